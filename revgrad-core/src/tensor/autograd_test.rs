use crate::autograd::grad_check::check_grad;
use crate::error::RevGradError;
use crate::ops::arithmetic::{add_op, mul_op};
use crate::ops::linalg::matmul_op;
use crate::ops::reduction::sum_op;
use crate::tensor::create::ones;
use crate::tensor::Tensor;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_backward_on_untracked_root_errors() {
    let a = create_test_tensor(vec![1.0, 2.0], vec![2]);
    let b = create_test_tensor(vec![3.0, 4.0], vec![2]);
    let y = add_op(&a, &b).unwrap();
    assert!(!y.requires_grad());
    assert_eq!(y.backward(None).err(), Some(RevGradError::RequiresGradNotMet));
}

#[test]
fn test_backward_non_scalar_without_seed_errors() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let y = add_op(&a, &a).unwrap();
    assert_eq!(y.backward(None).err(), Some(RevGradError::BackwardNonScalar));
}

#[test]
fn test_backward_seed_shape_mismatch_errors() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let y = add_op(&a, &a).unwrap();
    let bad_seed = create_test_tensor(vec![1.0, 1.0, 1.0], vec![3]);
    assert!(matches!(
        y.backward(Some(bad_seed)),
        Err(RevGradError::GradientAccumulationShapeMismatch { .. })
    ));
}

#[test]
fn test_backward_explicit_seed_passes_through_add() {
    // Additivity: for y = a + b, both grads equal the seed.
    let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0], vec![3]);
    let b = create_test_tensor_with_grad(vec![4.0, 5.0, 6.0], vec![3]);
    let y = add_op(&a, &b).unwrap();

    let seed = create_test_tensor(vec![0.5, -1.0, 2.0], vec![3]);
    y.backward(Some(seed)).unwrap();

    check_tensor_near(&a.grad().unwrap(), &[3], &[0.5, -1.0, 2.0], 1e-6);
    check_tensor_near(&b.grad().unwrap(), &[3], &[0.5, -1.0, 2.0], 1e-6);
}

#[test]
fn test_diamond_accumulation_add() {
    // y = a + a must deposit both edge contributions.
    let a = create_test_tensor_with_grad(vec![3.0], vec![1]);
    let y = add_op(&a, &a).unwrap();
    y.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[1], &[2.0], 1e-6);
}

#[test]
fn test_diamond_accumulation_mul() {
    // y = a * a => dy/da = 2a = 6.
    let a = create_test_tensor_with_grad(vec![3.0], vec![1]);
    let y = mul_op(&a, &a).unwrap();
    y.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[1], &[6.0], 1e-6);
}

#[test]
fn test_deep_diamond_accumulation() {
    // b = a + a; c = b * b; dc/da = 2b * 2 = 4 * (2a) = 8a.
    let a = create_test_tensor_with_grad(vec![1.5], vec![1]);
    let b = add_op(&a, &a).unwrap();
    let c = mul_op(&b, &b).unwrap();
    c.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[1], &[12.0], 1e-6);
}

#[test]
fn test_intermediate_node_receives_grad() {
    let a = create_test_tensor_with_grad(vec![2.0], vec![1]);
    let b = create_test_tensor_with_grad(vec![5.0], vec![1]);
    let c = mul_op(&a, &b).unwrap();
    let y = add_op(&c, &a).unwrap();
    y.backward(None).unwrap();

    // dy/dc = 1, dy/da = b + 1, dy/db = a.
    check_tensor_near(&c.grad().unwrap(), &[1], &[1.0], 1e-6);
    check_tensor_near(&a.grad().unwrap(), &[1], &[6.0], 1e-6);
    check_tensor_near(&b.grad().unwrap(), &[1], &[2.0], 1e-6);
}

#[test]
fn test_no_grad_isolation() {
    let a = create_test_tensor(vec![1.0, 2.0], vec![2]);
    let b = create_test_tensor(vec![3.0, 4.0], vec![2]);
    let c = mul_op(&a, &b).unwrap();
    let y = sum_op(&c, None, false).unwrap();

    // No node in the subgraph tracks gradients or records edges.
    assert!(!c.requires_grad());
    assert!(c.grad_fn().is_none());
    assert!(y.grad_fn().is_none());
    assert_eq!(y.backward(None).err(), Some(RevGradError::RequiresGradNotMet));
    assert!(a.grad().is_none());
    assert!(b.grad().is_none());
    assert!(c.grad().is_none());
}

#[test]
fn test_untracked_input_receives_no_grad() {
    let a = create_test_tensor_with_grad(vec![2.0], vec![1]);
    let b = create_test_tensor(vec![5.0], vec![1]);
    let y = mul_op(&a, &b).unwrap();
    y.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[1], &[5.0], 1e-6);
    assert!(b.grad().is_none());
}

#[test]
fn test_zero_grad_reset_idempotence() {
    let x = create_test_tensor_with_grad(vec![2.0, 3.0], vec![2]);

    let run = |x: &Tensor| {
        let sq = mul_op(x, x).unwrap();
        let y = sum_op(&sq, None, false).unwrap();
        y.backward(None).unwrap();
    };

    run(&x);
    let first = x.grad().unwrap().get_f32_data();

    x.zero_grad();
    assert!(x.grad().is_none());

    run(&x);
    let second = x.grad().unwrap().get_f32_data();
    assert_eq!(first, second);
}

#[test]
fn test_grad_accumulates_across_passes_without_reset() {
    let x = create_test_tensor_with_grad(vec![2.0, 3.0], vec![2]);
    for _ in 0..2 {
        let sq = mul_op(&x, &x).unwrap();
        let y = sum_op(&sq, None, false).unwrap();
        y.backward(None).unwrap();
    }
    // Two passes of d(sum(x^2))/dx = 2x.
    check_tensor_near(&x.grad().unwrap(), &[2], &[8.0, 12.0], 1e-6);
}

#[test]
fn test_end_to_end_sum_of_squares() {
    // x = [2, 3], y = sum(x * x) => grad = 2x = [4, 6].
    let x = create_test_tensor_with_grad(vec![2.0, 3.0], vec![2]);
    let sq = mul_op(&x, &x).unwrap();
    let y = sum_op(&sq, None, false).unwrap();
    assert_eq!(y.numel(), 1);
    assert_eq!(y.item().unwrap(), 13.0);

    y.backward(None).unwrap();
    check_tensor_near(&x.grad().unwrap(), &[2], &[4.0, 6.0], 1e-6);
}

#[test]
fn test_sum_of_squares_matches_oracle() {
    // Same quadratic as test_end_to_end_sum_of_squares, with the diamond
    // (x feeds both mul operands) validated against finite differences
    // instead of the analytic value. Tolerances are scaled to f32.
    let x = create_test_tensor_with_grad(vec![2.0, 3.0], vec![2]);
    let seed = ones(vec![]).unwrap();

    check_grad(
        |inputs| {
            let sq = mul_op(&inputs[0], &inputs[0])?;
            sum_op(&sq, None, false)
        },
        &[x.clone()],
        &seed,
        1e-2,
        1e-2,
    )
    .unwrap();

    // check_grad leaves the analytic pass's gradients in place.
    check_tensor_near(&x.grad().unwrap(), &[2], &[4.0, 6.0], 1e-5);
}

#[test]
fn test_matrix_vector_loss_matches_oracle() {
    // loss = sum(W @ x): gradients of both operands keep their input
    // shapes and agree with finite differences.
    let w = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let x = create_test_tensor_with_grad(vec![1.0, 0.0, -1.0], vec![3]);
    let seed = ones(vec![]).unwrap();

    check_grad(
        |inputs| {
            let y = matmul_op(&inputs[0], &inputs[1])?;
            sum_op(&y, None, false)
        },
        &[w.clone(), x.clone()],
        &seed,
        1e-2,
        1e-2,
    )
    .unwrap();

    assert_eq!(w.grad().unwrap().shape(), vec![2, 3]);
    assert_eq!(x.grad().unwrap().shape(), vec![3]);
}

#[test]
fn test_requires_grad_on_non_leaf_errors() {
    let a = create_test_tensor_with_grad(vec![1.0], vec![1]);
    let y = add_op(&a, &a).unwrap();
    assert_eq!(
        y.requires_grad_(true).err(),
        Some(RevGradError::RequiresGradOnNonLeaf)
    );
}

#[test]
fn test_detach_cuts_the_graph() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let y = mul_op(&a, &a).unwrap();
    let d = y.detach();
    assert!(!d.requires_grad());
    assert!(d.grad_fn().is_none());
    assert_eq!(d.get_f32_data(), y.get_f32_data());
}
