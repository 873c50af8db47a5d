use super::*;
use crate::autograd::grad_check::check_grad;
use crate::ops::reduction::sum_op;
use crate::tensor::create::ones;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_matmul_forward_2d() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let b = create_test_tensor(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]);
    let result = matmul_op(&a, &b).unwrap();
    check_tensor_near(&result, &[2, 2], &[19.0, 22.0, 43.0, 50.0], 1e-4);
}

#[test]
fn test_matmul_forward_rectangular() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let b = create_test_tensor(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], vec![3, 2]);
    let result = matmul_op(&a, &b).unwrap();
    check_tensor_near(&result, &[2, 2], &[58.0, 64.0, 139.0, 154.0], 1e-4);
}

#[test]
fn test_matmul_matrix_vector() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let x = create_test_tensor(vec![1.0, 0.0, -1.0], vec![3]);
    let result = matmul_op(&a, &x).unwrap();
    check_tensor_near(&result, &[2], &[-2.0, -2.0], 1e-6);
}

#[test]
fn test_matmul_vector_matrix() {
    let x = create_test_tensor(vec![1.0, 2.0], vec![2]);
    let b = create_test_tensor(vec![3.0, 4.0, 5.0, 6.0], vec![2, 2]);
    let result = matmul_op(&x, &b).unwrap();
    check_tensor_near(&result, &[2], &[13.0, 16.0], 1e-6);
}

#[test]
fn test_matmul_vector_vector_scalar() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
    let b = create_test_tensor(vec![4.0, 5.0, 6.0], vec![3]);
    let result = matmul_op(&a, &b).unwrap();
    check_tensor_near(&result, &[], &[32.0], 1e-4);
}

#[test]
fn test_matmul_inner_dim_mismatch() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let b = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
    assert!(matches!(
        matmul_op(&a, &b),
        Err(RevGradError::IncompatibleShapes { .. })
    ));
}

#[test]
fn test_matmul_rejects_higher_rank() {
    let a = create_test_tensor(vec![0.0; 8], vec![2, 2, 2]);
    let b = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    assert!(matches!(
        matmul_op(&a, &b),
        Err(RevGradError::IncompatibleShapes { .. })
    ));
}

#[test]
fn test_matmul_backward_2d() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let b = create_test_tensor_with_grad(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]);
    let c = matmul_op(&a, &b).unwrap();
    c.backward(Some(ones(vec![2, 2]).unwrap())).unwrap();

    // dA = dC @ B^T, dB = A^T @ dC with dC = ones.
    check_tensor_near(&a.grad().unwrap(), &[2, 2], &[11.0, 15.0, 11.0, 15.0], 1e-4);
    check_tensor_near(&b.grad().unwrap(), &[2, 2], &[4.0, 4.0, 6.0, 6.0], 1e-4);
}

#[test]
fn test_matmul_backward_matrix_vector() {
    // loss = sum(W @ x): dW replicates x across rows, dx is the column
    // sums of W.
    let w = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let x = create_test_tensor_with_grad(vec![1.0, 0.0, -1.0], vec![3]);
    let y = matmul_op(&w, &x).unwrap();
    let loss = sum_op(&y, None, false).unwrap();
    loss.backward(None).unwrap();

    check_tensor_near(
        &w.grad().unwrap(),
        &[2, 3],
        &[1.0, 0.0, -1.0, 1.0, 0.0, -1.0],
        1e-4,
    );
    check_tensor_near(&x.grad().unwrap(), &[3], &[5.0, 7.0, 9.0], 1e-4);
}

#[test]
fn test_matmul_grad_check_2d() {
    let a = create_test_tensor_with_grad(vec![0.5, -1.0, 2.0, 0.25, 1.5, -0.5], vec![2, 3]);
    let b = create_test_tensor_with_grad(vec![1.0, -2.0, 0.5, 0.75, -0.25, 1.25], vec![3, 2]);
    let output_grad = ones(vec![2, 2]).unwrap();

    check_grad(
        |inputs| matmul_op(&inputs[0], &inputs[1]),
        &[a, b],
        &output_grad,
        1e-2,
        1e-2,
    )
    .unwrap();
}

#[test]
fn test_matmul_grad_check_matrix_vector() {
    let w = create_test_tensor_with_grad(vec![0.5, -1.0, 2.0, 0.25, 1.5, -0.5], vec![2, 3]);
    let x = create_test_tensor_with_grad(vec![1.0, -0.5, 0.25], vec![3]);
    let output_grad = ones(vec![2]).unwrap();

    check_grad(
        |inputs| matmul_op(&inputs[0], &inputs[1]),
        &[w, x],
        &output_grad,
        1e-2,
        1e-2,
    )
    .unwrap();
}
