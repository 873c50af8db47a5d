use std::sync::Arc;

use crate::autograd::backward_op::BackwardOp;
use crate::error::RevGradError;
use crate::ops::arithmetic::broadcast_binary_kernel;
use crate::tensor::utils::broadcast_shapes;
use crate::tensor::Tensor;

// --- Backward Operation ---

/// Backward context for element-wise multiplication (product rule):
/// `d/da = grad * b`, `d/db = grad * a`, each reduced to its input's
/// shape. The vjp arithmetic runs on detached operands so it records no
/// second-order graph.
#[derive(Debug)]
struct MulBackward {
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for MulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RevGradError> {
        let grad_a = mul_op(grad_output, &self.b.detach())?.reduce_to_shape(&self.a_shape)?;
        let grad_b = mul_op(grad_output, &self.a.detach())?.reduce_to_shape(&self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

// --- Forward Operation ---

/// Performs element-wise multiplication of two tensors with broadcasting.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RevGradError> {
    let requires_grad = a.requires_grad() || b.requires_grad();
    let a_shape = a.shape();
    let b_shape = b.shape();
    let output_shape = broadcast_shapes(&a_shape, &b_shape)?;

    let a_guard = a.read_data();
    let b_guard = b.read_data();
    let result_data = broadcast_binary_kernel(&a_guard, &b_guard, &output_shape, |x, y| x * y);
    drop(a_guard);
    drop(b_guard);

    let result = Tensor::new(result_data, output_shape)?;

    if requires_grad {
        result.write_data().requires_grad = true;
        result.set_grad_fn(Some(Arc::new(MulBackward {
            a: a.clone(),
            b: b.clone(),
            a_shape,
            b_shape,
        })));
    }
    Ok(result)
}

// --- Tests ---
#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
