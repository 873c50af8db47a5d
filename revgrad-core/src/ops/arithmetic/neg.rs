use std::sync::Arc;

use crate::autograd::backward_op::BackwardOp;
use crate::error::RevGradError;
use crate::tensor::Tensor;

// --- Backward Operation ---

#[derive(Debug)]
struct NegBackward {
    input: Tensor,
}

impl BackwardOp for NegBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RevGradError> {
        Ok(vec![neg_op(grad_output)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

// --- Forward Operation ---

/// Performs element-wise negation of a tensor.
pub fn neg_op(a: &Tensor) -> Result<Tensor, RevGradError> {
    let requires_grad = a.requires_grad();

    let a_guard = a.read_data();
    let result_data: Vec<f32> = a_guard.data.iter().map(|&x| -x).collect();
    let output_shape = a_guard.shape.clone();
    drop(a_guard);

    let result = Tensor::new(result_data, output_shape)?;

    if requires_grad {
        result.write_data().requires_grad = true;
        result.set_grad_fn(Some(Arc::new(NegBackward { input: a.clone() })));
    }
    Ok(result)
}

// --- Tests ---
#[cfg(test)]
#[path = "neg_test.rs"]
mod tests;
