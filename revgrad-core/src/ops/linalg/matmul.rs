use std::ops::{AddAssign, Mul};
use std::sync::Arc;

use num_traits::Zero;

use crate::autograd::backward_op::BackwardOp;
use crate::error::RevGradError;
use crate::tensor::Tensor;

// --- Backward Operation ---

/// Backward context for matrix multiplication `C = A @ B`:
/// `dA = dC @ Bᵀ` and `dB = Aᵀ @ dC`, computed on the rank-promoted 2-D
/// shapes and reshaped back to the original operand shapes.
#[derive(Debug)]
struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RevGradError> {
        let (m, k, n) = promoted_dims(&self.a_shape, &self.b_shape)?;

        let g2 = grad_output.detach().reshaped(vec![m, n])?;
        let a2 = self.a.detach().reshaped(vec![m, k])?;
        let b2 = self.b.detach().reshaped(vec![k, n])?;

        let grad_a2 = matmul_op(&g2, &transpose_2d(&b2)?)?;
        let grad_b2 = matmul_op(&transpose_2d(&a2)?, &g2)?;

        Ok(vec![
            grad_a2.reshaped(self.a_shape.clone())?,
            grad_b2.reshaped(self.b_shape.clone())?,
        ])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

// --- Kernel ---

/// Row-major `[m,k] x [k,n]` matrix product.
fn matmul_kernel<T>(a: &[T], b: &[T], m: usize, k: usize, n: usize) -> Vec<T>
where
    T: Copy + Zero + Mul<Output = T> + AddAssign,
{
    let mut output = vec![T::zero(); m * n];
    for i in 0..m {
        for j in 0..n {
            let mut acc = T::zero();
            for l in 0..k {
                acc += a[i * k + l] * b[l * n + j];
            }
            output[i * n + j] = acc;
        }
    }
    output
}

/// Materializes the transpose of a contiguous 2-D tensor.
pub(crate) fn transpose_2d(t: &Tensor) -> Result<Tensor, RevGradError> {
    let shape = t.shape();
    if shape.len() != 2 {
        return Err(RevGradError::UnsupportedOperation(format!(
            "transpose_2d requires a 2-D tensor, got shape {:?}",
            shape
        )));
    }
    let (rows, cols) = (shape[0], shape[1]);
    let guard = t.read_data();
    let mut data = Vec::with_capacity(rows * cols);
    for j in 0..cols {
        for i in 0..rows {
            data.push(guard.data[i * cols + j]);
        }
    }
    drop(guard);
    Tensor::new(data, vec![cols, rows])
}

/// Resolves the promoted `[m,k] x [k,n]` dimensions for 1-D or 2-D
/// operands, NumPy style: a 1-D left operand becomes `[1,k]`, a 1-D
/// right operand becomes `[k,1]`.
fn promoted_dims(
    a_shape: &[usize],
    b_shape: &[usize],
) -> Result<(usize, usize, usize), RevGradError> {
    let (m, ka) = match a_shape {
        [k] => (1, *k),
        [m, k] => (*m, *k),
        _ => {
            return Err(RevGradError::IncompatibleShapes {
                shape1: a_shape.to_vec(),
                shape2: b_shape.to_vec(),
            })
        }
    };
    let (kb, n) = match b_shape {
        [k] => (*k, 1),
        [k, n] => (*k, *n),
        _ => {
            return Err(RevGradError::IncompatibleShapes {
                shape1: a_shape.to_vec(),
                shape2: b_shape.to_vec(),
            })
        }
    };
    if ka != kb {
        return Err(RevGradError::IncompatibleShapes {
            shape1: a_shape.to_vec(),
            shape2: b_shape.to_vec(),
        });
    }
    Ok((m, ka, n))
}

// --- Forward Operation ---

/// Performs matrix multiplication `C = A @ B` for 1-D or 2-D operands.
///
/// 1-D operands follow NumPy promotion: the inserted axis is squeezed
/// from the result, so `[m,k] @ [k]` yields `[m]` and `[k] @ [k]` a
/// scalar.
pub fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RevGradError> {
    let requires_grad = a.requires_grad() || b.requires_grad();
    let a_shape = a.shape();
    let b_shape = b.shape();
    let (m, k, n) = promoted_dims(&a_shape, &b_shape)?;

    let output_shape = match (a_shape.len(), b_shape.len()) {
        (2, 2) => vec![m, n],
        (1, 2) => vec![n],
        (2, 1) => vec![m],
        _ => vec![],
    };

    let a_guard = a.read_data();
    let b_guard = b.read_data();
    let output_data = matmul_kernel(a_guard.data.as_slice(), b_guard.data.as_slice(), m, k, n);
    drop(a_guard);
    drop(b_guard);

    let result = Tensor::new(output_data, output_shape)?;

    if requires_grad {
        result.write_data().requires_grad = true;
        result.set_grad_fn(Some(Arc::new(MatmulBackward {
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
#[path = "matmul_test.rs"]
mod tests;
