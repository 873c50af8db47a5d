use std::sync::Arc;

use crate::autograd::backward_op::BackwardOp;
use crate::error::RevGradError;
use crate::tensor::utils::{calculate_strides, coord_to_index_broadcasted, index_to_coord};
use crate::tensor::Tensor;

// --- Backward Operation ---

/// Backward context for summation: every input element contributed with
/// weight 1, so the input gradient is the output gradient replicated
/// back out. The gradient is first viewed in the keep-dims layout
/// (size-1 at each reduced axis) and then broadcast to the input shape.
#[derive(Debug)]
struct SumBackward {
    input: Tensor,
    input_shape: Vec<usize>,
    kd_shape: Vec<usize>,
}

impl BackwardOp for SumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RevGradError> {
        let grad = grad_output
            .detach()
            .reshaped(self.kd_shape.clone())?
            .expand_to_shape(&self.input_shape)?;
        Ok(vec![grad])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

// --- Forward Operation ---

/// Sums the elements of a tensor over the given axes.
///
/// `axes = None` (or an empty slice) sums over every axis, producing a
/// scalar unless `keep_dims` is set. With `keep_dims`, reduced axes stay
/// in the output with size 1.
pub fn sum_op(
    input: &Tensor,
    axes: Option<&[usize]>,
    keep_dims: bool,
) -> Result<Tensor, RevGradError> {
    let requires_grad = input.requires_grad();
    let input_shape = input.shape();
    let rank = input_shape.len();

    let resolved_axes: Vec<usize> = match axes {
        None => (0..rank).collect(),
        Some(axes) => {
            for &axis in axes {
                if axis >= rank {
                    return Err(RevGradError::IndexOutOfBounds {
                        index: vec![axis],
                        shape: input_shape,
                    });
                }
            }
            let mut resolved = axes.to_vec();
            resolved.sort_unstable();
            resolved.dedup();
            if resolved.is_empty() {
                (0..rank).collect()
            } else {
                resolved
            }
        }
    };

    // Keep-dims layout of the result; squeezed afterwards if requested.
    let kd_shape: Vec<usize> = input_shape
        .iter()
        .enumerate()
        .map(|(dim, &size)| if resolved_axes.contains(&dim) { 1 } else { size })
        .collect();
    let output_shape: Vec<usize> = if keep_dims {
        kd_shape.clone()
    } else {
        input_shape
            .iter()
            .enumerate()
            .filter(|&(dim, _)| !resolved_axes.contains(&dim))
            .map(|(_, &size)| size)
            .collect()
    };

    let guard = input.read_data();
    let kd_strides = calculate_strides(&kd_shape);
    let kd_numel: usize = kd_shape.iter().product();
    let mut result_data = vec![0.0f32; kd_numel];

    for i in 0..guard.numel() {
        let coords = index_to_coord(i, &guard.strides, &guard.shape);
        let out_idx = coord_to_index_broadcasted(&coords, &kd_shape, &kd_strides);
        result_data[out_idx] += guard.data[i];
    }
    drop(guard);

    let result = Tensor::new(result_data, kd_shape.clone())?;
    let result = if keep_dims {
        result
    } else {
        result.reshaped(output_shape)?
    };

    if requires_grad {
        result.write_data().requires_grad = true;
        result.set_grad_fn(Some(Arc::new(SumBackward {
            input: input.clone(),
            input_shape,
            kd_shape,
        })));
    }
    Ok(result)
}

// --- Tests ---
#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
