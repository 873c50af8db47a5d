//! Gradient shape adapters for broadcasting operations.
//!
//! Forward broadcasting stretches an operand to a larger shape; the
//! corresponding backward rule must sum the incoming gradient over the
//! stretched axes ([`Tensor::reduce_to_shape`]). Reduction operations go
//! the other way: their backward rule replicates a reduced gradient back
//! out to the input shape ([`Tensor::expand_to_shape`]).

use num_traits::Zero;

use crate::error::RevGradError;
use crate::ops::reduction::sum_op;
use crate::tensor::utils::{
    broadcast_shapes, calculate_strides, coord_to_index_broadcasted, index_to_coord,
};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

impl Tensor {
    /// Reduces this tensor (a gradient) to `target_shape` by summing over
    /// the axes that broadcasting stretched.
    ///
    /// When broadcasting occurred during a forward pass (e.g.
    /// `A[2,3] + B[3] -> C[2,3]`), the gradient flowing back to an input
    /// must have that input's shape: the upstream gradient is summed over
    /// every dimension that was prepended or expanded from size 1.
    pub fn reduce_to_shape(&self, target_shape: &[usize]) -> Result<Tensor, RevGradError> {
        let current_shape = self.shape();

        if current_shape == target_shape {
            return Ok(self.clone());
        }

        // Reduction to scalar sums everything.
        if target_shape.is_empty() {
            return sum_op(self, None, false);
        }

        let current_rank = current_shape.len();
        let target_rank = target_shape.len();

        if current_rank < target_rank {
            return Err(RevGradError::InternalError(format!(
                "Cannot reduce shape {:?} to target {:?}: current rank < target rank.",
                current_shape, target_shape
            )));
        }

        // Axes to sum: dimensions prepended by broadcasting, plus
        // dimensions that were 1 in the target but stretched in this shape.
        let rank_diff = current_rank - target_rank;
        let mut axes_to_reduce: Vec<usize> = (0..rank_diff).collect();

        for i in 0..target_rank {
            let current_dim = current_shape[rank_diff + i];
            let target_dim = target_shape[i];

            if current_dim != target_dim {
                if target_dim == 1 {
                    axes_to_reduce.push(rank_diff + i);
                } else {
                    return Err(RevGradError::InternalError(format!(
                        "Cannot reduce shape {:?} to target {:?}: incompatible dim {} ({} vs {}).",
                        current_shape, target_shape, i, current_dim, target_dim
                    )));
                }
            }
        }

        if axes_to_reduce.is_empty() {
            return Err(RevGradError::InternalError(format!(
                "Cannot reduce shape {:?} to {:?}: shapes differ but no reduction axes.",
                current_shape, target_shape
            )));
        }

        let reduced = sum_op(self, Some(&axes_to_reduce), true)?;
        if reduced.shape() == target_shape {
            Ok(reduced)
        } else {
            // keep_dims left size-1 axes the target does not have.
            reduced.reshaped(target_shape.to_vec())
        }
    }

    /// Replicates this tensor (a reduced gradient) out to `target_shape`
    /// following broadcasting rules. The counterpart of
    /// [`reduce_to_shape`](Tensor::reduce_to_shape), used by reduction
    /// backward rules.
    pub fn expand_to_shape(&self, target_shape: &[usize]) -> Result<Tensor, RevGradError> {
        let current_shape = self.shape();
        if current_shape == target_shape {
            return Ok(self.clone());
        }

        let broadcast = broadcast_shapes(&current_shape, target_shape)?;
        if broadcast != target_shape {
            return Err(RevGradError::IncompatibleShapes {
                shape1: current_shape,
                shape2: target_shape.to_vec(),
            });
        }

        let guard = self.read_data();
        let expanded = expand_kernel(
            target_shape,
            guard.data.as_slice(),
            &guard.shape,
            &guard.strides,
        );
        drop(guard);
        Tensor::new(expanded, target_shape.to_vec())
    }

    /// Returns a tensor sharing this tensor's buffer with a new shape.
    /// Element counts must match. The result carries no autograd state;
    /// callers use this on detached gradients and forward values only.
    pub(crate) fn reshaped(&self, new_shape: Vec<usize>) -> Result<Tensor, RevGradError> {
        let guard = self.read_data();
        let new_numel: usize = new_shape.iter().product();
        if new_numel != guard.numel() {
            return Err(RevGradError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: new_shape,
                operation: "reshaped".to_string(),
            });
        }
        let strides = calculate_strides(&new_shape);
        let tensor_data = TensorData {
            data: std::sync::Arc::clone(&guard.data),
            shape: new_shape,
            strides,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        };
        Ok(Tensor::from_data(tensor_data))
    }
}

/// Replicates `source` into a buffer of `target_shape` by mapping each
/// output coordinate back through the broadcasting rules.
pub(crate) fn expand_kernel<T>(
    target_shape: &[usize],
    source_data: &[T],
    source_shape: &[usize],
    source_strides: &[usize],
) -> Vec<T>
where
    T: Copy + Zero,
{
    let target_numel: usize = target_shape.iter().product();
    let target_strides = calculate_strides(target_shape);
    let mut expanded = vec![T::zero(); target_numel];

    for (i, slot) in expanded.iter_mut().enumerate() {
        let coords = index_to_coord(i, &target_strides, target_shape);
        let src_index = coord_to_index_broadcasted(&coords, source_shape, source_strides);
        *slot = source_data[src_index];
    }
    expanded
}
