//! Pure shape arithmetic shared by the operation kernels and the
//! broadcast gradient adapters.

use std::cmp::max;

use crate::error::RevGradError;

/// Calculates the contiguous strides for a given shape.
/// Strides represent the number of elements to skip in the flattened data
/// array to move one step along each dimension.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Determines the output shape resulting from broadcasting two shapes.
///
/// Follows NumPy/PyTorch broadcasting rules:
/// 1. If the shapes have different ranks, prepend 1s to the shorter one.
/// 2. Compare dimensions element-wise from right to left.
/// 3. Dimensions are compatible if they are equal, or one of them is 1.
/// 4. The resulting dimension size is the maximum of the two.
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>, RevGradError> {
    let rank_a = shape_a.len();
    let rank_b = shape_b.len();
    let max_rank = max(rank_a, rank_b);
    let mut result_shape = vec![0; max_rank];

    for i in 0..max_rank {
        let dim_a = shape_a.get(rank_a.wrapping_sub(1 + i)).copied().unwrap_or(1);
        let dim_b = shape_b.get(rank_b.wrapping_sub(1 + i)).copied().unwrap_or(1);

        if dim_a == dim_b {
            result_shape[max_rank - 1 - i] = dim_a;
        } else if dim_a == 1 {
            result_shape[max_rank - 1 - i] = dim_b;
        } else if dim_b == 1 {
            result_shape[max_rank - 1 - i] = dim_a;
        } else {
            return Err(RevGradError::BroadcastError {
                shape1: shape_a.to_vec(),
                shape2: shape_b.to_vec(),
            });
        }
    }
    Ok(result_shape)
}

/// Converts a linear index into multi-dimensional coordinates for the
/// given contiguous strides and shape.
pub fn index_to_coord(index: usize, strides: &[usize], shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut coord = vec![0; rank];
    let mut current_index = index;
    for i in 0..rank {
        if strides[i] == 0 {
            coord[i] = 0;
        } else {
            coord[i] = current_index / strides[i];
            current_index %= strides[i];
        }
    }
    coord
}

/// Maps coordinates in a broadcasted output back to the linear index of
/// the original (possibly lower-rank) operand.
///
/// Dimensions of size 1 in the original shape are pinned to coordinate 0;
/// leading output dimensions with no counterpart in the original are
/// skipped.
pub fn coord_to_index_broadcasted(
    target_coord: &[usize],
    original_shape: &[usize],
    original_strides: &[usize],
) -> usize {
    if original_shape.is_empty() {
        return 0; // Scalar operand
    }
    let rank_diff = target_coord.len().saturating_sub(original_shape.len());
    let mut index = 0;
    for i in 0..original_shape.len() {
        let coord_idx = rank_diff + i;
        let effective_coord = if original_shape[i] == 1 {
            0
        } else {
            target_coord[coord_idx]
        };
        index += effective_coord * original_strides[i];
    }
    index
}
