use crate::tensor::utils::{calculate_strides, coord_to_index_broadcasted, index_to_coord};
use crate::tensor_data::TensorData;

pub mod add;
pub mod mul;
pub mod neg;
pub mod sub;

pub use add::add_op;
pub use mul::mul_op;
pub use neg::neg_op;
pub use sub::sub_op;

/// Shared kernel for element-wise binary operations with broadcasting.
///
/// Walks the (already validated) broadcast output shape and maps every
/// output coordinate back to each operand's buffer, pinning size-1 and
/// missing dimensions to index 0.
pub(crate) fn broadcast_binary_kernel<F>(
    a: &TensorData,
    b: &TensorData,
    output_shape: &[usize],
    op: F,
) -> Vec<f32>
where
    F: Fn(f32, f32) -> f32,
{
    let numel: usize = output_shape.iter().product();
    let output_strides = calculate_strides(output_shape);
    let mut result = Vec::with_capacity(numel);

    for i in 0..numel {
        let coords = index_to_coord(i, &output_strides, output_shape);
        let offset_a = coord_to_index_broadcasted(&coords, &a.shape, &a.strides);
        let offset_b = coord_to_index_broadcasted(&coords, &b.shape, &b.strides);
        result.push(op(a.data[offset_a], b.data[offset_b]));
    }
    result
}
