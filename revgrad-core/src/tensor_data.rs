use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RevGradError;
use crate::tensor::utils::calculate_strides;
use crate::tensor::Tensor;

/// Internal storage and metadata for a Tensor.
///
/// Holds the data buffer, shape, strides, and autograd-related state.
/// It is wrapped in `Arc<RwLock<TensorData>>` by the `Tensor` struct to
/// allow shared ownership and interior mutability. `data`, `shape` and
/// `grad_fn` are fixed at construction; only `grad` (and, for leaves,
/// `requires_grad`) mutate afterwards.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying row-major data buffer.
    /// Wrapped in Arc for cheap sharing (e.g. by `detach`).
    pub(crate) data: Arc<Vec<f32>>,
    /// The shape (dimensions) of the tensor. `vec![]` is a scalar.
    pub(crate) shape: Vec<usize>,
    /// Contiguous strides for each dimension, derived from `shape`.
    pub(crate) strides: Vec<usize>,

    /// Flag indicating if the tensor participates in gradient tracking.
    /// If true, operations involving this tensor record graph edges.
    pub(crate) requires_grad: bool,
    /// Accumulated gradient, populated during backward passes.
    /// Always has the same shape as this tensor when present.
    pub(crate) grad: Option<Tensor>,
    /// The backward operation that produced this tensor, linking it to
    /// its parents in the computation graph. Leaf tensors have `None`.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp + Send + Sync>>,
}

impl TensorData {
    /// Creates a new `TensorData` from raw f32 data in row-major order.
    ///
    /// # Errors
    /// Returns `RevGradError::TensorCreationError` if the length of
    /// `data_vec` does not match the element count implied by `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, RevGradError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(RevGradError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);

        Ok(TensorData {
            data: Arc::new(data_vec),
            shape,
            strides,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}
