use std::fmt;
use std::sync::{Arc, RwLock};

use crate::autograd::graph::NodeId;
use crate::error::RevGradError;
use crate::tensor_data::TensorData;

mod autograd;
pub mod broadcast_utils;
pub mod create;
pub mod utils;

// Re-export creation functions to make them accessible as `tensor::ones` etc.
pub use create::{full, ones, ones_like, randn, zeros, zeros_like};

/// Represents a multi-dimensional array (tensor) of `f32` values.
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** Multiple `Tensor` handles can point to the same
///     underlying node without cloning the data itself (cheap clones). The
///     computation graph keeps its parents alive through these handles.
/// 2.  **Interior Mutability:** Autograd metadata (`requires_grad`, `grad`)
///     can be modified through an immutable `Tensor` reference during a
///     backward pass, with the `RwLock` keeping access thread safe.
///
/// Two handles are the same graph vertex exactly when they share the
/// allocation; content equality plays no role in graph bookkeeping.
pub struct Tensor {
    /// Arc for shared ownership, RwLock for interior mutability of TensorData.
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new leaf tensor from row-major data and a shape.
    ///
    /// The tensor does not require grad; call
    /// [`requires_grad_`](Tensor::requires_grad_) to opt into tracking.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, RevGradError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor::from_data(tensor_data))
    }

    pub(crate) fn from_data(tensor_data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides.
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// The identity of this tensor as a graph vertex.
    ///
    /// Stable across handle clones, distinct across allocations; used as
    /// the key for visited sets and gradient maps during backward.
    pub fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// The lock is released when the guard goes out of scope.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    ///
    /// The lock is released when the guard goes out of scope.
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns the tensor data as an owned `Vec<f32>` in row-major order.
    pub fn get_f32_data(&self) -> Vec<f32> {
        self.read_data().data.as_ref().clone()
    }

    /// Extracts the value of a single-element tensor.
    pub fn item(&self) -> Result<f32, RevGradError> {
        let guard = self.read_data();
        if guard.numel() != 1 {
            return Err(RevGradError::UnsupportedOperation(format!(
                "item() requires a single-element tensor, got shape {:?}",
                guard.shape
            )));
        }
        Ok(guard.data[0])
    }
}

// Cloning a Tensor clones the Arc, not the TensorData: both handles refer
// to the same graph vertex.
impl Clone for Tensor {
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("shape", &guard.shape)
            .field("requires_grad", &guard.requires_grad)
            .field("has_grad_fn", &guard.grad_fn.is_some())
            .field("data", &guard.data)
            .finish()
    }
}
