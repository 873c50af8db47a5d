//! # revgrad-core
//!
//! A minimal reverse-mode automatic differentiation engine over `f32`
//! tensors. Forward evaluation of the primitive operations in [`ops`]
//! implicitly records a computation graph; calling [`Tensor::backward`]
//! on a (typically scalar) output walks that graph once, in reverse
//! topological order, and accumulates the gradient of every ancestor
//! that requires one.

pub mod autograd;
pub mod error;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

pub use error::RevGradError;
pub use tensor::Tensor;
