//! # Tensor Operations Module (`ops`)
//!
//! Central hub for the engine's primitive differentiable operations.
//!
//! ## Structure
//!
//! - **`_op` functions:** each operation has a core function (`xxx_op`)
//!   that performs the forward computation and, when any input requires
//!   gradients, wires the autograd linkage onto the output. Graph
//!   construction is confined to these functions.
//! - **`Backward` structs:** each operation has a context struct (e.g.
//!   `AddBackward`, `MatmulBackward`) implementing
//!   [`BackwardOp`](crate::autograd::BackwardOp), storing whatever the
//!   forward pass must remember for its vector-Jacobian products.
//!
//! ## Submodules
//!
//! - [`arithmetic`]: element-wise add, sub, mul, neg (with broadcasting).
//! - [`linalg`]: matrix multiplication.
//! - [`reduction`]: sum over all or selected axes.

pub mod arithmetic;
pub mod linalg;
pub mod reduction;
