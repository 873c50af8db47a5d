//! Graph recording and the backward engine.
//!
//! Every primitive operation that produces a gradient-tracked tensor
//! stores a [`BackwardOp`] on its output; [`graph`] walks those links in
//! reverse topological order and [`grad_check`] validates the analytic
//! gradients against finite differences.

pub mod backward_op;
pub mod grad_check;
pub mod graph;

pub use backward_op::BackwardOp;
