use std::fmt::Debug;

use crate::error::RevGradError;
use crate::tensor::Tensor;

/// Defines the interface for the backward pass of a differentiable
/// tensor operation.
///
/// Any operation that creates a non-leaf `Tensor` (one produced from
/// inputs that require gradients) has an associated `BackwardOp`
/// implementation. It is stored in the output tensor's `grad_fn` field
/// and invoked during `backward()` to propagate gradients by the chain
/// rule. Adding a new primitive to the engine means adding one forward
/// function and one `BackwardOp` struct; no central registration exists.
///
/// The `Debug + Send + Sync` bounds let the `Arc<dyn BackwardOp>` holding
/// the context be shared and inspected across threads; backward passes
/// keep all traversal state local, so independent roots can run
/// concurrently.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the vector-Jacobian product for each input.
    ///
    /// Receives dL/dOutput (`grad_output`, same shape as this
    /// operation's output) and returns dL/dInput_i for every input, in
    /// the order [`inputs`](BackwardOp::inputs) reports them. Each
    /// returned gradient must already have the corresponding input's
    /// shape: rules for broadcasting operations sum over the broadcast
    /// axes before returning (see `Tensor::reduce_to_shape`). The engine
    /// rejects, rather than silently broadcasts, any mismatch.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RevGradError>;

    /// Returns the input tensors that participated in the forward
    /// operation, in forward order.
    ///
    /// These are handle clones of the original graph vertices (the same
    /// allocations), so `Tensor::node_id` identifies them in visited
    /// sets and gradient maps, and the graph keeps its ancestors alive
    /// for the duration of the pass.
    fn inputs(&self) -> Vec<Tensor>;
}
