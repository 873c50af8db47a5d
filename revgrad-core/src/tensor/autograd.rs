use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::autograd::graph::{topological_sort, NodeId};
use crate::autograd::BackwardOp;
use crate::error::RevGradError;
use crate::ops::arithmetic::add_op;
use crate::tensor::create::ones_like;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

impl Tensor {
    /// Checks if this tensor participates in gradient tracking.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag of this tensor **in-place**.
    /// Only allowed on leaf tensors; a composite's flag is fixed at
    /// construction as the OR of its inputs' flags.
    pub fn requires_grad_(&self, requires_grad: bool) -> Result<(), RevGradError> {
        let mut guard = self.write_data();
        if guard.grad_fn.is_some() {
            return Err(RevGradError::RequiresGradOnNonLeaf);
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns a clone of the gradient tensor, if one has accumulated.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Returns the backward operation that produced this tensor, if any.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp + Send + Sync>> {
        self.read_data().grad_fn.clone()
    }

    pub(crate) fn set_grad_fn(&self, grad_fn: Option<Arc<dyn BackwardOp + Send + Sync>>) {
        self.write_data().grad_fn = grad_fn;
    }

    /// Resets this tensor's gradient to absent. Touches only this node;
    /// the graph and other nodes' gradients are unaffected.
    pub fn zero_grad(&self) {
        self.write_data().grad = None;
    }

    /// Creates a new tensor sharing this tensor's buffer but detached
    /// from the computation graph: no `requires_grad`, no `grad_fn`.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        let detached = TensorData {
            data: Arc::clone(&guard.data),
            shape: guard.shape.clone(),
            strides: guard.strides.clone(),
            requires_grad: false,
            grad: None,
            grad_fn: None,
        };
        Tensor::from_data(detached)
    }

    /// Computes gradients of this tensor w.r.t. every ancestor that
    /// requires them, in a single reverse topological traversal.
    ///
    /// # Seed policy
    /// * `Some(g)`: `g` must have this tensor's exact shape; anything
    ///   else fails with `GradientAccumulationShapeMismatch` rather than
    ///   being broadcast.
    /// * `None`: allowed only for single-element roots, which are
    ///   seeded with ones. Non-scalar roots must pass an explicit seed
    ///   or get `BackwardNonScalar`.
    ///
    /// Gradients accumulate into existing `grad` fields; call
    /// [`zero_grad`](Tensor::zero_grad) between passes to start fresh.
    ///
    /// # Errors
    /// `RequiresGradNotMet` if this tensor does not require grad (the
    /// untracked-root case).
    pub fn backward(&self, gradient: Option<Tensor>) -> Result<(), RevGradError> {
        if !self.requires_grad() {
            return Err(RevGradError::RequiresGradNotMet);
        }

        let seed = match gradient {
            Some(g) => {
                if g.shape() != self.shape() {
                    return Err(RevGradError::GradientAccumulationShapeMismatch {
                        expected: self.shape(),
                        actual: g.shape(),
                    });
                }
                g.detach()
            }
            None => {
                if self.numel() == 1 {
                    ones_like(self)?
                } else {
                    return Err(RevGradError::BackwardNonScalar);
                }
            }
        };

        log::debug!(
            "backward: starting from root {:?} (shape {:?})",
            self.node_id(),
            self.shape()
        );

        // Contributions accumulate here until the reverse walk reaches
        // their node; reverse topological order guarantees an entry is
        // complete (all dependents processed) by then.
        let mut grad_map: HashMap<NodeId, Tensor> = HashMap::new();
        grad_map.insert(self.node_id(), seed);

        let sorted = topological_sort(self);

        for node in sorted.iter().rev() {
            let Some(node_grad) = grad_map.remove(&node.node_id()) else {
                // Ancestors reachable only through non-tracked inputs
                // receive no contribution.
                continue;
            };

            node.accumulate_grad(&node_grad)?;

            let Some(grad_fn) = node.grad_fn() else {
                continue; // Leaf.
            };

            let input_grads = grad_fn.backward(&node_grad)?;
            let parents = grad_fn.inputs();
            if input_grads.len() != parents.len() {
                return Err(RevGradError::InternalError(format!(
                    "BackwardOp returned {} gradients for {} inputs (op: {:?})",
                    input_grads.len(),
                    parents.len(),
                    grad_fn
                )));
            }

            for (parent, contribution) in parents.iter().zip(input_grads) {
                if !parent.requires_grad() {
                    continue;
                }
                let parent_shape = parent.shape();
                if contribution.shape() != parent_shape {
                    return Err(RevGradError::GradientAccumulationShapeMismatch {
                        expected: parent_shape,
                        actual: contribution.shape(),
                    });
                }
                log::trace!(
                    "backward: depositing contribution of shape {:?} into node {:?}",
                    contribution.shape(),
                    parent.node_id()
                );
                match grad_map.entry(parent.node_id()) {
                    Entry::Occupied(mut entry) => {
                        let summed = add_op(entry.get(), &contribution)?.detach();
                        entry.insert(summed);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(contribution.detach());
                    }
                }
            }
        }

        Ok(())
    }

    /// Adds `grad_to_add` into this tensor's `grad` field, initializing
    /// it when absent. Shapes must match exactly.
    pub(crate) fn accumulate_grad(&self, grad_to_add: &Tensor) -> Result<(), RevGradError> {
        let expected_shape = self.shape();
        if grad_to_add.shape() != expected_shape {
            return Err(RevGradError::GradientAccumulationShapeMismatch {
                expected: expected_shape,
                actual: grad_to_add.shape(),
            });
        }

        let new_grad = match self.grad() {
            Some(existing) => add_op(&existing, grad_to_add)?.detach(),
            None => grad_to_add.detach(),
        };
        self.write_data().grad = Some(new_grad);
        Ok(())
    }
}

#[cfg(test)]
#[path = "autograd_test.rs"]
mod tests;
