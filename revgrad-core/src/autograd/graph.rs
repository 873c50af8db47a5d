use std::collections::HashSet;
use std::sync::RwLock;

use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Identity of a tensor as a computation-graph vertex: the address of its
/// shared `TensorData`. Stable across `Tensor` handle clones, distinct
/// across allocations, and usable as a `HashMap`/`HashSet` key.
pub type NodeId = *const RwLock<TensorData>;

/// Builds a topological sort of the subgraph reachable backward from
/// `root`, returning nodes in post-order (ancestors before dependents,
/// `root` last). `backward()` walks the result in reverse, which
/// guarantees every node is processed only after all of its dependents
/// within the subgraph have deposited their gradient contributions.
///
/// Ordering tie-break: a node's parents are expanded in forward-input
/// order. This does not affect correctness (gradient accumulation is a
/// sum) but fixes the floating-point summation order, so results are
/// deterministic run to run.
pub(crate) fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut sorted = Vec::new();
    build_topo(root, &mut visited, &mut sorted);
    sorted
}

fn build_topo(node: &Tensor, visited: &mut HashSet<NodeId>, sorted: &mut Vec<Tensor>) {
    if !visited.insert(node.node_id()) {
        return;
    }
    log::trace!(
        "build_topo: visiting node {:?} (shape {:?})",
        node.node_id(),
        node.shape()
    );
    if let Some(grad_fn) = node.grad_fn() {
        for parent in grad_fn.inputs() {
            build_topo(&parent, visited, sorted);
        }
    }
    sorted.push(node.clone());
}
