//! Backward pass implementation.
//!
//! Walks the reverse topological order from a seed node, dispatching each
//! node's local gradient rule and *adding* the resulting contributions into
//! its operands' accumulators, so every path from the seed to a shared node
//! is counted.

use crate::error::Result;
use crate::graph::{Graph, NodeId};

/// Performs backward propagation through the graph.
///
/// Seeds `root`'s gradient to 1.0 (the derivative of the root with respect to
/// itself), then visits every reachable node in reverse topological order.
/// A node's gradient is fully accumulated from all of its consumers before
/// its own rule fires, so after this call every reachable node's `grad` is
/// the exact partial derivative ∂root/∂node at the frozen forward values.
///
/// Gradients start at the values set at node construction (0.0 for a fresh
/// graph); there is no reset. Calling this twice on the same graph keeps
/// accumulating — a fresh pass requires a rebuilt graph.
///
/// Deterministic and single-pass. NaN/Inf values propagate per IEEE
/// floating-point semantics; the only error is a corrupted graph surfaced by
/// the topological ordering.
pub fn backward(graph: &Graph, root: NodeId) -> Result<()> {
    let order = graph.topological_order(root)?;

    graph.set_grad(root, 1.0);
    for &id in order.iter().rev() {
        let node = graph.node(id);
        if node.inputs.is_empty() {
            continue;
        }
        let operand_values: Vec<f64> = node.inputs.iter().map(|&input| graph.data(input)).collect();
        let contributions = node.op.backward(node.grad, &operand_values, node.data);
        debug_assert_eq!(contributions.len(), node.inputs.len());
        for (&input, &contribution) in node.inputs.iter().zip(&contributions) {
            graph.add_grad(input, contribution);
        }
    }
    Ok(())
}
