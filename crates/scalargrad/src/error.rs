//! Error types for computation-graph operations.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors that can occur while walking a computation graph.
///
/// Graph construction itself cannot fail: a node is created strictly after
/// its operands, so a well-formed arena is acyclic by construction. These
/// errors surface library misuse (a corrupted arena, or a node id from a
/// different graph) synchronously, before any partial result escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The children relation contains a cycle.
    ///
    /// Detected when a node reappears on the active traversal path during
    /// topological ordering. The walk aborts without producing a partial
    /// ordering.
    #[error("cycle detected in computation graph at {node}")]
    CycleDetected {
        /// First node observed twice on the active traversal path.
        node: NodeId,
    },

    /// A node id does not belong to the arena being walked.
    #[error("{node} does not belong to this graph ({nodes} nodes allocated)")]
    UnknownNode {
        /// The offending id.
        node: NodeId,
        /// Number of nodes the arena actually holds.
        nodes: usize,
    },
}

/// Result type alias for operations that can produce [`GraphError`].
pub type Result<T> = std::result::Result<T, GraphError>;
