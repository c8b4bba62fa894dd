//! Reverse-mode automatic differentiation over scalar computation graphs.
//!
//! This crate provides a minimal autodiff engine for scalar values. Building
//! an expression records a directed acyclic graph of nodes; a single reverse
//! traversal then computes the exact partial derivative of one output with
//! respect to every node that contributed to it.
//!
//! # Features
//!
//! - **Dynamic graphs**: expressions record nodes in an arena as they are
//!   evaluated, with fan-out (one node feeding many consumers) expressed by
//!   reusing a handle
//! - **Reverse mode AD**: one backward pass yields all partial derivatives,
//!   with contributions from distinct paths summed, never overwritten
//! - **Inspectable graphs**: operations are plain enum tags and the full
//!   node/edge sets of a subgraph can be walked read-only
//!
//! # Architecture
//!
//! The engine is built around three core components:
//!
//! 1. **Graph**: the arena owning every node, plus topological ordering
//! 2. **Operations**: the differentiable algebra and its local gradient rules
//! 3. **Backward**: the reverse-order propagation driver
//!
//! # Example
//!
//! ```
//! use scalargrad::Graph;
//!
//! let g = Graph::new();
//! let x = g.labeled_leaf(0.5, "x");
//! let y = x * x + x; // fan-out: x feeds both the product and the sum
//! y.backward().unwrap();
//!
//! assert_eq!(y.data(), 0.75);
//! assert_eq!(x.grad(), 2.0); // d(x² + x)/dx = 2x + 1
//! ```

pub mod backward;
pub mod error;
pub mod graph;
pub mod ops;
pub mod value;

// Re-export key types
pub use backward::backward;
pub use error::{GraphError, Result};
pub use graph::{Graph, GraphEdge, GraphTrace, Node, NodeId};
pub use ops::Op;
pub use value::Value;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::backward::backward;
    pub use crate::error::{GraphError, Result};
    pub use crate::graph::{Graph, GraphEdge, GraphTrace, Node, NodeId};
    pub use crate::ops::Op;
    pub use crate::value::Value;
}
