//! Value handles and the differentiable operation algebra.
//!
//! A [`Value`] pairs a graph reference with a node index, so handles are
//! `Copy` and the same node can appear in any number of expressions
//! (fan-out). Arithmetic on handles records new nodes in the owning graph;
//! `f64` operands on either side auto-box into constant leaves.

use std::fmt;
use std::ops::{Add, Mul};
use std::ptr;

use crate::error::Result;
use crate::graph::{Graph, NodeId};
use crate::ops::Op;

/// A handle to a node in a [`Graph`].
#[derive(Clone, Copy)]
pub struct Value<'g> {
    graph: &'g Graph,
    id: NodeId,
}

impl<'g> Value<'g> {
    pub(crate) fn new(graph: &'g Graph, id: NodeId) -> Self {
        Self { graph, id }
    }

    /// The id of the underlying node.
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The graph this handle points into.
    pub fn graph(self) -> &'g Graph {
        self.graph
    }

    /// Forward value of the node.
    pub fn data(self) -> f64 {
        self.graph.data(self.id)
    }

    /// Accumulated gradient of the node.
    pub fn grad(self) -> f64 {
        self.graph.grad(self.id)
    }

    /// Operation tag of the node.
    pub fn op(self) -> Op {
        self.graph.op(self.id)
    }

    /// Diagnostic label of the node, if any.
    pub fn label(self) -> Option<String> {
        self.graph.label(self.id)
    }

    /// Attaches a diagnostic label, returning the handle for chaining.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.graph.set_label(self.id, label);
        self
    }

    /// Overwrites the node's forward value (see [`Graph::set_data`]).
    pub fn set_data(self, data: f64) {
        self.graph.set_data(self.id, data);
    }

    /// Handles to the node's direct operands; empty for leaves.
    pub fn children(self) -> Vec<Self> {
        self.graph
            .inputs(self.id)
            .into_iter()
            .map(|id| Self::new(self.graph, id))
            .collect()
    }

    /// Hyperbolic tangent, recorded as a new node.
    pub fn tanh(self) -> Self {
        Self::new(self.graph, self.graph.apply_op(Op::Tanh, &[self.id]))
    }

    /// Runs backward propagation seeded at this node (see
    /// [`backward`](crate::backward::backward)).
    pub fn backward(self) -> Result<()> {
        crate::backward::backward(self.graph, self.id)
    }

    fn binary(self, rhs: Self, op: Op) -> Self {
        assert!(
            ptr::eq(self.graph, rhs.graph),
            "operands belong to different graphs"
        );
        Self::new(self.graph, self.graph.apply_op(op, &[self.id, rhs.id]))
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("id", &self.id)
            .field("data", &self.data())
            .field("grad", &self.grad())
            .field("op", &self.op())
            .field("label", &self.label())
            .finish()
    }
}

/// Handle identity: same arena, same node.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl<'g> Add for Value<'g> {
    type Output = Value<'g>;

    fn add(self, rhs: Self) -> Self::Output {
        self.binary(rhs, Op::Add)
    }
}

impl<'g> Add<f64> for Value<'g> {
    type Output = Value<'g>;

    fn add(self, rhs: f64) -> Self::Output {
        self + self.graph.leaf(rhs)
    }
}

impl<'g> Add<Value<'g>> for f64 {
    type Output = Value<'g>;

    fn add(self, rhs: Value<'g>) -> Self::Output {
        rhs.graph.leaf(self) + rhs
    }
}

impl<'g> Mul for Value<'g> {
    type Output = Value<'g>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.binary(rhs, Op::Mul)
    }
}

impl<'g> Mul<f64> for Value<'g> {
    type Output = Value<'g>;

    fn mul(self, rhs: f64) -> Self::Output {
        self * self.graph.leaf(rhs)
    }
}

impl<'g> Mul<Value<'g>> for f64 {
    type Output = Value<'g>;

    fn mul(self, rhs: Value<'g>) -> Self::Output {
        rhs.graph.leaf(self) * rhs
    }
}
