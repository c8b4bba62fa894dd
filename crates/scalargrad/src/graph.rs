//! Arena-backed computation graph.
//!
//! Every node lives in a single growable store owned by [`Graph`] and is
//! referenced by [`NodeId`] index. Fan-out is expressed by repeating an id in
//! several operand lists; no node owns another, and the whole graph is freed
//! at once when the arena drops. Interior mutability lets gradient
//! accumulation run through shared references, which keeps the public
//! [`Value`] handles `Copy`; the graph is single-threaded by design.

use std::cell::RefCell;
use std::fmt;

use crate::error::{GraphError, Result};
use crate::ops::Op;
use crate::value::Value;

/// Unique identifier for a node: its index in the owning [`Graph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node{}", self.0)
    }
}

/// A vertex of the computation graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Forward value, frozen at construction time.
    pub data: f64,
    /// Accumulated gradient; starts at 0.0 and is only ever added to.
    pub grad: f64,
    /// The operation that produced this node.
    pub op: Op,
    /// Operands consumed to produce this node; empty for leaves.
    pub inputs: Vec<NodeId>,
    /// Optional diagnostic name; no semantic effect.
    pub label: Option<String>,
}

/// A parent→child edge of the graph, annotated with the parent's operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    /// The consuming node.
    pub parent: NodeId,
    /// The operand it consumes.
    pub child: NodeId,
    /// The operation recorded on the parent.
    pub op: Op,
}

/// The transitive node and edge sets reachable from a root.
///
/// This is the read-only walk a rendering collaborator consumes; the engine
/// itself never reads it back.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphTrace {
    /// Every reachable node, children before parents.
    pub nodes: Vec<NodeId>,
    /// Every parent→child edge among the reachable nodes.
    pub edges: Vec<GraphEdge>,
}

/// DFS state for cycle-aware topological ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    /// On the active recursion path; seeing this again means a cycle.
    OnPath,
    Done,
}

/// The computation graph: an arena owning every node.
///
/// Nodes are created through [`Graph::leaf`] and the operation algebra on
/// [`Value`] handles. Construction flows strictly forward (an operation only
/// references already-stored nodes), so a well-formed arena is acyclic.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: RefCell<Vec<Node>>,
}

impl Graph {
    /// Creates a new empty computation graph.
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(Vec::new()),
        }
    }

    /// Creates an input/constant node.
    pub fn leaf(&self, data: f64) -> Value<'_> {
        let id = self.push(Node {
            data,
            grad: 0.0,
            op: Op::Leaf,
            inputs: Vec::new(),
            label: None,
        });
        Value::new(self, id)
    }

    /// Creates a leaf with a diagnostic label.
    pub fn labeled_leaf(&self, data: f64, label: impl Into<String>) -> Value<'_> {
        let value = self.leaf(data);
        self.set_label(value.id(), label);
        value
    }

    /// Applies an operation to existing nodes, producing a new node whose
    /// forward value is computed immediately. Operands are never mutated.
    pub(crate) fn apply_op(&self, op: Op, inputs: &[NodeId]) -> NodeId {
        let operand_values: Vec<f64> = inputs.iter().map(|&id| self.data(id)).collect();
        let data = op.forward(&operand_values);
        self.push(Node {
            data,
            grad: 0.0,
            op,
            inputs: inputs.to_vec(),
            label: None,
        })
    }

    fn push(&self, node: Node) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        nodes.push(node);
        id
    }

    fn with_node<R>(&self, id: NodeId, f: impl FnOnce(&Node) -> R) -> R {
        let nodes = self.nodes.borrow();
        let node = nodes
            .get(id.0)
            .unwrap_or_else(|| panic!("{id} does not belong to this graph"));
        f(node)
    }

    fn with_node_mut<R>(&self, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> R {
        let mut nodes = self.nodes.borrow_mut();
        let node = nodes
            .get_mut(id.0)
            .unwrap_or_else(|| panic!("{id} does not belong to this graph"));
        f(node)
    }

    /// Forward value of a node.
    pub fn data(&self, id: NodeId) -> f64 {
        self.with_node(id, |n| n.data)
    }

    /// Accumulated gradient of a node.
    pub fn grad(&self, id: NodeId) -> f64 {
        self.with_node(id, |n| n.grad)
    }

    /// Operation tag of a node; [`Op::Leaf`] for inputs and constants.
    pub fn op(&self, id: NodeId) -> Op {
        self.with_node(id, |n| n.op)
    }

    /// Diagnostic label of a node, if any.
    pub fn label(&self, id: NodeId) -> Option<String> {
        self.with_node(id, |n| n.label.clone())
    }

    /// Direct operands of a node; empty for leaves.
    pub fn inputs(&self, id: NodeId) -> Vec<NodeId> {
        self.with_node(id, |n| n.inputs.clone())
    }

    /// A snapshot of a node, for inspection.
    pub fn node(&self, id: NodeId) -> Node {
        self.with_node(id, Node::clone)
    }

    /// Overwrites a node's forward value.
    ///
    /// This is the external mutation point for a parameter-update consumer.
    /// It invalidates previously computed gradients of this node's ancestors,
    /// and the values of ancestors are *not* recomputed; derived quantities
    /// require a rebuilt graph.
    pub fn set_data(&self, id: NodeId, data: f64) {
        self.with_node_mut(id, |n| n.data = data);
    }

    /// Attaches a diagnostic label to a node.
    pub fn set_label(&self, id: NodeId, label: impl Into<String>) {
        let label = label.into();
        self.with_node_mut(id, |n| n.label = Some(label));
    }

    pub(crate) fn set_grad(&self, id: NodeId, grad: f64) {
        self.with_node_mut(id, |n| n.grad = grad);
    }

    pub(crate) fn add_grad(&self, id: NodeId, contribution: f64) {
        self.with_node_mut(id, |n| n.grad += contribution);
    }

    /// Returns the number of nodes in the graph.
    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Returns `true` if the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Returns `true` if `id` belongs to this arena.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.num_nodes()
    }

    /// Returns every node reachable from `root`, children before parents.
    ///
    /// Post-order DFS keyed by node identity: a node is appended only after
    /// all of its operands, so reversing the sequence closes out each node's
    /// consumers before the node propagates its own gradient.
    pub fn topological_order(&self, root: NodeId) -> Result<Vec<NodeId>> {
        if !self.contains(root) {
            return Err(GraphError::UnknownNode {
                node: root,
                nodes: self.num_nodes(),
            });
        }
        let mut marks = vec![Mark::Unvisited; self.num_nodes()];
        let mut order = Vec::new();
        self.visit(root, &mut marks, &mut order)?;
        Ok(order)
    }

    fn visit(&self, id: NodeId, marks: &mut [Mark], order: &mut Vec<NodeId>) -> Result<()> {
        match marks[id.0] {
            Mark::Done => return Ok(()),
            Mark::OnPath => return Err(GraphError::CycleDetected { node: id }),
            Mark::Unvisited => {}
        }
        marks[id.0] = Mark::OnPath;
        for input in self.inputs(id) {
            if !self.contains(input) {
                return Err(GraphError::UnknownNode {
                    node: input,
                    nodes: self.num_nodes(),
                });
            }
            self.visit(input, marks, order)?;
        }
        marks[id.0] = Mark::Done;
        order.push(id);
        Ok(())
    }

    /// Walks the subgraph reachable from `root`, collecting the full node set
    /// and the parent→child edge set, each edge annotated with the parent's
    /// operation. Read-only.
    pub fn trace(&self, root: NodeId) -> Result<GraphTrace> {
        let nodes = self.topological_order(root)?;
        let mut edges = Vec::new();
        for &parent in &nodes {
            let op = self.op(parent);
            for child in self.inputs(parent) {
                edges.push(GraphEdge { parent, child, op });
            }
        }
        Ok(GraphTrace { nodes, edges })
    }
}
