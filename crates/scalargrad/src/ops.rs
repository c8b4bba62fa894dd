//! Operations for the computation graph.
//!
//! Each differentiable operation is a variant of [`Op`], with its forward
//! computation and its local gradient rule dispatched from the tag. Keeping
//! the rule as data rather than a per-node closure leaves the graph fully
//! inspectable.

/// The operation that produced a node in the computation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// An input or constant; carries no operands and no gradient rule.
    Leaf,
    /// Addition of two operands.
    Add,
    /// Multiplication of two operands.
    Mul,
    /// Hyperbolic tangent of one operand.
    Tanh,
}

impl Op {
    /// Number of operands the operation consumes.
    pub fn arity(self) -> usize {
        match self {
            Self::Leaf => 0,
            Self::Tanh => 1,
            Self::Add | Self::Mul => 2,
        }
    }

    /// Display symbol for diagnostic rendering; empty for leaves.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Leaf => "",
            Self::Add => "+",
            Self::Mul => "*",
            Self::Tanh => "tanh",
        }
    }

    /// Performs the forward computation.
    pub(crate) fn forward(self, inputs: &[f64]) -> f64 {
        assert_eq!(
            inputs.len(),
            self.arity(),
            "{self:?} expects {} operand(s), got {}",
            self.arity(),
            inputs.len()
        );
        match self {
            Self::Leaf => panic!("leaf nodes carry their value and have no forward rule"),
            Self::Add => inputs[0] + inputs[1],
            Self::Mul => inputs[0] * inputs[1],
            Self::Tanh => stable_tanh(inputs[0]),
        }
    }

    /// Computes the gradient contribution for each operand.
    ///
    /// # Arguments
    /// * `grad_output` - The accumulated gradient of the node this operation produced
    /// * `inputs` - The operand values from the forward pass
    /// * `output` - The node's own forward value
    ///
    /// # Returns
    /// One contribution per operand, in operand order; empty for leaves.
    pub(crate) fn backward(self, grad_output: f64, inputs: &[f64], output: f64) -> Vec<f64> {
        match self {
            Self::Leaf => Vec::new(),
            // d/da (a + b) = d/db (a + b) = 1
            Self::Add => vec![grad_output, grad_output],
            // d/da (a * b) = b, d/db (a * b) = a
            Self::Mul => vec![inputs[1] * grad_output, inputs[0] * grad_output],
            // d/dx tanh(x) = 1 - tanh(x)^2
            Self::Tanh => vec![(1.0 - output * output) * grad_output],
        }
    }
}

/// tanh via the branch form `1 - 2/(exp(2x) + 1)`, mirrored for negative
/// inputs so `exp` never overflows for large-magnitude arguments.
fn stable_tanh(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 - 2.0 / ((2.0 * x).exp() + 1.0)
    } else {
        2.0 / ((-2.0 * x).exp() + 1.0) - 1.0
    }
}
