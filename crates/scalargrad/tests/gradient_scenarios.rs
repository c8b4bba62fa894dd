//! End-to-end gradient scenarios for the autodiff engine.

use approx::assert_relative_eq;
use proptest::prelude::*;
use scalargrad::prelude::*;

/// The canonical worked example: `L = (a*b + c) * f`.
#[test]
fn test_two_layer_expression_gradients() {
    let graph = Graph::new();
    let a = graph.labeled_leaf(2.0, "a");
    let b = graph.labeled_leaf(-3.0, "b");
    let c = graph.labeled_leaf(10.0, "c");
    let e = (a * b).with_label("e");
    let d = (e + c).with_label("d");
    let f = graph.labeled_leaf(-2.0, "f");
    let loss = (d * f).with_label("L");

    assert_eq!(e.data(), -6.0);
    assert_eq!(d.data(), 4.0);
    assert_eq!(loss.data(), -8.0);

    loss.backward().unwrap();

    assert_eq!(loss.grad(), 1.0);
    assert_eq!(f.grad(), 4.0);
    assert_eq!(d.grad(), -2.0);
    assert_eq!(c.grad(), -2.0);
    assert_eq!(e.grad(), -2.0);
    assert_eq!(a.grad(), 6.0);
    assert_eq!(b.grad(), -4.0);
}

/// A tanh neuron: `o = tanh(x1*w1 + x2*w2 + b)`.
#[test]
fn test_neuron_gradients() {
    let graph = Graph::new();
    let x1 = graph.labeled_leaf(2.0, "x1");
    let x2 = graph.labeled_leaf(0.0, "x2");
    let w1 = graph.labeled_leaf(-3.0, "w1");
    let w2 = graph.labeled_leaf(1.0, "w2");
    let b = graph.labeled_leaf(6.881_373_587_019_543, "b");

    let n = x1 * w1 + x2 * w2 + b;
    let o = n.tanh().with_label("o");

    assert_relative_eq!(o.data(), 0.707_106_781_186_547_6, epsilon = 1e-9);

    o.backward().unwrap();

    // do/dn = 1 - o² = 0.5 at this bias, then the chain rule.
    assert_relative_eq!(n.grad(), 0.5, epsilon = 1e-6);
    assert_relative_eq!(w1.grad(), 1.0, epsilon = 1e-6);
    assert_relative_eq!(x1.grad(), -1.5, epsilon = 1e-6);
    assert_relative_eq!(w2.grad(), 0.0, epsilon = 1e-6);
    assert_relative_eq!(x2.grad(), 0.5, epsilon = 1e-6);
}

/// The analytic tanh derivative must agree with a central finite difference.
#[test]
fn test_tanh_gradient_matches_finite_difference() {
    let h = 1e-4;
    for x in [-2.0, -0.5, 0.0, 0.3, 1.5] {
        let graph = Graph::new();
        let leaf = graph.leaf(x);
        let t = leaf.tanh();
        t.backward().unwrap();

        assert_relative_eq!(leaf.grad(), 1.0 - t.data() * t.data(), epsilon = 1e-9);

        let numerical = (f64::tanh(x + h) - f64::tanh(x - h)) / (2.0 * h);
        assert_relative_eq!(leaf.grad(), numerical, epsilon = 1e-4);
    }
}

/// Rebuilding an identical graph from the same leaf values reproduces the
/// gradients exactly.
#[test]
fn test_forward_replay_is_deterministic() {
    let run = || {
        let graph = Graph::new();
        let x = graph.leaf(0.37);
        let y = graph.leaf(-1.2);
        let out = (x * y + x).tanh() * y;
        out.backward().unwrap();
        let order = graph.topological_order(out.id()).unwrap();
        order.iter().map(|&id| graph.grad(id)).collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

/// One gradient step on the leaves moves the rebuilt output in the gradient
/// direction, the way a parameter-update consumer uses the engine.
#[test]
fn test_parameter_step_increases_output() {
    let build = |a: f64, b: f64, c: f64, f: f64| {
        let graph = Graph::new();
        let a = graph.leaf(a);
        let b = graph.leaf(b);
        let c = graph.leaf(c);
        let f = graph.leaf(f);
        let loss = (a * b + c) * f;
        loss.backward().unwrap();
        (loss.data(), a.grad(), b.grad(), c.grad(), f.grad())
    };

    let (before, ga, gb, gc, gf) = build(2.0, -3.0, 10.0, -2.0);
    let step = 0.01;
    let (after, ..) = build(
        2.0 + step * ga,
        -3.0 + step * gb,
        10.0 + step * gc,
        -2.0 + step * gf,
    );

    assert!(after > before, "expected {after} > {before}");
}

/// The trace walk exposes exactly the reachable nodes and annotated edges.
#[test]
fn test_trace_matches_expression_shape() {
    let graph = Graph::new();
    let a = graph.leaf(2.0);
    let b = graph.leaf(-3.0);
    let f = graph.leaf(-2.0);
    let loss = (a * b + 10.0) * f;

    let trace = graph.trace(loss.id()).unwrap();
    // a, b, a*b, boxed 10.0, sum, f, loss
    assert_eq!(trace.nodes.len(), 7);
    assert_eq!(trace.edges.len(), 6);
    assert!(trace
        .edges
        .iter()
        .all(|edge| edge.op == graph.op(edge.parent)));
    assert!(trace
        .edges
        .iter()
        .any(|edge| edge.parent == loss.id() && edge.child == f.id() && edge.op == Op::Mul));
}

proptest! {
    #[test]
    fn prop_add_forward(a in -1e6f64..1e6, b in -1e6f64..1e6) {
        let graph = Graph::new();
        let sum = graph.leaf(a) + graph.leaf(b);
        prop_assert_eq!(sum.data(), a + b);
    }

    #[test]
    fn prop_mul_forward(a in -1e6f64..1e6, b in -1e6f64..1e6) {
        let graph = Graph::new();
        let prod = graph.leaf(a) * graph.leaf(b);
        prop_assert_eq!(prod.data(), a * b);
    }

    #[test]
    fn prop_tanh_forward(x in -50.0f64..50.0) {
        let graph = Graph::new();
        let t = graph.leaf(x).tanh();
        prop_assert!((t.data() - f64::tanh(x)).abs() <= 1e-12);
    }

    #[test]
    fn prop_add_local_gradients(a in -1e6f64..1e6, b in -1e6f64..1e6) {
        let graph = Graph::new();
        let lhs = graph.leaf(a);
        let rhs = graph.leaf(b);
        let sum = lhs + rhs;
        sum.backward().unwrap();
        prop_assert_eq!(lhs.grad(), 1.0);
        prop_assert_eq!(rhs.grad(), 1.0);
    }

    #[test]
    fn prop_mul_local_gradients(a in -1e6f64..1e6, b in -1e6f64..1e6) {
        let graph = Graph::new();
        let lhs = graph.leaf(a);
        let rhs = graph.leaf(b);
        let prod = lhs * rhs;
        prod.backward().unwrap();
        prop_assert_eq!(lhs.grad(), b);
        prop_assert_eq!(rhs.grad(), a);
    }

    #[test]
    fn prop_fan_out_accumulates(x in -1e3f64..1e3) {
        let graph = Graph::new();
        let leaf = graph.leaf(x);
        let y = leaf * leaf + leaf;
        y.backward().unwrap();
        let expected = 2.0 * x + 1.0;
        prop_assert!((leaf.grad() - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }
}
