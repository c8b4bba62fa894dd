//! One gradient step on the leaves of `L = (a*b + c) * f`.
//!
//! The engine produces the gradients; the update rule below is the caller's
//! business. Note the rebuilt graph for the second forward pass: gradients
//! are frozen at the values of the pass that produced them.

use scalargrad::Graph;

fn main() {
    let build = |a: f64, b: f64, c: f64, f: f64| {
        let graph = Graph::new();
        let a = graph.labeled_leaf(a, "a");
        let b = graph.labeled_leaf(b, "b");
        let c = graph.labeled_leaf(c, "c");
        let f = graph.labeled_leaf(f, "f");
        let loss = (a * b + c) * f;
        loss.backward().expect("well-formed graph");
        (loss.data(), [a, b, c, f].map(|leaf| (leaf.data(), leaf.grad())))
    };

    let (before, leaves) = build(2.0, -3.0, 10.0, -2.0);
    println!("L = {before}");
    for (name, (data, grad)) in ["a", "b", "c", "f"].iter().zip(leaves) {
        println!("  {name}: data = {data:6.3}, grad = {grad:6.3}");
    }

    // Nudge every leaf along its gradient and replay the forward pass.
    let step = 0.01;
    let [a, b, c, f] = leaves.map(|(data, grad)| data + step * grad);
    let (after, _) = build(a, b, c, f);
    println!("after one step of {step}: L = {after}");
}
