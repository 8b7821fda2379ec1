//! Cyclomatic complexity by decision-point counting

use crate::syntax::Construct;
use codeatlas_core::ComplexityScope;
use tree_sitter::Node;

/// Cyclomatic complexity of the function rooted at `function`.
///
/// Starts at 1 and adds one for every `if`, `for`, `for-in`, `for-of`, `while`,
/// `do-while`, ternary, `catch`, `case` with a test, `&&` and `||` below the
/// function node. With [`ComplexityScope::Exclusive`] nested function bodies
/// are not entered.
pub fn cyclomatic(function: &Node, scope: ComplexityScope) -> u32 {
    1 + decisions_below(function, scope)
}

/// Iterative so minified bundles with very deep expression chains cannot
/// exhaust the worker's stack.
fn decisions_below(function: &Node, scope: ComplexityScope) -> u32 {
    let mut count = 0;
    let mut cursor = function.walk();
    let mut pending: Vec<Node> = function.children(&mut cursor).collect();

    while let Some(node) = pending.pop() {
        let construct = Construct::of(&node);
        if construct.is_function() && scope == ComplexityScope::Exclusive {
            continue;
        }
        count += u32::from(construct.is_decision_point());
        pending.extend(node.children(&mut cursor));
    }
    count
}
