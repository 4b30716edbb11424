//! Reserve `/` before any backend transform sees it.
//!
//! Backends render infix operators and calls differently; renaming the
//! division operator to an ordinary function symbol at the boundary keeps it
//! out of numeric-literal territory and lets transformers treat it like any
//! other call.

use crate::tree::Node;
use crate::walk::rewrite;

pub const DIVISION_OPERATOR: &str = "/";

/// Symbol every `/` is renamed to.
pub const DIVISION_FUNCTION: &str = "divide";

pub fn rewrite_division(tree: Node) -> Node {
    rewrite(tree, |node| {
        node.is_symbol(DIVISION_OPERATOR)
            .then(|| Node::symbol(DIVISION_FUNCTION))
    })
}
