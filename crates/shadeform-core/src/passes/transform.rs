//! One bottom-up application of the backend transformer.

use crate::backend::Backend;
use crate::error::{Phase, TranslateError, guard};
use crate::passes::division::rewrite_division;
use crate::tree::Node;
use crate::walk::try_rewrite;

/// Apply the backend transformer once to every node, children first.
pub fn transform_round(backend: &dyn Backend, tree: Node) -> Result<Node, TranslateError> {
    try_rewrite(tree, |node| {
        guard(Phase::Transforming, node, backend.transform(node))
    })
}

/// Division rewrite followed by one transform round. The transformer never
/// sees the `/` symbol.
pub fn transform_step(backend: &dyn Backend, tree: Node) -> Result<Node, TranslateError> {
    transform_round(backend, rewrite_division(tree))
}
