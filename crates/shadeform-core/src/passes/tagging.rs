//! Binding-site tagging.

use crate::backend::Backend;
use crate::error::{Phase, TranslateError, guard};
use crate::meta::Meta;
use crate::tree::Node;
use crate::walk::{annotate, try_rewrite};
use std::collections::HashSet;

/// Run the backend tagger over every node, then mark first appearances.
pub fn tag(backend: &dyn Backend, tree: Node) -> Result<Node, TranslateError> {
    let tree = try_rewrite(tree, |node| guard(Phase::Tagging, node, backend.tag(node)))?;
    Ok(tag_first_appearance(tree))
}

/// Set `first_appearance` on the earliest occurrence of every symbol that
/// carries `assignment = true`.
pub fn tag_first_appearance(tree: Node) -> Node {
    let mut seen = HashSet::new();
    // Only symbols (leaves) are marked, and a post-order walk meets leaves in
    // the same order as a pre-order one.
    annotate(tree, |node| {
        let name = node.as_symbol()?;
        if !node.meta.is_assignment() || !seen.insert(name.to_string()) {
            return None;
        }
        Some(Meta {
            first_appearance: Some(true),
            ..Meta::default()
        })
    })
}
