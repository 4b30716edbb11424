//! Fixed-point type inference over assigned variables.
//!
//! Each round:
//!
//! 1. collect the declared variables (symbols with `assignment = true`);
//! 2. gather the types observed on every occurrence of each variable, and on
//!    every expression that `defines` it;
//! 3. a variable with one observed type is resolved, with none it stays open,
//!    with several the translation fails;
//! 4. tag all occurrences of resolved variables, then ask the backend
//!    inspector about every node still lacking a tag.
//!
//! Inference ends once nothing is open. A round that leaves the number of
//! tagged nodes unchanged counts as stalled; too many stalled rounds in a row
//! fail the translation instead of looping forever.

use crate::backend::Backend;
use crate::error::{Phase, TranslateError, guard};
use crate::meta::{Meta, TypeTag};
use crate::tree::{Atom, Node, NodeKind};
use crate::walk::{annotate, filter_nodes, try_annotate};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Type of a single node, if known.
///
/// Integer and float literals type themselves. Otherwise the node's tag is
/// its type; a tagged node that also carries a `numeric_value` takes that
/// value's type when it has one.
pub fn type_of(node: &Node) -> Option<TypeTag> {
    match node.kind {
        NodeKind::Atom(Atom::Int(_)) => return Some(TypeTag::int()),
        NodeKind::Atom(Atom::Float(_)) => return Some(TypeTag::float()),
        _ => {}
    }
    let tag = node.meta.tag.as_ref()?;
    node.meta
        .numeric_value
        .as_deref()
        .and_then(type_of)
        .or_else(|| Some(tag.clone()))
}

/// Names of all symbols flagged as binding sites.
pub fn declared_variables(tree: &Node) -> BTreeSet<String> {
    filter_nodes(tree, |node| node.as_symbol().is_some() && node.meta.is_assignment())
        .into_iter()
        .filter_map(|node| node.as_symbol().map(str::to_string))
        .collect()
}

/// Types observed for each declared variable, over its occurrences and the
/// expressions that define it.
fn observed_types(
    tree: &Node,
    declared: &BTreeSet<String>,
) -> BTreeMap<String, BTreeSet<TypeTag>> {
    let mut observed: BTreeMap<String, BTreeSet<TypeTag>> = BTreeMap::new();
    for node in filter_nodes(tree, |_| true) {
        let names = [node.as_symbol(), node.meta.defines.as_deref()];
        for name in names.into_iter().flatten() {
            if !declared.contains(name) {
                continue;
            }
            let types = observed.entry(name.to_string()).or_default();
            if let Some(ty) = type_of(node) {
                types.insert(ty);
            }
        }
    }
    observed
}

fn resolved_type<'a>(
    node: &Node,
    resolved: &'a BTreeMap<String, TypeTag>,
) -> Option<&'a TypeTag> {
    node.as_symbol()
        .and_then(|name| resolved.get(name))
        .or_else(|| node.meta.defines.as_deref().and_then(|name| resolved.get(name)))
}

fn apply_types(tree: Node, resolved: &BTreeMap<String, TypeTag>) -> Node {
    if resolved.is_empty() {
        return tree;
    }
    annotate(tree, |node| {
        let ty = resolved_type(node, resolved)?;
        (node.tag() != Some(ty)).then(|| Meta::tagged(ty.clone()))
    })
}

fn inspect_untyped(backend: &dyn Backend, tree: Node) -> Result<Node, TranslateError> {
    try_annotate(tree, |node| {
        if node.tag().is_some() {
            return Ok(None);
        }
        let ty = guard(Phase::InferringType, node, backend.inspect(node))?;
        Ok(ty.map(Meta::tagged))
    })
}

fn count_tagged(tree: &Node) -> usize {
    filter_nodes(tree, |node| node.tag().is_some()).len()
}

/// Run inference to completion.
///
/// Fails with [`TranslateError::AmbiguousType`] as soon as a variable shows
/// two distinct types, and with [`TranslateError::UnresolvedType`] once the
/// tagged-node count has stayed flat for more than `max_stalled_rounds`
/// rounds.
pub fn infer_types(
    backend: &dyn Backend,
    tree: Node,
    max_stalled_rounds: usize,
) -> Result<Node, TranslateError> {
    let mut tree = tree;
    let mut previous_tagged = None;
    let mut stalled = 0usize;
    let mut round = 0usize;

    loop {
        round += 1;
        let declared = declared_variables(&tree);
        let mut observed = observed_types(&tree, &declared);

        let mut resolved = BTreeMap::new();
        let mut unresolved = Vec::new();
        for variable in declared {
            let types = observed.remove(&variable).unwrap_or_default();
            match types.len() {
                0 => unresolved.push(variable),
                1 => {
                    if let Some(ty) = types.into_iter().next() {
                        resolved.insert(variable, ty);
                    }
                }
                _ => {
                    return Err(TranslateError::AmbiguousType {
                        variable,
                        types: types.into_iter().collect(),
                    });
                }
            }
        }
        trace!(
            round,
            resolved = resolved.len(),
            unresolved = unresolved.len(),
            "inference round"
        );

        tree = apply_types(tree, &resolved);
        tree = inspect_untyped(backend, tree)?;

        if unresolved.is_empty() {
            debug!(rounds = round, variables = resolved.len(), "types inferred");
            return Ok(tree);
        }

        let tagged = count_tagged(&tree);
        if previous_tagged == Some(tagged) {
            stalled += 1;
            if stalled > max_stalled_rounds {
                debug!(rounds = round, ?unresolved, "inference stalled");
                return Err(TranslateError::UnresolvedType {
                    variables: unresolved,
                });
            }
        } else {
            stalled = 0;
        }
        previous_tagged = Some(tagged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Hooks;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn assign(name: &str, value: Node) -> Node {
        Node::form("assign", [Node::symbol(name).with_meta(Meta::assignment()), value])
            .with_meta(Meta::defining(name))
    }

    /// Types `(assign v e)` by `e`'s type.
    fn assign_inspector() -> Hooks {
        Hooks::new("infer", |e: &Node| Ok(e.to_string())).with_inspector(|node| {
            Ok(match node.children() {
                [head, _, value] if head.is_symbol("assign") => {
                    value.tag().cloned().or_else(|| type_of(value))
                }
                _ => None,
            })
        })
    }

    #[test]
    fn test_type_of_literals_and_tags() {
        assert_eq!(type_of(&Node::int(1)), Some(TypeTag::int()));
        assert_eq!(type_of(&Node::float(1.5)), Some(TypeTag::float()));
        assert_eq!(type_of(&Node::symbol("x")), None);
        assert_eq!(type_of(&Node::string("s")), None);

        let tagged = Node::symbol("v").with_tag(TypeTag::new("vec4"));
        assert_eq!(type_of(&tagged), Some(TypeTag::new("vec4")));

        let indirect = Node::symbol("n").with_meta(Meta {
            tag: Some(TypeTag::new("number")),
            numeric_value: Some(Box::new(Node::float(2.0))),
            ..Meta::default()
        });
        assert_eq!(type_of(&indirect), Some(TypeTag::float()));

        let untagged_value = Node::symbol("n").with_meta(Meta {
            numeric_value: Some(Box::new(Node::int(2))),
            ..Meta::default()
        });
        assert_eq!(type_of(&untagged_value), None);
    }

    #[test]
    fn test_single_type_resolution() {
        let tree = Node::vector(vec![
            assign("x", Node::int(1)),
            Node::form("use", [Node::symbol("x")]),
        ]);
        let out = infer_types(&assign_inspector(), tree, 20).unwrap();

        let xs = filter_nodes(&out, |n| n.is_symbol("x"));
        assert_eq!(xs.len(), 2);
        assert!(xs.iter().all(|n| n.tag() == Some(&TypeTag::int())));
    }

    #[test]
    fn test_declared_tag_is_used() {
        let tree = Node::vector(vec![
            Node::form(
                "uniform",
                [Node::symbol("color")
                    .with_meta(Meta::assignment())
                    .with_tag(TypeTag::new("vec4"))],
            ),
            Node::form("use", [Node::symbol("color")]),
        ]);
        let backend = Hooks::new("infer", |e: &Node| Ok(e.to_string()));
        let out = infer_types(&backend, tree, 20).unwrap();
        let used = &out.children()[1].children()[1];
        assert_eq!(used.tag(), Some(&TypeTag::new("vec4")));
    }

    #[test]
    fn test_ambiguity_is_fatal() {
        let tree = Node::vector(vec![
            assign("x", Node::int(1)),
            assign("x", Node::float(1.0)),
        ]);
        let err = infer_types(&assign_inspector(), tree, 20).unwrap_err();
        match err {
            TranslateError::AmbiguousType { variable, types } => {
                assert_eq!(variable, "x");
                assert_eq!(types, vec![TypeTag::float(), TypeTag::int()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_dependent_variable_resolves_in_later_round() {
        // y is only typed once x is known and the inspector can see it.
        let tree = Node::vector(vec![
            assign("y", Node::symbol("x")),
            assign("x", Node::float(0.5)),
        ]);
        let out = infer_types(&assign_inspector(), tree, 20).unwrap();
        let ys = filter_nodes(&out, |n| n.is_symbol("y"));
        assert!(ys.iter().all(|n| n.tag() == Some(&TypeTag::float())));
    }

    #[test]
    fn test_bounded_non_convergence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let backend = Hooks::new("infer", |e: &Node| Ok(e.to_string())).with_inspector(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(None)
        });
        let tree = Node::vector(vec![
            assign("x", Node::symbol("mystery")),
            assign("y", Node::int(3)),
        ]);

        let err = infer_types(&backend, tree, 20).unwrap_err();
        match err {
            TranslateError::UnresolvedType { variables } => assert_eq!(variables, ["x", "y"]),
            other => panic!("unexpected error: {other:?}"),
        }
        // One round to record the count, then 21 stalled rounds.
        let nodes = 9;
        assert_eq!(calls.load(Ordering::Relaxed), 22 * nodes);
    }

    #[test]
    fn test_stall_bound_is_configurable() {
        let backend = Hooks::new("infer", |e: &Node| Ok(e.to_string()));
        let tree = assign("x", Node::symbol("mystery"));
        let err = infer_types(&backend, tree, 0).unwrap_err();
        assert!(matches!(err, TranslateError::UnresolvedType { .. }));
    }

    #[test]
    fn test_inspector_failure_is_wrapped() {
        let backend = Hooks::new("infer", |e: &Node| Ok(e.to_string()))
            .with_inspector(|node| {
                if node.is_symbol("bad") {
                    anyhow::bail!("cannot type");
                }
                Ok(None)
            });
        let tree = assign("x", Node::symbol("bad"));
        let err = infer_types(&backend, tree, 20).unwrap_err();
        assert!(err.to_string().starts_with("error while inferring type: cannot type"));
    }

    #[test]
    fn test_no_declarations() {
        let backend = Hooks::new("infer", |e: &Node| Ok(e.to_string()));
        let tree = Node::form("f", [Node::int(1)]);
        assert_eq!(infer_types(&backend, tree.clone(), 20).unwrap(), tree);
    }
}
