//! Generic tree traversal and rewriting.
//!
//! All walks use an explicit stack, so generated trees of any depth are safe
//! to process.
//!
//! # Rewrite order
//!
//! [`rewrite`] is post-order: a compound node is handed to the rewrite
//! function only after every child has been rewritten and the node has been
//! reassembled with the same [`Shape`] and metadata. Siblings are visited left
//! to right. For `(a (b c))` the function sees `a`, `b`, `c`, `(b c)`,
//! `(a (b c))`.

use crate::meta::Meta;
use crate::tree::{Node, NodeKind, Shape};
use std::convert::Infallible;
use std::fmt::Write;

enum Task {
    Enter(Node),
    Rebuild { shape: Shape, meta: Meta, arity: usize },
}

/// What a walk callback does with the node it was shown.
enum Edit {
    Keep,
    Replace(Node),
    Annotate(Meta),
}

/// Rewrite `tree` bottom-up.
///
/// `f` returns `None` to keep a node and `Some(replacement)` to replace it
/// (the replacement may be [`Node::nil`]). A replacement's metadata is merged
/// over the original's with [`Meta::merge`].
pub fn rewrite<F>(tree: Node, mut f: F) -> Node
where
    F: FnMut(&Node) -> Option<Node>,
{
    infallible(try_rewrite(tree, |node| Ok(f(node))))
}

/// Fallible [`rewrite`]: the first error stops the walk.
pub fn try_rewrite<F, E>(tree: Node, mut f: F) -> Result<Node, E>
where
    F: FnMut(&Node) -> Result<Option<Node>, E>,
{
    walk(tree, |node| {
        Ok(match f(node)? {
            Some(replacement) => Edit::Replace(replacement),
            None => Edit::Keep,
        })
    })
}

/// Metadata-only [`rewrite`]: `f` returns keys to merge into a node, leaving
/// its structure alone. Same visiting order as [`rewrite`].
pub fn annotate<F>(tree: Node, mut f: F) -> Node
where
    F: FnMut(&Node) -> Option<Meta>,
{
    infallible(try_annotate(tree, |node| Ok(f(node))))
}

/// Fallible [`annotate`].
pub fn try_annotate<F, E>(tree: Node, mut f: F) -> Result<Node, E>
where
    F: FnMut(&Node) -> Result<Option<Meta>, E>,
{
    walk(tree, |node| {
        Ok(match f(node)? {
            Some(meta) => Edit::Annotate(meta),
            None => Edit::Keep,
        })
    })
}

fn infallible(result: Result<Node, Infallible>) -> Node {
    match result {
        Ok(node) => node,
        Err(never) => match never {},
    }
}

fn walk<F, E>(tree: Node, mut f: F) -> Result<Node, E>
where
    F: FnMut(&Node) -> Result<Edit, E>,
{
    let mut tasks = vec![Task::Enter(tree)];
    let mut done: Vec<Node> = Vec::new();

    while let Some(task) = tasks.pop() {
        let node = match task {
            Task::Enter(node) if node.shape().is_some() => {
                if let (NodeKind::Compound(shape, children), meta) = node.into_parts() {
                    tasks.push(Task::Rebuild {
                        shape,
                        meta,
                        arity: children.len(),
                    });
                    tasks.extend(children.into_iter().rev().map(Task::Enter));
                }
                continue;
            }
            Task::Enter(node) => node,
            Task::Rebuild { shape, meta, arity } => {
                let children = done.split_off(done.len() - arity);
                Node::new(NodeKind::Compound(shape, children)).with_meta(meta)
            }
        };

        let node = match f(&node)? {
            Edit::Keep => node,
            Edit::Replace(replacement) => {
                let (kind, meta) = replacement.into_parts();
                let (_, old) = node.into_parts();
                Node {
                    kind,
                    meta: Meta::merge(old, meta),
                }
            }
            Edit::Annotate(meta) => node.merge_meta(meta),
        };
        done.push(node);
    }

    // The root (rebuilt compound or bare atom) is always the last push.
    Ok(done.pop().unwrap_or_else(Node::nil))
}

/// Apply [`rewrite`] until the tree stops changing.
///
/// Does not terminate if `f` keeps producing new trees.
pub fn rewrite_to_fixpoint<F>(tree: Node, mut f: F) -> Node
where
    F: FnMut(&Node) -> Option<Node>,
{
    let mut current = tree;
    loop {
        let next = rewrite(current.clone(), &mut f);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Every node of `tree` (root included) matching `predicate`, in depth-first
/// pre-order.
pub fn filter_nodes<'a, P>(tree: &'a Node, mut predicate: P) -> Vec<&'a Node>
where
    P: FnMut(&Node) -> bool,
{
    let mut found = Vec::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        if predicate(node) {
            found.push(node);
        }
        stack.extend(node.children().iter().rev());
    }
    found
}

pub const MAX_INDENT_DEPTH: usize = 16;

/// Debug dump: one line per node with its depth and metadata.
///
/// Compound nodes show only their delimiters and head atom; their children
/// follow on their own lines. Indentation stops growing after
/// [`MAX_INDENT_DEPTH`] levels; the depth number keeps counting.
///
/// ```text
/// 0 (assign ...) {defines=x}
///   1 assign {}
///   1 x {assignment=true}
///   1 1 {}
/// ```
pub fn print_tree(tree: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![(tree, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let indent = depth.min(MAX_INDENT_DEPTH) * 2;
        let _ = write!(out, "{:indent$}{depth} ", "");
        match &node.kind {
            NodeKind::Atom(atom) => {
                let _ = write!(out, "{atom}");
            }
            NodeKind::Compound(shape, children) => {
                let (open, close) = shape.delimiters();
                let _ = match children.first().map(|head| &head.kind) {
                    Some(NodeKind::Atom(head)) => write!(out, "{open}{head} ...{close}"),
                    Some(NodeKind::Compound(..)) => write!(out, "{open}...{close}"),
                    None => write!(out, "{open}{close}"),
                };
            }
        }
        let _ = writeln!(out, " {}", node.meta);
        stack.extend(node.children().iter().rev().map(|child| (child, depth + 1)));
    }
    out
}
