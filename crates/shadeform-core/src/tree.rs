//! Expression tree model.
//!
//! A [`Node`] is an atom or a compound node, paired with a [`Meta`] record.
//! Compound nodes come in two shapes:
//!
//! - `List` - a form such as `(assign x 1)`
//! - `Vector` - a sequence of expressions such as a block or a whole program
//!
//! Trees are values: passes take a tree and hand back a new one.
//!
//! Generated trees can be arbitrarily deep, so dropping, cloning, comparing
//! and printing a [`Node`] all work from a heap stack rather than recursing
//! once per level.

use crate::meta::{Meta, TypeTag};
use std::fmt;

/// Atomic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Symbol(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,
}

/// Container shape of a compound node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    List,
    Vector,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Atom(Atom),
    Compound(Shape, Vec<Node>),
}

/// A tree node and its metadata.
///
/// `Node` implements `Drop`, so fields cannot be moved out of it directly;
/// use [`Node::into_parts`].
pub struct Node {
    pub kind: NodeKind,
    pub meta: Meta,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            meta: Meta::default(),
        }
    }

    pub fn atom(atom: Atom) -> Self {
        Self::new(NodeKind::Atom(atom))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::atom(Atom::Symbol(name.into()))
    }

    pub fn int(value: i64) -> Self {
        Self::atom(Atom::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::atom(Atom::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::atom(Atom::Str(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::atom(Atom::Bool(value))
    }

    pub fn nil() -> Self {
        Self::atom(Atom::Nil)
    }

    pub fn list(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Compound(Shape::List, children))
    }

    pub fn vector(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Compound(Shape::Vector, children))
    }

    /// Build a list form `(head args...)`.
    pub fn form(head: &str, args: impl IntoIterator<Item = Node>) -> Self {
        let mut children = vec![Self::symbol(head)];
        children.extend(args);
        Self::list(children)
    }

    /// Replace this node's metadata wholesale.
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Merge `meta` into this node's metadata, `meta` winning per key.
    pub fn merge_meta(mut self, meta: Meta) -> Self {
        self.meta = Meta::merge(std::mem::take(&mut self.meta), meta);
        self
    }

    pub fn with_tag(self, tag: TypeTag) -> Self {
        self.merge_meta(Meta::tagged(tag))
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Atom(Atom::Symbol(name)) => Some(name),
            _ => None,
        }
    }

    pub fn is_symbol(&self, name: &str) -> bool {
        self.as_symbol() == Some(name)
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Compound(_, children) => children,
            NodeKind::Atom(_) => &[],
        }
    }

    pub fn shape(&self) -> Option<Shape> {
        match &self.kind {
            NodeKind::Compound(shape, _) => Some(*shape),
            NodeKind::Atom(_) => None,
        }
    }

    pub fn is_vector(&self) -> bool {
        self.shape() == Some(Shape::Vector)
    }

    /// Head symbol of a list form.
    pub fn head(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Compound(Shape::List, children) => children.first()?.as_symbol(),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&TypeTag> {
        self.meta.tag.as_ref()
    }

    /// Split into kind and metadata.
    pub fn into_parts(mut self) -> (NodeKind, Meta) {
        let kind = std::mem::replace(&mut self.kind, NodeKind::Atom(Atom::Nil));
        (kind, std::mem::take(&mut self.meta))
    }

    /// Consume a compound node into its children; an atom yields itself.
    pub fn into_children(self) -> Vec<Node> {
        if self.shape().is_none() {
            return vec![self];
        }
        match self.into_parts() {
            (NodeKind::Compound(_, children), _) => children,
            (NodeKind::Atom(_), _) => Vec::new(),
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        detach(self, &mut stack);
        while let Some(mut node) = stack.pop() {
            detach(&mut node, &mut stack);
        }
    }
}

/// Move everything `node` owns that can hold further nodes onto `stack`.
fn detach(node: &mut Node, stack: &mut Vec<Node>) {
    if let NodeKind::Compound(_, children) = &mut node.kind {
        stack.append(children);
    }
    if let Some(value) = node.meta.numeric_value.take() {
        stack.push(*value);
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        enum Step<'a> {
            Enter(&'a Node),
            Build(&'a Node, Shape, usize),
        }

        let mut steps = vec![Step::Enter(self)];
        let mut done: Vec<Node> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(node) => match &node.kind {
                    NodeKind::Atom(atom) => done.push(Node {
                        kind: NodeKind::Atom(atom.clone()),
                        meta: node.meta.clone(),
                    }),
                    NodeKind::Compound(shape, children) => {
                        steps.push(Step::Build(node, *shape, children.len()));
                        steps.extend(children.iter().rev().map(Step::Enter));
                    }
                },
                Step::Build(node, shape, arity) => {
                    let children = done.split_off(done.len() - arity);
                    done.push(Node {
                        kind: NodeKind::Compound(shape, children),
                        meta: node.meta.clone(),
                    });
                }
            }
        }
        done.pop().unwrap_or_else(Node::nil)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs = vec![(self, other)];
        while let Some((a, b)) = pairs.pop() {
            if a.meta != b.meta {
                return false;
            }
            match (&a.kind, &b.kind) {
                (NodeKind::Atom(x), NodeKind::Atom(y)) if x == y => {}
                (NodeKind::Compound(sa, ca), NodeKind::Compound(sb, cb))
                    if sa == sb && ca.len() == cb.len() =>
                {
                    pairs.extend(ca.iter().zip(cb));
                }
                _ => return false,
            }
        }
        true
    }
}

impl From<Atom> for Node {
    fn from(atom: Atom) -> Self {
        Self::atom(atom)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Symbol(name) => f.write_str(name),
            Atom::Int(n) => write!(f, "{n}"),
            // `{:?}` keeps the fractional part: 1.0 prints as "1.0", not "1"
            Atom::Float(x) => write!(f, "{x:?}"),
            Atom::Str(s) => write!(f, "{s:?}"),
            Atom::Bool(b) => write!(f, "{b}"),
            Atom::Nil => f.write_str("nil"),
        }
    }
}

impl Shape {
    pub(crate) fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            Shape::List => ("(", ")"),
            Shape::Vector => ("[", "]"),
        }
    }
}

enum Piece<'a> {
    Node(&'a Node),
    Text(&'static str),
    Meta(&'a Meta),
}

/// Print `tree` in s-expression syntax. With `with_meta`, non-empty metadata
/// follows the node it belongs to.
fn write_tree(f: &mut fmt::Formatter<'_>, tree: &Node, with_meta: bool) -> fmt::Result {
    let mut pieces = vec![Piece::Node(tree)];
    while let Some(piece) = pieces.pop() {
        let node = match piece {
            Piece::Text(text) => {
                f.write_str(text)?;
                continue;
            }
            Piece::Meta(meta) => {
                write!(f, "{meta}")?;
                continue;
            }
            Piece::Node(node) => node,
        };
        if with_meta && !node.meta.is_empty() {
            pieces.push(Piece::Meta(&node.meta));
        }
        match &node.kind {
            NodeKind::Atom(atom) => write!(f, "{atom}")?,
            NodeKind::Compound(shape, children) => {
                let (open, close) = shape.delimiters();
                f.write_str(open)?;
                pieces.push(Piece::Text(close));
                for (i, child) in children.iter().enumerate().rev() {
                    pieces.push(Piece::Node(child));
                    if i > 0 {
                        pieces.push(Piece::Text(" "));
                    }
                }
            }
        }
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tree(f, self, false)
    }
}

/// Like `Display`, with each node's metadata appended: `(assign x{assignment=true} 1){defines=x}`.
impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tree(f, self, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let tree = Node::vector(vec![
            Node::form("assign", [Node::symbol("x"), Node::int(1)]),
            Node::form("assign", [Node::symbol("y"), Node::float(1.0)]),
            Node::form("print", [Node::string("hi"), Node::nil(), Node::bool(true)]),
        ]);
        assert_eq!(
            tree.to_string(),
            r#"[(assign x 1) (assign y 1.0) (print "hi" nil true)]"#
        );
    }

    #[test]
    fn test_head_only_for_lists() {
        let form = Node::form("add", [Node::symbol("a")]);
        assert_eq!(form.head(), Some("add"));

        let block = Node::vector(vec![Node::symbol("add")]);
        assert_eq!(block.head(), None);
        assert!(block.is_vector());
    }

    #[test]
    fn test_debug_shows_meta() {
        let tree = Node::form(
            "assign",
            [Node::symbol("x").with_meta(Meta::assignment()), Node::int(1)],
        )
        .with_meta(Meta::defining("x"));
        assert_eq!(
            format!("{tree:?}"),
            "(assign x{assignment=true} 1){defines=x}"
        );
    }

    fn deep(depth: usize) -> Node {
        let mut tree = Node::int(0);
        for _ in 0..depth {
            tree = Node::list(vec![Node::symbol("f"), tree]);
        }
        tree
    }

    #[test]
    fn test_deep_tree_value_semantics() {
        let tree = deep(100_000);
        let copy = tree.clone();
        assert_eq!(copy, tree);
        assert_ne!(copy, deep(99_999));

        let text = tree.to_string();
        assert!(text.starts_with("(f (f (f"));
        assert!(text.ends_with("0)))"));
        assert_eq!(format!("{tree:?}").len(), text.len());
    }

    #[test]
    fn test_deep_numeric_value_chain_drops() {
        let mut tree = Node::int(0);
        for _ in 0..100_000 {
            tree = Node::symbol("n").with_meta(Meta {
                numeric_value: Some(Box::new(tree)),
                ..Meta::default()
            });
        }
        drop(tree);
    }

    #[test]
    fn test_into_parts() {
        let (kind, meta) = Node::form("f", [Node::int(1)])
            .with_meta(Meta::defining("f"))
            .into_parts();
        assert!(matches!(kind, NodeKind::Compound(Shape::List, ref children) if children.len() == 2));
        assert_eq!(meta.defines.as_deref(), Some("f"));
    }

    #[test]
    fn test_into_children() {
        let form = Node::form("f", [Node::int(1)]);
        assert_eq!(form.into_children().len(), 2);
        assert_eq!(Node::int(3).into_children(), vec![Node::int(3)]);
    }
}
