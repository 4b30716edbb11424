//! The backend seam.
//!
//! A backend parameterizes the core for one target language through five
//! hooks. Hooks return [`anyhow::Result`]; the core wraps any failure into a
//! [`TranslateError`](crate::TranslateError) pointing at the subtree the hook
//! was given.

use crate::meta::TypeTag;
use crate::tree::Node;

/// Hooks supplied by a target-language backend.
pub trait Backend: Send + Sync {
    /// Backend identifier (e.g. "glsl").
    fn name(&self) -> &'static str;

    /// Extra top-level expressions needed by `tree` (hoisted declarations,
    /// helper functions, ...). Must eventually return an empty vector when
    /// applied to its own output.
    fn generate(&self, tree: &Node) -> anyhow::Result<Vec<Node>> {
        let _ = tree;
        Ok(Vec::new())
    }

    /// Render one top-level expression as target source. Empty output is
    /// dropped by the renderer.
    fn render(&self, expr: &Node) -> anyhow::Result<String>;

    /// Bottom-up rewrite of one node; `None` keeps it.
    fn transform(&self, expr: &Node) -> anyhow::Result<Option<Node>> {
        let _ = expr;
        Ok(None)
    }

    /// Type of an untagged node, if it can be deduced.
    fn inspect(&self, expr: &Node) -> anyhow::Result<Option<TypeTag>> {
        let _ = expr;
        Ok(None)
    }

    /// Set `assignment`/`defines` metadata on one node; `None` keeps it.
    fn tag(&self, expr: &Node) -> anyhow::Result<Option<Node>> {
        let _ = expr;
        Ok(None)
    }
}

type Generator = Box<dyn Fn(&Node) -> anyhow::Result<Vec<Node>> + Send + Sync>;
type Parser = Box<dyn Fn(&Node) -> anyhow::Result<String> + Send + Sync>;
type Rewriter = Box<dyn Fn(&Node) -> anyhow::Result<Option<Node>> + Send + Sync>;
type Inspector = Box<dyn Fn(&Node) -> anyhow::Result<Option<TypeTag>> + Send + Sync>;

/// A [`Backend`] assembled from closures.
///
/// ```
/// use shadeform_core::{Hooks, Node, translate_expr};
///
/// let hooks = Hooks::new("echo", |expr: &Node| Ok(expr.to_string()));
/// let out = translate_expr(&hooks, Node::form("f", [Node::int(1)])).unwrap();
/// assert_eq!(out, "(f 1);\n");
/// ```
pub struct Hooks {
    name: &'static str,
    generator: Option<Generator>,
    parser: Parser,
    transformer: Option<Rewriter>,
    inspector: Option<Inspector>,
    tagger: Option<Rewriter>,
}

impl Hooks {
    pub fn new<P>(name: &'static str, parser: P) -> Self
    where
        P: Fn(&Node) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self {
            name,
            generator: None,
            parser: Box::new(parser),
            transformer: None,
            inspector: None,
            tagger: None,
        }
    }

    pub fn with_generator<G>(mut self, generator: G) -> Self
    where
        G: Fn(&Node) -> anyhow::Result<Vec<Node>> + Send + Sync + 'static,
    {
        self.generator = Some(Box::new(generator));
        self
    }

    pub fn with_transformer<T>(mut self, transformer: T) -> Self
    where
        T: Fn(&Node) -> anyhow::Result<Option<Node>> + Send + Sync + 'static,
    {
        self.transformer = Some(Box::new(transformer));
        self
    }

    pub fn with_inspector<I>(mut self, inspector: I) -> Self
    where
        I: Fn(&Node) -> anyhow::Result<Option<TypeTag>> + Send + Sync + 'static,
    {
        self.inspector = Some(Box::new(inspector));
        self
    }

    pub fn with_tagger<T>(mut self, tagger: T) -> Self
    where
        T: Fn(&Node) -> anyhow::Result<Option<Node>> + Send + Sync + 'static,
    {
        self.tagger = Some(Box::new(tagger));
        self
    }
}

impl Backend for Hooks {
    fn name(&self) -> &'static str {
        self.name
    }

    fn generate(&self, tree: &Node) -> anyhow::Result<Vec<Node>> {
        match &self.generator {
            Some(generator) => generator(tree),
            None => Ok(Vec::new()),
        }
    }

    fn render(&self, expr: &Node) -> anyhow::Result<String> {
        (self.parser)(expr)
    }

    fn transform(&self, expr: &Node) -> anyhow::Result<Option<Node>> {
        match &self.transformer {
            Some(transformer) => transformer(expr),
            None => Ok(None),
        }
    }

    fn inspect(&self, expr: &Node) -> anyhow::Result<Option<TypeTag>> {
        match &self.inspector {
            Some(inspector) => inspector(expr),
            None => Ok(None),
        }
    }

    fn tag(&self, expr: &Node) -> anyhow::Result<Option<Node>> {
        match &self.tagger {
            Some(tagger) => tagger(expr),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("name", &self.name)
            .field("generator", &self.generator.is_some())
            .field("transformer", &self.transformer.is_some())
            .field("inspector", &self.inspector.is_some())
            .field("tagger", &self.tagger.is_some())
            .finish()
    }
}
