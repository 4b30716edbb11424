//! Translation entry points.

use crate::backend::Backend;
use crate::error::TranslateError;
use crate::options::TranslateOptions;
use crate::passes::{generation_loop, infer_types, render, tag, transform_step};
use crate::tree::Node;
use tracing::{debug, debug_span};

/// One backend plus the options for translating with it.
///
/// Both stay fixed for the whole of a call; separate translators never share
/// state, so they can run side by side on different threads.
pub struct Translator<'a> {
    backend: &'a dyn Backend,
    options: TranslateOptions,
}

impl<'a> Translator<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            options: TranslateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(&self) -> &'a dyn Backend {
        self.backend
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate `tree` to target source text.
    pub fn translate_expr(&self, tree: Node) -> Result<String, TranslateError> {
        let body = self.lower(tree)?;
        let _span = debug_span!("render", backend = self.backend.name()).entered();
        render(self.backend, &body, &self.options.terminator)
    }

    /// Run every pass except rendering.
    ///
    /// Returns the only body expression when generation added nothing,
    /// otherwise a vector of the whole body in emission order.
    pub fn transform_expr(&self, tree: Node) -> Result<Node, TranslateError> {
        let mut body = self.lower(tree)?;
        Ok(match body.len() {
            1 => body.remove(0),
            _ => Node::vector(body),
        })
    }

    fn lower(&self, tree: Node) -> Result<Vec<Node>, TranslateError> {
        let backend = self.backend;
        let _span = debug_span!("translate", backend = backend.name()).entered();

        let tree = transform_step(backend, tree)?;
        let body = generation_loop(backend, tree)?;
        debug!(expressions = body.len(), "generation finished");

        let program = tag(backend, Node::vector(body))?;
        let program = infer_types(backend, program, self.options.max_stalled_rounds)?;
        Ok(program.into_children())
    }
}

/// Translate `tree` with default options.
pub fn translate_expr(backend: &dyn Backend, tree: Node) -> Result<String, TranslateError> {
    Translator::new(backend).translate_expr(tree)
}

/// Transform, tag and type `tree` with default options, without rendering.
pub fn transform_expr(backend: &dyn Backend, tree: Node) -> Result<Node, TranslateError> {
    Translator::new(backend).transform_expr(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Hooks;

    #[test]
    fn test_translator_uses_options() {
        let hooks = Hooks::new("plain", |expr: &Node| Ok(expr.to_string()));
        let translator =
            Translator::new(&hooks).with_options(TranslateOptions::default().with_terminator(""));
        let out = translator
            .translate_expr(Node::vector(vec![Node::symbol("a"), Node::symbol("b")]))
            .unwrap();
        assert_eq!(out, "a\nb\n");
        assert_eq!(translator.backend().name(), "plain");
    }

    #[test]
    fn test_transform_expr_collapses_single_body() {
        let hooks = Hooks::new("plain", |expr: &Node| Ok(expr.to_string()));
        let tree = Node::form("f", [Node::symbol("x")]);
        assert_eq!(transform_expr(&hooks, tree.clone()).unwrap(), tree);
    }

    #[test]
    fn test_transform_expr_wraps_generated_body() {
        let hooks = Hooks::new("plain", |expr: &Node| Ok(expr.to_string())).with_generator(|tree| {
            Ok(if tree.head() == Some("main") {
                vec![Node::form("decl", [Node::symbol("a")])]
            } else {
                Vec::new()
            })
        });
        let out = transform_expr(&hooks, Node::list(vec![Node::symbol("main")])).unwrap();
        assert_eq!(out.to_string(), "[(decl a) (main)]");
    }
}
