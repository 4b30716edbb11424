//! Backend-agnostic expression-tree compiler core.
//!
//! `shadeform-core` takes a generic S-expression tree and lowers it to target
//! source text. The target language is supplied by a [`Backend`]: five hooks
//! (generator, parser, transformer, inspector, tagger) that plug into a shared
//! rewrite / generation / type-inference pipeline.
//!
//! # Pipeline
//!
//! ```text
//! tree ─> division rewrite ─> transform round ─> generation loop ─> reverse
//!      ─> tagging ─> type inference ─> rendering ─> source text
//! ```
//!
//! - The **transform step** renames `/` to `divide`, then applies the backend
//!   transformer bottom-up once.
//! - The **generation loop** asks the backend for extra top-level expressions
//!   (hoisted declarations, helpers) until it returns none; each batch goes
//!   through the transform step. The body is then reversed.
//! - **Tagging** lets the backend mark binding sites, then flags the first
//!   appearance of every assigned variable.
//! - **Type inference** runs to a fixed point, failing on ambiguous or
//!   unresolvable variables.
//! - **Rendering** maps the backend parser over the body and appends
//!   statement terminators.
//!
//! # Example
//!
//! ```
//! use shadeform_core::{Hooks, Meta, Node, TypeTag, transform_expr};
//!
//! let hooks = Hooks::new("demo", |expr: &Node| Ok(expr.to_string()))
//!     .with_tagger(|node| {
//!         Ok(match node.children() {
//!             [head, var, _] if head.is_symbol("let") => {
//!                 let name = var.as_symbol().unwrap_or_default().to_string();
//!                 let mut children = node.children().to_vec();
//!                 children[1] = var.clone().merge_meta(Meta::assignment());
//!                 Some(Node::list(children).with_meta(Meta::defining(name)))
//!             }
//!             _ => None,
//!         })
//!     })
//!     .with_inspector(|node| match node.children() {
//!         [head, _, value] if head.is_symbol("let") => Ok(shadeform_core::type_of(value)),
//!         _ => Ok(None),
//!     });
//!
//! let tree = Node::form("let", [Node::symbol("x"), Node::int(1)]);
//! let typed = transform_expr(&hooks, tree).unwrap();
//! assert_eq!(typed.children()[1].tag(), Some(&TypeTag::int()));
//! ```

pub mod backend;
pub mod error;
pub mod meta;
pub mod options;
pub mod passes;
pub mod registry;
pub mod translate;
pub mod tree;
pub mod walk;

#[cfg(feature = "sexpr")]
pub mod sexpr;

// Re-exports: tree model
pub use meta::{Meta, TypeTag};
pub use tree::{Atom, Node, NodeKind, Shape};

// Re-exports: tree utilities
pub use walk::{
    annotate, filter_nodes, print_tree, rewrite, rewrite_to_fixpoint, try_annotate, try_rewrite,
};

// Re-exports: backends
pub use backend::{Backend, Hooks};
pub use registry::{backend_for_name, backends, register_backend};

// Re-exports: translation
pub use error::{Phase, TranslateError};
pub use options::{ConfigError, TranslateOptions};
pub use passes::type_of;
pub use translate::{Translator, transform_expr, translate_expr};

#[cfg(feature = "sexpr")]
pub use sexpr::{SExprError, from_json, to_json};
