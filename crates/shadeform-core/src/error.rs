//! Translation diagnostics.

use crate::meta::TypeTag;
use crate::tree::Node;
use crate::walk::print_tree;
use std::fmt;

/// Pipeline phase a hook was running in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Transforming,
    Generating,
    InferringType,
    Tagging,
    Rendering,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Transforming => "transforming",
            Phase::Generating => "generating",
            Phase::InferringType => "inferring type",
            Phase::Tagging => "tagging",
            Phase::Rendering => "rendering",
        })
    }
}

/// Error that aborts a translation.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// A backend hook failed.
    #[error("error while {phase}: {message}\nin:\n{tree}")]
    Hook {
        phase: Phase,
        /// [`print_tree`] dump of the subtree the hook was given.
        tree: String,
        message: String,
    },

    #[error("ambiguous type for `{variable}`: {}", join(types))]
    AmbiguousType {
        variable: String,
        types: Vec<TypeTag>,
    },

    #[error("could not infer a type for: {}", variables.join(", "))]
    UnresolvedType { variables: Vec<String> },
}

fn join(types: &[TypeTag]) -> String {
    types
        .iter()
        .map(TypeTag::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the result of a hook call through the diagnostic wrapper.
///
/// Diagnostics raised further down (for instance by a backend that calls back
/// into the translator) pass through untouched; anything else becomes
/// [`TranslateError::Hook`] anchored at `tree`.
pub(crate) fn guard<T>(
    phase: Phase,
    tree: &Node,
    result: anyhow::Result<T>,
) -> Result<T, TranslateError> {
    result.map_err(|err| match err.downcast::<TranslateError>() {
        Ok(diagnostic) => diagnostic,
        Err(err) => TranslateError::Hook {
            phase,
            tree: print_tree(tree),
            message: format!("{err:#}"),
        },
    })
}
