//! Final rendering of top-level expressions.

use crate::backend::Backend;
use crate::error::{Phase, TranslateError, guard};
use crate::tree::Node;

/// Render `body` with the backend parser.
///
/// A body consisting of a single vector is unwrapped first. Blank renders are
/// dropped; every other render gets `terminator` and a newline, unless it
/// already ends in a newline (a pre-formatted block).
pub fn render(
    backend: &dyn Backend,
    body: &[Node],
    terminator: &str,
) -> Result<String, TranslateError> {
    let exprs = match body {
        [only] if only.is_vector() => only.children(),
        _ => body,
    };

    let mut out = String::new();
    for expr in exprs {
        let text = guard(Phase::Rendering, expr, backend.render(expr))?;
        if text.trim().is_empty() {
            continue;
        }
        out.push_str(&text);
        if !text.ends_with('\n') {
            out.push_str(terminator);
            out.push('\n');
        }
    }
    Ok(out)
}
