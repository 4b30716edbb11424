//! Generation loop: let the backend add top-level expressions.
//!
//! The generator is first shown the transformed input tree. Every batch it
//! returns goes through the transform step and is appended to the body; the
//! generator is then shown that batch (as a vector), never the original tree
//! again. An empty batch ends the loop.
//!
//! Batches are flattened one level: a generated vector contributes its
//! children as separate top-level expressions.
//!
//! The accumulated body is reversed once at the end, so the last batch
//! discovered is the first emitted and the input tree comes last. Generators
//! should return dependencies of what they were shown, which then precede it
//! in the output.

use crate::backend::Backend;
use crate::error::{Phase, TranslateError, guard};
use crate::passes::transform::transform_step;
use crate::tree::Node;
use tracing::debug;

pub fn generation_loop(backend: &dyn Backend, tree: Node) -> Result<Vec<Node>, TranslateError> {
    let mut pending = guard(Phase::Generating, &tree, backend.generate(&tree))?;
    let mut body = vec![tree];
    let mut round = 0usize;

    while !pending.is_empty() {
        round += 1;
        let mut batch = Vec::with_capacity(pending.len());
        for expr in pending {
            let expr = transform_step(backend, expr)?;
            if expr.is_vector() {
                batch.extend(expr.into_children());
            } else {
                batch.push(expr);
            }
        }
        debug!(round, size = batch.len(), "generated batch");

        let batch = Node::vector(batch);
        pending = guard(Phase::Generating, &batch, backend.generate(&batch))?;
        body.extend(batch.into_children());
    }

    body.reverse();
    Ok(body)
}
