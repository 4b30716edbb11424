//! Registry of named backends.
//!
//! The core ships no backends of its own; target crates register theirs so
//! that tools can pick one by name. Translation never consults the registry:
//! the backend is always passed explicitly.

use crate::backend::Backend;
use std::sync::RwLock;

/// Global backend registry.
static BACKENDS: RwLock<Vec<&'static dyn Backend>> = RwLock::new(Vec::new());

/// Register a backend. A later registration under an existing name shadows
/// the earlier one.
pub fn register_backend(backend: &'static dyn Backend) {
    tracing::debug!(backend = backend.name(), "registering backend");
    BACKENDS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push(backend);
}

/// Get a backend by name.
pub fn backend_for_name(name: &str) -> Option<&'static dyn Backend> {
    BACKENDS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .iter()
        .rev()
        .find(|b| b.name() == name)
        .copied()
}

/// Get all registered backends, in registration order.
pub fn backends() -> Vec<&'static dyn Backend> {
    BACKENDS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}
