//! Translation options.
//!
//! Example `shadeform.toml`:
//! ```toml
//! terminator = ";"
//! max_stalled_rounds = 20
//! ```

use serde::Deserialize;
use std::path::Path;

/// Default number of inference rounds without progress before giving up.
pub const DEFAULT_MAX_STALLED_ROUNDS: usize = 20;

/// Error loading [`TranslateOptions`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Knobs that are constant for one translation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslateOptions {
    /// Appended (with a newline) after every rendered statement that does not
    /// already end in a newline.
    pub terminator: String,
    /// Inference fails once the number of tagged nodes has not changed for
    /// more than this many consecutive rounds.
    pub max_stalled_rounds: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            terminator: ";".to_string(),
            max_stalled_rounds: DEFAULT_MAX_STALLED_ROUNDS,
        }
    }
}

impl TranslateOptions {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a TOML file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    pub fn with_max_stalled_rounds(mut self, rounds: usize) -> Self {
        self.max_stalled_rounds = rounds;
        self
    }
}
