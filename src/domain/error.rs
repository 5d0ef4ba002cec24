//! Domain error types for diffview.
//!
//! Malformed unified diffs and oversized inputs are never errors here: they
//! degrade to best-effort output. These types cover programmatic misuse,
//! highlighter failures (which callers log and swallow) and configuration IO.

use thiserror::Error;

/// Errors raised while building diff structures.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("No diff input: supply a unified diff or a before/after pair")]
    MissingInput,

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Diff operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Errors reported by a [`crate::infra::highlight::Highlighter`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HighlightError {
    #[error("Unknown highlight theme: {0}")]
    UnknownTheme(String),

    #[error("Tokenizer failed: {0}")]
    Tokenize(String),

    #[error("Highlight task did not complete: {0}")]
    Join(String),
}

/// Errors related to reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
