//! Syntax highlighting seam.
//!
//! The pipeline only talks to the [`Highlighter`] trait. [`SyntectHighlighter`]
//! is the bundled implementation; [`CachedHighlighter`] memoizes any
//! implementation through an injected [`HighlightCache`].

pub mod cache;
pub mod markup;
pub mod syntax;

use crate::domain::HighlightError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use cache::{CachedHighlighter, HighlightCache};
pub use syntax::{SyntectHighlighter, detect_language};

/// A colored fragment of one source line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub content: String,
    /// CSS color, e.g. `#c0c5ce`.
    pub color: String,
}

/// Token runs for each line of a text, in line order.
pub type TokenLines = Vec<Vec<Token>>;

#[async_trait]
pub trait Highlighter: Send + Sync {
    /// Name of the theme colors are taken from; part of the cache key.
    fn theme(&self) -> &str;

    /// Tokenizes `text` as `language`. `Ok(None)` means tokens are not
    /// available yet; callers render plain text in that case.
    async fn highlight(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Option<Arc<TokenLines>>, HighlightError>;
}

/// Highlighter that never produces tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHighlighter;

#[async_trait]
impl Highlighter for NoopHighlighter {
    fn theme(&self) -> &str {
        "none"
    }

    async fn highlight(
        &self,
        _text: &str,
        _language: &str,
    ) -> Result<Option<Arc<TokenLines>>, HighlightError> {
        Ok(None)
    }
}
