use super::{Highlighter, TokenLines};
use crate::domain::HighlightError;
use crate::infra::hash::hash64;
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub const DEFAULT_CACHE_CAPACITY: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    content_hash: u64,
    language: String,
    theme: String,
}

impl CacheKey {
    fn new(text: &str, language: &str, theme: &str) -> Self {
        Self {
            content_hash: hash64(text),
            language: language.to_string(),
            theme: theme.to_string(),
        }
    }
}

/// Bounded least-recently-used store of highlighter output, keyed by
/// (content hash, language, theme). Clones share the same storage.
#[derive(Clone)]
pub struct HighlightCache(Arc<Mutex<LruCache<CacheKey, Arc<TokenLines>>>>);

impl Default for HighlightCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl HighlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self(Arc::new(Mutex::new(LruCache::new(capacity))))
    }

    pub fn get(&self, text: &str, language: &str, theme: &str) -> Option<Arc<TokenLines>> {
        self.0
            .lock()
            .get(&CacheKey::new(text, language, theme))
            .cloned()
    }

    pub fn insert(&self, text: &str, language: &str, theme: &str, lines: Arc<TokenLines>) {
        self.0.lock().put(CacheKey::new(text, language, theme), lines);
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.0.lock().cap().get()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    /// Drops every entry produced with `theme`; returns how many were removed.
    pub fn evict_theme(&self, theme: &str) -> usize {
        let mut cache = self.0.lock();
        let stale: Vec<CacheKey> = cache
            .iter()
            .filter(|(key, _)| key.theme == theme)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            cache.pop(key);
        }
        stale.len()
    }
}

/// Wraps a [`Highlighter`] with an injected cache. Only successful results
/// are stored; "not yet available" and failures always reach the inner
/// highlighter again.
pub struct CachedHighlighter<H> {
    inner: H,
    cache: HighlightCache,
}

impl<H: Highlighter> CachedHighlighter<H> {
    pub fn new(inner: H, cache: HighlightCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &HighlightCache {
        &self.cache
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<H: Highlighter> Highlighter for CachedHighlighter<H> {
    fn theme(&self) -> &str {
        self.inner.theme()
    }

    async fn highlight(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Option<Arc<TokenLines>>, HighlightError> {
        let theme = self.inner.theme();
        if let Some(hit) = self.cache.get(text, language, theme) {
            log::trace!("highlight cache hit ({language})");
            return Ok(Some(hit));
        }

        let result = self.inner.highlight(text, language).await?;
        if let Some(lines) = &result {
            self.cache.insert(text, language, theme, lines.clone());
        }
        Ok(result)
    }
}
