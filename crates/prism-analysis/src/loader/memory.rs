use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use prism_graph::ResolvedUrl;
use rustc_hash::FxHashMap;

use super::{UrlLoader, in_excluded_dir};
use crate::error::LoadError;

/// Serves contents from memory and counts how often each URL was loaded.
///
/// Clones share the same contents and counters.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUrlLoader {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    files: FxHashMap<ResolvedUrl, String>,
    loads: FxHashMap<ResolvedUrl, usize>,
}

impl InMemoryUrlLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a loader from `(url, contents)` pairs.
    pub fn with_files<U, C>(files: impl IntoIterator<Item = (U, C)>) -> Self
    where
        U: Into<ResolvedUrl>,
        C: Into<String>,
    {
        let loader = Self::new();
        for (url, contents) in files {
            loader.insert(url, contents);
        }
        loader
    }

    /// Add or replace a file.
    pub fn insert(&self, url: impl Into<ResolvedUrl>, contents: impl Into<String>) {
        self.inner.lock().files.insert(url.into(), contents.into());
    }

    pub fn remove(&self, url: &ResolvedUrl) -> Option<String> {
        self.inner.lock().files.remove(url)
    }

    /// How many times `url` was successfully loaded.
    pub fn load_count(&self, url: &ResolvedUrl) -> usize {
        self.inner.lock().loads.get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl UrlLoader for InMemoryUrlLoader {
    fn can_load(&self, url: &ResolvedUrl) -> bool {
        self.inner.lock().files.contains_key(url)
    }

    async fn load(&self, url: &ResolvedUrl) -> Result<String, LoadError> {
        let mut inner = self.inner.lock();
        let contents = inner
            .files
            .get(url)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(url.clone()))?;
        *inner.loads.entry(url.clone()).or_default() += 1;
        Ok(contents)
    }

    async fn list(&self, excluded_dirs: &[String]) -> Result<Vec<ResolvedUrl>, LoadError> {
        let mut urls: Vec<_> = self
            .inner
            .lock()
            .files
            .keys()
            .filter(|url| !in_excluded_dir(url.as_str(), excluded_dirs))
            .cloned()
            .collect();
        urls.sort();
        Ok(urls)
    }
}
