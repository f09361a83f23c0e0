//! One generation of memoized analysis work.
//!
//! Every expensive step (parse, local scan, scan with dependencies) is
//! stored as a [`Shared`] future keyed by URL, so concurrent callers within a
//! generation share a single unit of work. Resolved documents and
//! warning-carrying failures are stored as plain values.
//!
//! A generation is never changed once a newer one has been forked from it:
//! [`AnalysisCache::invalidate`] copies the maps and drops the stale keys from
//! the copy.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use prism_graph::{DependencyGraph, ResolvedUrl};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::error::SharedError;
use crate::model::{Document, ScannedDocument, Warning};
use crate::parser::ParsedDocument;

/// A memoized, possibly still running, unit of work.
pub type Memo<T> = Shared<BoxFuture<'static, Result<Arc<T>, SharedError>>>;

type MemoMap<T> = Mutex<FxHashMap<ResolvedUrl, Memo<T>>>;

#[derive(Default)]
pub(crate) struct AnalysisCache {
    pub(crate) parsed: MemoMap<ParsedDocument>,
    /// Documents scanned on their own, inline documents included.
    pub(crate) scanned_local: MemoMap<ScannedDocument>,
    /// Documents whose transitive imports have been scanned as well.
    pub(crate) scanned: MemoMap<ScannedDocument>,
    pub(crate) analyzed: Mutex<FxHashMap<ResolvedUrl, Arc<Document>>>,
    /// Documents that could not be scanned, with the warning explaining why.
    pub(crate) failed: Mutex<FxHashMap<ResolvedUrl, Warning>>,
    pub(crate) graph: DependencyGraph,
}

impl std::fmt::Debug for AnalysisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisCache")
            .field("parsed", &self.parsed.lock().len())
            .field("scanned", &self.scanned.lock().len())
            .field("analyzed", &self.analyzed.lock().len())
            .field("failed", &self.failed.lock().len())
            .finish()
    }
}

/// Return the memo for `url`, starting `make` if there is none yet.
pub(crate) fn memoize<T, F>(map: &MemoMap<T>, url: &ResolvedUrl, make: F) -> Memo<T>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> BoxFuture<'static, Result<Arc<T>, SharedError>>,
{
    map.lock()
        .entry(url.clone())
        .or_insert_with(|| make().shared())
        .clone()
}

/// The finished value of a memo, if it completed successfully.
pub(crate) fn finished<T>(map: &MemoMap<T>, url: &ResolvedUrl) -> Option<Arc<T>> {
    let map = map.lock();
    match map.get(url)?.peek()? {
        Ok(value) => Some(Arc::clone(value)),
        Err(_) => None,
    }
}

fn copy_without<V: Clone>(
    map: &Mutex<FxHashMap<ResolvedUrl, V>>,
    stale: &FxHashSet<ResolvedUrl>,
) -> Mutex<FxHashMap<ResolvedUrl, V>> {
    let copied = map
        .lock()
        .iter()
        .filter(|(url, _)| !stale.contains(*url))
        .map(|(url, value)| (url.clone(), value.clone()))
        .collect();
    Mutex::new(copied)
}

impl AnalysisCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A new generation that forgets `urls` and everything that transitively
    /// imports them. Passing no URLs produces a plain copy.
    pub(crate) fn invalidate(&self, urls: &[ResolvedUrl]) -> AnalysisCache {
        let mut stale: FxHashSet<ResolvedUrl> = FxHashSet::default();
        for url in urls {
            stale.insert(url.clone());
            stale.extend(self.graph.all_dependants_of(url));
        }
        if !stale.is_empty() {
            debug!(
                changed = urls.len(),
                invalidated = stale.len(),
                "invalidating cached documents"
            );
        }

        let stale_paths: Vec<ResolvedUrl> = stale.iter().cloned().collect();
        AnalysisCache {
            parsed: copy_without(&self.parsed, &stale),
            scanned_local: copy_without(&self.scanned_local, &stale),
            scanned: copy_without(&self.scanned, &stale),
            analyzed: copy_without(&self.analyzed, &stale),
            failed: copy_without(&self.failed, &stale),
            graph: self.graph.invalidate_paths(&stale_paths),
        }
    }

    pub(crate) fn contains(&self, url: &ResolvedUrl) -> bool {
        self.parsed.lock().contains_key(url)
            || self.scanned_local.lock().contains_key(url)
            || self.scanned.lock().contains_key(url)
            || self.is_settled(url)
    }

    pub(crate) fn is_settled(&self, url: &ResolvedUrl) -> bool {
        self.analyzed.lock().contains_key(url) || self.failed.lock().contains_key(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Severity, SourceRange};

    fn url(s: &str) -> ResolvedUrl {
        ResolvedUrl::new(s)
    }

    fn failure(file: &str) -> Warning {
        Warning::new(
            "could-not-load",
            "Can't load URL",
            Severity::Error,
            SourceRange::file_start(url(file)),
        )
    }

    #[test]
    fn invalidation_drops_transitive_dependants() {
        let cache = AnalysisCache::new();
        cache.graph.add_document(&url("app.html"), [url("page.html")]);
        cache.graph.add_document(&url("page.html"), [url("button.html")]);
        cache.graph.add_document(&url("button.html"), []);
        cache.graph.add_document(&url("other.html"), []);
        for file in ["app.html", "page.html", "button.html", "other.html"] {
            cache.failed.lock().insert(url(file), failure(file));
        }

        let next = cache.invalidate(&[url("button.html")]);

        let failed = next.failed.lock();
        assert!(failed.contains_key(&url("other.html")));
        assert!(!failed.contains_key(&url("button.html")));
        assert!(!failed.contains_key(&url("page.html")));
        assert!(!failed.contains_key(&url("app.html")));
        // The old generation is untouched.
        assert_eq!(cache.failed.lock().len(), 4);
        assert_eq!(next.graph.dependencies_of(&url("page.html")), None);
        assert_eq!(
            cache.graph.dependencies_of(&url("page.html")),
            Some(vec![url("button.html")])
        );
    }

    #[tokio::test]
    async fn memos_run_once() {
        let map: MemoMap<String> = Mutex::default();
        let key = url("a.html");
        let runs = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let make = |runs: Arc<std::sync::atomic::AtomicUsize>| {
            move || {
                async move {
                    runs.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Ok::<_, SharedError>(Arc::new("done".to_string()))
                }
                .boxed()
            }
        };
        let first = memoize(&map, &key, make(Arc::clone(&runs)));
        let second = memoize(&map, &key, make(Arc::clone(&runs)));

        let (a, b) = futures::join!(first, second);
        assert_eq!(a.unwrap().as_str(), "done");
        assert_eq!(b.unwrap().as_str(), "done");
        assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(finished(&map, &key).as_deref().map(String::as_str), Some("done"));
    }
}
