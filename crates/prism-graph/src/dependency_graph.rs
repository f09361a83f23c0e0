//! Import dependency graph with cycle-tolerant readiness tracking.
//!
//! Each known document owns a [`DocumentRecord`]: a small state machine
//! (`Pending → Ready(deps)` or `Pending → Rejected(reason)`) published through
//! a `tokio::sync::watch` channel, plus the set of documents known to import
//! it. Scanning code registers edges as soon as a document's own imports are
//! known and then awaits [`DependencyGraph::when_ready`], which only depends on
//! the records settling, never on the order in which scans return.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::watch;
use tracing::trace;

use crate::{GraphError, ResolvedUrl, Result};

#[derive(Debug, Clone)]
enum RecordState {
    Pending,
    Ready(Arc<[ResolvedUrl]>),
    Rejected(Arc<str>),
}

impl RecordState {
    fn is_settled(&self) -> bool {
        !matches!(self, RecordState::Pending)
    }
}

#[derive(Debug)]
struct DocumentRecord {
    state: watch::Sender<RecordState>,
    dependants: Mutex<FxHashSet<ResolvedUrl>>,
}

impl DocumentRecord {
    fn new(state: RecordState, dependants: FxHashSet<ResolvedUrl>) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            state,
            dependants: Mutex::new(dependants),
        }
    }

    fn pending() -> Self {
        Self::new(RecordState::Pending, FxHashSet::default())
    }

    fn current(&self) -> RecordState {
        self.state.borrow().clone()
    }

    /// Settle a pending record. Later settlements are ignored.
    fn settle(&self, next: RecordState) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_settled() {
                false
            } else {
                *state = next;
                true
            }
        })
    }

    async fn settled(&self) -> Option<RecordState> {
        let mut rx = self.state.subscribe();
        rx.wait_for(RecordState::is_settled)
            .await
            .ok()
            .map(|state| (*state).clone())
    }
}

/// Directed graph of "document imports document" edges.
///
/// The graph is shared by every scan task of one cache generation. A new
/// generation gets its own graph through [`fork`](Self::fork) or
/// [`invalidate_paths`](Self::invalidate_paths).
#[derive(Debug, Default)]
pub struct DependencyGraph {
    records: Mutex<FxHashMap<ResolvedUrl, Arc<DocumentRecord>>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, url: &ResolvedUrl) -> Arc<DocumentRecord> {
        let mut records = self.records.lock();
        Arc::clone(
            records
                .entry(url.clone())
                .or_insert_with(|| Arc::new(DocumentRecord::pending())),
        )
    }

    /// Register the direct imports of `url` and mark its edge set as known.
    ///
    /// Registering a document twice keeps the first edge set.
    pub fn add_document(
        &self,
        url: &ResolvedUrl,
        dependencies: impl IntoIterator<Item = ResolvedUrl>,
    ) {
        let dependencies: Vec<ResolvedUrl> = dependencies.into_iter().collect();
        for dependency in &dependencies {
            self.record(dependency).dependants.lock().insert(url.clone());
        }

        let count = dependencies.len();
        if self
            .record(url)
            .settle(RecordState::Ready(dependencies.into()))
        {
            trace!(url = %url, dependencies = count, "dependencies known");
        }
    }

    /// Mark `url` as permanently failed for this generation.
    pub fn reject_document(&self, url: &ResolvedUrl, reason: impl std::fmt::Display) {
        let reason: Arc<str> = Arc::from(reason.to_string());
        if self.record(url).settle(RecordState::Rejected(reason)) {
            trace!(url = %url, "document rejected");
        }
    }

    /// Wait until `url` and every document transitively reachable from it
    /// through currently known edges has settled.
    ///
    /// Each node is awaited at most once, so an import cycle completes as soon
    /// as all of its members have registered their edges. A rejected
    /// dependency counts as settled with no further edges; only a rejection
    /// of `url` itself is reported as an error.
    pub async fn when_ready(&self, url: &ResolvedUrl) -> Result<()> {
        let mut visited = FxHashSet::default();
        let mut to_wait_on = vec![url.clone()];

        while let Some(next) = to_wait_on.pop() {
            if !visited.insert(next.clone()) {
                continue;
            }

            let record = self.record(&next);
            match record.settled().await {
                Some(RecordState::Ready(dependencies)) => {
                    to_wait_on.extend(
                        dependencies
                            .iter()
                            .filter(|dependency| !visited.contains(*dependency))
                            .cloned(),
                    );
                }
                Some(RecordState::Rejected(reason)) if &next == url => {
                    return Err(GraphError::Rejected {
                        url: url.clone(),
                        reason: reason.to_string(),
                    });
                }
                Some(RecordState::Rejected(_)) => {}
                Some(RecordState::Pending) | None => {
                    return Err(GraphError::RecordDropped(next));
                }
            }
        }

        Ok(())
    }

    /// The direct imports of `url`, if they are known yet.
    pub fn dependencies_of(&self, url: &ResolvedUrl) -> Option<Vec<ResolvedUrl>> {
        let record = self.records.lock().get(url).cloned()?;
        match record.current() {
            RecordState::Ready(dependencies) => Some(dependencies.to_vec()),
            _ => None,
        }
    }

    /// The rejection reason for `url`, if it failed.
    pub fn rejection(&self, url: &ResolvedUrl) -> Option<String> {
        let record = self.records.lock().get(url).cloned()?;
        match record.current() {
            RecordState::Rejected(reason) => Some(reason.to_string()),
            _ => None,
        }
    }

    /// Every document that transitively imports `url`.
    pub fn all_dependants_of(&self, url: &ResolvedUrl) -> Vec<ResolvedUrl> {
        let records = self.records.lock();
        let mut result = Vec::new();
        let mut visited = FxHashSet::default();
        let mut stack = vec![url.clone()];

        while let Some(next) = stack.pop() {
            let Some(record) = records.get(&next) else {
                continue;
            };
            for dependant in record.dependants.lock().iter() {
                if visited.insert(dependant.clone()) {
                    result.push(dependant.clone());
                    stack.push(dependant.clone());
                }
            }
        }

        result
    }

    pub fn contains(&self, url: &ResolvedUrl) -> bool {
        self.records.lock().contains_key(url)
    }

    /// Copy every record into an independent graph.
    ///
    /// Settled records stay settled in the copy; pending records start a new,
    /// unrelated wait.
    pub fn fork(&self) -> DependencyGraph {
        let records = self.records.lock();
        let copied = records
            .iter()
            .map(|(url, record)| {
                let dependants = record.dependants.lock().clone();
                (
                    url.clone(),
                    Arc::new(DocumentRecord::new(record.current(), dependants)),
                )
            })
            .collect();

        DependencyGraph {
            records: Mutex::new(copied),
        }
    }

    /// Fork the graph and forget what is known about `paths`.
    ///
    /// Each invalidated path gets a fresh pending record that still lists the
    /// documents importing it, so a later rescan re-links the graph.
    pub fn invalidate_paths(&self, paths: &[ResolvedUrl]) -> DependencyGraph {
        let fork = self.fork();
        {
            let mut records = fork.records.lock();
            for path in paths {
                let Some(old) = records.remove(path) else {
                    continue;
                };

                if let RecordState::Ready(dependencies) = old.current() {
                    for dependency in dependencies.iter() {
                        if let Some(record) = records.get(dependency) {
                            record.dependants.lock().remove(path);
                        }
                    }
                }

                let dependants = old.dependants.lock().clone();
                records.insert(
                    path.clone(),
                    Arc::new(DocumentRecord::new(RecordState::Pending, dependants)),
                );
            }
        }
        fork
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn url(s: &str) -> ResolvedUrl {
        ResolvedUrl::new(s)
    }

    #[tokio::test]
    async fn when_ready_resolves_for_leaf_document() {
        let graph = DependencyGraph::new();
        graph.add_document(&url("a.html"), []);
        graph.when_ready(&url("a.html")).await.unwrap();
    }

    #[tokio::test]
    async fn when_ready_terminates_on_cycles() {
        let graph = DependencyGraph::new();
        graph.add_document(&url("a.html"), [url("b.html")]);
        graph.add_document(&url("b.html"), [url("a.html")]);

        tokio::time::timeout(Duration::from_secs(1), graph.when_ready(&url("a.html")))
            .await
            .expect("cycle should not deadlock")
            .unwrap();
    }

    #[tokio::test]
    async fn when_ready_waits_for_late_registration() {
        let graph = Arc::new(DependencyGraph::new());
        graph.add_document(&url("a.html"), [url("b.html")]);

        let waiter = {
            let graph = Arc::clone(&graph);
            tokio::spawn(async move { graph.when_ready(&url("a.html")).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        graph.add_document(&url("b.html"), []);
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn rejected_root_fails_but_rejected_dependency_does_not() {
        let graph = DependencyGraph::new();
        graph.add_document(&url("b.html"), [url("missing.html")]);
        graph.reject_document(&url("missing.html"), "Can't load URL: missing.html");

        graph.when_ready(&url("b.html")).await.unwrap();

        let err = graph.when_ready(&url("missing.html")).await.unwrap_err();
        assert!(matches!(err, GraphError::Rejected { .. }));
        assert_eq!(
            graph.rejection(&url("missing.html")).as_deref(),
            Some("Can't load URL: missing.html")
        );
    }

    #[test]
    fn first_registration_wins() {
        let graph = DependencyGraph::new();
        graph.add_document(&url("a.html"), [url("b.html")]);
        graph.add_document(&url("a.html"), [url("c.html")]);
        graph.reject_document(&url("a.html"), "late failure");

        assert_eq!(graph.dependencies_of(&url("a.html")), Some(vec![url("b.html")]));
        assert_eq!(graph.rejection(&url("a.html")), None);
    }

    #[test]
    fn all_dependants_is_transitive() {
        let graph = DependencyGraph::new();
        graph.add_document(&url("app.html"), [url("page.html")]);
        graph.add_document(&url("page.html"), [url("button.html")]);
        graph.add_document(&url("button.html"), []);

        let mut dependants = graph.all_dependants_of(&url("button.html"));
        dependants.sort();
        assert_eq!(dependants, vec![url("app.html"), url("page.html")]);
        assert!(graph.all_dependants_of(&url("app.html")).is_empty());
    }

    #[test]
    fn invalidate_paths_keeps_dependants_and_leaves_original_intact() {
        let graph = DependencyGraph::new();
        graph.add_document(&url("app.html"), [url("button.html")]);
        graph.add_document(&url("button.html"), [url("icon.html")]);
        graph.add_document(&url("icon.html"), []);

        let next = graph.invalidate_paths(&[url("button.html")]);

        assert_eq!(next.dependencies_of(&url("button.html")), None);
        assert_eq!(next.all_dependants_of(&url("button.html")), vec![url("app.html")]);
        assert!(next.all_dependants_of(&url("icon.html")).is_empty());

        assert_eq!(
            graph.dependencies_of(&url("button.html")),
            Some(vec![url("icon.html")])
        );
        assert_eq!(graph.all_dependants_of(&url("icon.html")).len(), 2);
    }

    #[test]
    fn fork_is_independent() {
        let graph = DependencyGraph::new();
        graph.add_document(&url("a.html"), []);

        let fork = graph.fork();
        fork.add_document(&url("b.html"), [url("a.html")]);

        assert!(fork.contains(&url("b.html")));
        assert!(!graph.contains(&url("b.html")));
        assert_eq!(fork.dependencies_of(&url("a.html")), Some(vec![]));
    }
}
