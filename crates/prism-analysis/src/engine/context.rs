//! The analysis context: one immutable cache generation plus the
//! collaborators needed to fill it.
//!
//! ```text
//!  analyze(urls) ──fork──▶ scan(url) ──▶ scan_local(url) ──▶ parse(url) ──▶ load(url)
//!                             │               └─ inline documents parsed and scanned in place
//!                             ├─ graph.add_document(url, imports)
//!                             ├─ tokio::spawn(scan(import)) for every import
//!                             └─ graph.when_ready(url)
//!                 ──▶ get_document(url) ──▶ Document::resolve
//! ```
//!
//! Contexts are cheap handles. Every operation that changes what is known
//! ([`analyze`](AnalysisContext::analyze),
//! [`files_changed`](AnalysisContext::files_changed),
//! [`clear_caches`](AnalysisContext::clear_caches)) returns a new context and
//! leaves the receiver as it was.

use std::sync::Arc;

use futures::FutureExt;
use prism_graph::ResolvedUrl;
use tracing::{debug, trace, warn};

use super::cache::{AnalysisCache, Memo, finished, memoize};
use crate::error::{AnalysisError, SharedError};
use crate::loader::UrlLoader;
use crate::model::{
    Document, DocumentResolver, ScannedDocument, ScannedFeature, Severity, SourceRange, Warning,
};
use crate::parser::{InlineInfo, ParsedDocument, ParserRegistry};
use crate::resolver::UrlResolver;
use crate::scanning::ScannerRegistry;

/// Configuration shared by every generation.
#[derive(Debug)]
struct Collaborators {
    parsers: ParserRegistry,
    scanners: ScannerRegistry,
    loader: Arc<dyn UrlLoader>,
    resolver: Arc<dyn UrlResolver>,
}

#[derive(Debug)]
struct ContextInner {
    generation: u64,
    collaborators: Arc<Collaborators>,
    cache: AnalysisCache,
    /// The latest context `analyze` forked from this one. Later calls start
    /// from it, so concurrent analyses of the same URLs share their work.
    successor: tokio::sync::Mutex<Option<AnalysisContext>>,
}

/// A handle on one generation of analysis results.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    inner: Arc<ContextInner>,
}

impl AnalysisContext {
    pub fn new(
        parsers: ParserRegistry,
        scanners: ScannerRegistry,
        loader: Arc<dyn UrlLoader>,
        resolver: Arc<dyn UrlResolver>,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                generation: 0,
                collaborators: Arc::new(Collaborators {
                    parsers,
                    scanners,
                    loader,
                    resolver,
                }),
                cache: AnalysisCache::new(),
                successor: tokio::sync::Mutex::new(None),
            }),
        }
    }

    /// Monotonically increasing across forks.
    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    /// Whether two handles refer to the same generation.
    pub fn ptr_eq(&self, other: &AnalysisContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn loader(&self) -> &Arc<dyn UrlLoader> {
        &self.inner.collaborators.loader
    }

    fn cache(&self) -> &AnalysisCache {
        &self.inner.cache
    }

    fn with_cache(&self, cache: AnalysisCache) -> AnalysisContext {
        let generation = self.inner.generation + 1;
        debug!(generation, "forked analysis context");
        AnalysisContext {
            inner: Arc::new(ContextInner {
                generation,
                collaborators: Arc::clone(&self.inner.collaborators),
                cache,
                successor: tokio::sync::Mutex::new(None),
            }),
        }
    }

    /// Resolve a URL as written in `base`, or as a top-level URL.
    ///
    /// URLs the resolver does not handle are taken verbatim.
    pub fn resolve_url(&self, url: &str, base: Option<&ResolvedUrl>) -> ResolvedUrl {
        let resolver = &self.inner.collaborators.resolver;
        if resolver.can_resolve(url) {
            if let Some(resolved) = resolver.resolve(url, base) {
                return resolved;
            }
        }
        ResolvedUrl::new(url)
    }

    /// Scan and resolve `urls`.
    ///
    /// Returns this same context when every URL was already analyzed (or
    /// already failed) in this generation. Otherwise the work happens in a
    /// fork, which is returned. Concurrent calls wait for each other and
    /// reuse what the earlier call produced. Failures are recorded per
    /// document and surface through [`get_document`](Self::get_document).
    pub async fn analyze<S: AsRef<str>>(&self, urls: &[S]) -> AnalysisContext {
        let urls: Vec<ResolvedUrl> = urls
            .iter()
            .map(|url| self.resolve_url(url.as_ref(), None))
            .collect();

        if urls.iter().all(|url| self.cache().is_settled(url)) {
            trace!(urls = urls.len(), "already analyzed");
            return self.clone();
        }

        let mut successor = self.inner.successor.lock().await;
        let base = successor.clone().unwrap_or_else(|| self.clone());
        if urls.iter().all(|url| base.cache().is_settled(url)) {
            return base;
        }

        let fork = base.with_cache(base.cache().invalidate(&[]));
        let scans: Vec<_> = urls
            .iter()
            .map(|url| {
                let scan = fork.scan(url);
                tokio::spawn(scan)
            })
            .collect();

        for (url, handle) in urls.iter().zip(futures::future::join_all(scans).await) {
            let result = handle.map_err(|e| Arc::new(AnalysisError::Task(e.to_string())));
            match result.and_then(|scanned| scanned) {
                Ok(_) => match fork.get_document(url) {
                    Ok(document) => {
                        trace!(%url, features = document.local_features().len(), "document ready");
                    }
                    Err(warning) => warn!(%url, %warning, "scanned document did not resolve"),
                },
                Err(error) => debug!(%url, %error, "analysis failed"),
            }
        }
        *successor = Some(fork.clone());
        fork
    }

    /// Forget `urls` and every document that imports them, in a new
    /// generation. Nothing is rescanned until the next
    /// [`analyze`](Self::analyze).
    pub fn files_changed<S: AsRef<str>>(&self, urls: &[S]) -> AnalysisContext {
        let urls: Vec<ResolvedUrl> = urls
            .iter()
            .map(|url| self.resolve_url(url.as_ref(), None))
            .collect();
        debug!(changed = ?urls, "files changed");
        self.with_cache(self.cache().invalidate(&urls))
    }

    /// A new generation with nothing cached.
    pub fn clear_caches(&self) -> AnalysisContext {
        self.with_cache(AnalysisCache::new())
    }

    /// Whether anything about `url` is cached in this generation.
    pub fn is_cached(&self, url: &ResolvedUrl) -> bool {
        self.cache().contains(url)
    }

    /// The resolved document for `url`.
    ///
    /// Documents that were scanned in this generation are resolved on first
    /// access. Anything else yields a warning describing why there is no
    /// document.
    pub fn get_document(&self, url: &ResolvedUrl) -> Result<Arc<Document>, Warning> {
        let cache = self.cache();
        if let Some(warning) = cache.failed.lock().get(url) {
            return Err(warning.clone());
        }
        if let Some(document) = cache.analyzed.lock().get(url) {
            return Ok(Arc::clone(document));
        }

        let Some(scanned) = finished(&cache.scanned_local, url) else {
            return Err(Warning::new(
                "unable-to-analyze",
                format!("Document not found: {url}"),
                Severity::Error,
                SourceRange::file_start(url.clone()),
            ));
        };

        // Registered before resolving so import cycles find it.
        let document = Arc::clone(
            cache
                .analyzed
                .lock()
                .entry(url.clone())
                .or_insert_with(|| Arc::new(Document::new(scanned))),
        );
        document.resolve(self);
        Ok(document)
    }

    /// Load `url` through the configured loader.
    pub async fn load(&self, url: &ResolvedUrl) -> crate::Result<String> {
        let loader = &self.inner.collaborators.loader;
        if !loader.can_load(url) {
            return Err(AnalysisError::CannotLoad(url.clone()));
        }
        Ok(loader.load(url).await?)
    }

    /// Load and parse `url`, once per generation.
    pub fn parse(&self, url: &ResolvedUrl) -> Memo<ParsedDocument> {
        let context = self.clone();
        let key = url.clone();
        memoize(&self.cache().parsed, url, move || {
            async move {
                let contents = context.load(&key).await?;
                let kind = document_type(&key);
                context
                    .inner
                    .collaborators
                    .parsers
                    .parse(kind, &contents, &key, None)
            }
            .map(|result| result.map_err(Arc::new))
            .boxed()
        })
    }

    /// Scan `url` on its own: its features, and those of its inline
    /// documents, without following imports.
    pub fn scan_local(&self, url: &ResolvedUrl) -> Memo<ScannedDocument> {
        let context = self.clone();
        let key = url.clone();
        memoize(&self.cache().scanned_local, url, move || {
            async move {
                let parsed = context.parse(&key).await?;
                let scanned = context.scan_parsed(parsed).map_err(Arc::new)?;
                debug!(
                    url = %key,
                    features = scanned.features.len(),
                    warnings = scanned.warnings.len(),
                    "scanned document"
                );
                Ok::<_, SharedError>(Arc::new(scanned))
            }
            .boxed()
        })
    }

    /// Scan `url` and, transitively, everything it imports.
    ///
    /// Completes once every reachable document has been scanned or has
    /// failed. Import failures do not fail the importer; they are recorded on
    /// the [`ScannedImport`](crate::model::ScannedImport).
    pub fn scan(&self, url: &ResolvedUrl) -> Memo<ScannedDocument> {
        let context = self.clone();
        let key = url.clone();
        memoize(&self.cache().scanned, url, move || {
            async move { context.scan_with_dependencies(key).await }.boxed()
        })
    }

    async fn scan_with_dependencies(
        self,
        url: ResolvedUrl,
    ) -> Result<Arc<ScannedDocument>, SharedError> {
        let graph = &self.cache().graph;

        let scanned = match self.scan_local(&url).await {
            Ok(scanned) => scanned,
            Err(error) => {
                let warning = match error.as_warning() {
                    Some(warning) => warning.clone(),
                    None => Warning::new(
                        "could-not-load",
                        error.to_string(),
                        Severity::Error,
                        SourceRange::file_start(url.clone()),
                    ),
                };
                self.cache().failed.lock().insert(url.clone(), warning);
                graph.reject_document(&url, &error);
                debug!(%url, %error, "scan failed");
                return Err(error);
            }
        };

        let imports: Vec<_> = scanned
            .imports()
            .into_iter()
            .map(|import| {
                let resolved = self.resolve_url(&import.url, Some(&url));
                (import, resolved)
            })
            .collect();
        graph.add_document(&url, imports.iter().map(|(_, resolved)| resolved.clone()));

        for (_, dependency) in &imports {
            let scan = self.scan(dependency);
            let dependency = dependency.clone();
            tokio::spawn(async move {
                if let Err(error) = scan.await {
                    trace!(url = %dependency, %error, "import failed to scan");
                }
            });
        }

        graph
            .when_ready(&url)
            .await
            .map_err(|e| Arc::new(AnalysisError::from(e)))?;

        // Every direct import has settled by now.
        for (import, dependency) in &imports {
            if let Some(reason) = graph.rejection(dependency) {
                import.set_error(reason);
            }
        }

        Ok(scanned)
    }

    /// Run the scanners over a parsed document, then parse and scan its
    /// inline documents.
    fn scan_parsed(&self, parsed: Arc<ParsedDocument>) -> crate::Result<ScannedDocument> {
        let collaborators = &self.inner.collaborators;
        let result = collaborators.scanners.scan(&parsed);
        let mut features = result.features;
        let mut warnings = result.warnings;

        for feature in &mut features {
            let ScannedFeature::InlineDocument(inline) = feature else {
                continue;
            };
            let info = InlineInfo {
                location_offset: inline.location_offset,
            };
            let parsed_inline = collaborators.parsers.parse(
                &inline.kind,
                &inline.contents,
                &parsed.url,
                Some(&info),
            );
            let scanned_inline = parsed_inline.and_then(|document| self.scan_parsed(document));

            match scanned_inline {
                Ok(mut scanned_inline) => {
                    if let Some(comment) = &inline.attached_comment {
                        let element = scanned_inline.features.iter_mut().find_map(|f| match f {
                            ScannedFeature::Element(element) => Some(element),
                            _ => None,
                        });
                        if let Some(element) = element {
                            element.apply_html_comment(comment);
                        }
                    }
                    inline.scanned = Some(Arc::new(scanned_inline));
                }
                Err(AnalysisError::WarningCarrying(warning)) => {
                    trace!(url = %parsed.url, code = %warning.code, "inline document failed");
                    warnings.push(*warning);
                }
                Err(AnalysisError::NoKnownParser { kind, .. }) => {
                    warn!(url = %parsed.url, kind = %kind, "no parser for inline document");
                }
                Err(error) => return Err(error),
            }
        }

        Ok(ScannedDocument {
            document: parsed,
            features,
            warnings,
        })
    }
}

impl DocumentResolver for AnalysisContext {
    fn resolve_url(&self, url: &str, base: &ResolvedUrl) -> ResolvedUrl {
        AnalysisContext::resolve_url(self, url, Some(base))
    }

    fn get_document(&self, url: &ResolvedUrl) -> Result<Arc<Document>, Warning> {
        AnalysisContext::get_document(self, url)
    }
}

/// Parser type for a URL, taken from its extension.
fn document_type(url: &ResolvedUrl) -> &str {
    match url.extension() {
        "htm" => "html",
        extension => extension,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::InMemoryUrlLoader;
    use crate::resolver::PackageUrlResolver;

    fn context(files: &[(&str, &str)]) -> (AnalysisContext, InMemoryUrlLoader) {
        let loader = InMemoryUrlLoader::with_files(files.iter().copied());
        let context = AnalysisContext::new(
            ParserRegistry::with_defaults(),
            ScannerRegistry::with_defaults(),
            Arc::new(loader.clone()),
            Arc::new(PackageUrlResolver::new()),
        );
        (context, loader)
    }

    #[tokio::test]
    async fn load_refuses_unknown_urls() {
        let (context, _) = context(&[]);
        let error = context
            .load(&ResolvedUrl::new("missing.html"))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Can't load URL: missing.html");
    }

    #[tokio::test]
    async fn unknown_extensions_have_no_parser() {
        let (context, _) = context(&[("notes.txt", "hello")]);
        let error = context
            .scan(&ResolvedUrl::new("notes.txt"))
            .await
            .unwrap_err();
        assert!(matches!(*error, AnalysisError::NoKnownParser { .. }));
    }

    #[tokio::test]
    async fn inline_syntax_errors_become_container_warnings() {
        let (context, _) = context(&[(
            "index.html",
            "<script>var x = ;</script>\n<my-el></my-el>",
        )]);
        let context = context.analyze(&["index.html"]).await;
        let document = context.get_document(&ResolvedUrl::new("index.html")).unwrap();
        let warnings = document.get_warnings(Default::default());
        assert!(warnings.iter().any(|w| w.code == "parse-error"));
    }

    #[tokio::test]
    async fn analyze_resolves_every_scanned_root() {
        let (context, _) = context(&[
            ("a.html", "<link rel=\"import\" href=\"b.html\">"),
            ("b.html", "<script>Polymer({is: 'b-el'});</script>"),
            ("broken.txt", ""),
        ]);
        let analyzed = context.analyze(&["a.html", "broken.txt"]).await;

        let resolved = analyzed.cache().analyzed.lock();
        for url in ["a.html", "b.html"] {
            let document = &resolved[&ResolvedUrl::new(url)];
            assert!(document.is_resolved(), "{url}");
        }
        assert!(!resolved.contains_key(&ResolvedUrl::new("broken.txt")));
    }

    #[tokio::test]
    async fn generations_increase() {
        let (context, _) = context(&[("a.html", "")]);
        let analyzed = context.analyze(&["a.html"]).await;
        let changed = analyzed.files_changed(&["a.html"]);
        let cleared = changed.clear_caches();
        assert_eq!(context.generation(), 0);
        assert_eq!(analyzed.generation(), 1);
        assert_eq!(changed.generation(), 2);
        assert_eq!(cleared.generation(), 3);
    }

    #[test]
    fn document_types_come_from_extensions() {
        assert_eq!(document_type(&ResolvedUrl::new("a/b.html")), "html");
        assert_eq!(document_type(&ResolvedUrl::new("a/b.htm")), "html");
        assert_eq!(document_type(&ResolvedUrl::new("x.mjs")), "mjs");
        assert_eq!(document_type(&ResolvedUrl::new("README")), "");
    }
}
