//! Long-lived analysis API.
//!
//! The [`Analyzer`] owns the current [`AnalysisContext`] and serializes the
//! operations that move it to a new generation, so callers can keep
//! analyzing while files change underneath them.

use std::path::PathBuf;
use std::sync::Arc;

use prism_graph::ResolvedUrl;
use tokio::sync::Mutex;
use tracing::debug;

use crate::analysis::Analysis;
use crate::config::AnalyzerOptions;
use crate::engine::AnalysisContext;
use crate::error::Result;
use crate::loader::UrlLoader;
use crate::parser::ParserRegistry;
use crate::resolver::{PackageUrlResolver, UrlResolver};
use crate::scanning::ScannerRegistry;

/// Typestate for an analyzer that has nowhere to load files from yet.
#[derive(Debug)]
pub struct Unconfigured {
    parsers: ParserRegistry,
    scanners: ScannerRegistry,
    resolver: Arc<dyn UrlResolver>,
}

impl Default for Unconfigured {
    fn default() -> Self {
        Self {
            parsers: ParserRegistry::with_defaults(),
            scanners: ScannerRegistry::with_defaults(),
            resolver: Arc::new(PackageUrlResolver::new()),
        }
    }
}

/// Typestate for an analyzer with a loader. Holds the current generation.
#[derive(Debug)]
pub struct Configured {
    context: Mutex<AnalysisContext>,
}

/// Analyzes web component packages.
///
/// Configuration happens on `Analyzer<Unconfigured>`; choosing where files
/// come from with [`root`](Analyzer::root) or [`loader`](Analyzer::loader)
/// moves it to `Analyzer<Configured>`, which is the only state that can
/// analyze.
///
/// # Example
///
/// ```rust,no_run
/// use prism_analysis::Analyzer;
/// use prism_analysis::model::{FeatureKind, FeatureQuery};
///
/// # async fn example() {
/// let analyzer = Analyzer::new().root("./my-elements");
/// let analysis = analyzer.analyze(&["index.html"]).await;
///
/// for element in analysis.get_features(&FeatureQuery::kind(FeatureKind::Element)) {
///     println!("{:?}", element.name());
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct Analyzer<State = Unconfigured> {
    options: AnalyzerOptions,
    state: State,
}

impl Default for Analyzer<Unconfigured> {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer<Unconfigured> {
    /// An analyzer with the default parsers, scanners and package resolver.
    pub fn new() -> Self {
        Self::with_options(AnalyzerOptions::default())
    }

    pub fn with_options(options: AnalyzerOptions) -> Self {
        Self {
            options,
            state: Unconfigured::default(),
        }
    }

    pub fn parsers(mut self, parsers: ParserRegistry) -> Self {
        self.state.parsers = parsers;
        self
    }

    pub fn scanners(mut self, scanners: ScannerRegistry) -> Self {
        self.state.scanners = scanners;
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn UrlResolver>) -> Self {
        self.state.resolver = resolver;
        self
    }

    /// Directory names skipped by [`analyze_package`](Analyzer::analyze_package).
    pub fn excluded_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.excluded_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Refuse to load files larger than `bytes` (filesystem loader only).
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.options.max_file_size = bytes;
        self
    }

    /// Load files from the package directory `root`.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Analyzer<Configured> {
        self.options.root = root.into();
        let loader = Arc::new(self.options.fs_loader());
        self.loader(loader)
    }

    /// Load files through `loader`.
    pub fn loader(self, loader: Arc<dyn UrlLoader>) -> Analyzer<Configured> {
        let Unconfigured {
            parsers,
            scanners,
            resolver,
        } = self.state;
        let context = AnalysisContext::new(parsers, scanners, loader, resolver);
        Analyzer {
            options: self.options,
            state: Configured {
                context: Mutex::new(context),
            },
        }
    }
}

impl<State> Analyzer<State> {
    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }
}

impl Analyzer<Configured> {
    /// The current generation.
    pub async fn context(&self) -> AnalysisContext {
        self.state.context.lock().await.clone()
    }

    /// Analyze `urls` and everything they import.
    ///
    /// Waits for any analysis already in progress. Documents that were
    /// already analyzed and have not changed are reused.
    pub async fn analyze<S: AsRef<str>>(&self, urls: &[S]) -> Analysis {
        let mut current = self.state.context.lock().await;
        let next = current.analyze(urls).await;
        let resolved: Vec<ResolvedUrl> = urls
            .iter()
            .map(|url| next.resolve_url(url.as_ref(), None))
            .collect();
        *current = next.clone();
        Analysis::new(next, resolved)
    }

    /// Analyze every `.html` and `.js` file the loader can list, outside the
    /// excluded directories.
    pub async fn analyze_package(&self) -> Result<Analysis> {
        let loader = Arc::clone(self.context().await.loader());
        let urls: Vec<ResolvedUrl> = loader
            .list(&self.options.excluded_dirs)
            .await?
            .into_iter()
            .filter(|url| matches!(url.extension(), "html" | "js"))
            .collect();
        debug!(files = urls.len(), "analyzing package");

        let urls: Vec<&str> = urls.iter().map(ResolvedUrl::as_str).collect();
        Ok(self.analyze(urls.as_slice()).await)
    }

    /// Forget what is known about `urls` and everything importing them.
    pub async fn files_changed<S: AsRef<str>>(&self, urls: &[S]) {
        let mut current = self.state.context.lock().await;
        *current = current.files_changed(urls);
    }

    /// Drop every cached result.
    pub async fn clear_caches(&self) {
        let mut current = self.state.context.lock().await;
        *current = current.clear_caches();
    }
}
