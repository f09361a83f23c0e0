//! # prism-analysis
//!
//! Incremental static analysis of web component sources.
//!
//! Prism reads HTML, JavaScript, CSS and JSON files, finds the web component
//! features they declare (custom elements, Polymer elements, behaviors,
//! mixins, classes, namespaces, functions, dom-modules, imports, CSS custom
//! properties) and links them across files.
//!
//! ## Pipeline
//!
//! ```text
//!  UrlLoader ──▶ ParserRegistry ──▶ ScannerRegistry ──▶ ScannedDocument
//!                                                           │
//!                      imports scanned concurrently ◀───────┤
//!                                                           ▼
//!                                     Document::resolve ──▶ Feature
//! ```
//!
//! Results are cached per generation. Telling the analyzer that files
//! changed starts a new generation that keeps every result not affected by
//! the change; an [`Analysis`] taken earlier keeps reporting what it saw.
//!
//! ## Quick Start
//!
//! ```no_run
//! use prism_analysis::Analyzer;
//! use prism_analysis::model::{FeatureKind, FeatureQuery, WarningQuery};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let analyzer = Analyzer::new().root("./my-elements");
//! let analysis = analyzer.analyze(&["my-app.html"]).await;
//!
//! for warning in analysis.get_warnings(WarningQuery { imported: true }) {
//!     println!("{warning}");
//! }
//! let elements = analysis.get_features(&FeatureQuery::kind(FeatureKind::Element).imported(true));
//! println!("{} elements", elements.len());
//! # }
//! ```

pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod scanning;

pub use analysis::Analysis;
pub use analyzer::{Analyzer, Configured, Unconfigured};
pub use config::AnalyzerOptions;
pub use engine::AnalysisContext;
pub use error::{AnalysisError, LoadError, Result, SharedError};
pub use loader::{FsUrlLoader, InMemoryUrlLoader, UrlLoader};
pub use resolver::{IdentityResolver, PackageUrlResolver, UrlResolver};

pub use prism_graph::{DependencyGraph, ResolvedUrl};
