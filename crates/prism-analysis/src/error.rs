//! Error types for the analysis pipeline.
//!
//! Two layers of failure exist:
//!
//! - [`AnalysisError`] aborts one load/parse/scan step for one URL. It is
//!   cached (as a rejected future) for the rest of the cache generation.
//! - [`Warning`](crate::model::Warning) values are recoverable problems that
//!   stay attached to documents. [`AnalysisError::WarningCarrying`] bridges the
//!   two: a parser or scanner may fail with a ready-made warning, and callers
//!   that can recover turn it back into a plain warning.

use std::sync::Arc;

use prism_graph::{GraphError, ResolvedUrl};
use thiserror::Error;

use crate::model::Warning;

/// Result type used throughout the pipeline.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Memoized futures share their error, so the pipeline passes errors as `Arc`.
pub type SharedError = Arc<AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No parser is registered for this document type.
    #[error("No parser for file type {kind} (url: {url})")]
    NoKnownParser { kind: String, url: ResolvedUrl },

    /// A parser failed unexpectedly.
    #[error("Error parsing {url}:\n {message}")]
    Parse { url: ResolvedUrl, message: String },

    /// An expected, position-anchored problem.
    #[error("{0}")]
    WarningCarrying(Box<Warning>),

    /// The loader refuses to load this URL.
    #[error("Can't load URL: {0}")]
    CannotLoad(ResolvedUrl),

    /// The loader accepted the URL but failed to produce its contents.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Waiting on the dependency graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A background task panicked or was cancelled.
    #[error("analysis task failed: {0}")]
    Task(String),
}

impl AnalysisError {
    pub fn warning(warning: Warning) -> Self {
        AnalysisError::WarningCarrying(Box::new(warning))
    }

    /// The carried warning, if this is a recoverable failure.
    pub fn as_warning(&self) -> Option<&Warning> {
        match self {
            AnalysisError::WarningCarrying(warning) => Some(warning),
            _ => None,
        }
    }
}

/// Errors produced by [`UrlLoader`](crate::loader::UrlLoader) implementations.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(ResolvedUrl),

    #[error("Failed to read {url}: {message}")]
    Io { url: ResolvedUrl, message: String },

    #[error("File {url} is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge {
        url: ResolvedUrl,
        size: u64,
        limit: u64,
    },

    #[error("File {0} is not valid UTF-8")]
    InvalidUtf8(ResolvedUrl),

    #[error("Loader error: {0}")]
    Other(String),
}
