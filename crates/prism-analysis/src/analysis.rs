//! The result of analyzing a set of URLs.

use std::sync::Arc;

use prism_graph::ResolvedUrl;

use crate::engine::AnalysisContext;
use crate::model::{Document, Feature, FeatureQuery, Warning, WarningQuery};

/// An immutable view of the documents requested from one
/// [`Analyzer::analyze`](crate::Analyzer::analyze) call.
///
/// Later analyses never change what an `Analysis` reports.
#[derive(Debug, Clone)]
pub struct Analysis {
    context: AnalysisContext,
    urls: Vec<ResolvedUrl>,
}

impl Analysis {
    pub(crate) fn new(context: AnalysisContext, urls: Vec<ResolvedUrl>) -> Self {
        Self { context, urls }
    }

    /// The requested URLs, resolved.
    pub fn urls(&self) -> &[ResolvedUrl] {
        &self.urls
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.context
    }

    /// The resolved document for `url`, or the warning explaining why there
    /// is none.
    pub fn get_document(&self, url: &str) -> Result<Arc<Document>, Warning> {
        let url = self.context.resolve_url(url, None);
        self.context.get_document(&url)
    }

    /// Every requested document that could be analyzed.
    pub fn documents(&self) -> Vec<Arc<Document>> {
        self.urls
            .iter()
            .filter_map(|url| self.context.get_document(url).ok())
            .collect()
    }

    /// Features matching `query` across all requested documents, each at most
    /// once.
    pub fn get_features(&self, query: &FeatureQuery) -> Vec<Feature> {
        let mut found: Vec<Feature> = Vec::new();
        for document in self.documents() {
            for feature in document.get_features(query) {
                if !found.iter().any(|seen| seen.ptr_eq(&feature)) {
                    found.push(feature);
                }
            }
        }
        found
    }

    /// Warnings of the requested documents, including the warnings for
    /// documents that could not be analyzed at all.
    pub fn get_warnings(&self, query: WarningQuery) -> Vec<Warning> {
        let mut warnings: Vec<Warning> = Vec::new();
        for url in &self.urls {
            let found = match self.context.get_document(url) {
                Ok(document) => document.get_warnings(query),
                Err(warning) => vec![warning],
            };
            for warning in found {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
        }
        warnings
    }
}
