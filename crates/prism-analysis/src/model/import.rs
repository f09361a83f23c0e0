use std::sync::{Arc, OnceLock};

use prism_graph::ResolvedUrl;
use serde::Serialize;

use super::resolve::ResolutionScope;
use super::{Document, Feature, FeatureKind, Severity, SourceRange, Warning};

/// The flavour of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// `<link rel="import">`
    HtmlImport,
    /// `<script src>`
    HtmlScript,
    /// `<link rel="stylesheet">`
    HtmlStyle,
    /// `import ... from`, `export ... from` and `import()`
    JsImport,
    /// `<link rel="import" type="css">` inside a dom-module
    CssImport,
}

impl ImportKind {
    pub fn feature_kind(self) -> FeatureKind {
        match self {
            ImportKind::HtmlImport => FeatureKind::HtmlImport,
            ImportKind::HtmlScript => FeatureKind::HtmlScript,
            ImportKind::HtmlStyle => FeatureKind::HtmlStyle,
            ImportKind::JsImport => FeatureKind::JsImport,
            ImportKind::CssImport => FeatureKind::CssImport,
        }
    }
}

/// An import as written in the source.
#[derive(Debug)]
pub struct ScannedImport {
    pub kind: ImportKind,
    /// The specifier as written, relative to the importing document.
    pub url: String,
    pub source_range: SourceRange,
    /// Range of the specifier text itself.
    pub url_source_range: SourceRange,
    pub lazy: bool,
    pub warnings: Vec<Warning>,
    error: OnceLock<String>,
}

impl ScannedImport {
    pub fn new(
        kind: ImportKind,
        url: impl Into<String>,
        source_range: SourceRange,
        url_source_range: SourceRange,
        lazy: bool,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            source_range,
            url_source_range,
            lazy,
            warnings: Vec::new(),
            error: OnceLock::new(),
        }
    }

    /// Why scanning the imported document failed, if it did.
    pub fn error(&self) -> Option<&str> {
        self.error.get().map(String::as_str)
    }

    /// Record a scan failure of the imported document. The first one sticks.
    pub fn set_error(&self, error: impl Into<String>) {
        let _ = self.error.set(error.into());
    }

    pub(crate) fn resolve(&self, scope: &mut ResolutionScope<'_>) -> Option<Feature> {
        let url = scope.resolve_url(&self.url);
        let document = match scope.document(&url) {
            Ok(document) => document,
            Err(warning) => {
                let reason = self.error().map_or(warning.message, str::to_string);
                scope.warn(Warning::new(
                    "could-not-load",
                    format!("Unable to load import: {reason}"),
                    Severity::Error,
                    self.url_source_range.clone(),
                ));
                return None;
            }
        };

        // Still being resolved further up the stack: an import cycle.
        let closes_cycle = !document.is_resolved();

        Some(Feature::Import(Arc::new(Import {
            kind: self.kind,
            url,
            original_url: self.url.clone(),
            source_range: self.source_range.clone(),
            url_source_range: self.url_source_range.clone(),
            lazy: self.lazy,
            warnings: self.warnings.clone(),
            document,
            closes_cycle,
        })))
    }
}

/// A resolved import.
///
/// The imported document is held strongly, cycle edges included, so any
/// document handed out keeps its whole import graph queryable. Documents of
/// one import cycle keep each other alive.
#[derive(Debug, Serialize)]
pub struct Import {
    pub kind: ImportKind,
    pub url: ResolvedUrl,
    pub original_url: String,
    pub source_range: SourceRange,
    pub url_source_range: SourceRange,
    pub lazy: bool,
    pub warnings: Vec<Warning>,
    #[serde(skip)]
    document: Arc<Document>,
    #[serde(skip)]
    closes_cycle: bool,
}

impl Import {
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Whether the imported document was still being resolved when this
    /// import was, i.e. the import closes a cycle.
    pub fn is_cycle_edge(&self) -> bool {
        self.closes_cycle
    }
}
