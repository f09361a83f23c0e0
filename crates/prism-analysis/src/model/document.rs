//! Scanned and resolved documents.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use prism_graph::ResolvedUrl;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use serde::ser::SerializeStruct;
use tracing::trace;

use super::resolve::{DocumentResolver, ResolutionScope};
use super::{Feature, FeatureKind, ScannedFeature, ScannedImport, SourceRange, Warning};
use crate::parser::ParsedDocument;

/// The output of scanning one parsed document.
#[derive(Debug)]
pub struct ScannedDocument {
    pub document: Arc<ParsedDocument>,
    pub features: Vec<ScannedFeature>,
    pub warnings: Vec<Warning>,
}

impl ScannedDocument {
    pub fn url(&self) -> &ResolvedUrl {
        &self.document.url
    }

    pub fn is_inline(&self) -> bool {
        self.document.is_inline()
    }

    /// Features of this document and of every nested inline document, in
    /// order.
    pub fn nested_features(&self) -> Vec<&ScannedFeature> {
        let mut out = Vec::new();
        self.collect_nested(&mut out);
        out
    }

    fn collect_nested<'a>(&'a self, out: &mut Vec<&'a ScannedFeature>) {
        for feature in &self.features {
            out.push(feature);
            if let ScannedFeature::InlineDocument(inline) = feature {
                if let Some(scanned) = &inline.scanned {
                    scanned.collect_nested(out);
                }
            }
        }
    }

    /// Every import, including those found in inline documents.
    pub fn imports(&self) -> Vec<Arc<ScannedImport>> {
        self.nested_features()
            .into_iter()
            .filter_map(|feature| match feature {
                ScannedFeature::Import(import) => Some(Arc::clone(import)),
                _ => None,
            })
            .collect()
    }
}

/// Filter for [`Document::get_features`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureQuery {
    pub kind: Option<FeatureKind>,
    pub id: Option<String>,
    /// Also search transitively imported documents.
    pub imported: bool,
    /// Allow crossing into `bower_components/` or `node_modules/`.
    pub external_packages: bool,
}

impl FeatureQuery {
    /// Every feature of this document.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn kind(kind: FeatureKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn imported(mut self, imported: bool) -> Self {
        self.imported = imported;
        self
    }

    pub fn external_packages(mut self, external_packages: bool) -> Self {
        self.external_packages = external_packages;
        self
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        self.kind.is_none_or(|kind| feature.has_kind(kind))
            && self
                .id
                .as_deref()
                .is_none_or(|id| feature.identifiers().contains(&id))
    }
}

/// Filter for [`Document::get_warnings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarningQuery {
    pub imported: bool,
}

/// Whether a URL lives inside a third-party package directory.
pub fn is_external(url: &ResolvedUrl) -> bool {
    url.as_str()
        .split('/')
        .any(|segment| segment == "bower_components" || segment == "node_modules")
}

/// A resolved, queryable document.
///
/// Built at most once per cache generation from a [`ScannedDocument`] and
/// immutable once resolution finished. While it is being resolved, each
/// feature is published as soon as it exists, so a document reached again
/// through an import cycle already shows what was declared before the
/// import.
#[derive(Debug)]
pub struct Document {
    scanned: Arc<ScannedDocument>,
    source_range: Option<SourceRange>,
    started: AtomicBool,
    features: RwLock<Vec<Feature>>,
    /// Set once resolution finished.
    warnings: OnceLock<Vec<Warning>>,
}

impl Document {
    pub(crate) fn new(scanned: Arc<ScannedDocument>) -> Self {
        Self::with_range(scanned, None)
    }

    fn inline(scanned: Arc<ScannedDocument>, source_range: SourceRange) -> Self {
        Self::with_range(scanned, Some(source_range))
    }

    fn with_range(scanned: Arc<ScannedDocument>, source_range: Option<SourceRange>) -> Self {
        Self {
            started: AtomicBool::new(false),
            features: RwLock::new(Vec::with_capacity(scanned.features.len())),
            warnings: OnceLock::new(),
            scanned,
            source_range,
        }
    }

    pub fn url(&self) -> &ResolvedUrl {
        self.scanned.url()
    }

    /// Parser type: `html`, `js`, `css` or `json`.
    pub fn kind(&self) -> &str {
        &self.scanned.document.kind
    }

    pub fn is_inline(&self) -> bool {
        self.scanned.is_inline()
    }

    pub fn parsed(&self) -> &Arc<ParsedDocument> {
        &self.scanned.document
    }

    pub fn scanned(&self) -> &Arc<ScannedDocument> {
        &self.scanned
    }

    /// Range in the container for inline documents.
    pub fn source_range(&self) -> Option<&SourceRange> {
        self.source_range.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.warnings.get().is_some()
    }

    /// Features declared directly in this document, inline documents
    /// included as [`Feature::Document`].
    ///
    /// During resolution this is the prefix published so far.
    pub fn local_features(&self) -> Vec<Feature> {
        self.features.read().clone()
    }

    fn publish(&self, feature: Feature) {
        self.features.write().push(feature);
    }

    /// Resolve a top-level document. Calling this again is a no-op.
    pub(crate) fn resolve(&self, resolver: &dyn DocumentResolver) {
        if self.is_resolved() {
            return;
        }
        let mut scope = ResolutionScope::new(resolver, self.url().clone());
        self.resolve_in(&mut scope);
    }

    /// Only the first call does the work. A later caller, an import cycle
    /// or another thread, sees the features published so far.
    fn resolve_in(&self, scope: &mut ResolutionScope<'_>) {
        if self.started.swap(true, Ordering::AcqRel) {
            return;
        }
        let outer_warnings = scope.take_warnings();

        // Dom-modules depend on nothing, so they are made visible up front
        // and an element finds its module wherever the scanners listed it.
        let mut dom_modules: FxHashMap<usize, Feature> = self
            .scanned
            .features
            .iter()
            .enumerate()
            .filter(|(_, scanned)| matches!(scanned, ScannedFeature::DomModule(_)))
            .filter_map(|(index, scanned)| {
                let feature = scanned.resolve(scope)?;
                scope.push_visible(feature.clone());
                Some((index, feature))
            })
            .collect();

        for (index, scanned) in self.scanned.features.iter().enumerate() {
            if let Some(feature) = dom_modules.remove(&index) {
                self.publish(feature);
                continue;
            }
            if let ScannedFeature::InlineDocument(inline) = scanned {
                if let Some(inline_scanned) = &inline.scanned {
                    let document = Arc::new(Document::inline(
                        Arc::clone(inline_scanned),
                        inline.source_range.clone(),
                    ));
                    self.publish(Feature::Document(Arc::clone(&document)));
                    document.resolve_in(scope);
                }
                continue;
            }

            if let Some(feature) = scanned.resolve(scope) {
                scope.push_visible(feature.clone());
                self.publish(feature);
            }
        }

        let mut warnings = self.scanned.warnings.clone();
        warnings.extend(scope.take_warnings());
        scope.restore_warnings(outer_warnings);

        trace!(url = %self.url(), features = self.features.read().len(), "document resolved");
        let _ = self.warnings.set(warnings);
    }

    /// Query features of this document, its inline documents and, when
    /// `query.imported` is set, everything it transitively imports.
    ///
    /// Results are in declaration order, each feature at most once.
    pub fn get_features(&self, query: &FeatureQuery) -> Vec<Feature> {
        let mut visited = FxHashSet::default();
        let mut found = Vec::new();
        self.collect_features(query, &mut visited, &mut found);
        found
    }

    pub(crate) fn collect_features(
        &self,
        query: &FeatureQuery,
        visited: &mut FxHashSet<*const Document>,
        found: &mut Vec<Feature>,
    ) {
        if !visited.insert(std::ptr::from_ref(self)) {
            return;
        }
        for feature in self.local_features() {
            if query.matches(&feature) {
                found.push(feature.clone());
            }
            match feature {
                Feature::Document(inline) => inline.collect_features(query, visited, found),
                Feature::Import(import) if query.imported => {
                    let document = import.document();
                    if query.external_packages || !is_external(document.url()) {
                        document.collect_features(query, visited, found);
                    }
                }
                _ => {}
            }
        }
    }

    /// Warnings of this document and its features, optionally including
    /// those of transitively imported documents.
    pub fn get_warnings(&self, query: WarningQuery) -> Vec<Warning> {
        let mut visited = FxHashSet::default();
        let mut warnings = Vec::new();
        self.collect_warnings(query, &mut visited, &mut warnings);
        warnings
    }

    fn collect_warnings(
        &self,
        query: WarningQuery,
        visited: &mut FxHashSet<*const Document>,
        warnings: &mut Vec<Warning>,
    ) {
        if !visited.insert(std::ptr::from_ref(self)) {
            return;
        }
        let Some(own) = self.warnings.get() else {
            return;
        };
        warnings.extend(own.iter().cloned());
        for feature in self.local_features() {
            warnings.extend(feature.warnings().iter().cloned());
            match &feature {
                Feature::Document(inline) => inline.collect_warnings(query, visited, warnings),
                Feature::Import(import) if query.imported => {
                    import.document().collect_warnings(query, visited, warnings);
                }
                _ => {}
            }
        }
    }
}

impl Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Document", 3)?;
        state.serialize_field("url", self.url())?;
        state.serialize_field("type", self.kind())?;
        state.serialize_field("inline", &self.is_inline())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_urls_are_package_directories() {
        assert!(is_external(&ResolvedUrl::new("bower_components/paper/paper.html")));
        assert!(is_external(&ResolvedUrl::new("app/node_modules/x/index.js")));
        assert!(!is_external(&ResolvedUrl::new("src/my_node_modules.html")));
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = FeatureQuery::all();
        assert_eq!(query.kind, None);
        assert!(!query.imported);
    }
}
