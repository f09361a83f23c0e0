//! Shared test utilities for analysis tests.

// Test fixtures are written with std::fs directly
#![allow(clippy::disallowed_methods)]
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use prism_analysis::model::{Document, Feature, FeatureKind, FeatureQuery};
use prism_analysis::{
    AnalysisContext, Analyzer, Configured, InMemoryUrlLoader, PackageUrlResolver, ResolvedUrl,
};
use prism_analysis::parser::ParserRegistry;
use prism_analysis::scanning::ScannerRegistry;
use tempfile::TempDir;

/// Create a test project with the given `(path, content)` files and return
/// its root.
pub fn create_test_project(temp: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = temp.path().to_path_buf();

    for (path, content) in files {
        let file_path = root.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("Failed to create parent directory for {path}: {e}"));
        }
        fs::write(&file_path, content).unwrap_or_else(|e| panic!("Failed to write {path}: {e}"));
    }

    root
}

/// An in-memory loader holding `files`.
pub fn memory_loader(files: &[(&str, &str)]) -> InMemoryUrlLoader {
    InMemoryUrlLoader::with_files(files.iter().copied())
}

/// A fresh context over an in-memory package.
pub fn memory_context(files: &[(&str, &str)]) -> (AnalysisContext, InMemoryUrlLoader) {
    let loader = memory_loader(files);
    let context = AnalysisContext::new(
        ParserRegistry::with_defaults(),
        ScannerRegistry::with_defaults(),
        Arc::new(loader.clone()),
        Arc::new(PackageUrlResolver::new()),
    );
    (context, loader)
}

/// An analyzer over an in-memory package.
pub fn memory_analyzer(files: &[(&str, &str)]) -> (Analyzer<Configured>, InMemoryUrlLoader) {
    let loader = memory_loader(files);
    let analyzer = Analyzer::new().loader(Arc::new(loader.clone()));
    (analyzer, loader)
}

pub fn url(s: &str) -> ResolvedUrl {
    ResolvedUrl::new(s)
}

/// Analyze `file` in `context` and return the resolved document.
pub async fn analyzed_document(context: &AnalysisContext, file: &str) -> (AnalysisContext, Arc<Document>) {
    let context = context.analyze(&[file]).await;
    let document = context
        .get_document(&url(file))
        .unwrap_or_else(|warning| panic!("{file} was not analyzed: {warning}"));
    (context, document)
}

/// Features of `kind` in `document` and everything it imports.
pub fn features_of(document: &Document, kind: FeatureKind) -> Vec<Feature> {
    document.get_features(&FeatureQuery::kind(kind).imported(true))
}

pub fn warning_codes(document: &Document) -> Vec<String> {
    document
        .get_warnings(prism_analysis::model::WarningQuery { imported: true })
        .into_iter()
        .map(|warning| warning.code)
        .collect()
}
