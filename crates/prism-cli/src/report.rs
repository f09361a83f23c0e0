//! Warning reports for `prism analyze`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use prism_analysis::Analysis;
use prism_analysis::model::{Warning, WarningQuery, is_external};
use serde::Serialize;

use crate::ui;

/// Warnings of one analysis, grouped by the file they point into.
#[derive(Debug, Serialize)]
pub struct WarningReport {
    pub documents: usize,
    pub errors: usize,
    pub warnings: usize,
    pub files: Vec<FileWarnings>,
}

#[derive(Debug, Serialize)]
pub struct FileWarnings {
    pub url: String,
    pub warnings: Vec<Warning>,
}

impl WarningReport {
    /// Collect the warnings of every requested document and its imports.
    ///
    /// Warnings located in `bower_components/` or `node_modules/` are left
    /// out unless `external_packages` is set.
    pub fn new(analysis: &Analysis, external_packages: bool) -> Self {
        let mut by_file: BTreeMap<String, Vec<Warning>> = BTreeMap::new();
        for warning in analysis.get_warnings(WarningQuery { imported: true }) {
            if !external_packages && is_external(&warning.source_range.file) {
                continue;
            }
            by_file
                .entry(warning.source_range.file.as_str().to_string())
                .or_default()
                .push(warning);
        }

        let mut errors = 0;
        let mut warnings = 0;
        let files = by_file
            .into_iter()
            .map(|(url, mut found)| {
                found.sort_by(|a, b| a.source_range.start.cmp(&b.source_range.start));
                errors += found.iter().filter(|w| w.is_error()).count();
                warnings += found.iter().filter(|w| !w.is_error()).count();
                FileWarnings {
                    url,
                    warnings: found,
                }
            })
            .collect();

        Self {
            documents: analysis.urls().len(),
            errors,
            warnings,
            files,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            let _ = writeln!(out, "{}", console::style(&file.url).bold().underlined());
            for warning in &file.warnings {
                let start = &warning.source_range.start;
                let _ = writeln!(
                    out,
                    "  {:>4}:{:<3} {} {}  {}",
                    start.line + 1,
                    start.column + 1,
                    ui::severity(warning.severity),
                    console::style(&warning.code).dim(),
                    warning.message
                );
            }
            out.push('\n');
        }
        out
    }

    pub fn summary(&self) -> String {
        format!(
            "Analyzed {} document(s): {} error(s), {} warning(s)",
            self.documents, self.errors, self.warnings
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use prism_analysis::{Analyzer, InMemoryUrlLoader};

    use super::*;

    async fn analysis(files: &[(&str, &str)], urls: &[&str]) -> Analysis {
        let loader = InMemoryUrlLoader::with_files(files.iter().copied());
        Analyzer::new().loader(Arc::new(loader)).analyze(urls).await
    }

    #[tokio::test]
    async fn groups_warnings_by_file() {
        let analysis = analysis(
            &[
                ("app.html", "<link rel=\"import\" href=\"gone.html\">\n<script>Polymer({is: 'x-a', behaviors: [Nope]});</script>"),
            ],
            &["app.html"],
        )
        .await;
        let report = WarningReport::new(&analysis, false);

        assert_eq!(report.documents, 1);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].url, "app.html");
        assert_eq!(report.errors, 1);
        assert_eq!(report.warnings, 1);
        assert!(report.has_errors());

        console::set_colors_enabled(false);
        let text = report.render_text();
        assert!(text.starts_with("app.html\n"));
        assert!(text.contains("could-not-load"));
        assert!(text.contains("unknown-polymer-behavior"));
    }

    #[tokio::test]
    async fn skips_external_packages_unless_asked() {
        let files = [
            ("app.html", "<link rel=\"import\" href=\"node_modules/dep/dep.html\">"),
            ("node_modules/dep/dep.html", "<script>Polymer({is: 'dep-el', behaviors: [Nope]});</script>"),
        ];
        let analysis = analysis(&files, &["app.html"]).await;

        let report = WarningReport::new(&analysis, false);
        assert!(report.files.is_empty());
        assert!(!report.has_errors());

        let report = WarningReport::new(&analysis, true);
        assert_eq!(report.files[0].url, "node_modules/dep/dep.html");
        assert_eq!(report.warnings, 1);
    }
}
