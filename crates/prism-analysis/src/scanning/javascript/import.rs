use std::sync::Arc;

use crate::model::{ImportKind, ScannedFeature, ScannedImport, Severity, Warning};
use crate::parser::ParsedDocument;
use crate::parser::js_ast::{JsNode, JsNodeKind};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

/// Static imports, `export ... from` and dynamic `import()`.
///
/// Bare module specifiers (`import 'lodash'`) are skipped: only path-like
/// specifiers can be followed without a module resolution algorithm.
/// Dynamic imports are lazy.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScriptImportScanner;

impl Scanner<JsNode> for JavaScriptImportScanner {
    fn name(&self) -> &'static str {
        "javascript-import"
    }

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<JsNode> + 'd> {
        Box::new(Visitor {
            document,
            result: ScanResult::default(),
        })
    }
}

struct Visitor<'d> {
    document: &'d ParsedDocument,
    result: ScanResult,
}

fn is_path_specifier(specifier: &str) -> bool {
    specifier.starts_with('/')
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.contains("://")
}

impl ScanVisitor<JsNode> for Visitor<'_> {
    fn enter(&mut self, node: &JsNode) -> VisitControl {
        let JsNodeKind::Import {
            source,
            source_span,
            dynamic,
        } = &node.kind
        else {
            return VisitControl::Continue;
        };

        let Some(source) = source else {
            self.result.warnings.push(Warning::new(
                "non-literal-import",
                "Cannot analyze dynamic imports with non-literal arguments",
                Severity::Warning,
                self.document.source_range(node.span),
            ));
            return VisitControl::Continue;
        };
        if !is_path_specifier(source) {
            return VisitControl::Continue;
        }

        let import = ScannedImport::new(
            ImportKind::JsImport,
            source.clone(),
            self.document.source_range(node.span),
            self.document.source_range(*source_span),
            *dynamic,
        );
        self.result.features.push(ScannedFeature::Import(Arc::new(import)));
        VisitControl::Continue
    }

    fn finish(self: Box<Self>) -> ScanResult {
        self.result
    }
}
