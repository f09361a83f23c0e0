use std::sync::Arc;

use crate::model::{ImportKind, ScannedFeature};
use crate::parser::{HtmlNode, ParsedDocument};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::{base_href, has_rel, import_from_attribute};

/// `<link rel="import">` and `<link rel="lazy-import">`.
///
/// Stylesheet imports (`type="css"`) are left to the style and CSS import
/// scanners.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlImportScanner;

impl Scanner<HtmlNode> for HtmlImportScanner {
    fn name(&self) -> &'static str {
        "html-import"
    }

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<HtmlNode> + 'd> {
        Box::new(Visitor {
            document,
            base: base_href(document),
            result: ScanResult::default(),
        })
    }
}

struct Visitor<'d> {
    document: &'d ParsedDocument,
    base: Option<String>,
    result: ScanResult,
}

impl ScanVisitor<HtmlNode> for Visitor<'_> {
    fn enter(&mut self, node: &HtmlNode) -> VisitControl {
        let Some(element) = node.element() else {
            return VisitControl::Continue;
        };
        if element.tag != "link" || element.attr("type") == Some("css") {
            return VisitControl::Continue;
        }

        let rel = element.attr("rel");
        let lazy = has_rel(rel, "lazy-import");
        if !lazy && !has_rel(rel, "import") {
            return VisitControl::Continue;
        }
        if let Some(href) = element.attribute("href") {
            let import = import_from_attribute(
                self.document,
                self.base.as_deref(),
                ImportKind::HtmlImport,
                node,
                href,
                lazy,
            );
            self.result.features.push(ScannedFeature::Import(Arc::new(import)));
        }
        VisitControl::Continue
    }

    fn finish(self: Box<Self>) -> ScanResult {
        self.result
    }
}
