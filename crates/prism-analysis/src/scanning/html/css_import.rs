use std::sync::Arc;

use crate::model::{ImportKind, ScannedFeature};
use crate::parser::{HtmlNode, ParsedDocument};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::{base_href, has_rel, import_from_attribute};

/// `<link rel="import" type="css">` inside a `<dom-module>`: Polymer's
/// shared-style import.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssImportScanner;

impl Scanner<HtmlNode> for CssImportScanner {
    fn name(&self) -> &'static str {
        "css-import"
    }

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<HtmlNode> + 'd> {
        Box::new(Visitor {
            document,
            base: base_href(document),
            dom_module_depth: 0,
            result: ScanResult::default(),
        })
    }
}

struct Visitor<'d> {
    document: &'d ParsedDocument,
    base: Option<String>,
    dom_module_depth: usize,
    result: ScanResult,
}

impl ScanVisitor<HtmlNode> for Visitor<'_> {
    fn enter(&mut self, node: &HtmlNode) -> VisitControl {
        let Some(element) = node.element() else {
            return VisitControl::Continue;
        };
        if element.tag == "dom-module" {
            self.dom_module_depth += 1;
            return VisitControl::Continue;
        }
        if self.dom_module_depth == 0
            || element.tag != "link"
            || !has_rel(element.attr("rel"), "import")
            || element.attr("type") != Some("css")
        {
            return VisitControl::Continue;
        }
        if let Some(href) = element.attribute("href") {
            let import = import_from_attribute(
                self.document,
                self.base.as_deref(),
                ImportKind::CssImport,
                node,
                href,
                false,
            );
            self.result.features.push(ScannedFeature::Import(Arc::new(import)));
        }
        VisitControl::Continue
    }

    fn leave(&mut self, node: &HtmlNode) {
        if node.is_tag("dom-module") {
            self.dom_module_depth = self.dom_module_depth.saturating_sub(1);
        }
    }

    fn finish(self: Box<Self>) -> ScanResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::test_support::scan_html;

    #[test]
    fn only_imports_inside_dom_modules() {
        let result = scan_html(
            &CssImportScanner,
            r#"<link rel="import" type="css" href="outside.css">
<dom-module id="x-a">
  <link rel="import" type="css" href="inside.css">
  <template></template>
</dom-module>"#,
        );
        assert_eq!(result.features.len(), 1);
        let ScannedFeature::Import(import) = &result.features[0] else {
            panic!("expected an import");
        };
        assert_eq!(import.kind, ImportKind::CssImport);
        assert_eq!(import.url, "inside.css");
    }
}
