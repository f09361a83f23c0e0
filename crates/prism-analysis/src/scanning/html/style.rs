use std::sync::Arc;

use crate::model::{ImportKind, ScannedFeature, ScannedInlineDocument};
use crate::parser::{HtmlNode, ParsedDocument};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::{base_href, has_rel, import_from_attribute, location_offset};

/// External stylesheets and inline `<style>` bodies.
///
/// `<link rel="import" type="css">` outside a dom-module is the deprecated
/// spelling of a stylesheet link and is treated as one.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlStyleScanner;

impl Scanner<HtmlNode> for HtmlStyleScanner {
    fn name(&self) -> &'static str {
        "html-style"
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
        match element.tag.as_str() {
            "dom-module" => self.dom_module_depth += 1,
            "link" => {
                let rel = element.attr("rel");
                let stylesheet = has_rel(rel, "stylesheet")
                    || (self.dom_module_depth == 0
                        && has_rel(rel, "import")
                        && element.attr("type") == Some("css"));
                if let (true, Some(href)) = (stylesheet, element.attribute("href")) {
                    let import = import_from_attribute(
                        self.document,
                        self.base.as_deref(),
                        ImportKind::HtmlStyle,
                        node,
                        href,
                        false,
                    );
                    self.result.features.push(ScannedFeature::Import(Arc::new(import)));
                }
            }
            "style" => {
                if let Some(body) = element.raw_text {
                    self.result
                        .features
                        .push(ScannedFeature::InlineDocument(ScannedInlineDocument::new(
                            "css",
                            self.document.slice(body),
                            location_offset(self.document, body),
                            self.document.source_range(node.span),
                        )));
                }
                return VisitControl::SkipChildren;
            }
            _ => {}
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
    fn finds_linked_and_inline_styles() {
        let result = scan_html(
            &HtmlStyleScanner,
            r#"<link rel="stylesheet" href="a.css">
<link rel="import" type="css" href="b.css">
<dom-module id="x-a"><link rel="import" type="css" href="c.css"></dom-module>
<style>:root { --x: 1px; }</style>"#,
        );
        let urls: Vec<_> = result
            .features
            .iter()
            .filter_map(|feature| match feature {
                ScannedFeature::Import(import) => Some(import.url.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(urls, ["a.css", "b.css"]);

        let inline = result
            .features
            .iter()
            .find_map(|feature| match feature {
                ScannedFeature::InlineDocument(inline) => Some(inline),
                _ => None,
            })
            .unwrap();
        assert_eq!(inline.kind, "css");
        assert_eq!(inline.contents, ":root { --x: 1px; }");
    }
}
