use crate::model::{ElementReference, ReferenceAttribute, ScannedFeature};
use crate::parser::{HtmlNode, ParsedDocument};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

/// Every use of a custom element, i.e. a tag whose name contains `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlCustomElementReferenceScanner;

impl Scanner<HtmlNode> for HtmlCustomElementReferenceScanner {
    fn name(&self) -> &'static str {
        "element-reference"
    }

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<HtmlNode> + 'd> {
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

impl ScanVisitor<HtmlNode> for Visitor<'_> {
    fn enter(&mut self, node: &HtmlNode) -> VisitControl {
        let Some(element) = node.element() else {
            return VisitControl::Continue;
        };
        if !element.tag.contains('-') {
            return VisitControl::Continue;
        }
        let attributes = element
            .attributes
            .iter()
            .map(|attribute| ReferenceAttribute {
                name: attribute.name.clone(),
                value: attribute.value.clone(),
                source_range: self.document.source_range(attribute.span()),
            })
            .collect();
        self.result
            .features
            .push(ScannedFeature::ElementReference(ElementReference {
                tag_name: element.tag.clone(),
                attributes,
                source_range: self.document.source_range(node.span),
            }));
        VisitControl::Continue
    }

    fn finish(self: Box<Self>) -> ScanResult {
        self.result
    }
}
