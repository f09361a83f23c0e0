use rustc_hash::FxHashMap;

use crate::model::{DatabindingExpression, DomModule, LocalId, ScannedFeature, Slot};
use crate::parser::{HtmlNode, HtmlNodeKind, ParsedDocument};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::comments_before_children;

/// `<dom-module id="...">` declarations with the slots, local ids and
/// databinding expressions of their template.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomModuleScanner;

impl Scanner<HtmlNode> for DomModuleScanner {
    fn name(&self) -> &'static str {
        "dom-module"
    }

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<HtmlNode> + 'd> {
        Box::new(Visitor {
            document,
            comments: FxHashMap::default(),
            result: ScanResult::default(),
        })
    }
}

struct Visitor<'d> {
    document: &'d ParsedDocument,
    comments: FxHashMap<usize, String>,
    result: ScanResult,
}

impl Visitor<'_> {
    fn module(&self, node: &HtmlNode, id: &str) -> DomModule {
        let mut slots = Vec::new();
        let mut local_ids = Vec::new();
        let mut databindings = Vec::new();

        for template in node.children.iter().filter(|child| child.is_tag("template")) {
            for descendant in template.descendants() {
                if let HtmlNodeKind::Text(_) = descendant.kind {
                    databindings.extend(DatabindingExpression::in_template_text(
                        self.document,
                        descendant.span,
                        None,
                    ));
                }
                let Some(element) = descendant.element() else {
                    continue;
                };
                for attribute in &element.attributes {
                    if let Some(value_span) = attribute.value_span {
                        databindings.extend(DatabindingExpression::in_template_text(
                            self.document,
                            value_span,
                            Some(&attribute.name),
                        ));
                    }
                }
                if element.tag == "slot" {
                    slots.push(Slot {
                        name: element.attr("name").unwrap_or_default().to_string(),
                        source_range: self.document.source_range(descendant.span),
                    });
                }
                if let Some(id) = element.attr("id") {
                    local_ids.push(LocalId {
                        name: id.to_string(),
                        source_range: self.document.source_range(descendant.span),
                    });
                }
            }
        }

        let warnings = databindings
            .iter()
            .flat_map(|expression| expression.warnings.iter().cloned())
            .collect();
        DomModule {
            id: id.to_string(),
            comment: self.comments.get(&node.span.start).cloned(),
            slots,
            local_ids,
            databindings,
            source_range: self.document.source_range(node.span),
            warnings,
        }
    }
}

impl ScanVisitor<HtmlNode> for Visitor<'_> {
    fn enter(&mut self, node: &HtmlNode) -> VisitControl {
        self.comments.extend(comments_before_children(node));

        let Some(element) = node.element() else {
            return VisitControl::Continue;
        };
        if element.tag != "dom-module" {
            return VisitControl::Continue;
        }
        if let Some(id) = element.attr("id").filter(|id| !id.is_empty()) {
            let module = self.module(node, id);
            self.result.features.push(ScannedFeature::DomModule(module));
        }
        VisitControl::SkipChildren
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
    fn collects_slots_local_ids_and_comment() {
        let result = scan_html(
            &DomModuleScanner,
            r#"<!-- The x-a element. -->
<dom-module id="x-a">
  <template>
    <div id="wrapper"><slot></slot></div>
    <slot name="footer"></slot>
  </template>
</dom-module>
<dom-module></dom-module>"#,
        );
        assert_eq!(result.features.len(), 1);
        let ScannedFeature::DomModule(module) = &result.features[0] else {
            panic!("expected a dom-module");
        };
        assert_eq!(module.id, "x-a");
        assert_eq!(module.comment.as_deref().map(str::trim), Some("The x-a element."));
        let slots: Vec<_> = module.slots.iter().map(|slot| slot.name.as_str()).collect();
        assert_eq!(slots, ["", "footer"]);
        assert_eq!(module.local_ids[0].name, "wrapper");
        assert!(module.databindings.is_empty());
    }

    #[test]
    fn template_bindings_are_parsed() {
        let result = scan_html(
            &DomModuleScanner,
            r#"<dom-module id="x-b">
  <template>
    <input value="{{query::input}}" hidden$="[[!visible]]">
    <span>Total: [[_total(items.*)]]</span>
    <p>{{a + b}}</p>
  </template>
</dom-module>"#,
        );
        let ScannedFeature::DomModule(module) = &result.features[0] else {
            panic!("expected a dom-module");
        };
        let texts: Vec<_> =
            module.databindings.iter().map(|b| b.expression_text.as_str()).collect();
        assert_eq!(texts, ["query", "!visible", "_total(items.*)", "a + b"]);
        assert_eq!(module.databindings[2].method_name.as_deref(), Some("_total"));

        assert_eq!(module.warnings.len(), 1);
        assert_eq!(module.warnings[0].code, "invalid-polymer-expression");
        assert_eq!(module.warnings[0].source_range.start.line, 4);
    }
}
