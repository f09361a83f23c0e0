use crate::model::{Namespace, ScannedFeature, Severity, Warning};
use crate::parser::ParsedDocument;
use crate::parser::js_ast::{JsNode, JsNodeKind};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::namespaced_name;

/// Objects annotated with `@namespace`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceScanner;

impl Scanner<JsNode> for NamespaceScanner {
    fn name(&self) -> &'static str {
        "namespace"
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

impl ScanVisitor<JsNode> for Visitor<'_> {
    fn enter(&mut self, node: &JsNode) -> VisitControl {
        let target = match &node.kind {
            JsNodeKind::Assignment { target, .. } => target.as_deref(),
            JsNodeKind::VariableDeclarator { name, .. } => name.as_deref(),
            _ => return VisitControl::Continue,
        };
        let Some(annotation) = node.annotation() else {
            return VisitControl::Continue;
        };
        let Some(tag) = annotation.tag("namespace") else {
            return VisitControl::Continue;
        };
        let source_range = self.document.source_range(node.span);

        match tag.name.as_deref().or(target) {
            Some(name) => {
                let name = namespaced_name(name, Some(&annotation));
                let summary = annotation
                    .tag("summary")
                    .and_then(|tag| tag.description.clone())
                    .unwrap_or_default();
                self.result.features.push(ScannedFeature::Namespace(Namespace {
                    name,
                    description: annotation.description.clone(),
                    summary,
                    jsdoc: Some(annotation),
                    source_range,
                    warnings: Vec::new(),
                }));
            }
            None => self.result.warnings.push(Warning::new(
                "cant-determine-name",
                "Unable to determine name for @namespace",
                Severity::Warning,
                source_range,
            )),
        }
        VisitControl::Continue
    }

    fn finish(self: Box<Self>) -> ScanResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::test_support::scan_js;

    #[test]
    fn namespaces_from_assignments_and_declarations() {
        let result = scan_js(
            &NamespaceScanner,
            r#"
/**
 * Shared helpers.
 * @namespace
 * @summary Helpers for everything.
 */
var Polymer = {};

/** @namespace Polymer.Utils */
Polymer.UtilsImpl = {};

/** Just an object. */
Polymer.NotANamespace = {};
"#,
        );
        let names: Vec<_> = result
            .features
            .iter()
            .filter_map(|feature| match feature {
                ScannedFeature::Namespace(namespace) => Some(namespace),
                _ => None,
            })
            .collect();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].name, "Polymer");
        assert_eq!(names[0].description, "Shared helpers.");
        assert_eq!(names[0].summary, "Helpers for everything.");
        assert_eq!(names[1].name, "Polymer.Utils");
    }
}
