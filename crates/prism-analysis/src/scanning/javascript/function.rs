use crate::model::{Annotation, Function, ScannedFeature, Span, jsdoc};
use crate::parser::ParsedDocument;
use crate::parser::js_ast::{EntryKind, Expr, ExprNode, JsNode, JsNodeKind};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::{namespaced_name, params_of};

/// Documented functions that belong to a namespace.
///
/// A function is reported when its doc comment carries `@memberof` or
/// `@global`, or when it is a function-valued entry of an object annotated
/// with `@namespace`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionScanner;

impl Scanner<JsNode> for FunctionScanner {
    fn name(&self) -> &'static str {
        "function"
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

fn is_namespaced(annotation: &Annotation) -> bool {
    annotation.has_tag("memberof") || annotation.has_tag("global")
}

impl Visitor<'_> {
    fn function(&mut self, name: &str, params: &[String], annotation: Annotation, span: Span) {
        let name = namespaced_name(name, Some(&annotation));
        let returns = annotation.tag("return").or_else(|| annotation.tag("returns"));
        let function = Function {
            description: annotation.description.clone(),
            summary: annotation
                .tag("summary")
                .and_then(|tag| tag.description.clone())
                .unwrap_or_default(),
            params: params_of(params, Some(&annotation)),
            return_type: returns.and_then(|tag| tag.kind.clone()),
            return_description: returns.and_then(|tag| tag.description.clone()),
            privacy: jsdoc::privacy_of(&name, Some(&annotation)),
            source_range: self.document.source_range(span),
            warnings: Vec::new(),
            jsdoc: Some(annotation),
            name,
        };
        self.result.features.push(ScannedFeature::Function(function));
    }

    fn assigned(&mut self, node: &JsNode, target: Option<&str>, value: &ExprNode) {
        let Some(annotation) = node.annotation() else {
            return;
        };
        match &value.expr {
            Expr::Function { params, .. } if is_namespaced(&annotation) => {
                if let Some(name) = target {
                    self.function(name, params, annotation, node.span);
                }
            }
            Expr::Object(entries) if annotation.has_tag("namespace") => {
                let Some(namespace) = annotation
                    .tag("namespace")
                    .and_then(|tag| tag.name.as_deref())
                    .or(target)
                else {
                    return;
                };
                let namespace = namespaced_name(namespace, Some(&annotation));
                for entry in entries {
                    let (Some(key), Expr::Function { params, .. }) = (&entry.key, &entry.value.expr) else {
                        continue;
                    };
                    if !matches!(entry.kind, EntryKind::Init | EntryKind::Method) {
                        continue;
                    }
                    let doc = entry.annotation().unwrap_or_default();
                    self.function(&format!("{namespace}.{key}"), params, doc, entry.span);
                }
            }
            _ => {}
        }
    }
}

impl ScanVisitor<JsNode> for Visitor<'_> {
    fn enter(&mut self, node: &JsNode) -> VisitControl {
        match &node.kind {
            JsNodeKind::FunctionDeclaration {
                name: Some(name),
                params,
            } => {
                if let Some(annotation) = node.annotation().filter(is_namespaced) {
                    self.function(name, params, annotation, node.span);
                }
            }
            JsNodeKind::Assignment { target, value } => {
                self.assigned(node, target.as_deref(), value);
            }
            JsNodeKind::VariableDeclarator {
                name,
                init: Some(init),
            } => self.assigned(node, name.as_deref(), init),
            _ => {}
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

    fn functions(source: &str) -> Vec<Function> {
        scan_js(&FunctionScanner, source)
            .features
            .into_iter()
            .filter_map(|feature| match feature {
                ScannedFeature::Function(function) => Some(function),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn memberof_functions() {
        let found = functions(
            r#"
/**
 * Adds things.
 * @memberof Polymer.Math
 * @param {number} a First.
 * @return {number} The sum.
 */
function add(a, b) { return a + b; }

/** @memberof Polymer.Math */
Polymer.Math.sub = function(a, b) { return a - b; };

/** Not part of any namespace. */
function loose() {}
"#,
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Polymer.Math.add");
        assert_eq!(found[0].description, "Adds things.");
        assert_eq!(found[0].params.len(), 2);
        assert_eq!(found[0].params[0].type_name.as_deref(), Some("number"));
        assert_eq!(found[0].return_type.as_deref(), Some("number"));
        assert_eq!(found[1].name, "Polymer.Math.sub");
    }

    #[test]
    fn namespace_object_members() {
        let found = functions(
            r#"
/** @namespace */
Polymer.Async = {
  /** Runs later. */
  run(callback) {},
  _queue: [],
  cancel: function(handle) {}
};
"#,
        );
        let names: Vec<_> = found.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Polymer.Async.run", "Polymer.Async.cancel"]);
        assert_eq!(found[0].description, "Runs later.");
    }
}
