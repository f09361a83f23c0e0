use crate::model::members::demos_of;
use crate::model::{Annotation, ScannedBehavior, ScannedFeature, Severity, Warning, jsdoc};
use crate::parser::ParsedDocument;
use crate::parser::js_ast::{Expr, ExprNode, JsNode, JsNodeKind};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::namespaced_name;
use super::polymer::{PolymerObject, behavior_references};

/// Objects (or arrays of behaviors) annotated with `@polymerBehavior`.
///
/// ```js
/// /** @polymerBehavior Polymer.IronButtonState */
/// Polymer.IronButtonStateImpl = { ... };
/// /** @polymerBehavior */
/// Polymer.IronButtonState = [Polymer.IronA11yKeysBehavior, Polymer.IronButtonStateImpl];
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BehaviorScanner;

impl Scanner<JsNode> for BehaviorScanner {
    fn name(&self) -> &'static str {
        "behavior"
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

impl Visitor<'_> {
    fn behavior(&mut self, node: &JsNode, target: Option<&str>, value: &ExprNode) {
        let Some(annotation) = node.annotation() else {
            return;
        };
        let Some(tag) = annotation.tag("polymerBehavior") else {
            return;
        };
        let source_range = self.document.source_range(node.span);

        let Some(name) = tag.name.as_deref().or(target) else {
            self.result.warnings.push(Warning::new(
                "cant-determine-name",
                "Unable to determine name for @polymerBehavior",
                Severity::Warning,
                source_range,
            ));
            return;
        };
        let name = namespaced_name(name, Some(&annotation));

        let mut behavior = ScannedBehavior {
            privacy: jsdoc::privacy_of(&name, Some(&annotation)),
            name,
            description: annotation.description.clone(),
            demos: demos_of(Some(&annotation)),
            jsdoc: None,
            members: Default::default(),
            observers: Vec::new(),
            listeners: Vec::new(),
            behaviors: Vec::new(),
            source_range,
            warnings: Vec::new(),
        };

        match &value.expr {
            Expr::Object(entries) => {
                let object = PolymerObject::from_entries(entries, self.document);
                behavior.members = object.members;
                behavior.behaviors = object.behaviors;
                behavior.observers = object.observers;
                behavior.listeners = object.listeners;
                behavior.warnings = object.warnings;
            }
            Expr::Array(_) => {
                let (references, warnings) = behavior_references(value, self.document);
                behavior.behaviors = references;
                behavior.warnings = warnings;
            }
            _ => {}
        }
        behavior.jsdoc = Some(annotation_without_behavior_tag(annotation));
        self.result.features.push(ScannedFeature::Behavior(behavior));
    }
}

/// The doc comment minus the `@polymerBehavior` tag itself, so it does not
/// leak into the docs of elements inheriting from it.
fn annotation_without_behavior_tag(mut annotation: Annotation) -> Annotation {
    annotation.tags.retain(|tag| tag.title != "polymerBehavior");
    annotation
}

impl ScanVisitor<JsNode> for Visitor<'_> {
    fn enter(&mut self, node: &JsNode) -> VisitControl {
        match &node.kind {
            JsNodeKind::Assignment { target, value } => {
                self.behavior(node, target.as_deref(), value);
            }
            JsNodeKind::VariableDeclarator {
                name,
                init: Some(init),
            } => self.behavior(node, name.as_deref(), init),
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

    fn behaviors(source: &str) -> Vec<ScannedBehavior> {
        scan_js(&BehaviorScanner, source)
            .features
            .into_iter()
            .filter_map(|feature| match feature {
                ScannedFeature::Behavior(behavior) => Some(behavior),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn object_and_array_behaviors() {
        let found = behaviors(
            r#"
/**
 * Tracks pressed state.
 * @polymerBehavior Polymer.ButtonState
 */
Polymer.ButtonStateImpl = {
  properties: { pressed: { type: Boolean, notify: true } },
  observers: ['_pressedChanged(pressed)'],
  _pressedChanged: function(pressed) {}
};

/** @polymerBehavior */
Polymer.ButtonState = [Polymer.A11yKeys, Polymer.ButtonStateImpl];

/** Not a behavior. */
Polymer.Other = {};
"#,
        );
        assert_eq!(found.len(), 2);
        let impl_ = &found[0];
        assert_eq!(impl_.name, "Polymer.ButtonState");
        assert_eq!(impl_.description, "Tracks pressed state.");
        assert!(impl_.members.properties.contains_key("pressed"));
        assert!(impl_.members.methods.contains_key("_pressedChanged"));
        assert_eq!(impl_.observers.len(), 1);

        let composed = &found[1];
        assert_eq!(composed.name, "Polymer.ButtonState");
        let parts: Vec<_> = composed.behaviors.iter().map(|b| b.identifier.as_str()).collect();
        assert_eq!(parts, ["Polymer.A11yKeys", "Polymer.ButtonStateImpl"]);
    }

    #[test]
    fn declarators_use_their_binding_name() {
        let found = behaviors("/** @polymerBehavior */\nconst MyBehavior = { ready() {} };");
        assert_eq!(found[0].name, "MyBehavior");
    }
}
