use crate::model::members::events_of;
use crate::model::{ElementKind, ScannedElement, ScannedFeature, Span, jsdoc};
use crate::parser::ParsedDocument;
use crate::parser::js_ast::{JsNode, JsNodeKind};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::AssignedNames;
use super::polymer::PolymerObject;

/// Elements declared with a `Polymer({...})` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolymerElementScanner;

impl Scanner<JsNode> for PolymerElementScanner {
    fn name(&self) -> &'static str {
        "polymer-element"
    }

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<JsNode> + 'd> {
        Box::new(Visitor {
            document,
            names: AssignedNames::default(),
            state: State::Idle,
            result: ScanResult::default(),
        })
    }
}

enum State {
    Idle,
    /// Inside the `Polymer(...)` call at `call`.
    Building { call: Span, element: Box<ScannedElement> },
}

struct Visitor<'d> {
    document: &'d ParsedDocument,
    names: AssignedNames,
    state: State,
    result: ScanResult,
}

impl Visitor<'_> {
    fn start(&self, node: &JsNode) -> Option<ScannedElement> {
        let JsNodeKind::Call { callee, args } = &node.kind else {
            return None;
        };
        if callee.as_deref() != Some("Polymer") {
            return None;
        }
        let [declaration] = args.as_slice() else {
            return None;
        };
        let entries = declaration.as_object()?;

        let annotation = node.annotation();
        let source_range = self.document.source_range(declaration.span);
        let mut element = ScannedElement::new(ElementKind::PolymerCall, annotation.clone(), source_range);
        element.class_name = self.names.name_for(node.span).map(str::to_string);

        let object = PolymerObject::from_entries(entries, self.document);
        element.tag_name = object.tag_name;
        element.extends = object.extends;
        element.members = object.members;
        element.behaviors = object.behaviors;
        element.observers = object.observers;
        element.listeners = object.listeners;
        element.warnings.extend(object.warnings);
        if let Some(doc) = &annotation {
            for event in events_of(doc, &element.source_range) {
                element.members.add_event(event);
            }
        }

        let name = element
            .class_name
            .as_deref()
            .or(element.tag_name.as_deref())
            .unwrap_or_default()
            .to_string();
        element.privacy = jsdoc::privacy_of(&name, annotation.as_ref());
        Some(element)
    }
}

impl ScanVisitor<JsNode> for Visitor<'_> {
    fn enter(&mut self, node: &JsNode) -> VisitControl {
        self.names.enter(node);
        if let State::Building { .. } = self.state {
            return VisitControl::Continue;
        }
        match self.start(node) {
            Some(element) => {
                self.state = State::Building {
                    call: node.span,
                    element: Box::new(element),
                };
                VisitControl::SkipChildren
            }
            None => VisitControl::Continue,
        }
    }

    fn leave(&mut self, node: &JsNode) {
        self.names.leave(node);
        if let State::Building { call, .. } = &self.state {
            if *call != node.span {
                return;
            }
            if let State::Building { element, .. } = std::mem::replace(&mut self.state, State::Idle) {
                self.result.features.push(ScannedFeature::Element(*element));
            }
        }
    }

    fn finish(self: Box<Self>) -> ScanResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::test_support::scan_js;

    fn elements(source: &str) -> Vec<ScannedElement> {
        scan_js(&PolymerElementScanner, source)
            .features
            .into_iter()
            .filter_map(|feature| match feature {
                ScannedFeature::Element(element) => Some(element),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn polymer_call_becomes_an_element() {
        let elements = elements(
            r#"
/**
 * A fancy input.
 * @demo demo/index.html The demo
 * @event fancy-change Fired on change.
 */
var FancyInput = Polymer({
  is: 'fancy-input',
  behaviors: [Polymer.IronControlState],
  properties: {
    value: { type: String, notify: true }
  },
  listeners: { focus: '_onFocus' },
  _onFocus: function() {}
});
"#,
        );
        assert_eq!(elements.len(), 1);
        let element = &elements[0];
        assert_eq!(element.kind, ElementKind::PolymerCall);
        assert_eq!(element.tag_name.as_deref(), Some("fancy-input"));
        assert_eq!(element.class_name.as_deref(), Some("FancyInput"));
        assert_eq!(element.description, "A fancy input.");
        assert_eq!(element.demos[0].url, "demo/index.html");
        assert_eq!(element.behaviors[0].identifier, "Polymer.IronControlState");
        assert!(element.members.events.contains_key("fancy-change"));
        assert!(element.members.events.contains_key("value-changed"));
        assert!(element.members.methods.contains_key("_onFocus"));
        assert_eq!(element.listeners.len(), 1);
    }

    #[test]
    fn only_single_object_arguments_count() {
        assert!(elements("Polymer('x-a', {});").is_empty());
        assert!(elements("Polymer.Foo({is: 'x-b'});").is_empty());
        assert_eq!(elements("Polymer({is: 'x-c'}); Polymer({is: 'x-d'});").len(), 2);
    }
}
