//! Polymer declaration objects: the argument of `Polymer({...})` and the
//! value of a `@polymerBehavior` assignment.

use crate::model::{
    DatabindingContext, DatabindingExpression, ElementMembers, ExpressionLimitation, Listener,
    Observer, Property, ScannedReference, Severity, Span, Warning, jsdoc,
};
use crate::parser::ParsedDocument;
use crate::parser::js_ast::{EntryKind, Expr, ExprNode, ObjectEntry};

use super::{closure_type, method, plain_property};

/// Everything a Polymer declaration object declares.
#[derive(Debug, Default)]
pub(crate) struct PolymerObject {
    pub tag_name: Option<String>,
    pub extends: Option<String>,
    pub members: ElementMembers,
    pub behaviors: Vec<ScannedReference>,
    pub observers: Vec<Observer>,
    pub listeners: Vec<Listener>,
    pub warnings: Vec<Warning>,
}

impl PolymerObject {
    pub fn from_entries(entries: &[ObjectEntry], document: &ParsedDocument) -> Self {
        let mut object = Self::default();

        for entry in entries {
            let Some(name) = entry.key.as_deref() else {
                object.warnings.push(Warning::new(
                    "cant-determine-property-name",
                    "Can't determine name for property key from a computed expression.",
                    Severity::Warning,
                    document.source_range(entry.span),
                ));
                continue;
            };

            if object.declaration(name, &entry.value, document) {
                continue;
            }

            match entry.kind {
                EntryKind::Get => {
                    let has_setter = entries.iter().any(|other| {
                        other.kind == EntryKind::Set && other.key.as_deref() == Some(name)
                    });
                    let mut property = plain_property(
                        document,
                        name,
                        None,
                        entry.annotation(),
                        entry.span,
                    );
                    property.read_only = property.read_only || !has_setter;
                    object.add_property(property);
                }
                EntryKind::Set => {
                    let has_getter = entries.iter().any(|other| {
                        other.kind == EntryKind::Get && other.key.as_deref() == Some(name)
                    });
                    if !has_getter {
                        let property = plain_property(
                            document,
                            name,
                            None,
                            entry.annotation(),
                            entry.span,
                        );
                        object.add_property(property);
                    }
                }
                EntryKind::Method => object.add_function(name, entry, document),
                EntryKind::Init if matches!(entry.value.expr, Expr::Function { .. }) => {
                    object.add_function(name, entry, document);
                }
                EntryKind::Init => {
                    let property = plain_property(
                        document,
                        name,
                        Some(&entry.value),
                        entry.annotation(),
                        entry.span,
                    );
                    object.add_property(property);
                }
            }
        }
        object
    }

    fn add_property(&mut self, property: Property) {
        self.warnings.extend(property.warnings.iter().cloned());
        self.members.add_property(property);
    }

    fn add_function(&mut self, name: &str, entry: &ObjectEntry, document: &ParsedDocument) {
        let params = match &entry.value.expr {
            Expr::Function { params, .. } => params.as_slice(),
            _ => &[],
        };
        let annotation = entry.annotation();
        self.members.add_method(method(
            name,
            params,
            annotation.as_ref(),
            document.source_range(entry.span),
        ));
    }

    /// Handle one of the special Polymer keys. Returns whether `name` was one.
    fn declaration(&mut self, name: &str, value: &ExprNode, document: &ParsedDocument) -> bool {
        match name {
            "is" => {
                self.tag_name = value.as_str().map(str::to_string);
                if self.tag_name.is_none() {
                    self.warnings.push(Warning::new(
                        "invalid-element-tag-name",
                        "The `is` property of a Polymer element must be a string literal.",
                        Severity::Warning,
                        document.source_range(value.span),
                    ));
                }
            }
            "extends" => self.extends = value.as_str().map(str::to_string),
            "properties" => {
                for property in analyze_properties(value, document) {
                    self.add_property(property);
                }
            }
            "behaviors" => {
                let (references, warnings) = behavior_references(value, document);
                self.behaviors.extend(references);
                self.warnings.extend(warnings);
            }
            "observers" => {
                let (observers, warnings) = observers_of(value, document);
                self.observers.extend(observers);
                self.warnings.extend(warnings);
            }
            "listeners" => self.listeners_of(value, document),
            _ => return false,
        }
        true
    }

    fn listeners_of(&mut self, value: &ExprNode, document: &ParsedDocument) {
        let Some(entries) = value.as_object() else {
            self.warnings.push(Warning::new(
                "invalid-listeners-declaration",
                "`listeners` property should be an object expression",
                Severity::Warning,
                document.source_range(value.span),
            ));
            return;
        };
        for entry in entries {
            let Some(event) = entry.key.clone() else {
                continue;
            };
            self.listeners.push(Listener {
                event,
                handler: entry.value.as_str().map(str::to_string),
                source_range: document.source_range(entry.span),
            });
        }
    }
}

/// Behavior references in a `behaviors` value: an identifier chain or an
/// array of them. Nested arrays are flattened.
pub(crate) fn behavior_references(
    value: &ExprNode,
    document: &ParsedDocument,
) -> (Vec<ScannedReference>, Vec<Warning>) {
    let mut references = Vec::new();
    let mut warnings = Vec::new();
    collect_behaviors(value, document, &mut references, &mut warnings);
    (references, warnings)
}

fn collect_behaviors(
    value: &ExprNode,
    document: &ParsedDocument,
    references: &mut Vec<ScannedReference>,
    warnings: &mut Vec<Warning>,
) {
    match &value.expr {
        Expr::Path(path) => {
            references.push(ScannedReference::new(path.clone(), document.source_range(value.span)));
        }
        Expr::Array(items) => {
            for item in items {
                collect_behaviors(item, document, references, warnings);
            }
        }
        _ => warnings.push(Warning::new(
            "could-not-determine-behavior",
            "Expected behavior to be an identifier or member expression.",
            Severity::Warning,
            document.source_range(value.span),
        )),
    }
}

/// Complex observers from an `observers` array.
pub(crate) fn observers_of(
    value: &ExprNode,
    document: &ParsedDocument,
) -> (Vec<Observer>, Vec<Warning>) {
    let Some(items) = value.as_array() else {
        let warning = Warning::new(
            "invalid-observers-declaration",
            "`observers` property should be an array expression.",
            Severity::Warning,
            document.source_range(value.span),
        );
        return (Vec::new(), vec![warning]);
    };
    let mut warnings = Vec::new();
    let observers = items
        .iter()
        .map(|item| Observer {
            expression: item.as_str().map(str::to_string),
            parsed_expression: literal_expression(
                item,
                document,
                ExpressionLimitation::CallExpression,
                &mut warnings,
            ),
            source_range: document.source_range(item.span),
        })
        .collect();
    (observers, warnings)
}

/// Parse a string literal holding a Polymer expression. Its warnings, or a
/// warning about `value` not being a string literal, go to `warnings`.
fn literal_expression(
    value: &ExprNode,
    document: &ParsedDocument,
    limitation: ExpressionLimitation,
    warnings: &mut Vec<Warning>,
) -> Option<DatabindingExpression> {
    if value.as_str().is_none() {
        warnings.push(Warning::new(
            "invalid-polymer-expression",
            "Expected a string literal here.",
            Severity::Warning,
            document.source_range(value.span),
        ));
        return None;
    }
    let inner = Span::new(value.span.start + 1, value.span.end.saturating_sub(1));
    let expression =
        DatabindingExpression::parse(document, inner, DatabindingContext::JavaScript, limitation);
    warnings.extend(expression.warnings.iter().cloned());
    Some(expression)
}

/// Read a Polymer `properties` block.
///
/// Every entry becomes a published property. A `@type` doc tag is
/// canonical; otherwise the type comes from an identifier value (`foo:
/// String`) or from the `type` key of a configuration object.
pub fn analyze_properties(value: &ExprNode, document: &ParsedDocument) -> Vec<Property> {
    let Some(entries) = value.as_object() else {
        return Vec::new();
    };

    let mut properties = Vec::new();
    for entry in entries {
        let Some(name) = entry.key.as_deref() else {
            continue;
        };
        let annotation = entry.annotation();
        let mut property = Property {
            name: name.to_string(),
            description: annotation
                .as_ref()
                .and_then(|doc| doc.description_or_tag_text())
                .unwrap_or_default(),
            type_name: annotation
                .as_ref()
                .and_then(|doc| doc.type_tag().map(str::to_string)),
            privacy: jsdoc::privacy_of(name, annotation.as_ref()),
            published: true,
            source_range: Some(document.source_range(entry.span)),
            jsdoc: annotation,
            ..Property::default()
        };
        let mut computed = false;

        match &entry.value.expr {
            Expr::Path(path) => {
                property.type_name.get_or_insert_with(|| path.clone());
            }
            Expr::Object(config) => {
                for option in config {
                    let value = &option.value;
                    match option.key.as_deref() {
                        Some("type") => {
                            if property.type_name.is_none() {
                                property.type_name =
                                    value.as_path().or_else(|| value.as_str()).map(str::to_string);
                                if property.type_name.is_none() {
                                    property.warnings.push(Warning::new(
                                        "invalid-property-type",
                                        "Invalid type in property object.",
                                        Severity::Warning,
                                        document.source_range(option.span),
                                    ));
                                }
                            }
                        }
                        Some("notify") => property.notify = value.expr.is_truthy(),
                        Some("observer") => {
                            property.observer = value.as_str().map(str::to_string);
                            property.observer_expression = literal_expression(
                                value,
                                document,
                                ExpressionLimitation::IdentifierOnly,
                                &mut property.warnings,
                            );
                        }
                        Some("readOnly") => property.read_only = value.expr.is_truthy(),
                        Some("reflectToAttribute") => {
                            property.reflect_to_attribute = value.expr.is_truthy();
                        }
                        Some("computed") => {
                            computed = true;
                            property.computed_expression = value.as_str().map(str::to_string);
                            property.computed_databinding = literal_expression(
                                value,
                                document,
                                ExpressionLimitation::CallExpression,
                                &mut property.warnings,
                            );
                        }
                        Some("value") => {
                            property.default = value.expr.to_json().map(|json| json.to_string());
                        }
                        _ => {}
                    }
                }
            }
            _ => continue,
        }

        if computed {
            property.read_only = true;
        }
        property.type_name = property
            .type_name
            .map(|type_name| closure_type(&type_name).to_string());
        if property.type_name.is_none() {
            property.warnings.push(Warning::new(
                "no-type-for-property",
                "Unable to determine type for property.",
                Severity::Warning,
                document.source_range(entry.span),
            ));
        }
        properties.push(property);
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::js_ast::JsNodeKind;
    use crate::parser::{Ast, ParserRegistry};
    use prism_graph::ResolvedUrl;
    use std::sync::Arc;

    /// Parse `var x = <object>;` and hand back the document and the object.
    fn object(source: &str) -> (Arc<ParsedDocument>, ExprNode) {
        let document = ParserRegistry::with_defaults()
            .parse("js", &format!("var x = {source};"), &ResolvedUrl::new("a.js"), None)
            .unwrap();
        let Ast::Js(ast) = &document.ast else {
            panic!("expected js");
        };
        let JsNodeKind::VariableDeclarator { init: Some(init), .. } = &ast.root.children[0].kind
        else {
            panic!("expected a declarator");
        };
        let init = init.clone();
        (document, init)
    }

    #[test]
    fn properties_block() {
        let (document, value) = object(
            r#"{
                label: String,
                /** @type {!Array<string>} */
                items: { type: Array, value: function() { return []; } },
                count: { type: Number, value: 3, notify: true, observer: '_countChanged' },
                total: { type: Number, computed: '_sum(count)' },
                opened: { type: Boolean, reflectToAttribute: true, readOnly: true },
                weird: { type: 7 },
                untyped: { value: 1 }
            }"#,
        );
        let properties = analyze_properties(&value, &document);
        let by_name = |name: &str| properties.iter().find(|p| p.name == name).unwrap();

        assert!(properties.iter().all(|p| p.published));
        assert_eq!(by_name("label").type_name.as_deref(), Some("string"));
        assert_eq!(by_name("items").type_name.as_deref(), Some("!Array<string>"));
        assert_eq!(by_name("items").default, None);

        let count = by_name("count");
        assert_eq!(count.type_name.as_deref(), Some("number"));
        assert_eq!(count.default.as_deref(), Some("3.0"));
        assert!(count.notify);
        assert_eq!(count.observer.as_deref(), Some("_countChanged"));

        let total = by_name("total");
        assert!(total.read_only);
        assert_eq!(total.computed_expression.as_deref(), Some("_sum(count)"));

        let opened = by_name("opened");
        assert!(opened.reflect_to_attribute && opened.read_only);

        let codes: Vec<_> = by_name("weird").warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(codes, ["invalid-property-type", "no-type-for-property"]);
        assert_eq!(by_name("untyped").warnings[0].code, "no-type-for-property");
    }

    #[test]
    fn declaration_object() {
        let (document, value) = object(
            r#"{
                is: 'x-foo',
                extends: 'button',
                behaviors: [Polymer.A, [Polymer.B]],
                observers: ['_update(a, b)'],
                listeners: { tap: '_onTap' },
                properties: { a: String },
                get size() { return 1; },
                set name(v) {},
                get name() { return ''; },
                _onTap: function(e) {},
                ready() {},
                flag: true
            }"#,
        );
        let object = PolymerObject::from_entries(value.as_object().unwrap(), &document);

        assert_eq!(object.tag_name.as_deref(), Some("x-foo"));
        assert_eq!(object.extends.as_deref(), Some("button"));
        let behaviors: Vec<_> = object.behaviors.iter().map(|b| b.identifier.as_str()).collect();
        assert_eq!(behaviors, ["Polymer.A", "Polymer.B"]);
        assert_eq!(object.observers[0].expression.as_deref(), Some("_update(a, b)"));
        assert_eq!(object.listeners[0].handler.as_deref(), Some("_onTap"));

        let members = &object.members;
        assert!(members.properties["a"].published);
        assert!(members.properties["size"].read_only);
        assert!(!members.properties["name"].read_only);
        assert_eq!(members.properties["flag"].type_name.as_deref(), Some("boolean"));
        assert!(members.methods.contains_key("_onTap"));
        assert!(members.methods.contains_key("ready"));
        assert!(members.attributes.contains_key("a"));
    }

    #[test]
    fn observer_and_computed_strings_are_parsed() {
        let (document, value) = object(
            r#"{
                a: { type: String, observer: '_aChanged' },
                b: { type: String, computed: '_join(a, c.d)' },
                broken: { type: String, observer: '_a(b' },
                plain: { type: String, computed: 'first' },
                numeric: { type: String, observer: 42 }
            }"#,
        );
        let properties = analyze_properties(&value, &document);
        let by_name = |name: &str| properties.iter().find(|p| p.name == name).unwrap();

        let a = by_name("a");
        assert!(a.warnings.is_empty());
        let observer = a.observer_expression.as_ref().unwrap();
        assert_eq!(observer.method_name.as_deref(), Some("_aChanged"));
        assert_eq!(observer.expression_text, "_aChanged");

        let computed = by_name("b").computed_databinding.as_ref().unwrap();
        let dependencies: Vec<_> = computed.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(dependencies, ["a", "c"]);

        for name in ["broken", "plain", "numeric"] {
            let codes: Vec<_> = by_name(name).warnings.iter().map(|w| w.code.as_str()).collect();
            assert_eq!(codes, ["invalid-polymer-expression"], "{name}");
        }
    }

    #[test]
    fn observers_array_expressions_are_checked() {
        let (document, value) = object("['_update(a, b.*)', 'a + b']");
        let (observers, warnings) = observers_of(&value, &document);
        assert_eq!(observers.len(), 2);
        let first = observers[0].parsed_expression.as_ref().unwrap();
        assert_eq!(first.method_name.as_deref(), Some("_update"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "invalid-polymer-expression");
        assert_eq!(warnings[0].source_range.start.line, 0);
    }

    #[test]
    fn non_identifier_behaviors_warn() {
        let (document, value) = object("[Polymer.A, makeBehavior()]");
        let (references, warnings) = behavior_references(&value, &document);
        assert_eq!(references.len(), 1);
        assert_eq!(warnings[0].code, "could-not-determine-behavior");
    }
}
