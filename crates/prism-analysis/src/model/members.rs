//! Members shared by classes, elements, behaviors and mixins.
//!
//! Everything here exists in both the scanned and the resolved world: a
//! scanner fills an [`ElementMembers`] while walking one declaration, and
//! resolution copies it and layers inherited members on top.

use indexmap::IndexMap;
use serde::Serialize;

use super::jsdoc::{self, Annotation, Privacy};
use super::{DatabindingExpression, SourceRange, Warning};

/// A reference to another feature by name, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedReference {
    pub identifier: String,
    pub source_range: SourceRange,
}

impl ScannedReference {
    pub fn new(identifier: impl Into<String>, source_range: SourceRange) -> Self {
        Self {
            identifier: identifier.into(),
            source_range,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub description: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip)]
    pub jsdoc: Option<Annotation>,
    pub privacy: Privacy,
    pub read_only: bool,
    pub published: bool,
    pub notify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observer: Option<String>,
    #[serde(skip)]
    pub observer_expression: Option<DatabindingExpression>,
    pub reflect_to_attribute: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_expression: Option<String>,
    #[serde(skip)]
    pub computed_databinding: Option<DatabindingExpression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_range: Option<SourceRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub description: String,
    pub params: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_description: Option<String>,
    pub privacy: Privacy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_range: Option<SourceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub description: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_range: Option<SourceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_range: Option<SourceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
}

/// A complex observer such as `'_update(foo, bar)'`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observer {
    pub expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_expression: Option<DatabindingExpression>,
    pub source_range: SourceRange,
}

/// One entry of a Polymer `listeners` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listener {
    pub event: String,
    pub handler: Option<String>,
    pub source_range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub name: String,
    pub source_range: SourceRange,
}

/// An element with an `id` inside a dom-module template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalId {
    pub name: String,
    pub source_range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Demo {
    pub url: String,
    pub description: String,
}

/// Pull `@demo url description` tags out of a doc comment.
pub fn demos_of(annotation: Option<&Annotation>) -> Vec<Demo> {
    let Some(annotation) = annotation else {
        return Vec::new();
    };
    annotation
        .tags_titled("demo")
        .filter_map(|tag| {
            Some(Demo {
                url: tag.name.clone()?,
                description: tag.description.clone().unwrap_or_default(),
            })
        })
        .collect()
}

/// `@event`/`@fires` tags as events.
pub fn events_of(annotation: &Annotation, source_range: &SourceRange) -> Vec<Event> {
    annotation
        .tags
        .iter()
        .filter(|tag| tag.title == "event" || tag.title == "fires")
        .filter_map(|tag| {
            Some(Event {
                name: tag.name.clone()?,
                description: tag.description.clone().unwrap_or_default(),
                source_range: Some(source_range.clone()),
                inherited_from: None,
            })
        })
        .collect()
}

/// Polymer's property name to attribute name mapping.
///
/// Names whose first character has no lowercase form distinct from its
/// uppercase form (`Foo`, `_foo`, `$foo`) are never mapped.
pub fn property_to_attribute_name(name: &str) -> Option<String> {
    let first = name.chars().next()?;
    if first.to_uppercase().next() == Some(first) {
        return None;
    }
    let mut attribute = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            attribute.push('-');
            attribute.push(ch.to_ascii_lowercase());
        } else {
            attribute.push(ch);
        }
    }
    Some(attribute)
}

/// The first of two optional strings that is present and not empty.
fn first_non_empty(a: Option<&str>, b: Option<&str>) -> Option<String> {
    [a, b]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Merge two declarations of the same property.
///
/// `a` is preferred for single-valued fields as long as it is not empty.
/// Flags are OR-ed, jsdoc tags and warnings are concatenated, and privacy is
/// re-inferred from the result.
pub fn merge_property_declarations(a: &Property, b: &Property) -> Property {
    debug_assert_eq!(a.name, b.name, "merged properties must share a name");

    let description = jsdoc::pick_best_description([a.description.as_str(), b.description.as_str()]);
    let jsdoc = Annotation {
        description: description.clone(),
        tags: a
            .jsdoc
            .iter()
            .chain(b.jsdoc.iter())
            .flat_map(|annotation| annotation.tags.iter().cloned())
            .collect(),
    };
    let privacy = jsdoc::privacy_of(&a.name, Some(&jsdoc));

    Property {
        name: a.name.clone(),
        description,
        type_name: first_non_empty(a.type_name.as_deref(), b.type_name.as_deref()),
        default: first_non_empty(a.default.as_deref(), b.default.as_deref()),
        privacy,
        read_only: a.read_only || b.read_only,
        published: a.published || b.published,
        notify: a.notify || b.notify,
        observer: first_non_empty(a.observer.as_deref(), b.observer.as_deref()),
        observer_expression: a
            .observer_expression
            .clone()
            .or_else(|| b.observer_expression.clone()),
        reflect_to_attribute: a.reflect_to_attribute || b.reflect_to_attribute,
        computed_expression: first_non_empty(
            a.computed_expression.as_deref(),
            b.computed_expression.as_deref(),
        ),
        computed_databinding: a
            .computed_databinding
            .clone()
            .or_else(|| b.computed_databinding.clone()),
        change_event: first_non_empty(a.change_event.as_deref(), b.change_event.as_deref()),
        source_range: a.source_range.clone().or_else(|| b.source_range.clone()),
        warnings: a.warnings.iter().chain(&b.warnings).cloned().collect(),
        jsdoc: Some(jsdoc),
        inherited_from: a.inherited_from.clone().or_else(|| b.inherited_from.clone()),
    }
}

/// The member tables of a class-like feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementMembers {
    pub properties: IndexMap<String, Property>,
    pub methods: IndexMap<String, Method>,
    pub static_methods: IndexMap<String, Method>,
    pub attributes: IndexMap<String, Attribute>,
    pub events: IndexMap<String, Event>,
}

impl ElementMembers {
    /// Add a property, merging with an existing declaration of the same name
    /// and deriving the attribute and change event of published properties.
    pub fn add_property(&mut self, property: Property) {
        let property = match self.properties.get(&property.name) {
            Some(existing) => merge_property_declarations(existing, &property),
            None => property,
        };

        let attribute_name = property_to_attribute_name(&property.name);
        let derives_attribute = property.privacy == Privacy::Public && property.published;

        if let (Some(attribute_name), true) = (attribute_name, derives_attribute) {
            let change_event = property.notify.then(|| format!("{attribute_name}-changed"));
            if let Some(event_name) = &change_event {
                self.events.insert(
                    event_name.clone(),
                    Event {
                        name: event_name.clone(),
                        description: format!("Fired when the `{}` property changes.", property.name),
                        source_range: property.source_range.clone(),
                        inherited_from: None,
                    },
                );
            }
            self.attributes.insert(
                attribute_name.clone(),
                Attribute {
                    name: attribute_name,
                    description: property.description.clone(),
                    type_name: property.type_name.clone(),
                    change_event,
                    source_range: property.source_range.clone(),
                    inherited_from: None,
                },
            );
        }

        self.properties.insert(property.name.clone(), property);
    }

    pub fn add_method(&mut self, method: Method) {
        self.methods.insert(method.name.clone(), method);
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.entry(event.name.clone()).or_insert(event);
    }

    /// Copy members of an ancestor that are not declared in `own`.
    ///
    /// Ancestors are applied in prototype-chain order, so a later ancestor
    /// overrides an earlier one but never an own declaration.
    pub fn inherit(&mut self, own: &ElementMembers, ancestor: &ElementMembers, ancestor_name: &str) {
        fn merge<T: Clone>(
            target: &mut IndexMap<String, T>,
            own: &IndexMap<String, T>,
            inherited: &IndexMap<String, T>,
            mark: impl Fn(&mut T),
        ) {
            for (name, member) in inherited {
                if own.contains_key(name) {
                    continue;
                }
                let mut member = member.clone();
                mark(&mut member);
                target.insert(name.clone(), member);
            }
        }

        let from = || Some(ancestor_name.to_string());
        merge(&mut self.properties, &own.properties, &ancestor.properties, |p| {
            p.inherited_from = p.inherited_from.take().or_else(from);
        });
        merge(&mut self.methods, &own.methods, &ancestor.methods, |m| {
            m.inherited_from = m.inherited_from.take().or_else(from);
        });
        merge(&mut self.attributes, &own.attributes, &ancestor.attributes, |a| {
            a.inherited_from = a.inherited_from.take().or_else(from);
        });
        merge(&mut self.events, &own.events, &ancestor.events, |e| {
            e.inherited_from = e.inherited_from.take().or_else(from);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_graph::ResolvedUrl;

    fn range(line: usize) -> SourceRange {
        let mut range = SourceRange::file_start(ResolvedUrl::new("el.js"));
        range.start.line = line;
        range.end.line = line;
        range
    }

    fn property(name: &str) -> Property {
        Property {
            name: name.to_string(),
            ..Property::default()
        }
    }

    #[test]
    fn attribute_names_are_dash_cased() {
        assert_eq!(property_to_attribute_name("fooBarBaz").as_deref(), Some("foo-bar-baz"));
        assert_eq!(property_to_attribute_name("Foo"), None);
        assert_eq!(property_to_attribute_name("_foo"), None);
        assert_eq!(property_to_attribute_name(""), None);
    }

    #[test]
    fn merge_prefers_first_and_ors_flags() {
        let a = Property {
            description: "short".into(),
            type_name: Some("string".into()),
            source_range: Some(range(1)),
            ..property("label")
        };
        let b = Property {
            description: "a longer description".into(),
            type_name: Some("number".into()),
            default: Some("\"x\"".into()),
            read_only: true,
            notify: true,
            source_range: Some(range(9)),
            ..property("label")
        };

        let merged = merge_property_declarations(&a, &b);
        assert_eq!(merged.description, "a longer description");
        assert_eq!(merged.type_name.as_deref(), Some("string"));
        assert_eq!(merged.default.as_deref(), Some("\"x\""));
        assert_eq!(merged.source_range, Some(range(1)));
        assert!(merged.read_only);
        assert!(merged.notify);
        assert!(!merged.published);
    }

    #[test]
    fn merge_skips_empty_strings() {
        let a = Property {
            type_name: Some(String::new()),
            observer: Some(String::new()),
            computed_expression: Some(String::new()),
            change_event: Some(String::new()),
            ..property("value")
        };
        let b = Property {
            type_name: Some("string".into()),
            observer: Some("_valueChanged".into()),
            change_event: Some("value-changed".into()),
            ..property("value")
        };

        let merged = merge_property_declarations(&a, &b);
        assert_eq!(merged.type_name.as_deref(), Some("string"));
        assert_eq!(merged.observer.as_deref(), Some("_valueChanged"));
        assert_eq!(merged.change_event.as_deref(), Some("value-changed"));
        assert_eq!(merged.computed_expression, None);
    }

    #[test]
    fn merge_reinfers_privacy_from_combined_tags() {
        let a = property("secret");
        let b = Property {
            jsdoc: Some(Annotation::parse("/** @private */")),
            ..property("secret")
        };
        assert_eq!(merge_property_declarations(&a, &b).privacy, Privacy::Private);
    }

    #[test]
    fn published_notify_property_adds_attribute_and_event() {
        let mut members = ElementMembers::default();
        members.add_property(Property {
            published: true,
            notify: true,
            ..property("selectedItem")
        });

        let attribute = &members.attributes["selected-item"];
        assert_eq!(attribute.change_event.as_deref(), Some("selected-item-changed"));
        assert!(members.events.contains_key("selected-item-changed"));
    }

    #[test]
    fn private_or_unpublished_properties_have_no_attribute() {
        let mut members = ElementMembers::default();
        members.add_property(Property {
            published: true,
            privacy: Privacy::Protected,
            ..property("_internal")
        });
        members.add_property(property("plain"));
        assert!(members.attributes.is_empty());
        assert_eq!(members.properties.len(), 2);
    }

    #[test]
    fn inherit_never_overrides_own_members() {
        let mut own = ElementMembers::default();
        own.add_property(property("a"));
        let mut ancestor = ElementMembers::default();
        ancestor.add_property(Property {
            description: "inherited".into(),
            ..property("a")
        });
        ancestor.add_property(property("b"));

        let mut merged = own.clone();
        merged.inherit(&own, &ancestor, "Base");

        assert_eq!(merged.properties["a"].description, "");
        assert_eq!(merged.properties["b"].inherited_from.as_deref(), Some("Base"));
    }
}
