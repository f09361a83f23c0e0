//! The scanned and resolved feature unions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::members::ElementMembers;
use super::resolve::ResolutionScope;
use super::{
    Behavior, Class, CssCustomProperty, Document, DomModule, Element, ElementKind, ElementMixin,
    ElementReference, Function, Import, Namespace, ScannedBehavior, ScannedClass, ScannedElement,
    ScannedImport, ScannedInlineDocument, ScannedMixin, SourceRange, Warning,
};

/// Query kinds. A feature can answer to several kinds at once: a Polymer
/// element is both an `element` and a `polymer-element`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureKind {
    Import,
    HtmlImport,
    HtmlScript,
    HtmlStyle,
    JsImport,
    CssImport,
    Document,
    HtmlDocument,
    JsDocument,
    CssDocument,
    JsonDocument,
    Element,
    PolymerElement,
    Behavior,
    Class,
    ElementMixin,
    Namespace,
    Function,
    DomModule,
    ElementReference,
    CssCustomPropertyAssignment,
    CssCustomPropertyUse,
}

impl FeatureKind {
    pub const ALL: &'static [FeatureKind] = &[
        FeatureKind::Import,
        FeatureKind::HtmlImport,
        FeatureKind::HtmlScript,
        FeatureKind::HtmlStyle,
        FeatureKind::JsImport,
        FeatureKind::CssImport,
        FeatureKind::Document,
        FeatureKind::HtmlDocument,
        FeatureKind::JsDocument,
        FeatureKind::CssDocument,
        FeatureKind::JsonDocument,
        FeatureKind::Element,
        FeatureKind::PolymerElement,
        FeatureKind::Behavior,
        FeatureKind::Class,
        FeatureKind::ElementMixin,
        FeatureKind::Namespace,
        FeatureKind::Function,
        FeatureKind::DomModule,
        FeatureKind::ElementReference,
        FeatureKind::CssCustomPropertyAssignment,
        FeatureKind::CssCustomPropertyUse,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Import => "import",
            FeatureKind::HtmlImport => "html-import",
            FeatureKind::HtmlScript => "html-script",
            FeatureKind::HtmlStyle => "html-style",
            FeatureKind::JsImport => "js-import",
            FeatureKind::CssImport => "css-import",
            FeatureKind::Document => "document",
            FeatureKind::HtmlDocument => "html-document",
            FeatureKind::JsDocument => "js-document",
            FeatureKind::CssDocument => "css-document",
            FeatureKind::JsonDocument => "json-document",
            FeatureKind::Element => "element",
            FeatureKind::PolymerElement => "polymer-element",
            FeatureKind::Behavior => "behavior",
            FeatureKind::Class => "class",
            FeatureKind::ElementMixin => "element-mixin",
            FeatureKind::Namespace => "namespace",
            FeatureKind::Function => "function",
            FeatureKind::DomModule => "dom-module",
            FeatureKind::ElementReference => "element-reference",
            FeatureKind::CssCustomPropertyAssignment => "css-custom-property-assignment",
            FeatureKind::CssCustomPropertyUse => "css-custom-property-use",
        }
    }

    /// The document kind for a parser type such as `html`.
    pub fn for_document_type(kind: &str) -> Option<FeatureKind> {
        match kind {
            "html" => Some(FeatureKind::HtmlDocument),
            "js" | "mjs" => Some(FeatureKind::JsDocument),
            "css" => Some(FeatureKind::CssDocument),
            "json" => Some(FeatureKind::JsonDocument),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown feature kind `{s}`"))
    }
}

/// A syntax-level fact produced by one scanner.
///
/// References to other features are by name only; [`Document`] resolution
/// turns each one into a [`Feature`].
#[derive(Debug, Clone)]
pub enum ScannedFeature {
    Import(Arc<ScannedImport>),
    InlineDocument(ScannedInlineDocument),
    Element(ScannedElement),
    Behavior(ScannedBehavior),
    Class(ScannedClass),
    Mixin(ScannedMixin),
    Namespace(Namespace),
    Function(Function),
    DomModule(DomModule),
    ElementReference(ElementReference),
    CssCustomPropertyAssignment(CssCustomProperty),
    CssCustomPropertyUse(CssCustomProperty),
}

impl ScannedFeature {
    pub fn source_range(&self) -> &SourceRange {
        match self {
            ScannedFeature::Import(import) => &import.source_range,
            ScannedFeature::InlineDocument(inline) => &inline.source_range,
            ScannedFeature::Element(element) => &element.source_range,
            ScannedFeature::Behavior(behavior) => &behavior.source_range,
            ScannedFeature::Class(class) => &class.source_range,
            ScannedFeature::Mixin(mixin) => &mixin.source_range,
            ScannedFeature::Namespace(namespace) => &namespace.source_range,
            ScannedFeature::Function(function) => &function.source_range,
            ScannedFeature::DomModule(module) => &module.source_range,
            ScannedFeature::ElementReference(reference) => &reference.source_range,
            ScannedFeature::CssCustomPropertyAssignment(property)
            | ScannedFeature::CssCustomPropertyUse(property) => &property.source_range,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            ScannedFeature::Import(import) => &import.warnings,
            ScannedFeature::Element(element) => &element.warnings,
            ScannedFeature::Behavior(behavior) => &behavior.warnings,
            ScannedFeature::Class(class) => &class.warnings,
            ScannedFeature::Mixin(mixin) => &mixin.warnings,
            ScannedFeature::Namespace(namespace) => &namespace.warnings,
            ScannedFeature::Function(function) => &function.warnings,
            ScannedFeature::DomModule(module) => &module.warnings,
            ScannedFeature::InlineDocument(_)
            | ScannedFeature::ElementReference(_)
            | ScannedFeature::CssCustomPropertyAssignment(_)
            | ScannedFeature::CssCustomPropertyUse(_) => &[],
        }
    }

    /// Resolve against the features visible from the owning document.
    ///
    /// `None` drops the feature. Inline documents are resolved by their
    /// containing [`Document`] and always return `None` here.
    pub(crate) fn resolve(&self, scope: &mut ResolutionScope<'_>) -> Option<Feature> {
        match self {
            ScannedFeature::Import(import) => import.resolve(scope),
            ScannedFeature::InlineDocument(_) => None,
            ScannedFeature::Element(element) => element.resolve(scope),
            ScannedFeature::Behavior(behavior) => behavior.resolve(scope),
            ScannedFeature::Class(class) => class.resolve(scope),
            ScannedFeature::Mixin(mixin) => mixin.resolve(scope),
            ScannedFeature::Namespace(namespace) => {
                Some(Feature::Namespace(Arc::new(namespace.clone())))
            }
            ScannedFeature::Function(function) => Some(Feature::Function(Arc::new(function.clone()))),
            ScannedFeature::DomModule(module) => Some(Feature::DomModule(Arc::new(module.clone()))),
            ScannedFeature::ElementReference(reference) => {
                Some(Feature::ElementReference(Arc::new(reference.clone())))
            }
            ScannedFeature::CssCustomPropertyAssignment(property) => Some(
                Feature::CssCustomPropertyAssignment(Arc::new(property.clone())),
            ),
            ScannedFeature::CssCustomPropertyUse(property) => {
                Some(Feature::CssCustomPropertyUse(Arc::new(property.clone())))
            }
        }
    }
}

/// A resolved feature. Cloning is cheap: every variant is an `Arc`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "feature", rename_all = "kebab-case")]
pub enum Feature {
    Import(Arc<Import>),
    Document(Arc<Document>),
    Element(Arc<Element>),
    Behavior(Arc<Behavior>),
    Class(Arc<Class>),
    ElementMixin(Arc<ElementMixin>),
    Namespace(Arc<Namespace>),
    Function(Arc<Function>),
    DomModule(Arc<DomModule>),
    ElementReference(Arc<ElementReference>),
    CssCustomPropertyAssignment(Arc<CssCustomProperty>),
    CssCustomPropertyUse(Arc<CssCustomProperty>),
}

impl Feature {
    pub fn kinds(&self) -> Vec<FeatureKind> {
        match self {
            Feature::Import(import) => vec![FeatureKind::Import, import.kind.feature_kind()],
            Feature::Document(document) => {
                let mut kinds = vec![FeatureKind::Document];
                kinds.extend(FeatureKind::for_document_type(document.kind()));
                kinds
            }
            Feature::Element(element) => match element.kind {
                ElementKind::PolymerCall => vec![FeatureKind::Element, FeatureKind::PolymerElement],
                ElementKind::Class => vec![FeatureKind::Element],
            },
            Feature::Behavior(_) => vec![FeatureKind::Behavior],
            Feature::Class(_) => vec![FeatureKind::Class],
            Feature::ElementMixin(_) => vec![FeatureKind::ElementMixin],
            Feature::Namespace(_) => vec![FeatureKind::Namespace],
            Feature::Function(_) => vec![FeatureKind::Function],
            Feature::DomModule(_) => vec![FeatureKind::DomModule],
            Feature::ElementReference(_) => vec![FeatureKind::ElementReference],
            Feature::CssCustomPropertyAssignment(_) => {
                vec![FeatureKind::CssCustomPropertyAssignment]
            }
            Feature::CssCustomPropertyUse(_) => vec![FeatureKind::CssCustomPropertyUse],
        }
    }

    pub fn has_kind(&self, kind: FeatureKind) -> bool {
        self.kinds().contains(&kind)
    }

    /// Names a query `id` can match.
    pub fn identifiers(&self) -> Vec<&str> {
        match self {
            Feature::Import(import) => vec![import.url.as_str()],
            Feature::Document(document) => vec![document.url().as_str()],
            Feature::Element(element) => element
                .tag_name
                .iter()
                .chain(element.class_name.iter())
                .map(String::as_str)
                .collect(),
            Feature::Behavior(behavior) => vec![behavior.name.as_str()],
            Feature::Class(class) => class.name.iter().map(String::as_str).collect(),
            Feature::ElementMixin(mixin) => vec![mixin.name.as_str()],
            Feature::Namespace(namespace) => vec![namespace.name.as_str()],
            Feature::Function(function) => vec![function.name.as_str()],
            Feature::DomModule(module) => vec![module.id.as_str()],
            Feature::ElementReference(reference) => vec![reference.tag_name.as_str()],
            Feature::CssCustomPropertyAssignment(property)
            | Feature::CssCustomPropertyUse(property) => vec![property.name.as_str()],
        }
    }

    /// A short display name, the first identifier.
    pub fn name(&self) -> Option<&str> {
        self.identifiers().into_iter().next()
    }

    pub fn source_range(&self) -> Option<&SourceRange> {
        match self {
            Feature::Import(import) => Some(&import.source_range),
            Feature::Document(document) => document.source_range(),
            Feature::Element(element) => Some(&element.source_range),
            Feature::Behavior(behavior) => Some(&behavior.source_range),
            Feature::Class(class) => Some(&class.source_range),
            Feature::ElementMixin(mixin) => Some(&mixin.source_range),
            Feature::Namespace(namespace) => Some(&namespace.source_range),
            Feature::Function(function) => Some(&function.source_range),
            Feature::DomModule(module) => Some(&module.source_range),
            Feature::ElementReference(reference) => Some(&reference.source_range),
            Feature::CssCustomPropertyAssignment(property)
            | Feature::CssCustomPropertyUse(property) => Some(&property.source_range),
        }
    }

    /// Warnings attached to this feature itself. Document warnings are
    /// reported through [`Document::get_warnings`].
    pub fn warnings(&self) -> &[Warning] {
        match self {
            Feature::Import(import) => &import.warnings,
            Feature::Element(element) => &element.warnings,
            Feature::Behavior(behavior) => &behavior.warnings,
            Feature::Class(class) => &class.warnings,
            Feature::ElementMixin(mixin) => &mixin.warnings,
            Feature::Namespace(namespace) => &namespace.warnings,
            Feature::Function(function) => &function.warnings,
            Feature::DomModule(module) => &module.warnings,
            Feature::Document(_)
            | Feature::ElementReference(_)
            | Feature::CssCustomPropertyAssignment(_)
            | Feature::CssCustomPropertyUse(_) => &[],
        }
    }

    /// Members a subclass, mixin application or behavior user inherits.
    pub fn members(&self) -> Option<&ElementMembers> {
        match self {
            Feature::Element(element) => Some(&element.members),
            Feature::Behavior(behavior) => Some(&behavior.members),
            Feature::Class(class) => Some(&class.members),
            Feature::ElementMixin(mixin) => Some(&mixin.members),
            _ => None,
        }
    }

    /// Whether both values point at the same resolved feature.
    pub fn ptr_eq(&self, other: &Feature) -> bool {
        match (self, other) {
            (Feature::Import(a), Feature::Import(b)) => Arc::ptr_eq(a, b),
            (Feature::Document(a), Feature::Document(b)) => Arc::ptr_eq(a, b),
            (Feature::Element(a), Feature::Element(b)) => Arc::ptr_eq(a, b),
            (Feature::Behavior(a), Feature::Behavior(b)) => Arc::ptr_eq(a, b),
            (Feature::Class(a), Feature::Class(b)) => Arc::ptr_eq(a, b),
            (Feature::ElementMixin(a), Feature::ElementMixin(b)) => Arc::ptr_eq(a, b),
            (Feature::Namespace(a), Feature::Namespace(b)) => Arc::ptr_eq(a, b),
            (Feature::Function(a), Feature::Function(b)) => Arc::ptr_eq(a, b),
            (Feature::DomModule(a), Feature::DomModule(b)) => Arc::ptr_eq(a, b),
            (Feature::ElementReference(a), Feature::ElementReference(b)) => Arc::ptr_eq(a, b),
            (Feature::CssCustomPropertyAssignment(a), Feature::CssCustomPropertyAssignment(b))
            | (Feature::CssCustomPropertyUse(a), Feature::CssCustomPropertyUse(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }

    pub fn as_element(&self) -> Option<&Arc<Element>> {
        match self {
            Feature::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_import(&self) -> Option<&Arc<Import>> {
        match self {
            Feature::Import(import) => Some(import),
            _ => None,
        }
    }

    pub fn as_behavior(&self) -> Option<&Arc<Behavior>> {
        match self {
            Feature::Behavior(behavior) => Some(behavior),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Arc<Class>> {
        match self {
            Feature::Class(class) => Some(class),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_their_names() {
        for kind in FeatureKind::ALL {
            assert_eq!(kind.as_str().parse::<FeatureKind>(), Ok(*kind));
        }
        assert!("widget".parse::<FeatureKind>().is_err());
    }

    #[test]
    fn document_kinds_follow_parser_types() {
        assert_eq!(FeatureKind::for_document_type("mjs"), Some(FeatureKind::JsDocument));
        assert_eq!(FeatureKind::for_document_type("txt"), None);
    }
}
