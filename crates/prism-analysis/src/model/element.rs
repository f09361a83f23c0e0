//! Custom elements, both `Polymer({...})` calls and element classes.

use std::sync::Arc;

use serde::Serialize;

use super::jsdoc::{Annotation, Privacy};
use super::members::{
    Demo, ElementMembers, Listener, LocalId, Observer, ScannedReference, Slot, demos_of,
};
use super::resolve::ResolutionScope;
use super::{Behavior, ElementMixin, Feature, FeatureKind, SourceRange, Warning};

/// How an element was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    /// `Polymer({is: 'x-foo', ...})`
    PolymerCall,
    /// `class XFoo extends HTMLElement {}` promoted to an element.
    Class,
}

#[derive(Debug, Clone)]
pub struct ScannedElement {
    pub kind: ElementKind,
    pub tag_name: Option<String>,
    pub class_name: Option<String>,
    pub super_class: Option<ScannedReference>,
    pub mixins: Vec<ScannedReference>,
    pub behaviors: Vec<ScannedReference>,
    /// Native element extended through `extends: 'input'`.
    pub extends: Option<String>,
    pub description: String,
    pub summary: String,
    pub jsdoc: Option<Annotation>,
    pub members: ElementMembers,
    pub observers: Vec<Observer>,
    pub listeners: Vec<Listener>,
    pub demos: Vec<Demo>,
    pub privacy: Privacy,
    pub is_abstract: bool,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
}

impl ScannedElement {
    pub fn new(kind: ElementKind, jsdoc: Option<Annotation>, source_range: SourceRange) -> Self {
        let summary = jsdoc
            .as_ref()
            .and_then(|doc| doc.tag("summary"))
            .and_then(|tag| tag.description.clone())
            .unwrap_or_default();
        Self {
            kind,
            tag_name: None,
            class_name: None,
            super_class: None,
            mixins: Vec::new(),
            behaviors: Vec::new(),
            extends: None,
            description: jsdoc
                .as_ref()
                .map(|doc| doc.description.clone())
                .unwrap_or_default(),
            summary,
            demos: demos_of(jsdoc.as_ref()),
            is_abstract: jsdoc.as_ref().is_some_and(|doc| doc.has_tag("abstract")),
            jsdoc,
            members: ElementMembers::default(),
            observers: Vec::new(),
            listeners: Vec::new(),
            privacy: Privacy::Public,
            source_range,
            warnings: Vec::new(),
        }
    }

    /// An HTML comment right before the `<script>` that defines this element
    /// documents it when the script itself does not.
    pub fn apply_html_comment(&mut self, comment: &str) {
        let annotation = Annotation::parse(comment);
        if self.description.is_empty() {
            self.description = annotation.description.clone();
        }
        let mut demos = demos_of(Some(&annotation));
        demos.append(&mut self.demos);
        self.demos = demos;
    }

    pub(crate) fn resolve(&self, scope: &mut ResolutionScope<'_>) -> Option<Feature> {
        let mut warnings = self.warnings.clone();
        let mut description = self.description.clone();
        let mut demos = self.demos.clone();
        let mut slots = Vec::new();
        let mut local_ids = Vec::new();
        let mut dom_module = None;

        if let Some(tag_name) = &self.tag_name {
            let modules = scope.lookup(FeatureKind::DomModule, tag_name);
            if let [Feature::DomModule(module)] = modules.as_slice() {
                dom_module = Some(module.id.clone());
                slots.extend(module.slots.iter().cloned());
                local_ids.extend(module.local_ids.iter().cloned());
                if let Some(comment) = &module.comment {
                    let doc = Annotation::parse(comment);
                    let mut module_demos = demos_of(Some(&doc));
                    module_demos.append(&mut demos);
                    demos = module_demos;
                    if !doc.description.is_empty() {
                        description = format!("{}\n\n{}", doc.description, description)
                            .trim()
                            .to_string();
                    }
                }
            }
        }

        let chain = scope.prototype_chain(
            self.super_class.as_ref(),
            &self.mixins,
            &self.behaviors,
            &mut warnings,
        );
        let members = chain.inherit_into(&self.members);

        Some(Feature::Element(Arc::new(Element {
            kind: self.kind,
            tag_name: self.tag_name.clone(),
            class_name: self.class_name.clone(),
            super_class: self.super_class.clone(),
            extends: self.extends.clone(),
            description,
            summary: self.summary.clone(),
            members,
            observers: self.observers.clone(),
            listeners: self.listeners.clone(),
            slots,
            local_ids,
            dom_module,
            demos,
            privacy: self.privacy,
            is_abstract: self.is_abstract,
            source_range: self.source_range.clone(),
            warnings,
            mixins: chain.mixins,
            behaviors: chain.behaviors,
        })))
    }
}

/// A resolved custom element.
#[derive(Debug, Serialize)]
pub struct Element {
    pub kind: ElementKind,
    pub tag_name: Option<String>,
    pub class_name: Option<String>,
    pub super_class: Option<ScannedReference>,
    pub extends: Option<String>,
    pub description: String,
    pub summary: String,
    #[serde(flatten)]
    pub members: ElementMembers,
    pub observers: Vec<Observer>,
    pub listeners: Vec<Listener>,
    pub slots: Vec<Slot>,
    pub local_ids: Vec<LocalId>,
    /// Id of the dom-module providing this element's template.
    pub dom_module: Option<String>,
    pub demos: Vec<Demo>,
    pub privacy: Privacy,
    pub is_abstract: bool,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
    #[serde(skip)]
    pub mixins: Vec<Arc<ElementMixin>>,
    #[serde(skip)]
    pub behaviors: Vec<Arc<Behavior>>,
}

impl Element {
    pub fn behavior_names(&self) -> Vec<&str> {
        self.behaviors.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn mixin_names(&self) -> Vec<&str> {
        self.mixins.iter().map(|m| m.name.as_str()).collect()
    }
}
