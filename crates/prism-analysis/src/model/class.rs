//! Plain classes and element mixins.

use std::sync::Arc;

use serde::Serialize;

use super::jsdoc::{Annotation, Privacy};
use super::members::{Demo, ElementMembers, ScannedReference};
use super::resolve::ResolutionScope;
use super::{Feature, SourceRange, Warning};

#[derive(Debug, Clone)]
pub struct ScannedClass {
    pub name: Option<String>,
    pub description: String,
    pub jsdoc: Option<Annotation>,
    pub members: ElementMembers,
    pub super_class: Option<ScannedReference>,
    pub mixins: Vec<ScannedReference>,
    pub demos: Vec<Demo>,
    pub privacy: Privacy,
    pub is_abstract: bool,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
}

impl ScannedClass {
    pub(crate) fn resolve(&self, scope: &mut ResolutionScope<'_>) -> Option<Feature> {
        let mut warnings = self.warnings.clone();
        let chain = scope.prototype_chain(self.super_class.as_ref(), &self.mixins, &[], &mut warnings);
        let members = chain.inherit_into(&self.members);

        Some(Feature::Class(Arc::new(Class {
            name: self.name.clone(),
            description: self.description.clone(),
            members,
            super_class: self.super_class.clone(),
            demos: self.demos.clone(),
            privacy: self.privacy,
            is_abstract: self.is_abstract,
            source_range: self.source_range.clone(),
            warnings,
            mixins: chain.mixins,
        })))
    }
}

#[derive(Debug, Serialize)]
pub struct Class {
    pub name: Option<String>,
    pub description: String,
    #[serde(flatten)]
    pub members: ElementMembers,
    pub super_class: Option<ScannedReference>,
    pub demos: Vec<Demo>,
    pub privacy: Privacy,
    pub is_abstract: bool,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
    #[serde(skip)]
    pub mixins: Vec<Arc<ElementMixin>>,
}

/// A `@mixinFunction` / `@polymerMixin` function returning a class.
#[derive(Debug, Clone)]
pub struct ScannedMixin {
    pub name: String,
    pub description: String,
    pub jsdoc: Option<Annotation>,
    pub members: ElementMembers,
    /// Mixins applied by this mixin (`@appliesMixin`).
    pub mixins: Vec<ScannedReference>,
    pub demos: Vec<Demo>,
    pub privacy: Privacy,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
}

impl ScannedMixin {
    pub(crate) fn resolve(&self, scope: &mut ResolutionScope<'_>) -> Option<Feature> {
        let mut warnings = self.warnings.clone();
        let chain = scope.prototype_chain(None, &self.mixins, &[], &mut warnings);
        let members = chain.inherit_into(&self.members);

        Some(Feature::ElementMixin(Arc::new(ElementMixin {
            name: self.name.clone(),
            description: self.description.clone(),
            members,
            demos: self.demos.clone(),
            privacy: self.privacy,
            source_range: self.source_range.clone(),
            warnings,
            mixins: chain.mixins,
        })))
    }
}

#[derive(Debug, Serialize)]
pub struct ElementMixin {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub members: ElementMembers,
    pub demos: Vec<Demo>,
    pub privacy: Privacy,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
    #[serde(skip)]
    pub mixins: Vec<Arc<ElementMixin>>,
}
