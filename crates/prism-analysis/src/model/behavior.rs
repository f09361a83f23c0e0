use std::sync::Arc;

use serde::Serialize;

use super::jsdoc::{Annotation, Privacy};
use super::members::{Demo, ElementMembers, Listener, Observer, ScannedReference};
use super::resolve::ResolutionScope;
use super::{Feature, SourceRange, Warning};

/// A `@polymerBehavior` object (or array of behaviors).
#[derive(Debug, Clone)]
pub struct ScannedBehavior {
    pub name: String,
    pub description: String,
    pub jsdoc: Option<Annotation>,
    pub members: ElementMembers,
    pub observers: Vec<Observer>,
    pub listeners: Vec<Listener>,
    /// Behaviors composed into this one through an array literal or a
    /// `behaviors` key.
    pub behaviors: Vec<ScannedReference>,
    pub demos: Vec<Demo>,
    pub privacy: Privacy,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
}

impl ScannedBehavior {
    pub(crate) fn resolve(&self, scope: &mut ResolutionScope<'_>) -> Option<Feature> {
        let mut warnings = self.warnings.clone();
        let chain = scope.prototype_chain(None, &[], &self.behaviors, &mut warnings);
        let members = chain.inherit_into(&self.members);

        Some(Feature::Behavior(Arc::new(Behavior {
            name: self.name.clone(),
            description: self.description.clone(),
            members,
            observers: self.observers.clone(),
            listeners: self.listeners.clone(),
            demos: self.demos.clone(),
            privacy: self.privacy,
            source_range: self.source_range.clone(),
            warnings,
            behaviors: chain.behaviors,
        })))
    }
}

#[derive(Debug, Serialize)]
pub struct Behavior {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub members: ElementMembers,
    pub observers: Vec<Observer>,
    pub listeners: Vec<Listener>,
    pub demos: Vec<Demo>,
    pub privacy: Privacy,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
    #[serde(skip)]
    pub behaviors: Vec<Arc<Behavior>>,
}
