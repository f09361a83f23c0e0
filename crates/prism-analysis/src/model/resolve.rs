//! Cross-document lookups during resolution.
//!
//! A [`ResolutionScope`] lives for one top-level [`Document`] resolution. It
//! accumulates the features resolved so far (including those of inline
//! documents, which share their container's scope) and answers name lookups
//! against them and against everything they transitively import.

use std::sync::Arc;

use prism_graph::ResolvedUrl;
use rustc_hash::FxHashSet;

use super::members::{ElementMembers, ScannedReference};
use super::{Behavior, Document, ElementMixin, Feature, FeatureKind, FeatureQuery, Severity, Warning};

/// What resolution needs from the analysis context.
pub trait DocumentResolver {
    /// Resolve a URL found in the document `base`.
    fn resolve_url(&self, url: &str, base: &ResolvedUrl) -> ResolvedUrl;

    /// The resolved document for `url`, building it if it was scanned.
    fn get_document(&self, url: &ResolvedUrl) -> Result<Arc<Document>, Warning>;
}

pub struct ResolutionScope<'a> {
    resolver: &'a dyn DocumentResolver,
    base_url: ResolvedUrl,
    visible: Vec<Feature>,
    warnings: Vec<Warning>,
}

impl<'a> ResolutionScope<'a> {
    pub fn new(resolver: &'a dyn DocumentResolver, base_url: ResolvedUrl) -> Self {
        Self {
            resolver,
            base_url,
            visible: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn resolve_url(&self, url: &str) -> ResolvedUrl {
        self.resolver.resolve_url(url, &self.base_url)
    }

    pub fn document(&self, url: &ResolvedUrl) -> Result<Arc<Document>, Warning> {
        self.resolver.get_document(url)
    }

    /// Record a warning on the document being resolved.
    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    pub(crate) fn restore_warnings(&mut self, warnings: Vec<Warning>) {
        self.warnings = warnings;
    }

    pub(crate) fn push_visible(&mut self, feature: Feature) {
        self.visible.push(feature);
    }

    /// Features of `kind` named `identifier`, in declaration order, searching
    /// imports transitively and across package boundaries.
    pub fn lookup(&self, kind: FeatureKind, identifier: &str) -> Vec<Feature> {
        let query = FeatureQuery::kind(kind)
            .id(identifier)
            .imported(true)
            .external_packages(true);

        let mut visited = FxHashSet::default();
        let mut found = Vec::new();
        for feature in &self.visible {
            if query.matches(feature) {
                found.push(feature.clone());
            }
            if let Feature::Import(import) = feature {
                import
                    .document()
                    .collect_features(&query, &mut visited, &mut found);
            }
        }
        found
    }

    /// Look up the superclass, mixins and behaviors of a class-like feature.
    ///
    /// A superclass that cannot be found is dropped silently. Unknown mixins
    /// and behaviors produce warnings; when several behaviors share a name the
    /// most recently declared one wins.
    pub fn prototype_chain(
        &self,
        super_class: Option<&ScannedReference>,
        mixins: &[ScannedReference],
        behaviors: &[ScannedReference],
        warnings: &mut Vec<Warning>,
    ) -> PrototypeChain {
        let super_class = super_class.and_then(|reference| {
            let mut found = self.lookup(FeatureKind::Class, &reference.identifier);
            if found.is_empty() {
                found = self.lookup(FeatureKind::Element, &reference.identifier);
            }
            found.pop()
        });

        let mut resolved_mixins = Vec::new();
        for reference in mixins {
            let found = self.lookup(FeatureKind::ElementMixin, &reference.identifier);
            match found.last() {
                Some(Feature::ElementMixin(mixin)) => resolved_mixins.push(Arc::clone(mixin)),
                _ => warnings.push(Warning::new(
                    "unknown-mixin",
                    format!(
                        "Unable to resolve mixin `{}`. Did you import it? Is it annotated with @mixinFunction?",
                        reference.identifier
                    ),
                    Severity::Warning,
                    reference.source_range.clone(),
                )),
            }
        }

        let mut resolved_behaviors = Vec::new();
        for reference in behaviors {
            let found = self.lookup(FeatureKind::Behavior, &reference.identifier);
            if found.is_empty() {
                warnings.push(Warning::new(
                    "unknown-polymer-behavior",
                    format!(
                        "Unable to resolve behavior `{}`. Did you import it? Is it annotated with @polymerBehavior?",
                        reference.identifier
                    ),
                    Severity::Warning,
                    reference.source_range.clone(),
                ));
                continue;
            }
            if found.len() > 1 {
                warnings.push(Warning::new(
                    "multiple-polymer-behaviors",
                    format!("Found more than one behavior named {}.", reference.identifier),
                    Severity::Warning,
                    reference.source_range.clone(),
                ));
            }
            if let Some(Feature::Behavior(behavior)) = found.last() {
                resolved_behaviors.push(Arc::clone(behavior));
            }
        }

        PrototypeChain {
            super_class,
            mixins: resolved_mixins,
            behaviors: resolved_behaviors,
        }
    }
}

/// The resolved ancestors of a class-like feature, in prototype order.
#[derive(Debug, Default)]
pub struct PrototypeChain {
    pub super_class: Option<Feature>,
    pub mixins: Vec<Arc<ElementMixin>>,
    pub behaviors: Vec<Arc<Behavior>>,
}

impl PrototypeChain {
    /// `own` plus every member inherited from the chain.
    pub fn inherit_into(&self, own: &ElementMembers) -> ElementMembers {
        let mut members = own.clone();

        if let Some(super_class) = &self.super_class {
            if let Some(inherited) = super_class.members() {
                members.inherit(own, inherited, super_class.name().unwrap_or_default());
            }
        }
        for mixin in &self.mixins {
            members.inherit(own, &mixin.members, &mixin.name);
        }
        for behavior in &self.behaviors {
            members.inherit(own, &behavior.members, &behavior.name);
        }

        members
    }
}
