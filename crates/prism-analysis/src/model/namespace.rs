use serde::Serialize;

use super::jsdoc::Annotation;
use super::{SourceRange, Warning};

/// An object annotated with `@namespace`, e.g. `Polymer.Foo = {}`.
///
/// Namespaces carry no references, so the scanned form is also the
/// resolved form.
#[derive(Debug, Clone, Serialize)]
pub struct Namespace {
    pub name: String,
    pub description: String,
    pub summary: String,
    #[serde(skip)]
    pub jsdoc: Option<Annotation>,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
}
