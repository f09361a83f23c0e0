use serde::Serialize;

use super::jsdoc::{Annotation, Privacy};
use super::members::Parameter;
use super::{SourceRange, Warning};

/// A function documented with `@memberof` or `@global`.
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub name: String,
    pub description: String,
    pub summary: String,
    pub params: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_description: Option<String>,
    pub privacy: Privacy,
    #[serde(skip)]
    pub jsdoc: Option<Annotation>,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
}
