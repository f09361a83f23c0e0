use serde::Serialize;

use super::SourceRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceAttribute {
    pub name: String,
    pub value: Option<String>,
    pub source_range: SourceRange,
}

/// A use of a custom element (any tag containing `-`) in HTML.
#[derive(Debug, Clone, Serialize)]
pub struct ElementReference {
    pub tag_name: String,
    pub attributes: Vec<ReferenceAttribute>,
    pub source_range: SourceRange,
}
