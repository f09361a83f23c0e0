use serde::Serialize;

use super::members::{LocalId, Slot};
use super::{DatabindingExpression, SourceRange, Warning};

/// A `<dom-module id="...">` holding an element's template.
#[derive(Debug, Clone, Serialize)]
pub struct DomModule {
    pub id: String,
    /// Text of the HTML comment directly before the module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub slots: Vec<Slot>,
    pub local_ids: Vec<LocalId>,
    /// `{{...}}` and `[[...]]` bindings in the template, in source order.
    pub databindings: Vec<DatabindingExpression>,
    pub source_range: SourceRange,
    pub warnings: Vec<Warning>,
}
