use serde::Serialize;

use super::SourceRange;

/// A CSS custom property, either assigned (`--x: ...`) or used
/// (`var(--x)`, `@apply --x`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CssCustomProperty {
    pub name: String,
    pub source_range: SourceRange,
}
