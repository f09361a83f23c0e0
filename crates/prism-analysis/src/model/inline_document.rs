use std::sync::Arc;

use super::{LocationOffset, ScannedDocument, SourceRange};

/// A document embedded in another one, such as the body of a `<script>`
/// or `<style>` tag.
///
/// The analysis context parses and scans `contents` after the container
/// has been scanned, and stores the result in `scanned`. Inline documents
/// never enter the scanned-document cache on their own.
#[derive(Debug, Clone)]
pub struct ScannedInlineDocument {
    /// Parser type of the contents: `js`, `css` or `json`.
    pub kind: String,
    pub contents: String,
    pub location_offset: LocationOffset,
    /// HTML comment directly preceding the container tag.
    pub attached_comment: Option<String>,
    pub source_range: SourceRange,
    pub scanned: Option<Arc<ScannedDocument>>,
}

impl ScannedInlineDocument {
    pub fn new(
        kind: impl Into<String>,
        contents: impl Into<String>,
        location_offset: LocationOffset,
        source_range: SourceRange,
    ) -> Self {
        Self {
            kind: kind.into(),
            contents: contents.into(),
            location_offset,
            attached_comment: None,
            source_range,
            scanned: None,
        }
    }
}
