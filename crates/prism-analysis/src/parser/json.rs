use prism_graph::ResolvedUrl;

use super::{Ast, InlineInfo, ParsedDocument, Parser};
use crate::error::{AnalysisError, Result};
use crate::model::{Severity, SourcePosition, SourceRange, Warning};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(
        &self,
        contents: &str,
        url: &ResolvedUrl,
        inline: Option<&InlineInfo>,
    ) -> Result<ParsedDocument> {
        match serde_json::from_str::<serde_json::Value>(contents) {
            Ok(value) => Ok(ParsedDocument::new(
                url.clone(),
                "json",
                contents.to_string(),
                Ast::Json(value),
                inline,
            )),
            Err(error) => {
                // serde_json reports 1-based lines and columns.
                let local = SourcePosition::new(
                    error.line().saturating_sub(1),
                    error.column().saturating_sub(1),
                );
                let position = inline.map_or(local, |info| info.location_offset.apply(local));
                Err(AnalysisError::warning(Warning::new(
                    "parse-error",
                    format!("Unable to parse as JSON: {error}"),
                    Severity::Error,
                    SourceRange {
                        file: url.clone(),
                        start: position,
                        end: position,
                    },
                )))
            }
        }
    }
}
