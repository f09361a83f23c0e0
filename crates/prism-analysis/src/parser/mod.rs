//! Parsers turn document text into a syntax tree.
//!
//! Every document type (`html`, `js`, `css`, `json`) has one [`Parser`]
//! registered in a [`ParserRegistry`]. Parsers own the source text and an
//! owned [`Ast`]; nothing borrows from a parser arena once `parse` returns,
//! so a [`ParsedDocument`] can be shared across threads and cached.
//!
//! Inline documents (a `<script>` or `<style>` body) are parsed with an
//! [`InlineInfo`] that records where they start in their container, and all
//! ranges they report are translated back into the container's coordinates.

pub mod css;
pub mod html;
pub mod javascript;
pub mod js_ast;
pub mod json;

use std::fmt::Debug;
use std::sync::Arc;

use prism_graph::ResolvedUrl;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::model::{LineIndex, LocationOffset, SourcePosition, SourceRange, Span};

pub use css::{CssDiagnostic, CssNode, CssNodeKind, CssParser, CssReference};
pub use html::{HtmlAttribute, HtmlElement, HtmlNode, HtmlNodeKind, HtmlParser};
pub use javascript::JavaScriptParser;
pub use js_ast::JsAst;
pub use json::JsonParser;

/// Placement of an inline document inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineInfo {
    pub location_offset: LocationOffset,
}

/// Syntax tree of one document.
#[derive(Debug, Clone)]
pub enum Ast {
    Html(HtmlNode),
    Js(JsAst),
    Css(CssNode),
    Json(serde_json::Value),
}

/// The parse result for a single document, top-level or inline.
#[derive(Debug)]
pub struct ParsedDocument {
    /// For inline documents, the URL of the container.
    pub url: ResolvedUrl,
    /// Parser type that produced this document.
    pub kind: String,
    pub contents: String,
    pub ast: Ast,
    line_index: LineIndex,
    location_offset: Option<LocationOffset>,
}

impl ParsedDocument {
    pub fn new(
        url: ResolvedUrl,
        kind: impl Into<String>,
        contents: String,
        ast: Ast,
        inline: Option<&InlineInfo>,
    ) -> Self {
        let line_index = LineIndex::new(&contents);
        Self {
            url,
            kind: kind.into(),
            contents,
            ast,
            line_index,
            location_offset: inline.map(|info| info.location_offset),
        }
    }

    pub fn is_inline(&self) -> bool {
        self.location_offset.is_some()
    }

    pub fn location_offset(&self) -> Option<LocationOffset> {
        self.location_offset
    }

    /// Position of a byte offset, in container coordinates.
    pub fn position(&self, offset: usize) -> SourcePosition {
        let local = self.line_index.position(&self.contents, offset);
        match self.location_offset {
            Some(location_offset) => location_offset.apply(local),
            None => local,
        }
    }

    pub fn source_range(&self, span: Span) -> SourceRange {
        SourceRange {
            file: self.url.clone(),
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }

    /// Source text of `span`, or `""` when it is out of bounds.
    pub fn slice(&self, span: Span) -> &str {
        self.contents.get(span.start..span.end).unwrap_or_default()
    }

    /// Range covering the whole document.
    pub fn full_range(&self) -> SourceRange {
        self.source_range(Span::new(0, self.contents.len()))
    }
}

/// Position of `offset` in `contents`, shifted for inline documents.
pub(crate) fn position_in(
    contents: &str,
    offset: usize,
    inline: Option<&InlineInfo>,
) -> SourcePosition {
    let local = LineIndex::new(contents).position(contents, offset);
    match inline {
        Some(info) => info.location_offset.apply(local),
        None => local,
    }
}

/// Parses the text of one document type.
pub trait Parser: Send + Sync + Debug {
    fn parse(
        &self,
        contents: &str,
        url: &ResolvedUrl,
        inline: Option<&InlineInfo>,
    ) -> Result<ParsedDocument>;
}

/// Parsers keyed by document type.
#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    parsers: FxHashMap<String, Arc<dyn Parser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `html`, `js`, `mjs`, `css` and `json`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("html", Arc::new(HtmlParser));
        registry.register("js", Arc::new(JavaScriptParser::script()));
        registry.register("mjs", Arc::new(JavaScriptParser::module()));
        registry.register("css", Arc::new(CssParser));
        registry.register("json", Arc::new(JsonParser));
        registry
    }

    pub fn register(&mut self, kind: impl Into<String>, parser: Arc<dyn Parser>) {
        self.parsers.insert(kind.into(), parser);
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.parsers.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    /// Parse `contents` as a document of type `kind`.
    ///
    /// Position-anchored failures pass through as
    /// [`AnalysisError::WarningCarrying`]; anything else is reported as
    /// [`AnalysisError::Parse`].
    pub fn parse(
        &self,
        kind: &str,
        contents: &str,
        url: &ResolvedUrl,
        inline: Option<&InlineInfo>,
    ) -> Result<Arc<ParsedDocument>> {
        let parser = self
            .parsers
            .get(kind)
            .ok_or_else(|| AnalysisError::NoKnownParser {
                kind: kind.to_string(),
                url: url.clone(),
            })?;

        debug!(%url, kind, inline = inline.is_some(), "parsing document");
        match parser.parse(contents, url, inline) {
            Ok(document) => Ok(Arc::new(document)),
            Err(error @ AnalysisError::WarningCarrying(_)) => Err(error),
            Err(error) => Err(AnalysisError::Parse {
                url: url.clone(),
                message: error.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kinds_have_no_parser() {
        let registry = ParserRegistry::with_defaults();
        let url = ResolvedUrl::new("notes.txt");
        let error = registry.parse("txt", "hello", &url, None).unwrap_err();
        assert!(matches!(error, AnalysisError::NoKnownParser { ref kind, .. } if kind == "txt"));
        assert_eq!(error.to_string(), "No parser for file type txt (url: notes.txt)");
    }

    #[test]
    fn inline_positions_are_shifted_into_the_container() {
        let registry = ParserRegistry::with_defaults();
        let url = ResolvedUrl::new("index.html");
        let inline = InlineInfo {
            location_offset: LocationOffset { line: 4, col: 8 },
        };
        let parsed = registry
            .parse("js", "var a;\nvar b;", &url, Some(&inline))
            .unwrap();

        assert!(parsed.is_inline());
        assert_eq!(parsed.url, url);
        assert_eq!(parsed.position(4), SourcePosition::new(4, 12));
        assert_eq!(parsed.position(11), SourcePosition::new(5, 4));
    }

    #[test]
    fn slices_out_of_bounds_are_empty() {
        let registry = ParserRegistry::with_defaults();
        let url = ResolvedUrl::new("a.json");
        let parsed = registry.parse("json", "{}", &url, None).unwrap();
        assert_eq!(parsed.slice(Span::new(0, 2)), "{}");
        assert_eq!(parsed.slice(Span::new(1, 10)), "");
    }
}
