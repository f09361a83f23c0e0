//! HTML parsing with `tl`.
//!
//! `tl` provides the tree shape; exact byte spans are recovered from the
//! source text. Before parsing, the bodies of `<script>` and `<style>`
//! elements are blanked out (replaced by spaces of the same byte length,
//! newlines kept) so script text can never be mistaken for markup. Those
//! bodies are then exposed as [`HtmlElement::raw_text`] spans into the
//! original source.
//!
//! ```text
//! source ──blank raw text──▶ buffer ──tl::parse──▶ VDom
//!                                                   │
//!        offsets = node pointer - buffer pointer ◀──┘
//! ```

use memchr::memchr;
use prism_graph::ResolvedUrl;

use super::{Ast, InlineInfo, ParsedDocument, Parser};
use crate::error::{AnalysisError, Result};
use crate::model::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlNode {
    pub kind: HtmlNodeKind,
    pub span: Span,
    pub children: Vec<HtmlNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNodeKind {
    Document,
    Element(HtmlElement),
    Text(String),
    /// Comment text without the `<!--`/`-->` delimiters.
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlElement {
    /// Lowercased tag name.
    pub tag: String,
    pub attributes: Vec<HtmlAttribute>,
    /// `<tag ...>` including the angle brackets.
    pub start_tag: Span,
    /// Body of a `<script>` or `<style>` element.
    pub raw_text: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlAttribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Entity-decoded value; `None` for bare attributes such as `hidden`.
    pub value: Option<String>,
    pub name_span: Span,
    /// Span of the value text, without quotes.
    pub value_span: Option<Span>,
}

impl HtmlAttribute {
    /// Whole `name="value"` span.
    pub fn span(&self) -> Span {
        match self.value_span {
            Some(value) => Span::new(self.name_span.start, value.end),
            None => self.name_span,
        }
    }
}

impl HtmlElement {
    pub fn attribute(&self, name: &str) -> Option<&HtmlAttribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Value of `name`; a bare attribute reads as `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attribute(name)
            .map(|attribute| attribute.value.as_deref().unwrap_or_default())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

impl HtmlNode {
    pub fn element(&self) -> Option<&HtmlElement> {
        match &self.kind {
            HtmlNodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Whether this is an element with the given (lowercase) tag.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.element().is_some_and(|element| element.tag == tag)
    }

    /// Pre-order traversal of all descendants, not including `self`.
    pub fn descendants(&self) -> Vec<&HtmlNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&HtmlNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl Parser for HtmlParser {
    fn parse(
        &self,
        contents: &str,
        url: &ResolvedUrl,
        inline: Option<&InlineInfo>,
    ) -> Result<ParsedDocument> {
        let bodies = raw_text_bodies(contents);
        let buffer = blank(contents, &bodies);

        let dom = tl::parse(&buffer, tl::ParserOptions::default()).map_err(|error| {
            AnalysisError::Parse {
                url: url.clone(),
                message: format!("{error:?}"),
            }
        })?;

        let lowering = Lowering {
            source: contents,
            buffer: &buffer,
            bodies: &bodies,
        };
        let parser = dom.parser();
        let children = dom
            .children()
            .iter()
            .filter_map(|handle| lowering.lower(*handle, parser))
            .collect();

        let root = HtmlNode {
            kind: HtmlNodeKind::Document,
            span: Span::new(0, contents.len()),
            children,
        };
        Ok(ParsedDocument::new(
            url.clone(),
            "html",
            contents.to_string(),
            Ast::Html(root),
            inline,
        ))
    }
}

struct Lowering<'s> {
    source: &'s str,
    buffer: &'s str,
    bodies: &'s [Span],
}

impl Lowering<'_> {
    fn lower(&self, handle: tl::NodeHandle, parser: &tl::Parser<'_>) -> Option<HtmlNode> {
        match handle.get(parser)? {
            tl::Node::Tag(tag) => {
                let name = tag.name().as_utf8_str().to_ascii_lowercase();
                if name.is_empty() || name.starts_with('!') || name.starts_with('?') {
                    return None;
                }
                let raw = tag.raw().as_bytes();
                let start = offset_of(self.buffer, raw)?;
                let bytes = self.source.as_bytes();
                let start_tag_end = find_tag_end(bytes, start + 1)
                    .map_or(start + raw.len(), |gt| gt + 1);
                let start_tag = Span::new(start, start_tag_end);

                let raw_text = if name == "script" || name == "style" {
                    self.bodies
                        .iter()
                        .find(|body| body.start == start_tag.end)
                        .copied()
                } else {
                    None
                };
                let children: Vec<HtmlNode> = if raw_text.is_some() {
                    Vec::new()
                } else {
                    tag.children()
                        .top()
                        .iter()
                        .filter_map(|child| self.lower(*child, parser))
                        .collect()
                };

                let mut end = start + raw.len();
                if let Some(body) = raw_text {
                    end = end.max(body.end);
                }
                if let Some(last) = children.last() {
                    end = end.max(last.span.end);
                }

                Some(HtmlNode {
                    kind: HtmlNodeKind::Element(HtmlElement {
                        attributes: parse_attributes(self.source, start_tag),
                        tag: name,
                        start_tag,
                        raw_text,
                    }),
                    span: Span::new(start, end),
                    children,
                })
            }
            tl::Node::Raw(bytes) => {
                let start = offset_of(self.buffer, bytes.as_bytes())?;
                let span = Span::new(start, start + bytes.as_bytes().len());
                Some(HtmlNode {
                    kind: HtmlNodeKind::Text(self.source.get(span.start..span.end)?.to_string()),
                    span,
                    children: Vec::new(),
                })
            }
            tl::Node::Comment(bytes) => {
                let start = offset_of(self.buffer, bytes.as_bytes())?;
                let span = Span::new(start, start + bytes.as_bytes().len());
                let text = self.source.get(span.start..span.end)?;
                let text = text.strip_prefix("<!--").unwrap_or(text);
                let text = text.strip_suffix("-->").unwrap_or(text);
                Some(HtmlNode {
                    kind: HtmlNodeKind::Comment(text.to_string()),
                    span,
                    children: Vec::new(),
                })
            }
        }
    }
}

/// Byte offset of `bytes` within `base`, if it is a sub-slice of it.
fn offset_of(base: &str, bytes: &[u8]) -> Option<usize> {
    let start = (bytes.as_ptr() as usize).checked_sub(base.as_ptr() as usize)?;
    (start + bytes.len() <= base.len()).then_some(start)
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

/// Index of the `>` closing a tag, skipping quoted attribute values.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote = None;
    for (idx, &byte) in bytes.iter().enumerate().skip(from) {
        match (quote, byte) {
            (Some(open), _) if byte == open => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return Some(idx),
            (None, _) => {}
        }
    }
    None
}

/// Body spans of every `<script>` and `<style>` element, outside comments.
fn raw_text_bodies(source: &str) -> Vec<Span> {
    let bytes = source.as_bytes();
    let lower = source.to_ascii_lowercase();
    let mut bodies = Vec::new();
    let mut idx = 0;

    while let Some(found) = memchr(b'<', &bytes[idx..]) {
        let at = idx + found;
        let rest = &lower[at..];
        if rest.starts_with("<!--") {
            idx = rest[4..].find("-->").map_or(bytes.len(), |end| at + 4 + end + 3);
            continue;
        }
        let name = if rest.starts_with("<script") {
            "script"
        } else if rest.starts_with("<style") {
            "style"
        } else {
            idx = at + 1;
            continue;
        };
        let after_name = at + 1 + name.len();
        if !bytes
            .get(after_name)
            .is_some_and(|&byte| is_space(byte) || byte == b'>' || byte == b'/')
        {
            idx = at + 1;
            continue;
        }
        let Some(gt) = find_tag_end(bytes, after_name) else {
            break;
        };
        let body_start = gt + 1;
        let closing = format!("</{name}");
        let body_end = lower[body_start..]
            .find(&closing)
            .map_or(bytes.len(), |end| body_start + end);
        bodies.push(Span::new(body_start, body_end));
        idx = body_end;
    }
    bodies
}

/// Copy of `source` with every body replaced by spaces, newlines kept.
fn blank(source: &str, bodies: &[Span]) -> String {
    let mut bytes = source.as_bytes().to_vec();
    for body in bodies {
        for byte in &mut bytes[body.start..body.end] {
            if *byte != b'\n' {
                *byte = b' ';
            }
        }
    }
    // Bodies start after `>` and end before `<`, so whole characters were
    // replaced and the buffer is still valid UTF-8.
    String::from_utf8(bytes).unwrap_or_else(|_| source.to_string())
}

/// Attributes of the start tag at `start_tag`, with exact spans.
fn parse_attributes(source: &str, start_tag: Span) -> Vec<HtmlAttribute> {
    let bytes = source.as_bytes();
    let end = start_tag.end.min(bytes.len());
    let mut attributes = Vec::new();

    let mut idx = start_tag.start + 1;
    while idx < end && !is_space(bytes[idx]) && bytes[idx] != b'>' && bytes[idx] != b'/' {
        idx += 1;
    }

    loop {
        while idx < end && (is_space(bytes[idx]) || bytes[idx] == b'/') {
            idx += 1;
        }
        if idx >= end || bytes[idx] == b'>' {
            break;
        }

        let name_start = idx;
        while idx < end && !is_space(bytes[idx]) && !matches!(bytes[idx], b'=' | b'>' | b'/') {
            idx += 1;
        }
        if idx == name_start {
            idx += 1;
            continue;
        }
        let name_span = Span::new(name_start, idx);

        let mut cursor = idx;
        while cursor < end && is_space(bytes[cursor]) {
            cursor += 1;
        }
        let mut value_span = None;
        if cursor < end && bytes[cursor] == b'=' {
            cursor += 1;
            while cursor < end && is_space(bytes[cursor]) {
                cursor += 1;
            }
            match bytes.get(cursor) {
                Some(&quote @ (b'"' | b'\'')) => {
                    let value_start = cursor + 1;
                    let value_end = bytes[value_start..end]
                        .iter()
                        .position(|&byte| byte == quote)
                        .map_or(end, |pos| value_start + pos);
                    value_span = Some(Span::new(value_start, value_end));
                    idx = (value_end + 1).min(end);
                }
                _ => {
                    let value_start = cursor;
                    while cursor < end && !is_space(bytes[cursor]) && bytes[cursor] != b'>' {
                        cursor += 1;
                    }
                    value_span = Some(Span::new(value_start, cursor));
                    idx = cursor;
                }
            }
        }

        let name = source
            .get(name_span.start..name_span.end)
            .unwrap_or_default()
            .to_ascii_lowercase();
        let value = value_span.map(|span| {
            decode_entities(source.get(span.start..span.end).unwrap_or_default())
        });
        attributes.push(HtmlAttribute {
            name,
            value,
            name_span,
            value_span,
        });
    }
    attributes
}

/// Decode the handful of character references common in attribute values.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> HtmlNode {
        let parsed = HtmlParser
            .parse(source, &ResolvedUrl::new("test.html"), None)
            .unwrap();
        match parsed.ast {
            Ast::Html(root) => root,
            other => panic!("expected an HTML ast, got {other:?}"),
        }
    }

    #[test]
    fn attributes_have_exact_spans() {
        let source = r#"<link rel="import" href='foo.html' async>"#;
        let root = parse(source);
        let link = root.children[0].element().unwrap();
        assert_eq!(link.tag, "link");
        assert_eq!(link.attr("rel"), Some("import"));
        assert_eq!(link.attr("async"), Some(""));

        let href = link.attribute("href").unwrap();
        let value_span = href.value_span.unwrap();
        assert_eq!(&source[value_span.start..value_span.end], "foo.html");
        assert_eq!(&source[href.name_span.start..href.name_span.end], "href");
    }

    #[test]
    fn script_bodies_are_raw_text() {
        let source = "<div>\n<script>\nif (a < b && c > d) { x('<p>'); }\n</script>\n</div>";
        let root = parse(source);
        let script = root
            .descendants()
            .into_iter()
            .find(|node| node.is_tag("script"))
            .unwrap();
        let body = script.element().unwrap().raw_text.unwrap();
        assert_eq!(
            &source[body.start..body.end],
            "\nif (a < b && c > d) { x('<p>'); }\n"
        );
        assert!(script.children.is_empty());
    }

    #[test]
    fn commented_out_scripts_are_not_raw_text() {
        let bodies = raw_text_bodies("<!-- <script>x</script> --><style>a{}</style>");
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0], Span::new(34, 37));
    }

    #[test]
    fn comments_and_nesting() {
        let source = "<!-- The element. -->\n<dom-module id=\"x-el\"><template><slot name=\"a\"></slot></template></dom-module>";
        let root = parse(source);
        let comment = root
            .children
            .iter()
            .find_map(|node| match &node.kind {
                HtmlNodeKind::Comment(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(comment.trim(), "The element.");

        let module = root.children.iter().find(|node| node.is_tag("dom-module")).unwrap();
        assert_eq!(module.element().unwrap().attr("id"), Some("x-el"));
        assert!(module.descendants().iter().any(|node| node.is_tag("slot")));
        assert_eq!(&source[module.span.start..module.span.start + 11], "<dom-module");
    }

    #[test]
    fn entities_in_values_are_decoded() {
        assert_eq!(decode_entities("a &amp;&amp; b"), "a && b");
        assert_eq!(decode_entities("&quot;x&quot;"), "\"x\"");
    }
}
