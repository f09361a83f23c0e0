//! Scanners over HTML documents.

mod css_import;
mod dom_module;
mod element_reference;
mod import;
mod script;
mod style;

pub use css_import::CssImportScanner;
pub use dom_module::DomModuleScanner;
pub use element_reference::HtmlCustomElementReferenceScanner;
pub use import::HtmlImportScanner;
pub use script::HtmlScriptScanner;
pub use style::HtmlStyleScanner;

use rustc_hash::FxHashMap;

use crate::model::{ImportKind, LocationOffset, ScannedImport, Span};
use crate::parser::{Ast, HtmlAttribute, HtmlNode, HtmlNodeKind, ParsedDocument};

/// The `href` of the first `<base>` element, if any.
pub(crate) fn base_href(document: &ParsedDocument) -> Option<String> {
    let Ast::Html(root) = &document.ast else {
        return None;
    };
    root.descendants()
        .into_iter()
        .filter_map(HtmlNode::element)
        .find(|element| element.tag == "base")
        .and_then(|element| element.attr("href"))
        .map(str::to_string)
}

/// Apply a `<base href>` to a relative URL.
pub(crate) fn with_base(base: Option<&str>, url: &str) -> String {
    let Some(base) = base else {
        return url.to_string();
    };
    if url.starts_with('/') || url.starts_with('#') || url.contains("://") || url.starts_with("data:") {
        return url.to_string();
    }
    match base.rfind('/') {
        Some(slash) => format!("{}{url}", &base[..=slash]),
        None => url.to_string(),
    }
}

/// Whether the whitespace-separated `rel` attribute contains `value`.
pub(crate) fn has_rel(rel: Option<&str>, value: &str) -> bool {
    rel.is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case(value))
    })
}

/// Build an import from a URL-valued attribute of `node`.
pub(crate) fn import_from_attribute(
    document: &ParsedDocument,
    base: Option<&str>,
    kind: ImportKind,
    node: &HtmlNode,
    attribute: &HtmlAttribute,
    lazy: bool,
) -> ScannedImport {
    let value = attribute.value.as_deref().unwrap_or_default();
    ScannedImport::new(
        kind,
        with_base(base, value),
        document.source_range(node.span),
        document.source_range(attribute.value_span.unwrap_or(attribute.name_span)),
        lazy,
    )
}

/// For every element child of `node`, the text of the comment right before
/// it, skipping whitespace-only text.
pub(crate) fn comments_before_children(node: &HtmlNode) -> FxHashMap<usize, String> {
    let mut comments = FxHashMap::default();
    let mut pending: Option<&str> = None;
    for child in &node.children {
        match &child.kind {
            HtmlNodeKind::Comment(text) => pending = Some(text),
            HtmlNodeKind::Text(text) if text.trim().is_empty() => {}
            HtmlNodeKind::Element(_) => {
                if let Some(comment) = pending.take() {
                    comments.insert(child.span.start, comment.to_string());
                }
            }
            _ => pending = None,
        }
    }
    comments
}

/// Where the text at `span` begins, in container coordinates.
pub(crate) fn location_offset(document: &ParsedDocument, span: Span) -> LocationOffset {
    let position = document.position(span.start);
    LocationOffset {
        line: position.line,
        col: position.column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserRegistry;
    use prism_graph::ResolvedUrl;

    #[test]
    fn base_href_applies_to_relative_urls_only() {
        assert_eq!(with_base(Some("/aybabtu/"), "foo.js"), "/aybabtu/foo.js");
        assert_eq!(with_base(Some("/aybabtu/index.html"), "foo.js"), "/aybabtu/foo.js");
        assert_eq!(with_base(Some("/aybabtu/"), "/abs.js"), "/abs.js");
        assert_eq!(with_base(None, "foo.js"), "foo.js");
    }

    #[test]
    fn rel_tokens_are_case_insensitive() {
        assert!(has_rel(Some("Import preload"), "import"));
        assert!(!has_rel(Some("lazy-import"), "import"));
        assert!(!has_rel(None, "import"));
    }

    #[test]
    fn comments_attach_to_the_next_element() {
        let document = ParserRegistry::with_defaults()
            .parse(
                "html",
                "<!-- doc -->\n  <script></script><p></p>",
                &ResolvedUrl::new("a.html"),
                None,
            )
            .unwrap();
        let Ast::Html(root) = &document.ast else {
            panic!("expected html");
        };
        let comments = comments_before_children(root);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments.values().next().map(|c| c.trim()), Some("doc"));
    }
}
