use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::model::{ImportKind, ScannedFeature, ScannedInlineDocument, Span};
use crate::parser::{HtmlNode, ParsedDocument};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::{base_href, comments_before_children, import_from_attribute, location_offset};

/// `<script src>` imports and inline `<script>` bodies.
///
/// Inline bodies become inline documents: `js` for classic scripts, `mjs`
/// for `type="module"`, `json` for JSON payloads. Other script types (such
/// as templates) are not scanned.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlScriptScanner;

impl Scanner<HtmlNode> for HtmlScriptScanner {
    fn name(&self) -> &'static str {
        "html-script"
    }

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<HtmlNode> + 'd> {
        Box::new(Visitor {
            document,
            base: base_href(document),
            comments: FxHashMap::default(),
            result: ScanResult::default(),
        })
    }
}

struct Visitor<'d> {
    document: &'d ParsedDocument,
    base: Option<String>,
    /// Preceding HTML comment keyed by element start offset.
    comments: FxHashMap<usize, String>,
    result: ScanResult,
}

/// Inline document type for a script `type` attribute.
fn inline_kind(script_type: Option<&str>) -> Option<&'static str> {
    let Some(script_type) = script_type.map(str::trim) else {
        return Some("js");
    };
    match script_type.to_ascii_lowercase().as_str() {
        "" | "text/javascript" | "application/javascript" | "text/ecmascript"
        | "application/ecmascript" => Some("js"),
        "module" => Some("mjs"),
        other if other.ends_with("json") => Some("json"),
        _ => None,
    }
}

impl Visitor<'_> {
    fn inline(&mut self, node: &HtmlNode, body: Span, kind: &str) {
        let mut inline = ScannedInlineDocument::new(
            kind,
            self.document.slice(body),
            location_offset(self.document, body),
            self.document.source_range(node.span),
        );
        inline.attached_comment = self.comments.get(&node.span.start).cloned();
        self.result.features.push(ScannedFeature::InlineDocument(inline));
    }
}

impl ScanVisitor<HtmlNode> for Visitor<'_> {
    fn enter(&mut self, node: &HtmlNode) -> VisitControl {
        self.comments.extend(comments_before_children(node));

        let Some(element) = node.element() else {
            return VisitControl::Continue;
        };
        if element.tag != "script" {
            return VisitControl::Continue;
        }

        if let Some(src) = element.attribute("src") {
            let import = import_from_attribute(
                self.document,
                self.base.as_deref(),
                ImportKind::HtmlScript,
                node,
                src,
                false,
            );
            self.result.features.push(ScannedFeature::Import(Arc::new(import)));
        } else if let (Some(kind), Some(body)) = (inline_kind(element.attr("type")), element.raw_text) {
            self.inline(node, body, kind);
        }
        VisitControl::SkipChildren
    }

    fn finish(self: Box<Self>) -> ScanResult {
        self.result
    }
}
