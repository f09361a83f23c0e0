//! Scanners turn a parsed document into scanned features.
//!
//! Each [`Scanner`] hands out a fresh, single-use [`ScanVisitor`] per
//! document. The driver walks the owned AST once, pre-order, and offers every
//! node to every visitor:
//!
//! ```text
//!            enter (registration order)
//!   node ──▶ visitor 1 ─▶ visitor 2 ─▶ ... ──▶ children ──▶ leave (same order)
//! ```
//!
//! A visitor that answers [`VisitControl::SkipChildren`] stops seeing the
//! subtree below that node; the other visitors are unaffected. When the walk
//! is over, every visitor is finished and the results are concatenated in
//! registration order.

pub mod css;
pub mod html;
pub mod javascript;

use std::fmt::Debug;
use std::sync::Arc;

use tracing::trace;

use crate::model::{ScannedFeature, Warning};
use crate::parser::{Ast, CssNode, HtmlNode, ParsedDocument};
use crate::parser::js_ast::JsNode;

/// What a visitor wants after entering a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitControl {
    Continue,
    SkipChildren,
}

/// Features and document-level warnings found by one or more scanners.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub features: Vec<ScannedFeature>,
    pub warnings: Vec<Warning>,
}

impl ScanResult {
    pub fn extend(&mut self, other: ScanResult) {
        self.features.extend(other.features);
        self.warnings.extend(other.warnings);
    }
}

/// Per-document scanning state.
pub trait ScanVisitor<N> {
    fn enter(&mut self, _node: &N) -> VisitControl {
        VisitControl::Continue
    }

    fn leave(&mut self, _node: &N) {}

    fn finish(self: Box<Self>) -> ScanResult;
}

/// A scanner for one AST flavour.
pub trait Scanner<N>: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<N> + 'd>;
}

/// Tree shape the driver needs.
pub trait AstNode: Sized {
    fn children(&self) -> &[Self];
}

impl AstNode for HtmlNode {
    fn children(&self) -> &[Self] {
        &self.children
    }
}

impl AstNode for JsNode {
    fn children(&self) -> &[Self] {
        &self.children
    }
}

impl AstNode for CssNode {
    fn children(&self) -> &[Self] {
        &self.children
    }
}

struct Slot<'d, N> {
    visitor: Box<dyn ScanVisitor<N> + 'd>,
    /// Depth of the node whose children this visitor skips.
    skip_below: Option<usize>,
}

fn walk<N: AstNode>(node: &N, slots: &mut [Slot<'_, N>], depth: usize) {
    for slot in slots.iter_mut() {
        if slot.skip_below.is_none() && slot.visitor.enter(node) == VisitControl::SkipChildren {
            slot.skip_below = Some(depth);
        }
    }

    if slots.iter().any(|slot| slot.skip_below.is_none()) {
        for child in node.children() {
            walk(child, slots, depth + 1);
        }
    }

    for slot in slots.iter_mut() {
        match slot.skip_below {
            None => slot.visitor.leave(node),
            Some(skipped) if skipped == depth => {
                slot.skip_below = None;
                slot.visitor.leave(node);
            }
            Some(_) => {}
        }
    }
}

/// Run `scanners` over the tree rooted at `root` in a single walk.
///
/// Features are grouped by scanner in registration order, each group in
/// source order.
pub fn run_scanners<N: AstNode>(
    document: &ParsedDocument,
    root: &N,
    scanners: &[Arc<dyn Scanner<N>>],
) -> ScanResult {
    let mut slots: Vec<Slot<'_, N>> = scanners
        .iter()
        .map(|scanner| Slot {
            visitor: scanner.visitor(document),
            skip_below: None,
        })
        .collect();

    walk(root, &mut slots, 0);

    let mut result = ScanResult::default();
    for (slot, scanner) in slots.into_iter().zip(scanners) {
        let found = slot.visitor.finish();
        trace!(
            url = %document.url,
            scanner = scanner.name(),
            features = found.features.len(),
            warnings = found.warnings.len(),
            "scanner finished"
        );
        result.extend(found);
    }
    result
}


/// The scanners run for each document type.
#[derive(Debug, Clone, Default)]
pub struct ScannerRegistry {
    pub html: Vec<Arc<dyn Scanner<HtmlNode>>>,
    pub js: Vec<Arc<dyn Scanner<JsNode>>>,
    pub css: Vec<Arc<dyn Scanner<CssNode>>>,
}

impl ScannerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in scanner.
    pub fn with_defaults() -> Self {
        Self {
            html: vec![
                Arc::new(html::HtmlImportScanner),
                Arc::new(html::HtmlScriptScanner),
                Arc::new(html::HtmlStyleScanner),
                Arc::new(html::DomModuleScanner),
                Arc::new(html::CssImportScanner),
                Arc::new(html::HtmlCustomElementReferenceScanner),
            ],
            js: vec![
                Arc::new(javascript::PolymerElementScanner),
                Arc::new(javascript::BehaviorScanner),
                Arc::new(javascript::NamespaceScanner),
                Arc::new(javascript::FunctionScanner),
                Arc::new(javascript::ClassScanner),
                Arc::new(javascript::JavaScriptImportScanner),
            ],
            css: vec![Arc::new(css::CssCustomPropertyScanner)],
        }
    }

    /// Scan a parsed document with the scanners for its AST.
    pub fn scan(&self, document: &ParsedDocument) -> ScanResult {
        match &document.ast {
            Ast::Html(root) => run_scanners(document, root, &self.html),
            Ast::Js(ast) => run_scanners(document, &ast.root, &self.js),
            Ast::Css(root) => run_scanners(document, root, &self.css),
            Ast::Json(_) => ScanResult::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{HtmlNodeKind, ParserRegistry};
    use prism_graph::ResolvedUrl;
    use std::sync::Mutex;

    /// Records the tags it sees and skips below `skip`.
    #[derive(Debug)]
    struct Recording {
        skip: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    struct RecordingVisitor {
        skip: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    fn tag(node: &HtmlNode) -> Option<&str> {
        match &node.kind {
            HtmlNodeKind::Element(element) => Some(element.tag.as_str()),
            _ => None,
        }
    }

    impl ScanVisitor<HtmlNode> for RecordingVisitor {
        fn enter(&mut self, node: &HtmlNode) -> VisitControl {
            let Some(tag) = tag(node) else {
                return VisitControl::Continue;
            };
            self.log.lock().unwrap().push(format!("enter {tag}"));
            if tag == self.skip {
                VisitControl::SkipChildren
            } else {
                VisitControl::Continue
            }
        }

        fn leave(&mut self, node: &HtmlNode) {
            if let Some(tag) = tag(node) {
                self.log.lock().unwrap().push(format!("leave {tag}"));
            }
        }

        fn finish(self: Box<Self>) -> ScanResult {
            ScanResult::default()
        }
    }

    impl Scanner<HtmlNode> for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn visitor<'d>(&self, _document: &'d ParsedDocument) -> Box<dyn ScanVisitor<HtmlNode> + 'd> {
            Box::new(RecordingVisitor {
                skip: self.skip,
                log: Arc::clone(&self.log),
            })
        }
    }

    fn parse(html: &str) -> Arc<ParsedDocument> {
        ParserRegistry::with_defaults()
            .parse("html", html, &ResolvedUrl::new("test.html"), None)
            .unwrap()
    }

    #[test]
    fn skipping_is_tracked_per_visitor() {
        let document = parse("<div><span><b></b></span></div><p></p>");
        let skipping = Arc::new(Mutex::new(Vec::new()));
        let seeing = Arc::new(Mutex::new(Vec::new()));
        let scanners: Vec<Arc<dyn Scanner<HtmlNode>>> = vec![
            Arc::new(Recording {
                skip: "span",
                log: Arc::clone(&skipping),
            }),
            Arc::new(Recording {
                skip: "none",
                log: Arc::clone(&seeing),
            }),
        ];
        let Ast::Html(root) = &document.ast else {
            panic!("expected html");
        };
        run_scanners(&document, root, &scanners);

        assert_eq!(
            *skipping.lock().unwrap(),
            ["enter div", "enter span", "leave span", "leave div", "enter p", "leave p"]
        );
        assert!(seeing.lock().unwrap().contains(&"enter b".to_string()));
    }

    #[test]
    fn default_html_scanners_keep_their_registration_order() {
        let names: Vec<_> = ScannerRegistry::with_defaults()
            .html
            .iter()
            .map(|scanner| scanner.name())
            .collect();
        assert_eq!(
            names,
            [
                "html-import",
                "html-script",
                "html-style",
                "dom-module",
                "css-import",
                "element-reference"
            ]
        );
    }

    #[test]
    fn features_follow_scanner_registration_order() {
        let document = parse(
            r#"<dom-module id="x-a"><template></template></dom-module>
<script>Polymer({is: 'x-a'});</script>
<link rel="import" href="late.html">"#,
        );
        let result = ScannerRegistry::with_defaults().scan(&document);
        let kinds: Vec<_> = result
            .features
            .iter()
            .filter_map(|feature| match feature {
                ScannedFeature::DomModule(_) => Some("dom-module"),
                ScannedFeature::InlineDocument(_) => Some("inline"),
                ScannedFeature::Import(_) => Some("import"),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, ["import", "inline", "dom-module"]);
    }

    #[test]
    fn json_documents_have_no_scanners() {
        let document = ParserRegistry::with_defaults()
            .parse("json", "{}", &ResolvedUrl::new("a.json"), None)
            .unwrap();
        let result = ScannerRegistry::with_defaults().scan(&document);
        assert!(result.features.is_empty());
        assert!(result.warnings.is_empty());
    }
}
