//! Scanners over CSS documents.

use crate::model::{CssCustomProperty, ScannedFeature, Severity, SourcePosition, SourceRange, Warning};
use crate::parser::{CssNode, CssNodeKind, CssReference, ParsedDocument};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

/// Custom property assignments (`--x: ...`) and uses (`var(--x)`,
/// `@apply --x`).
///
/// Problems lightningcss recovered from are reported as `css-parse-error`
/// warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssCustomPropertyScanner;

impl Scanner<CssNode> for CssCustomPropertyScanner {
    fn name(&self) -> &'static str {
        "css-custom-property"
    }

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<CssNode> + 'd> {
        Box::new(Visitor {
            document,
            result: ScanResult::default(),
        })
    }
}

struct Visitor<'d> {
    document: &'d ParsedDocument,
    result: ScanResult,
}

impl Visitor<'_> {
    fn uses(&mut self, references: &[CssReference]) {
        for reference in references {
            self.result
                .features
                .push(ScannedFeature::CssCustomPropertyUse(CssCustomProperty {
                    name: reference.name.clone(),
                    source_range: self.document.source_range(reference.span),
                }));
        }
    }
}

impl ScanVisitor<CssNode> for Visitor<'_> {
    fn enter(&mut self, node: &CssNode) -> VisitControl {
        match &node.kind {
            CssNodeKind::Stylesheet { diagnostics } => {
                for diagnostic in diagnostics {
                    let local = SourcePosition::new(diagnostic.line, diagnostic.column);
                    let position = self
                        .document
                        .location_offset()
                        .map_or(local, |offset| offset.apply(local));
                    self.result.warnings.push(Warning::new(
                        "css-parse-error",
                        format!("Unable to parse as CSS: {}", diagnostic.message),
                        Severity::Warning,
                        SourceRange {
                            file: self.document.url.clone(),
                            start: position,
                            end: position,
                        },
                    ));
                }
            }
            CssNodeKind::Declaration {
                property,
                property_span,
                references,
            } => {
                if property.starts_with("--") {
                    self.result
                        .features
                        .push(ScannedFeature::CssCustomPropertyAssignment(CssCustomProperty {
                            name: property.clone(),
                            source_range: self.document.source_range(*property_span),
                        }));
                }
                self.uses(references);
            }
            CssNodeKind::AtRule { references, .. } => self.uses(references),
            CssNodeKind::Rule { .. } => {}
        }
        VisitControl::Continue
    }

    fn finish(self: Box<Self>) -> ScanResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::test_support::scan_css;

    fn names(result: &ScanResult) -> (Vec<&str>, Vec<&str>) {
        let mut assigned = Vec::new();
        let mut used = Vec::new();
        for feature in &result.features {
            match feature {
                ScannedFeature::CssCustomPropertyAssignment(property) => {
                    assigned.push(property.name.as_str());
                }
                ScannedFeature::CssCustomPropertyUse(property) => used.push(property.name.as_str()),
                _ => {}
            }
        }
        (assigned, used)
    }

    #[test]
    fn assignments_and_uses() {
        let result = scan_css(
            &CssCustomPropertyScanner,
            ":host {\n  --primary: red;\n  color: var(--primary, var(--fallback));\n  @apply --card-mixin;\n}\n",
        );
        let (assigned, used) = names(&result);
        assert_eq!(assigned, ["--primary"]);
        assert_eq!(used, ["--primary", "--fallback", "--card-mixin"]);
    }

    #[test]
    fn assignment_range_covers_the_property_name() {
        let result = scan_css(&CssCustomPropertyScanner, "a {\n  --x: 1px;\n}");
        let ScannedFeature::CssCustomPropertyAssignment(property) = &result.features[0] else {
            panic!("expected an assignment");
        };
        assert_eq!(property.source_range.start.line, 1);
        assert_eq!(property.source_range.start.column, 2);
        assert_eq!(property.source_range.end.column, 5);
    }

    #[test]
    fn mixin_values_are_assignments() {
        let result = scan_css(
            &CssCustomPropertyScanner,
            "html { --paper-card: { padding: var(--gap); }; }",
        );
        let (assigned, used) = names(&result);
        assert_eq!(assigned, ["--paper-card"]);
        assert_eq!(used, ["--gap"]);
    }

    #[test]
    fn recovered_errors_become_warnings() {
        let result = scan_css(
            &CssCustomPropertyScanner,
            "!nonsense { color: red; }\nb { --kept: 1px; }",
        );
        assert!(!result.warnings.is_empty());
        for warning in &result.warnings {
            assert_eq!(warning.code, "css-parse-error");
            assert_eq!(warning.severity, Severity::Warning);
            assert_eq!(warning.source_range.start.line, 0);
        }
        let (assigned, _) = names(&result);
        assert_eq!(assigned, ["--kept"]);
    }
}
