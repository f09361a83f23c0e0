//! CSS parsing.
//!
//! lightningcss parses the stylesheet with error recovery enabled and its
//! rule tree is lowered into [`CssNode`]s. Recovered errors are kept as
//! diagnostics on the stylesheet node instead of failing the parse, since
//! browsers accept far more than a strict parser does.
//!
//! lightningcss reports a location for every rule but not for declarations,
//! so property names and `var()` references are located by searching the
//! rule's text forward from that location.

use std::sync::{Arc, RwLock};

use lightningcss::error::{Error, ParserError};
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::Property;
use lightningcss::properties::custom::{TokenList, TokenOrValue};
use lightningcss::rules::{CssRule, CssRuleList, Location};
use lightningcss::declaration::DeclarationBlock;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::traits::ToCss;
use prism_graph::ResolvedUrl;

use super::{Ast, InlineInfo, ParsedDocument, Parser};
use crate::error::Result;
use crate::model::{LineIndex, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssNode {
    pub kind: CssNodeKind,
    pub span: Span,
    pub children: Vec<CssNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssNodeKind {
    Stylesheet { diagnostics: Vec<CssDiagnostic> },
    Rule { selector: String },
    /// A block at-rule (`@media`, `@supports`, ...) or an unknown at-rule
    /// such as `@apply --mixin;`.
    AtRule {
        name: String,
        references: Vec<CssReference>,
    },
    Declaration {
        property: String,
        property_span: Span,
        references: Vec<CssReference>,
    },
}

/// A custom property named by a value: `var(--x)`, or `--x` in the
/// prelude of `@apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssReference {
    pub name: String,
    pub span: Span,
}

/// A problem lightningcss recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssDiagnostic {
    pub message: String,
    /// 0-based line and column, local to the stylesheet.
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CssParser;

impl Parser for CssParser {
    fn parse(
        &self,
        contents: &str,
        url: &ResolvedUrl,
        inline: Option<&InlineInfo>,
    ) -> Result<ParsedDocument> {
        let warnings = Arc::new(RwLock::new(Vec::new()));
        let options = ParserOptions {
            filename: url.to_string(),
            error_recovery: true,
            warnings: Some(Arc::clone(&warnings)),
            ..Default::default()
        };

        let lowering = Lowering {
            source: contents,
            lines: LineIndex::new(contents),
        };
        let (children, fatal) = match StyleSheet::parse(contents, options) {
            Ok(stylesheet) => (lowering.rules(&stylesheet.rules), None),
            Err(error) => (Vec::new(), Some(diagnostic(&error))),
        };

        let mut diagnostics: Vec<CssDiagnostic> = warnings
            .read()
            .map(|warnings| {
                warnings
                    .iter()
                    .filter(|warning| !is_polymer_mixin(warning))
                    .map(diagnostic)
                    .collect()
            })
            .unwrap_or_default();
        diagnostics.extend(fatal);

        let root = CssNode {
            kind: CssNodeKind::Stylesheet { diagnostics },
            span: Span::new(0, contents.len()),
            children,
        };
        Ok(ParsedDocument::new(
            url.clone(),
            "css",
            contents.to_string(),
            Ast::Css(root),
            inline,
        ))
    }
}

/// `@apply` is a Polymer extension, not an error.
fn is_polymer_mixin(warning: &Error<ParserError<'_>>) -> bool {
    matches!(&warning.kind, ParserError::AtRuleInvalid(name) if name.eq_ignore_ascii_case("apply"))
}

fn diagnostic(error: &Error<ParserError<'_>>) -> CssDiagnostic {
    let (line, column) = error.loc.as_ref().map_or((0, 0), |loc| {
        (loc.line as usize, (loc.column as usize).saturating_sub(1))
    });
    CssDiagnostic {
        message: error.kind.to_string(),
        line,
        column,
    }
}

struct Lowering<'s> {
    source: &'s str,
    lines: LineIndex,
}

impl Lowering<'_> {
    fn offset(&self, loc: &Location) -> usize {
        self.lines.offset_utf16(
            self.source,
            loc.line as usize,
            (loc.column as usize).saturating_sub(1),
        )
    }

    fn rules(&self, rules: &CssRuleList<'_>) -> Vec<CssNode> {
        let mut nodes = Vec::new();
        for rule in &rules.0 {
            self.rule(rule, &mut nodes);
        }
        nodes
    }

    fn rule(&self, rule: &CssRule<'_>, out: &mut Vec<CssNode>) {
        match rule {
            CssRule::Style(style) => {
                let start = self.offset(&style.loc);
                let body = self
                    .source
                    .get(start..)
                    .and_then(|rest| rest.find('{'))
                    .map_or(start, |brace| start + brace + 1);
                let mut children = self.declarations(&style.declarations, body);
                children.extend(self.rules(&style.rules));
                out.push(CssNode {
                    kind: CssNodeKind::Rule {
                        selector: style
                            .selectors
                            .to_css_string(PrinterOptions::default())
                            .unwrap_or_default(),
                    },
                    span: enclosing(start, &children),
                    children,
                });
            }
            CssRule::NestedDeclarations(nested) => {
                out.extend(self.declarations(&nested.declarations, self.offset(&nested.loc)));
            }
            CssRule::Media(media) => out.push(self.block("media", &media.loc, &media.rules)),
            CssRule::Supports(supports) => {
                out.push(self.block("supports", &supports.loc, &supports.rules));
            }
            CssRule::LayerBlock(layer) => out.push(self.block("layer", &layer.loc, &layer.rules)),
            CssRule::Container(container) => {
                out.push(self.block("container", &container.loc, &container.rules));
            }
            CssRule::Unknown(unknown) => {
                let start = self.offset(&unknown.loc);
                let apply = unknown.name.eq_ignore_ascii_case("apply");
                let mut names = Vec::new();
                referenced_names(&unknown.prelude, apply, &mut names);
                if let Some(block) = &unknown.block {
                    referenced_names(block, false, &mut names);
                }
                let mut cursor = start;
                let references = self.locate(&names, &mut cursor);
                out.push(CssNode {
                    kind: CssNodeKind::AtRule {
                        name: unknown.name.to_ascii_lowercase(),
                        references,
                    },
                    span: Span::new(start, cursor),
                    children: Vec::new(),
                });
            }
            _ => {}
        }
    }

    fn block(&self, name: &str, loc: &Location, rules: &CssRuleList<'_>) -> CssNode {
        let start = self.offset(loc);
        let children = self.rules(rules);
        CssNode {
            kind: CssNodeKind::AtRule {
                name: name.to_string(),
                references: Vec::new(),
            },
            span: enclosing(start, &children),
            children,
        }
    }

    /// Declarations of one block, `!important` ones after the rest.
    fn declarations(&self, block: &DeclarationBlock<'_>, body: usize) -> Vec<CssNode> {
        let mut nodes = Vec::new();
        for declarations in [&block.declarations, &block.important_declarations] {
            let mut cursor = body;
            for property in declarations {
                nodes.push(self.declaration(property, &mut cursor));
            }
        }
        nodes
    }

    fn declaration(&self, property: &Property<'_>, cursor: &mut usize) -> CssNode {
        let mut names = Vec::new();
        let name = match property {
            Property::Custom(custom) => {
                referenced_names(&custom.value, false, &mut names);
                custom.name.as_ref().to_string()
            }
            Property::Unparsed(unparsed) => {
                referenced_names(&unparsed.value, false, &mut names);
                unparsed.property_id.name().to_string()
            }
            other => other.property_id().name().to_string(),
        };

        let property_span = match self.find_name(&name, *cursor, true) {
            Some(start) => Span::new(start, start + name.len()),
            None => Span::new(*cursor, *cursor),
        };
        *cursor = property_span.end;
        let mut value_cursor = property_span.end;
        let references = self.locate(&names, &mut value_cursor);

        CssNode {
            kind: CssNodeKind::Declaration {
                property: name,
                property_span,
                references,
            },
            span: Span::new(property_span.start, value_cursor),
            children: Vec::new(),
        }
    }

    /// Spans of `names`, each searched after the previous one.
    fn locate(&self, names: &[String], cursor: &mut usize) -> Vec<CssReference> {
        names
            .iter()
            .map(|name| {
                let span = match self.find_name(name, *cursor, false) {
                    Some(start) => Span::new(start, start + name.len()),
                    None => Span::new(*cursor, *cursor),
                };
                *cursor = span.end;
                CssReference {
                    name: name.clone(),
                    span,
                }
            })
            .collect()
    }

    /// First whole-identifier occurrence of `name` at or after `from`,
    /// optionally followed by a `:`.
    fn find_name(&self, name: &str, from: usize, declared: bool) -> Option<usize> {
        let rest = self.source.get(from..)?;
        rest.match_indices(name).map(|(idx, _)| from + idx).find(|&start| {
            let end = start + name.len();
            let before = self.source[..start].chars().next_back();
            let after = &self.source[end..];
            if before.is_some_and(is_ident_char) || after.chars().next().is_some_and(is_ident_char) {
                return false;
            }
            !declared || after.trim_start().starts_with(':')
        })
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

fn enclosing(start: usize, children: &[CssNode]) -> Span {
    let end = children.iter().map(|child| child.span.end).max().unwrap_or(start);
    Span::new(start, end.max(start))
}

/// Custom property names a token list refers to, in source order. With
/// `dashed_idents`, bare `--x` tokens count too.
fn referenced_names(tokens: &TokenList<'_>, dashed_idents: bool, out: &mut Vec<String>) {
    for token in &tokens.0 {
        match token {
            TokenOrValue::Var(variable) => {
                out.push(variable.name.ident.to_string());
                if let Some(fallback) = &variable.fallback {
                    referenced_names(fallback, dashed_idents, out);
                }
            }
            TokenOrValue::Function(function) => {
                referenced_names(&function.arguments, dashed_idents, out);
            }
            TokenOrValue::DashedIdent(ident) if dashed_idents => out.push(ident.to_string()),
            _ => {}
        }
    }
}
