//! Polymer databinding expressions.
//!
//! They show up as `{{...}}` and `[[...]]` bindings inside a `<dom-module>`
//! template and as the string values of `observer`, `computed` and
//! `observers` in a Polymer declaration. Each one is parsed as a JavaScript
//! expression and then checked against the small subset of syntax Polymer
//! evaluates.

use std::sync::LazyLock;

use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, UnaryOperator};
use oxc_parser::Parser as OxcParser;
use oxc_span::{GetSpan, SourceType};
use regex::Regex;
use serde::Serialize;

use super::{Severity, SourceRange, Span, Warning};
use crate::parser::ParsedDocument;

const INVALID_EXPRESSION: &str = "invalid-polymer-expression";

/// How much syntax a binding site accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionLimitation {
    /// Template bindings: paths, negation, literals and one method call.
    Full,
    /// A bare method name, as in a property's `observer`.
    IdentifierOnly,
    /// A single method call, as in `computed` and `observers`.
    CallExpression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingDirection {
    /// `[[...]]`
    OneWay,
    /// `{{...}}`
    TwoWay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DatabindingContext {
    /// A string literal in a Polymer declaration object.
    JavaScript,
    TextNode {
        direction: BindingDirection,
    },
    Attribute {
        attribute: String,
        direction: BindingDirection,
        /// The `event` of `value="{{x::event}}"`.
        #[serde(skip_serializing_if = "Option::is_none")]
        event_name: Option<String>,
        /// Whether the binding is the attribute's whole value.
        is_complete_binding: bool,
    },
}

/// A name read by an expression. For `a.b.c` that is `a`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabindingProperty {
    pub name: String,
    pub source_range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabindingExpression {
    pub expression_text: String,
    pub source_range: SourceRange,
    pub context: DatabindingContext,
    pub properties: Vec<DatabindingProperty>,
    /// The method an observer names or a call expression invokes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl DatabindingExpression {
    /// Parse the text at `span` of `document`.
    ///
    /// Never fails: syntax errors and unsupported constructs become
    /// `invalid-polymer-expression` warnings on the returned expression.
    pub fn parse(
        document: &ParsedDocument,
        span: Span,
        context: DatabindingContext,
        limitation: ExpressionLimitation,
    ) -> Self {
        let expression_text = document.slice(span).to_string();
        let mut checker = Checker {
            document,
            base: span.start,
            properties: Vec::new(),
            method_name: None,
            warnings: Vec::new(),
        };

        // `items.*` is a valid Polymer path; `_` keeps every offset in place.
        let normalized = expression_text.replace(".*", "._");
        let allocator = Allocator::default();
        match OxcParser::new(&allocator, &normalized, SourceType::mjs()).parse_expression() {
            Ok(expression) => {
                let end = expression.span().end as usize;
                if end < normalized.trim_end().len() {
                    checker.warn(
                        end,
                        normalized.len(),
                        "Unexpected text after the end of the expression.",
                    );
                } else {
                    checker.check(&expression, limitation);
                }
            }
            Err(errors) => {
                let offset = errors
                    .first()
                    .and_then(|error| error.labels.as_ref())
                    .and_then(|labels| labels.first())
                    .map_or(0, |label| label.offset());
                let message = errors
                    .first()
                    .map(|error| error.message.to_string())
                    .unwrap_or_default();
                checker.warn(
                    offset,
                    offset,
                    format!("Invalid expression syntax: {message}"),
                );
            }
        }

        Self {
            expression_text,
            source_range: document.source_range(span),
            context,
            properties: checker.properties,
            method_name: checker.method_name,
            warnings: checker.warnings,
        }
    }

    /// Every `{{...}}`/`[[...]]` binding inside the text at `span`.
    ///
    /// `attribute` is the attribute name when `span` is an attribute value.
    pub fn in_template_text(
        document: &ParsedDocument,
        span: Span,
        attribute: Option<&str>,
    ) -> Vec<Self> {
        static BINDING: LazyLock<Option<Regex>> =
            LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}|\[\[(.*?)\]\]").ok());
        let Some(binding) = BINDING.as_ref() else {
            return Vec::new();
        };

        let text = document.slice(span);
        let mut expressions = Vec::new();
        for captures in binding.captures_iter(text) {
            let (inner, direction) = match (captures.get(1), captures.get(2)) {
                (Some(inner), _) => (inner, BindingDirection::TwoWay),
                (None, Some(inner)) => (inner, BindingDirection::OneWay),
                (None, None) => continue,
            };
            let Some(whole) = captures.get(0) else {
                continue;
            };

            let mut end = inner.end();
            let mut event_name = None;
            if let Some(attribute) = attribute {
                if direction == BindingDirection::TwoWay {
                    if let Some(separator) = inner.as_str().find("::") {
                        end = inner.start() + separator;
                        event_name = Some(inner.as_str()[separator + 2..].to_string());
                    }
                }
                let context = DatabindingContext::Attribute {
                    attribute: attribute.to_string(),
                    direction,
                    event_name,
                    is_complete_binding: whole.as_str() == text.trim(),
                };
                expressions.push(Self::parse(
                    document,
                    Span::new(span.start + inner.start(), span.start + end),
                    context,
                    ExpressionLimitation::Full,
                ));
            } else {
                expressions.push(Self::parse(
                    document,
                    Span::new(span.start + inner.start(), span.start + end),
                    DatabindingContext::TextNode { direction },
                    ExpressionLimitation::Full,
                ));
            }
        }
        expressions
    }
}

struct Checker<'d> {
    document: &'d ParsedDocument,
    base: usize,
    properties: Vec<DatabindingProperty>,
    method_name: Option<String>,
    warnings: Vec<Warning>,
}

impl Checker<'_> {
    fn range(&self, start: usize, end: usize) -> SourceRange {
        self.document
            .source_range(Span::new(self.base + start, self.base + end))
    }

    fn warn(&mut self, start: usize, end: usize, message: impl Into<String>) {
        let range = self.range(start, end);
        self.warnings.push(Warning::new(
            INVALID_EXPRESSION,
            message,
            Severity::Warning,
            range,
        ));
    }

    fn warn_at(&mut self, expression: &Expression<'_>, message: impl Into<String>) {
        let span = expression.span();
        self.warn(span.start as usize, span.end as usize, message);
    }

    fn check(&mut self, expression: &Expression<'_>, limitation: ExpressionLimitation) {
        match limitation {
            ExpressionLimitation::IdentifierOnly => match expression {
                Expression::Identifier(ident) => {
                    self.method_name = Some(ident.name.to_string());
                }
                other => self.warn_at(other, "Expected just a name here, not an expression."),
            },
            ExpressionLimitation::CallExpression => match expression {
                Expression::CallExpression(_) => self.top_level(expression),
                other => self.warn_at(other, "Expected a function call here."),
            },
            ExpressionLimitation::Full => self.top_level(expression),
        }
    }

    /// The outermost expression of a binding: a call, a negation or a
    /// simple value.
    fn top_level(&mut self, expression: &Expression<'_>) {
        match expression {
            Expression::CallExpression(call) => {
                match path_of(&call.callee) {
                    Some(path) => self.method_name = Some(path),
                    None => self.warn_at(&call.callee, "Expected a method name to call."),
                }
                for argument in &call.arguments {
                    match argument.as_expression() {
                        Some(argument) => self.value(argument),
                        None => self.unsupported(argument.span(), "Spread arguments"),
                    }
                }
            }
            Expression::UnaryExpression(unary) if unary.operator == UnaryOperator::LogicalNot => {
                self.top_level(&unary.argument);
            }
            other => self.value(other),
        }
    }

    /// Call arguments and plain bindings: paths and literals.
    fn value(&mut self, expression: &Expression<'_>) {
        match expression {
            Expression::StringLiteral(_)
            | Expression::NumericLiteral(_)
            | Expression::BooleanLiteral(_)
            | Expression::NullLiteral(_) => {}
            Expression::UnaryExpression(unary)
                if unary.operator == UnaryOperator::UnaryNegation
                    && matches!(unary.argument, Expression::NumericLiteral(_)) => {}
            Expression::Identifier(_)
            | Expression::StaticMemberExpression(_)
            | Expression::ComputedMemberExpression(_) => match root_of(expression) {
                Some((name, start, end)) => {
                    let source_range = self.range(start, end);
                    self.properties.push(DatabindingProperty { name, source_range });
                }
                None => self.warn_at(expression, "Expected a property path here."),
            },
            Expression::CallExpression(_) => {
                self.warn_at(expression, "Polymer does not support nested method calls.");
            }
            other => {
                let span = other.span();
                self.unsupported(span, kind_name(other));
            }
        }
    }

    fn unsupported(&mut self, span: oxc_span::Span, what: &str) {
        self.warn(
            span.start as usize,
            span.end as usize,
            format!(
                "Only simple syntax is supported in Polymer databinding expressions. {what} not expected here."
            ),
        );
    }
}

/// Root identifier of a member chain, with its offsets.
fn root_of(expression: &Expression<'_>) -> Option<(String, usize, usize)> {
    match expression {
        Expression::Identifier(ident) => Some((
            ident.name.to_string(),
            ident.span.start as usize,
            ident.span.end as usize,
        )),
        Expression::StaticMemberExpression(member) => root_of(&member.object),
        Expression::ComputedMemberExpression(member) => match &member.expression {
            Expression::NumericLiteral(_) | Expression::StringLiteral(_) => root_of(&member.object),
            _ => None,
        },
        _ => None,
    }
}

fn path_of(expression: &Expression<'_>) -> Option<String> {
    match expression {
        Expression::Identifier(ident) => Some(ident.name.to_string()),
        Expression::StaticMemberExpression(member) => {
            Some(format!("{}.{}", path_of(&member.object)?, member.property.name))
        }
        _ => None,
    }
}

fn kind_name(expression: &Expression<'_>) -> &'static str {
    match expression {
        Expression::BinaryExpression(_) => "Binary expressions",
        Expression::LogicalExpression(_) => "Logical expressions",
        Expression::ConditionalExpression(_) => "Ternary expressions",
        Expression::AssignmentExpression(_) => "Assignments",
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => "Functions",
        Expression::ObjectExpression(_) => "Object literals",
        Expression::ArrayExpression(_) => "Array literals",
        Expression::TemplateLiteral(_) => "Template literals",
        Expression::UnaryExpression(_) => "Unary operators",
        Expression::ThisExpression(_) => "`this`",
        _ => "This syntax",
    }
}
