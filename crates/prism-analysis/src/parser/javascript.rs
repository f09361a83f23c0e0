//! JavaScript parsing with oxc.
//!
//! The program is parsed into an arena, walked once with an oxc [`Visit`]or,
//! and lowered into the owned [`JsAst`]. Doc comments are matched to nodes
//! through oxc's `attached_to` offsets: a node gets the `/** */` comment
//! attached to its own first token, or failing that the one attached to the
//! statement that contains it.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, ArrayExpressionElement, AssignmentExpression, AssignmentTarget, BindingPattern,
    BindingPatternKind, CallExpression, Class, ClassElement, ClassType, Declaration,
    ExportAllDeclaration, ExportNamedDeclaration, Expression, FormalParameters, FunctionBody,
    ImportDeclaration, ImportExpression, MethodDefinitionKind, ObjectPropertyKind, PropertyKey,
    PropertyKind, Statement, VariableDeclarator,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser as OxcParser;
use oxc_span::{GetSpan, SourceType};
use prism_graph::ResolvedUrl;
use rustc_hash::FxHashMap;

use super::js_ast::{
    ClassMember, EntryKind, Expr, ExprNode, JsAst, JsClass, JsComment, JsNode, JsNodeKind,
    MemberKind, ObjectEntry, ThisAssignment,
};
use super::{Ast, InlineInfo, ParsedDocument, Parser, position_in};
use crate::error::{AnalysisError, Result};
use crate::model::{Severity, SourceRange, Span, Warning};

/// Parser for `js` and `mjs` documents.
#[derive(Debug, Clone, Copy)]
pub struct JavaScriptParser {
    module_only: bool,
}

impl JavaScriptParser {
    /// Parse as a module, retrying as a classic script if that fails.
    pub fn script() -> Self {
        Self { module_only: false }
    }

    /// Parse strictly as an ES module.
    pub fn module() -> Self {
        Self { module_only: true }
    }
}

impl Parser for JavaScriptParser {
    fn parse(
        &self,
        contents: &str,
        url: &ResolvedUrl,
        inline: Option<&InlineInfo>,
    ) -> Result<ParsedDocument> {
        let allocator = Allocator::default();
        let mut ret = OxcParser::new(&allocator, contents, SourceType::mjs()).parse();

        if !self.module_only && (ret.panicked || !ret.errors.is_empty()) {
            let script = OxcParser::new(&allocator, contents, SourceType::mjs().with_module(false))
                .parse();
            if !script.panicked && script.errors.is_empty() {
                ret = script;
            }
        }
        let is_module = self.module_only || ret.module_record.has_module_syntax;

        if let Some(error) = ret.errors.first() {
            let offset = error
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map_or(0, |label| label.offset());
            let position = position_in(contents, offset, inline);
            return Err(AnalysisError::warning(Warning::new(
                "parse-error",
                format!("Unable to parse as JavaScript: {}", error.message),
                Severity::Error,
                SourceRange {
                    file: url.clone(),
                    start: position,
                    end: position,
                },
            )));
        }

        let program = &ret.program;
        let mut docs = FxHashMap::default();
        let mut comments = Vec::new();
        for comment in program.comments.iter().filter(|comment| comment.is_jsdoc()) {
            docs.insert(comment.attached_to, comment.span);
            comments.push(JsComment {
                span: to_span(comment.span),
                text: slice(contents, comment.span).to_string(),
            });
        }

        let mut lowering = Lowering {
            source: contents,
            docs,
            statements: Vec::new(),
            open: Vec::new(),
            root: JsNode {
                kind: JsNodeKind::Program,
                span: to_span(program.span),
                jsdoc: None,
                children: Vec::new(),
            },
        };
        lowering.visit_program(program);

        let ast = JsAst {
            root: lowering.root,
            comments,
            is_module,
        };
        Ok(ParsedDocument::new(
            url.clone(),
            if self.module_only { "mjs" } else { "js" },
            contents.to_string(),
            Ast::Js(ast),
            inline,
        ))
    }
}

fn to_span(span: oxc_span::Span) -> Span {
    Span::new(span.start as usize, span.end as usize)
}

fn slice(source: &str, span: oxc_span::Span) -> &str {
    source
        .get(span.start as usize..span.end as usize)
        .unwrap_or_default()
}

struct Lowering<'s> {
    source: &'s str,
    /// `attached_to` offset to the doc comment attached there.
    docs: FxHashMap<u32, oxc_span::Span>,
    /// Start offsets of the statements enclosing the current position.
    statements: Vec<u32>,
    open: Vec<JsNode>,
    root: JsNode,
}

impl Lowering<'_> {
    fn doc_at(&self, offset: u32) -> Option<String> {
        self.docs
            .get(&offset)
            .map(|span| slice(self.source, *span).to_string())
    }

    fn node_doc(&self, start: u32) -> Option<String> {
        self.doc_at(start).or_else(|| {
            self.statements
                .last()
                .and_then(|statement| self.doc_at(*statement))
        })
    }

    fn push(&mut self, kind: JsNodeKind, span: oxc_span::Span) {
        let jsdoc = self.node_doc(span.start);
        self.open.push(JsNode {
            kind,
            span: to_span(span),
            jsdoc,
            children: Vec::new(),
        });
    }

    fn pop(&mut self) {
        let Some(node) = self.open.pop() else {
            return;
        };
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.children.push(node),
        }
    }

    fn leaf(&mut self, kind: JsNodeKind, span: oxc_span::Span) {
        self.push(kind, span);
        self.pop();
    }

    fn lower(&self, expr: &Expression<'_>) -> ExprNode {
        let span = expr.span();
        ExprNode {
            expr: self.lower_expr(expr),
            span: to_span(span),
            jsdoc: self.doc_at(span.start),
        }
    }

    fn lower_expr(&self, expr: &Expression<'_>) -> Expr {
        match expr {
            Expression::StringLiteral(lit) => Expr::String(lit.value.to_string()),
            Expression::NumericLiteral(lit) => Expr::Number(lit.value),
            Expression::BooleanLiteral(lit) => Expr::Bool(lit.value),
            Expression::NullLiteral(_) => Expr::Null,
            Expression::Identifier(ident) if ident.name.as_str() == "undefined" => Expr::Undefined,
            Expression::TemplateLiteral(template) if template.expressions.is_empty() => template
                .quasis
                .first()
                .map_or(Expr::Other, |quasi| {
                    let text = quasi.value.cooked.as_ref().unwrap_or(&quasi.value.raw);
                    Expr::String(text.to_string())
                }),
            Expression::UnaryExpression(unary) if unary.operator.as_str() == "-" => {
                match &unary.argument {
                    Expression::NumericLiteral(lit) => Expr::Number(-lit.value),
                    _ => Expr::Other,
                }
            }
            Expression::ParenthesizedExpression(inner) => self.lower_expr(&inner.expression),
            Expression::ArrayExpression(array) => Expr::Array(
                array
                    .elements
                    .iter()
                    .filter_map(ArrayExpressionElement::as_expression)
                    .map(|element| self.lower(element))
                    .collect(),
            ),
            Expression::ObjectExpression(object) => Expr::Object(
                object
                    .properties
                    .iter()
                    .filter_map(|property| match property {
                        ObjectPropertyKind::ObjectProperty(prop) => Some(ObjectEntry {
                            key: if prop.computed {
                                None
                            } else {
                                property_key_name(&prop.key)
                            },
                            kind: match prop.kind {
                                PropertyKind::Get => EntryKind::Get,
                                PropertyKind::Set => EntryKind::Set,
                                PropertyKind::Init if prop.method => EntryKind::Method,
                                PropertyKind::Init => EntryKind::Init,
                            },
                            value: self.lower(&prop.value),
                            jsdoc: self.doc_at(prop.span.start),
                            span: to_span(prop.span),
                        }),
                        ObjectPropertyKind::SpreadProperty(_) => None,
                    })
                    .collect(),
            ),
            Expression::FunctionExpression(function) => Expr::Function {
                params: param_names(&function.params),
                returns: self.first_return(function.body.as_deref()).map(Box::new),
            },
            Expression::ArrowFunctionExpression(arrow) => {
                let returns = if arrow.expression {
                    arrow.body.statements.first().and_then(|statement| match statement {
                        Statement::ExpressionStatement(stmt) => Some(self.lower(&stmt.expression)),
                        _ => None,
                    })
                } else {
                    self.first_return(Some(&*arrow.body))
                };
                Expr::Function {
                    params: param_names(&arrow.params),
                    returns: returns.map(Box::new),
                }
            }
            Expression::ClassExpression(class) => Expr::Class {
                name: class.id.as_ref().map(|id| id.name.to_string()),
            },
            Expression::CallExpression(call) => Expr::Call {
                callee: path_of(&call.callee),
                args: self.lower_args(&call.arguments),
            },
            other => path_of(other).map_or(Expr::Other, Expr::Path),
        }
    }

    fn lower_args(&self, args: &[Argument<'_>]) -> Vec<ExprNode> {
        args.iter()
            .filter_map(Argument::as_expression)
            .map(|arg| self.lower(arg))
            .collect()
    }

    fn first_return(&self, body: Option<&FunctionBody<'_>>) -> Option<ExprNode> {
        body?.statements.iter().find_map(|statement| match statement {
            Statement::ReturnStatement(ret) => ret.argument.as_ref().map(|arg| self.lower(arg)),
            _ => None,
        })
    }

    fn lower_class(&self, class: &Class<'_>) -> JsClass {
        let members = class
            .body
            .body
            .iter()
            .filter_map(|element| match element {
                ClassElement::MethodDefinition(method) => {
                    let kind = match method.kind {
                        MethodDefinitionKind::Constructor => MemberKind::Constructor,
                        MethodDefinitionKind::Method => MemberKind::Method,
                        MethodDefinitionKind::Get => MemberKind::Get,
                        MethodDefinitionKind::Set => MemberKind::Set,
                    };
                    let body = method.value.body.as_deref();
                    Some(ClassMember {
                        name: property_key_name(&method.key),
                        kind,
                        is_static: method.r#static,
                        params: param_names(&method.value.params),
                        returns: self.first_return(body),
                        jsdoc: self.doc_at(method.span.start),
                        span: to_span(method.span),
                        this_assignments: if kind == MemberKind::Constructor {
                            self.this_assignments(body)
                        } else {
                            Vec::new()
                        },
                    })
                }
                ClassElement::PropertyDefinition(prop) => Some(ClassMember {
                    name: property_key_name(&prop.key),
                    kind: MemberKind::Field,
                    is_static: prop.r#static,
                    params: Vec::new(),
                    returns: prop.value.as_ref().map(|value| self.lower(value)),
                    jsdoc: self.doc_at(prop.span.start),
                    span: to_span(prop.span),
                    this_assignments: Vec::new(),
                }),
                _ => None,
            })
            .collect();

        JsClass {
            name: class.id.as_ref().map(|id| id.name.to_string()),
            is_expression: matches!(class.r#type, ClassType::ClassExpression),
            super_class: class.super_class.as_ref().map(|expr| self.lower(expr)),
            members,
        }
    }

    /// `this.foo = ...` and `this.foo;` at the top level of a constructor.
    fn this_assignments(&self, body: Option<&FunctionBody<'_>>) -> Vec<ThisAssignment> {
        let Some(body) = body else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for statement in &body.statements {
            let Statement::ExpressionStatement(stmt) = statement else {
                continue;
            };
            let (member, value_span) = match &stmt.expression {
                Expression::AssignmentExpression(assign) => match &assign.left {
                    AssignmentTarget::StaticMemberExpression(member) => {
                        (member, Some(to_span(assign.right.span())))
                    }
                    _ => continue,
                },
                Expression::StaticMemberExpression(member) => (member, None),
                _ => continue,
            };
            if !matches!(member.object, Expression::ThisExpression(_)) {
                continue;
            }
            found.push(ThisAssignment {
                name: member.property.name.to_string(),
                value_span,
                jsdoc: self.doc_at(stmt.span.start),
                span: to_span(stmt.span),
            });
        }
        found
    }
}

impl<'a> Visit<'a> for Lowering<'_> {
    fn visit_statement(&mut self, it: &Statement<'a>) {
        self.statements.push(it.span().start);
        walk::walk_statement(self, it);
        self.statements.pop();
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        let class = self.lower_class(it);
        self.push(JsNodeKind::Class(class), it.span);
        walk::walk_class(self, it);
        self.pop();
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        let kind = JsNodeKind::Call {
            callee: path_of(&it.callee),
            args: self.lower_args(&it.arguments),
        };
        self.push(kind, it.span);
        walk::walk_call_expression(self, it);
        self.pop();
    }

    fn visit_assignment_expression(&mut self, it: &AssignmentExpression<'a>) {
        let target = match &it.left {
            AssignmentTarget::AssignmentTargetIdentifier(ident) => Some(ident.name.to_string()),
            AssignmentTarget::StaticMemberExpression(member) => path_of(&member.object)
                .map(|object| format!("{object}.{}", member.property.name)),
            _ => None,
        };
        let kind = JsNodeKind::Assignment {
            target,
            value: self.lower(&it.right),
        };
        self.push(kind, it.span);
        walk::walk_assignment_expression(self, it);
        self.pop();
    }

    fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
        let kind = JsNodeKind::VariableDeclarator {
            name: binding_name(&it.id),
            init: it.init.as_ref().map(|init| self.lower(init)),
        };
        self.push(kind, it.span);
        walk::walk_variable_declarator(self, it);
        self.pop();
    }

    fn visit_declaration(&mut self, it: &Declaration<'a>) {
        if let Declaration::FunctionDeclaration(function) = it {
            let kind = JsNodeKind::FunctionDeclaration {
                name: function.id.as_ref().map(|id| id.name.to_string()),
                params: param_names(&function.params),
            };
            self.push(kind, function.span);
            walk::walk_declaration(self, it);
            self.pop();
        } else {
            walk::walk_declaration(self, it);
        }
    }

    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        let kind = JsNodeKind::Import {
            source: Some(it.source.value.to_string()),
            source_span: to_span(it.source.span),
            dynamic: false,
        };
        self.leaf(kind, it.span);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            let kind = JsNodeKind::Import {
                source: Some(source.value.to_string()),
                source_span: to_span(source.span),
                dynamic: false,
            };
            self.leaf(kind, it.span);
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        let kind = JsNodeKind::Import {
            source: Some(it.source.value.to_string()),
            source_span: to_span(it.source.span),
            dynamic: false,
        };
        self.leaf(kind, it.span);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        let source = match &it.source {
            Expression::StringLiteral(lit) => Some(lit.value.to_string()),
            Expression::TemplateLiteral(template) if template.expressions.is_empty() => template
                .quasis
                .first()
                .map(|quasi| quasi.value.raw.to_string()),
            _ => None,
        };
        let kind = JsNodeKind::Import {
            source,
            source_span: to_span(it.source.span()),
            dynamic: true,
        };
        self.push(kind, it.span);
        walk::walk_import_expression(self, it);
        self.pop();
    }
}

/// Dotted path of an identifier or static member chain.
fn path_of(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(ident) => Some(ident.name.to_string()),
        Expression::ThisExpression(_) => Some("this".to_string()),
        Expression::StaticMemberExpression(member) => {
            Some(format!("{}.{}", path_of(&member.object)?, member.property.name))
        }
        Expression::ComputedMemberExpression(member) => match &member.expression {
            Expression::StringLiteral(key) => {
                Some(format!("{}.{}", path_of(&member.object)?, key.value))
            }
            _ => None,
        },
        Expression::ParenthesizedExpression(inner) => path_of(&inner.expression),
        _ => None,
    }
}

fn property_key_name(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(ident) => Some(ident.name.to_string()),
        PropertyKey::PrivateIdentifier(ident) => Some(format!("#{}", ident.name)),
        PropertyKey::StringLiteral(lit) => Some(lit.value.to_string()),
        PropertyKey::NumericLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

fn binding_name(pattern: &BindingPattern<'_>) -> Option<String> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.to_string()),
        BindingPatternKind::AssignmentPattern(assign) => binding_name(&assign.left),
        _ => None,
    }
}

fn param_names(params: &FormalParameters<'_>) -> Vec<String> {
    params
        .items
        .iter()
        .filter_map(|param| binding_name(&param.pattern))
        .collect()
}
