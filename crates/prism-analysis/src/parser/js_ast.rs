//! Owned JavaScript syntax tree.
//!
//! The oxc AST borrows from an arena that is gone once parsing returns, so
//! the JavaScript parser lowers it into this much smaller tree. Only the
//! node categories scanners care about become [`JsNode`]s; their nesting
//! follows the original containment (a call inside a class method is a child
//! of that class). Expressions that scanners need to inspect statically are
//! kept as [`Expr`] values on the nodes.

use crate::model::{Annotation, Span};

#[derive(Debug, Clone, PartialEq)]
pub struct JsNode {
    pub kind: JsNodeKind,
    pub span: Span,
    /// Doc comment attached to the node or to its enclosing statement.
    pub jsdoc: Option<String>,
    pub children: Vec<JsNode>,
}

impl JsNode {
    pub fn annotation(&self) -> Option<Annotation> {
        self.jsdoc.as_deref().map(Annotation::parse)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsNodeKind {
    Program,
    Class(JsClass),
    Call {
        /// Dotted callee path such as `customElements.define`.
        callee: Option<String>,
        args: Vec<ExprNode>,
    },
    Assignment {
        /// Dotted target path such as `Polymer.Foo` or `this.bar`.
        target: Option<String>,
        value: ExprNode,
    },
    VariableDeclarator {
        name: Option<String>,
        init: Option<ExprNode>,
    },
    FunctionDeclaration {
        name: Option<String>,
        params: Vec<String>,
    },
    /// Static `import`/`export ... from`, or a dynamic `import()`.
    Import {
        /// The specifier, when it is a string literal.
        source: Option<String>,
        source_span: Span,
        dynamic: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsClass {
    pub name: Option<String>,
    pub is_expression: bool,
    pub super_class: Option<ExprNode>,
    pub members: Vec<ClassMember>,
}

impl JsClass {
    /// The value returned by `static get <name>()`.
    pub fn static_getter(&self, name: &str) -> Option<&ExprNode> {
        self.members
            .iter()
            .find(|member| {
                member.is_static
                    && member.kind == MemberKind::Get
                    && member.name.as_deref() == Some(name)
            })
            .and_then(|member| member.returns.as_ref())
    }

    pub fn constructor(&self) -> Option<&ClassMember> {
        self.members
            .iter()
            .find(|member| member.kind == MemberKind::Constructor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Constructor,
    Method,
    Get,
    Set,
    Field,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub name: Option<String>,
    pub kind: MemberKind,
    pub is_static: bool,
    pub params: Vec<String>,
    /// Argument of the first top-level `return` in the body.
    pub returns: Option<ExprNode>,
    pub jsdoc: Option<String>,
    pub span: Span,
    /// `this.x = ...` / `this.x;` statements of a constructor.
    pub this_assignments: Vec<ThisAssignment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThisAssignment {
    pub name: String,
    pub value_span: Option<Span>,
    pub jsdoc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    pub expr: Expr,
    pub span: Span,
    pub jsdoc: Option<String>,
}

impl ExprNode {
    pub fn annotation(&self) -> Option<Annotation> {
        self.jsdoc.as_deref().map(Annotation::parse)
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.expr {
            Expr::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&str> {
        match &self.expr {
            Expr::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[ObjectEntry]> {
        match &self.expr {
            Expr::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ExprNode]> {
        match &self.expr {
            Expr::Array(items) => Some(items),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Undefined,
    /// Identifier or static member chain, `this` included.
    Path(String),
    Array(Vec<ExprNode>),
    Object(Vec<ObjectEntry>),
    Function {
        params: Vec<String>,
        returns: Option<Box<ExprNode>>,
    },
    Class {
        name: Option<String>,
    },
    Call {
        callee: Option<String>,
        args: Vec<ExprNode>,
    },
    Other,
}

impl Expr {
    /// The statically known value, as JSON.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value;

        Some(match self {
            Expr::String(value) => Value::String(value.clone()),
            Expr::Number(value) => serde_json::Number::from_f64(*value).map_or(Value::Null, Value::Number),
            Expr::Bool(value) => Value::Bool(*value),
            Expr::Null => Value::Null,
            Expr::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.expr.to_json())
                    .collect::<Option<Vec<_>>>()?,
            ),
            Expr::Object(entries) => {
                let mut map = serde_json::Map::new();
                for entry in entries {
                    if entry.kind != EntryKind::Init {
                        return None;
                    }
                    map.insert(entry.key.clone()?, entry.value.expr.to_json()?);
                }
                Value::Object(map)
            }
            _ => return None,
        })
    }

    /// JavaScript truthiness of a statically known value.
    pub fn is_truthy(&self) -> bool {
        match self {
            Expr::String(value) => !value.is_empty(),
            Expr::Number(value) => *value != 0.0 && !value.is_nan(),
            Expr::Bool(value) => *value,
            Expr::Null | Expr::Undefined | Expr::Other | Expr::Path(_) | Expr::Call { .. } => false,
            Expr::Array(_) | Expr::Object(_) | Expr::Function { .. } | Expr::Class { .. } => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Init,
    Get,
    Set,
    Method,
}

/// One `key: value` (or method/getter/setter) of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    /// Static key; `None` for computed keys and spreads.
    pub key: Option<String>,
    pub kind: EntryKind,
    pub value: ExprNode,
    pub jsdoc: Option<String>,
    pub span: Span,
}

impl ObjectEntry {
    pub fn annotation(&self) -> Option<Annotation> {
        self.jsdoc.as_deref().map(Annotation::parse)
    }
}

/// Find an entry by key.
pub fn entry<'a>(entries: &'a [ObjectEntry], key: &str) -> Option<&'a ObjectEntry> {
    entries.iter().find(|entry| entry.key.as_deref() == Some(key))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsComment {
    pub span: Span,
    pub text: String,
}

/// A lowered JavaScript program.
#[derive(Debug, Clone, PartialEq)]
pub struct JsAst {
    pub root: JsNode,
    /// Every `/** ... */` comment, in source order.
    pub comments: Vec<JsComment>,
    pub is_module: bool,
}

impl JsAst {
    /// Doc comments that lie within `span`.
    pub fn comments_within(&self, span: Span) -> impl Iterator<Item = &JsComment> + '_ {
        self.comments
            .iter()
            .filter(move |comment| span.contains(comment.span))
    }
}
