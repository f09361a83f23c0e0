//! Scanners over JavaScript documents.
//!
//! The helpers in this module read doc comments and object literals the
//! same way for every scanner: method signatures come from `@param` and
//! `@return` tags, names get their `@memberof` namespace, and Polymer
//! declaration objects are read by [`polymer::PolymerObject`].

mod behavior;
mod class;
mod function;
mod import;
mod namespace;
mod polymer;
mod polymer_element;

pub use behavior::BehaviorScanner;
pub use class::ClassScanner;
pub use function::FunctionScanner;
pub use import::JavaScriptImportScanner;
pub use namespace::NamespaceScanner;
pub use polymer::analyze_properties;
pub use polymer_element::PolymerElementScanner;

use crate::model::{Annotation, Method, Parameter, Property, SourceRange, Span, jsdoc};
use crate::parser::ParsedDocument;
use crate::parser::js_ast::{Expr, ExprNode, JsNode, JsNodeKind};

/// Names assigned to the expression currently being visited.
///
/// `X = <value>` and `const X = <value>` push `(value span, X)` while their
/// subtree is walked, so a class or call node can learn which name it is
/// bound to.
#[derive(Debug, Default)]
pub(crate) struct AssignedNames {
    stack: Vec<(Span, Option<String>)>,
}

impl AssignedNames {
    fn binding(node: &JsNode) -> Option<(Span, Option<String>)> {
        match &node.kind {
            JsNodeKind::Assignment { target, value } => Some((value.span, target.clone())),
            JsNodeKind::VariableDeclarator {
                name,
                init: Some(init),
            } => Some((init.span, name.clone())),
            _ => None,
        }
    }

    pub fn enter(&mut self, node: &JsNode) {
        if let Some(binding) = Self::binding(node) {
            self.stack.push(binding);
        }
    }

    pub fn leave(&mut self, node: &JsNode) {
        if Self::binding(node).is_some() {
            self.stack.pop();
        }
    }

    /// The name bound to the expression at `span`, if it is the right-hand
    /// side of the innermost assignment.
    pub fn name_for(&self, span: Span) -> Option<&str> {
        self.stack
            .last()
            .filter(|(value, _)| *value == span)
            .and_then(|(_, name)| name.as_deref())
    }
}

/// Prefix `name` with its `@memberof` namespace unless it already has it.
pub(crate) fn namespaced_name(name: &str, annotation: Option<&Annotation>) -> String {
    let namespace = annotation
        .and_then(|doc| doc.tag("memberof"))
        .and_then(|tag| tag.name.as_deref());
    match namespace {
        Some(namespace) if !name.starts_with(&format!("{namespace}.")) => {
            let local = name.rsplit('.').next().unwrap_or(name);
            format!("{namespace}.{local}")
        }
        _ => name.to_string(),
    }
}

/// Parameters from the declared names, described by matching `@param` tags.
pub(crate) fn params_of(names: &[String], annotation: Option<&Annotation>) -> Vec<Parameter> {
    let tags: Vec<_> = annotation
        .map(|doc| {
            doc.tags
                .iter()
                .filter(|tag| matches!(tag.title.as_str(), "param" | "arg" | "argument"))
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        return tags
            .iter()
            .filter_map(|tag| {
                Some(Parameter {
                    name: tag.name.clone()?,
                    type_name: tag.kind.clone(),
                    description: tag.description.clone(),
                })
            })
            .collect();
    }

    names
        .iter()
        .map(|name| {
            let tag = tags.iter().find(|tag| tag.name.as_deref() == Some(name.as_str()));
            Parameter {
                name: name.clone(),
                type_name: tag.and_then(|tag| tag.kind.clone()),
                description: tag.and_then(|tag| tag.description.clone()),
            }
        })
        .collect()
}

/// A method described by its doc comment.
pub(crate) fn method(
    name: &str,
    params: &[String],
    annotation: Option<&Annotation>,
    source_range: SourceRange,
) -> Method {
    let returns = annotation.and_then(|doc| doc.tag("return").or_else(|| doc.tag("returns")));
    Method {
        name: name.to_string(),
        description: annotation.map(|doc| doc.description.clone()).unwrap_or_default(),
        params: params_of(params, annotation),
        return_type: returns.and_then(|tag| tag.kind.clone()),
        return_description: returns.and_then(|tag| tag.description.clone()),
        privacy: jsdoc::privacy_of(name, annotation),
        source_range: Some(source_range),
        inherited_from: None,
    }
}

/// Closure type names for the constructors Polymer uses as property types.
pub(crate) fn closure_type(name: &str) -> &str {
    match name {
        "Boolean" => "boolean",
        "Number" => "number",
        "String" => "string",
        other => other,
    }
}

/// Best-effort type of a literal value.
pub(crate) fn infer_type(expr: &Expr) -> &'static str {
    match expr {
        Expr::String(_) => "string",
        Expr::Number(_) => "number",
        Expr::Bool(_) => "boolean",
        Expr::Array(_) => "Array",
        Expr::Object(_) => "Object",
        Expr::Function { .. } => "Function",
        Expr::Null => "null",
        Expr::Undefined => "undefined",
        _ => "?",
    }
}

/// A plain (unpublished) property declared by an object entry or getter.
pub(crate) fn plain_property(
    document: &ParsedDocument,
    name: &str,
    value: Option<&ExprNode>,
    annotation: Option<Annotation>,
    span: Span,
) -> Property {
    let type_name = annotation
        .as_ref()
        .and_then(|doc| doc.type_tag().map(str::to_string))
        .or_else(|| value.map(|value| infer_type(&value.expr).to_string()));
    Property {
        name: name.to_string(),
        description: annotation
            .as_ref()
            .and_then(Annotation::description_or_tag_text)
            .unwrap_or_default(),
        type_name,
        default: value
            .and_then(|value| value.expr.to_json())
            .map(|json| json.to_string()),
        privacy: jsdoc::privacy_of(name, annotation.as_ref()),
        read_only: annotation.as_ref().is_some_and(|doc| doc.has_tag("const")),
        source_range: Some(document.source_range(span)),
        jsdoc: annotation,
        ..Property::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memberof_prefixes_names() {
        let doc = Annotation::parse("/** @memberof Polymer */");
        assert_eq!(namespaced_name("dom", Some(&doc)), "Polymer.dom");
        assert_eq!(namespaced_name("Polymer.dom", Some(&doc)), "Polymer.dom");
        assert_eq!(namespaced_name("dom", None), "dom");
    }

    #[test]
    fn params_follow_declared_names() {
        let doc = Annotation::parse("/**\n * @param {string} b The b.\n * @return {number} Sum.\n */");
        let params = params_of(&["a".to_string(), "b".to_string()], Some(&doc));
        assert_eq!(params[0].type_name, None);
        assert_eq!(params[1].type_name.as_deref(), Some("string"));

        let range = SourceRange::file_start(prism_graph::ResolvedUrl::new("a.js"));
        let method = method("_add", &["a".to_string(), "b".to_string()], Some(&doc), range);
        assert_eq!(method.return_type.as_deref(), Some("number"));
        assert_eq!(method.privacy, crate::model::Privacy::Protected);
    }

    #[test]
    fn constructor_types_become_closure_types() {
        assert_eq!(closure_type("Boolean"), "boolean");
        assert_eq!(closure_type("Array"), "Array");
    }
}
