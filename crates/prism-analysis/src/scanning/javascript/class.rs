//! ES classes and what they turn out to be.
//!
//! A class can end up as a custom element, as the body of a mixin function
//! or as a plain class. `customElements.define` may appear anywhere after
//! the class it registers, so the visitor only collects while walking and
//! classifies everything in [`ScanVisitor::finish`]:
//!
//! ```text
//! enter: Class ─────────────▶ classes[]  (claimed by the innermost open mixin function)
//!        define(tag, cls) ──▶ defines[]
//!        @mixinFunction ────▶ mixins[]   (open until its node is left)
//!
//! finish: define(tag, class expr)  ─┐
//!         define(tag, ClassName)   ─┼─▶ ScannedElement
//!         @customElement           ─┘
//!         claimed by a mixin ─────────▶ ScannedMixin
//!         anything else ──────────────▶ ScannedClass
//! ```

use tracing::trace;

use crate::model::members::{demos_of, events_of};
use crate::model::{
    Annotation, Attribute, ElementKind, ElementMembers, Observer, Property, ScannedClass,
    ScannedElement, ScannedFeature, ScannedMixin, ScannedReference, Severity, SourceRange, Span,
    Warning, jsdoc,
};
use crate::parser::ParsedDocument;
use crate::parser::js_ast::{Expr, ExprNode, JsClass, JsNode, JsNodeKind, MemberKind};
use crate::scanning::{ScanResult, ScanVisitor, Scanner, VisitControl};

use super::polymer::{analyze_properties, behavior_references, observers_of};
use super::{AssignedNames, method, namespaced_name, plain_property};

const DEFINE_CALLEES: &[&str] = &["customElements.define", "window.customElements.define"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassScanner;

impl Scanner<JsNode> for ClassScanner {
    fn name(&self) -> &'static str {
        "class"
    }

    fn visitor<'d>(&self, document: &'d ParsedDocument) -> Box<dyn ScanVisitor<JsNode> + 'd> {
        Box::new(Visitor {
            document,
            names: AssignedNames::default(),
            classes: Vec::new(),
            defines: Vec::new(),
            mixins: Vec::new(),
            open_mixins: Vec::new(),
            warnings: Vec::new(),
        })
    }
}

struct FoundClass {
    class: JsClass,
    span: Span,
    annotation: Option<Annotation>,
    name: Option<String>,
    /// Index of the mixin function whose body this class is.
    mixin: Option<usize>,
}

enum TagSource {
    Literal(String),
    /// `X.is`: the tag comes from the class's static `is`.
    StaticIs,
}

enum ClassSource {
    Name(String),
    Expression(Span),
}

struct DefineCall {
    tag: TagSource,
    class: ClassSource,
}

struct MixinFunction {
    span: Span,
    name: Option<String>,
    annotation: Annotation,
    class: Option<usize>,
}

struct Visitor<'d> {
    document: &'d ParsedDocument,
    names: AssignedNames,
    classes: Vec<FoundClass>,
    defines: Vec<DefineCall>,
    mixins: Vec<MixinFunction>,
    open_mixins: Vec<usize>,
    warnings: Vec<Warning>,
}

fn strip_window(path: &str) -> &str {
    path.strip_prefix("window.").unwrap_or(path)
}

fn static_is(class: &JsClass) -> Option<String> {
    class
        .static_getter("is")
        .or_else(|| {
            class
                .members
                .iter()
                .find(|member| {
                    member.is_static
                        && member.kind == MemberKind::Field
                        && member.name.as_deref() == Some("is")
                })
                .and_then(|member| member.returns.as_ref())
        })
        .and_then(ExprNode::as_str)
        .map(str::to_string)
}

impl Visitor<'_> {
    fn class(&mut self, node: &JsNode, class: &JsClass) {
        let annotation = node.annotation();
        let assigned = self.names.name_for(node.span).map(str::to_string);
        let name = if class.is_expression {
            assigned.or_else(|| class.name.clone())
        } else {
            class.name.clone().or(assigned)
        };
        let name = name.map(|name| namespaced_name(&name, annotation.as_ref()));

        let index = self.classes.len();
        let mut mixin = None;
        if let Some(&open) = self.open_mixins.last() {
            if self.mixins[open].class.is_none() {
                self.mixins[open].class = Some(index);
                mixin = Some(open);
            }
        }

        self.classes.push(FoundClass {
            class: class.clone(),
            span: node.span,
            annotation,
            name,
            mixin,
        });
    }

    fn define(&mut self, node: &JsNode, args: &[ExprNode]) {
        let [tag, class, ..] = args else {
            return;
        };
        let tag = match &tag.expr {
            Expr::String(tag) => TagSource::Literal(tag.clone()),
            Expr::Path(path) if path.ends_with(".is") => TagSource::StaticIs,
            _ => {
                self.warnings.push(Warning::new(
                    "cant-determine-element-tagname",
                    "Unable to evaluate this expression down to a definitive string tagname.",
                    Severity::Warning,
                    self.document.source_range(tag.span),
                ));
                return;
            }
        };
        let class = match &class.expr {
            Expr::Path(path) => ClassSource::Name(strip_window(path).to_string()),
            Expr::Class { .. } => ClassSource::Expression(class.span),
            _ => {
                self.warnings.push(Warning::new(
                    "cant-determine-element-class",
                    "Unable to evaluate this expression down to a class.",
                    Severity::Warning,
                    self.document.source_range(class.span),
                ));
                return;
            }
        };
        trace!(span = ?node.span, "found customElements.define call");
        self.defines.push(DefineCall { tag, class });
    }

    fn mixin_function(&mut self, node: &JsNode, target: Option<&str>) {
        let Some(annotation) = node.annotation() else {
            return;
        };
        if !annotation.has_tag("mixinFunction") && !annotation.has_tag("polymerMixin") {
            return;
        }
        let name = annotation
            .tag("mixinFunction")
            .and_then(|tag| tag.name.as_deref())
            .or(target)
            .map(|name| namespaced_name(name, Some(&annotation)));
        self.open_mixins.push(self.mixins.len());
        self.mixins.push(MixinFunction {
            span: node.span,
            name,
            annotation,
            class: None,
        });
    }

    /// Which classes are elements, with the tag name their define call
    /// gave them.
    fn promotions(&self) -> Vec<Option<Option<String>>> {
        let mut promoted = vec![None; self.classes.len()];
        let mut promote = |index: Option<usize>, tag: &TagSource| {
            let Some(index) = index.filter(|index| self.classes[*index].mixin.is_none()) else {
                return;
            };
            if promoted[index].is_none() {
                promoted[index] = Some(match tag {
                    TagSource::Literal(tag) => Some(tag.clone()),
                    TagSource::StaticIs => None,
                });
            }
        };

        for define in &self.defines {
            if let ClassSource::Expression(span) = define.class {
                let index = self.classes.iter().position(|found| found.span == span);
                promote(index, &define.tag);
            }
        }
        for define in &self.defines {
            if let ClassSource::Name(name) = &define.class {
                let index = self
                    .classes
                    .iter()
                    .rposition(|found| found.name.as_deref() == Some(name.as_str()));
                promote(index, &define.tag);
            }
        }
        for (index, found) in self.classes.iter().enumerate() {
            let tagged = found.annotation.as_ref().is_some_and(|doc| {
                doc.has_tag("customElement") || doc.has_tag("polymerElement")
            });
            if tagged && found.mixin.is_none() && promoted[index].is_none() {
                promoted[index] = Some(None);
            }
        }
        promoted
    }

    fn element(&self, found: &FoundClass, tag: Option<String>) -> ScannedElement {
        let source_range = self.document.source_range(found.span);
        let mut element =
            ScannedElement::new(ElementKind::Class, found.annotation.clone(), source_range);
        element.tag_name = tag.or_else(|| static_is(&found.class));
        element.class_name = found.name.clone();

        let heritage = Heritage::of(self.document, &found.class, found.annotation.as_ref(), &element.source_range);
        element.super_class = heritage.super_class;
        element.mixins = heritage.mixins;
        element.behaviors = heritage.behaviors;
        element.warnings.extend(heritage.warnings);

        let body = ClassBody::read(self.document, &found.class);
        element.members = body.members;
        element.observers = body.observers;
        element.warnings.extend(body.warnings);
        if let Some(doc) = &found.annotation {
            for event in events_of(doc, &element.source_range) {
                element.members.add_event(event);
            }
        }

        let name = element
            .class_name
            .as_deref()
            .or(element.tag_name.as_deref())
            .unwrap_or_default()
            .to_string();
        element.privacy = jsdoc::privacy_of(&name, found.annotation.as_ref());
        element
    }

    fn plain_class(&self, found: &FoundClass) -> ScannedClass {
        let source_range = self.document.source_range(found.span);
        let annotation = found.annotation.as_ref();
        let heritage = Heritage::of(self.document, &found.class, annotation, &source_range);
        let body = ClassBody::read(self.document, &found.class);
        let mut warnings = heritage.warnings;
        warnings.extend(body.warnings);

        ScannedClass {
            privacy: jsdoc::privacy_of(found.name.as_deref().unwrap_or_default(), annotation),
            name: found.name.clone(),
            description: annotation.map(|doc| doc.description.clone()).unwrap_or_default(),
            jsdoc: found.annotation.clone(),
            members: body.members,
            super_class: heritage.super_class,
            mixins: heritage.mixins,
            demos: demos_of(annotation),
            is_abstract: annotation.is_some_and(|doc| doc.has_tag("abstract")),
            source_range,
            warnings,
        }
    }

    fn mixin(&self, mixin: &MixinFunction, warnings: &mut Vec<Warning>) -> Option<ScannedMixin> {
        let source_range = self.document.source_range(mixin.span);
        let Some(name) = mixin.name.clone() else {
            warnings.push(Warning::new(
                "cant-determine-name",
                "Unable to determine name for @mixinFunction",
                Severity::Warning,
                source_range,
            ));
            return None;
        };

        let mut mixins = Vec::new();
        let mut own_warnings = Vec::new();
        applied_mixins(&mixin.annotation, &source_range, &mut mixins, &mut own_warnings);

        let body = mixin
            .class
            .map(|index| ClassBody::read(self.document, &self.classes[index].class))
            .unwrap_or_default();
        own_warnings.extend(body.warnings);

        Some(ScannedMixin {
            privacy: jsdoc::privacy_of(&name, Some(&mixin.annotation)),
            name,
            description: mixin.annotation.description.clone(),
            jsdoc: Some(mixin.annotation.clone()),
            members: body.members,
            mixins,
            demos: demos_of(Some(&mixin.annotation)),
            source_range,
            warnings: own_warnings,
        })
    }
}

/// `@appliesMixin`/`@mixes` references of a doc comment.
fn applied_mixins(
    annotation: &Annotation,
    source_range: &SourceRange,
    mixins: &mut Vec<ScannedReference>,
    warnings: &mut Vec<Warning>,
) {
    let tags = annotation
        .tags
        .iter()
        .filter(|tag| tag.title == "appliesMixin" || tag.title == "mixes");
    for tag in tags {
        match tag.name.as_deref() {
            Some(name) => mixins.push(ScannedReference::new(strip_window(name), source_range.clone())),
            None => warnings.push(Warning::new(
                "class-mixes-annotation-no-id",
                "@appliesMixin annotation with no identifier. Usage `@appliesMixin MixinName`",
                Severity::Warning,
                source_range.clone(),
            )),
        }
    }
}

/// What a class inherits from: its superclass, mixins and (for hybrid
/// elements) Polymer behaviors.
#[derive(Default)]
struct Heritage {
    super_class: Option<ScannedReference>,
    mixins: Vec<ScannedReference>,
    behaviors: Vec<ScannedReference>,
    warnings: Vec<Warning>,
}

impl Heritage {
    fn of(
        document: &ParsedDocument,
        class: &JsClass,
        annotation: Option<&Annotation>,
        source_range: &SourceRange,
    ) -> Self {
        let mut heritage = Self::default();

        let extends = annotation.and_then(|doc| doc.tag("extends").or_else(|| doc.tag("augments")));
        match extends {
            Some(tag) => match tag.name.as_deref() {
                Some(name) => {
                    heritage.super_class =
                        Some(ScannedReference::new(strip_window(name), source_range.clone()));
                }
                None => heritage.warnings.push(Warning::new(
                    "class-extends-annotation-no-id",
                    "@extends annotation with no identifier",
                    Severity::Warning,
                    source_range.clone(),
                )),
            },
            None => {
                if let Some(super_class) = &class.super_class {
                    heritage.super_class_expression(document, super_class);
                }
            }
        }

        if let Some(doc) = annotation {
            applied_mixins(doc, source_range, &mut heritage.mixins, &mut heritage.warnings);
        }
        heritage
    }

    fn super_class_expression(&mut self, document: &ParsedDocument, expr: &ExprNode) {
        match &expr.expr {
            Expr::Path(path) => {
                self.super_class = Some(ScannedReference::new(
                    strip_window(path),
                    document.source_range(expr.span),
                ));
            }
            // `Polymer.mixinBehaviors([BehaviorA, BehaviorB], Polymer.Element)`
            Expr::Call { callee, args } if callee.as_deref() == Some("Polymer.mixinBehaviors") => {
                let [behaviors, base] = args.as_slice() else {
                    return;
                };
                let (references, warnings) = behavior_references(behaviors, document);
                self.behaviors = references;
                self.warnings.extend(warnings);
                self.super_class_expression(document, base);
            }
            _ => {}
        }
    }
}

/// Members and observers declared in a class body.
#[derive(Default)]
struct ClassBody {
    members: ElementMembers,
    observers: Vec<Observer>,
    warnings: Vec<Warning>,
}

impl ClassBody {
    fn read(document: &ParsedDocument, class: &JsClass) -> Self {
        let mut body = Self::default();

        // Constructor `this.x` statements only count when documented.
        if let Some(constructor) = class.constructor() {
            for assignment in &constructor.this_assignments {
                let Some(annotation) = assignment.jsdoc.as_deref().map(Annotation::parse) else {
                    continue;
                };
                if annotation.tags.is_empty() {
                    continue;
                }
                let mut property =
                    plain_property(document, &assignment.name, None, Some(annotation), assignment.span);
                property.default = assignment
                    .value_span
                    .map(|span| document.slice(span).to_string());
                body.add_property(property);
            }
        }

        if let Some(properties) = class.static_getter("properties") {
            for property in analyze_properties(properties, document) {
                body.add_property(property);
            }
        }

        if let Some(observers) = class.static_getter("observers") {
            let (observers, warnings) = observers_of(observers, document);
            body.observers = observers;
            body.warnings.extend(warnings);
        }

        if let Some(attributes) = class.static_getter("observedAttributes").and_then(ExprNode::as_array) {
            for attribute in attributes {
                let Some(name) = attribute.as_str() else {
                    continue;
                };
                body.members.attributes.insert(
                    name.to_string(),
                    Attribute {
                        name: name.to_string(),
                        description: String::new(),
                        type_name: None,
                        change_event: None,
                        source_range: Some(document.source_range(attribute.span)),
                        inherited_from: None,
                    },
                );
            }
        }

        let has = |kind: MemberKind, name: &str| {
            class.members.iter().any(|member| {
                member.kind == kind && !member.is_static && member.name.as_deref() == Some(name)
            })
        };

        for member in &class.members {
            let Some(name) = member.name.as_deref() else {
                continue;
            };
            let annotation = member.jsdoc.as_deref().map(Annotation::parse);
            match (member.kind, member.is_static) {
                (MemberKind::Method, false) => {
                    let range = document.source_range(member.span);
                    body.members
                        .add_method(method(name, &member.params, annotation.as_ref(), range));
                }
                (MemberKind::Method, true) => {
                    let range = document.source_range(member.span);
                    body.members.static_methods.insert(
                        name.to_string(),
                        method(name, &member.params, annotation.as_ref(), range),
                    );
                }
                (MemberKind::Get, false) => {
                    let mut property = plain_property(document, name, None, annotation, member.span);
                    property.read_only |= !has(MemberKind::Set, name);
                    body.add_property(property);
                }
                (MemberKind::Set, false) if !has(MemberKind::Get, name) => {
                    body.add_property(plain_property(document, name, None, annotation, member.span));
                }
                (MemberKind::Field, false) => {
                    body.add_property(plain_property(
                        document,
                        name,
                        member.returns.as_ref(),
                        annotation,
                        member.span,
                    ));
                }
                _ => {}
            }
        }
        body
    }

    fn add_property(&mut self, property: Property) {
        self.warnings.extend(property.warnings.iter().cloned());
        self.members.add_property(property);
    }
}

impl ScanVisitor<JsNode> for Visitor<'_> {
    fn enter(&mut self, node: &JsNode) -> VisitControl {
        self.names.enter(node);
        match &node.kind {
            JsNodeKind::Class(class) => self.class(node, class),
            JsNodeKind::Call { callee, args }
                if callee.as_deref().is_some_and(|callee| DEFINE_CALLEES.contains(&callee)) =>
            {
                self.define(node, args);
            }
            JsNodeKind::Assignment { target, .. } => self.mixin_function(node, target.as_deref()),
            JsNodeKind::VariableDeclarator { name, .. }
            | JsNodeKind::FunctionDeclaration { name, .. } => {
                self.mixin_function(node, name.as_deref());
            }
            _ => {}
        }
        VisitControl::Continue
    }

    fn leave(&mut self, node: &JsNode) {
        self.names.leave(node);
        if let Some(&open) = self.open_mixins.last() {
            if self.mixins[open].span == node.span {
                self.open_mixins.pop();
            }
        }
    }

    fn finish(self: Box<Self>) -> ScanResult {
        let promoted = self.promotions();
        let mut result = ScanResult::default();
        let mut warnings = self.warnings.clone();

        for (found, promotion) in self.classes.iter().zip(promoted) {
            if let Some(index) = found.mixin {
                if let Some(mixin) = self.mixin(&self.mixins[index], &mut warnings) {
                    result.features.push(ScannedFeature::Mixin(mixin));
                }
                continue;
            }
            result.features.push(match promotion {
                Some(tag) => ScannedFeature::Element(self.element(found, tag)),
                None => ScannedFeature::Class(self.plain_class(found)),
            });
        }
        for mixin in self.mixins.iter().filter(|mixin| mixin.class.is_none()) {
            if let Some(mixin) = self.mixin(mixin, &mut warnings) {
                result.features.push(ScannedFeature::Mixin(mixin));
            }
        }

        result.warnings = warnings;
        result
    }
}
