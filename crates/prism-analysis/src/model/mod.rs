//! The feature model.
//!
//! Scanners produce `Scanned*` values that refer to each other by name.
//! [`Document`] resolution turns them into [`Feature`]s holding live
//! references to other resolved features and documents.
//!
//! ```text
//! ScannedDocument ──resolve──▶ Document
//!   ├─ ScannedImport ─────────▶ Import ──▶ Document (imported)
//!   ├─ ScannedInlineDocument ─▶ Document (inline, shares the scope)
//!   ├─ ScannedElement ────────▶ Element ──▶ [Behavior], [ElementMixin]
//!   └─ ...
//! ```

pub mod behavior;
pub mod class;
pub mod css;
pub mod databinding;
pub mod document;
pub mod dom_module;
pub mod element;
pub mod element_reference;
pub mod feature;
pub mod function;
pub mod import;
pub mod inline_document;
pub mod jsdoc;
pub mod members;
pub mod namespace;
pub mod resolve;
pub mod source_range;
pub mod warning;

pub use behavior::{Behavior, ScannedBehavior};
pub use class::{Class, ElementMixin, ScannedClass, ScannedMixin};
pub use css::CssCustomProperty;
pub use databinding::{
    BindingDirection, DatabindingContext, DatabindingExpression, DatabindingProperty,
    ExpressionLimitation,
};
pub use document::{Document, FeatureQuery, ScannedDocument, WarningQuery, is_external};
pub use dom_module::DomModule;
pub use element::{Element, ElementKind, ScannedElement};
pub use element_reference::{ElementReference, ReferenceAttribute};
pub use feature::{Feature, FeatureKind, ScannedFeature};
pub use function::Function;
pub use import::{Import, ImportKind, ScannedImport};
pub use inline_document::ScannedInlineDocument;
pub use jsdoc::{Annotation, Privacy, Tag};
pub use members::{
    Attribute, Demo, ElementMembers, Event, Listener, LocalId, Method, Observer, Parameter,
    Property, ScannedReference, Slot,
};
pub use namespace::Namespace;
pub use resolve::{DocumentResolver, PrototypeChain, ResolutionScope};
pub use source_range::{LineIndex, LocationOffset, SourcePosition, SourceRange, Span};
pub use warning::{Severity, Warning};
