//! Annotation attributes for live preview.
//!
//! Rendered output carries `data-kontent-*` attributes that let the editing
//! frame locate the entity, element or component a node was rendered from.
//! The attribute keys and values are a fixed wire contract with the editor.
//!
//! Everything here is pure: the same inputs always produce the same
//! [`AttributeSet`]. [`Annotator`] binds language and project once so
//! rendering code does not have to thread them through every call.

mod annotation;
mod annotator;
mod attrs;

pub use annotation::{
    InsertPosition, RenderPosition, component_annotation, element_annotation, entity_annotation,
    insert_annotation,
};
pub use annotator::Annotator;
pub use attrs::{AttrValue, AttributeSet, escape_html, keys};
