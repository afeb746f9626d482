//! Content entity model for live preview.
//!
//! Defines the types every other crate renders, patches or fetches:
//! - [`ContentEntity`]: a content item as delivered by the backend
//! - [`ElementValue`]: the tagged union of element payloads
//! - [`ResolvedTree`]: a root item plus the closure of everything it links to,
//!   stored as an arena keyed by [`ItemId`](livepreview_types::ItemId)
//! - [`CloudinaryVideo`]: the structured payload of the video custom element
//!
//! References between entities are identifiers, never embedded structures, so
//! self-referencing content is representable and every traversal terminates.

mod element;
mod entity;
mod tree;
mod video;

pub use element::{Asset, ChoiceOption, ElementValue, FlowNode, RichText, TaxonomyTerm};
pub use entity::ContentEntity;
pub use tree::ResolvedTree;
pub use video::{CloudinaryVideo, Playback, DEFAULT_VIDEO_HEIGHT, DEFAULT_VIDEO_WIDTH};
