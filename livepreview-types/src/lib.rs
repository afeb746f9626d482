//! Core type definitions for live preview.
//!
//! This crate defines the small, dependency-light types shared by every other
//! crate in the workspace:
//! - Content identifiers (item ids, codenames, language and project codenames)
//! - Editor events emitted by the authoring tool's preview frame
//! - The navigation context read from the current URL
//!
//! Content entities themselves live in `livepreview-model`.

mod context;
mod event;
mod ids;

pub use context::NavigationContext;
pub use event::{FrameEvent, ItemChange, RefreshEvent, RefreshMetadata, UpdateEvent};
pub use ids::{Codename, ItemId, LanguageCodename, ProjectId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("invalid query string: {0}")]
    InvalidQuery(String),
}
