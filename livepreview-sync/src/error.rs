//! Error types for the preview core.

use livepreview_delivery::DeliveryError;
use thiserror::Error;

/// Result type for tree patching.
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors that can occur while patching a resolved tree.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The item fetch failed for a reason other than missing content.
    #[error("fetch failed: {0}")]
    Fetch(#[from] DeliveryError),
}

/// Result type for preview session operations.
pub type PreviewResult<T> = Result<T, PreviewError>;

/// Errors that can occur while connecting to the editing frame. The session
/// manager recovers from all of them by disabling preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The anchor node the editor attaches to is not present.
    #[error("anchor element not found")]
    AnchorMissing,

    /// The editing frame refused or failed the connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The connection did not complete in time.
    #[error("connection timed out")]
    Timeout,
}
