//! Error types for content delivery.

use thiserror::Error;

/// Result type for delivery operations.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Errors that can occur while querying the delivery API.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport failure: connection, TLS, timeout.
    #[error("http error: {0}")]
    Http(String),

    /// The requested content does not exist.
    #[error("content not found: {0}")]
    NotFound(String),

    /// The backend rejected the request.
    #[error("delivery api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DeliveryError {
    /// True for errors the backend reports about the content itself. Page
    /// loaders render these as "no content" instead of failing.
    pub fn is_content_missing(&self) -> bool {
        matches!(self, DeliveryError::NotFound(_) | DeliveryError::Api { .. })
    }

    /// True only when the backend answered that the content does not exist.
    /// Other status errors may be transient and say nothing about the items.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DeliveryError::NotFound(_))
    }
}

impl From<serde_json::Error> for DeliveryError {
    fn from(e: serde_json::Error) -> Self {
        DeliveryError::Decode(e.to_string())
    }
}
