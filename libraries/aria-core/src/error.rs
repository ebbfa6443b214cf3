//! Error types shared across the core libraries

use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors produced by the external collaborators
#[derive(Error, Debug)]
pub enum CoreError {
    /// A search / related-tracks / stream-URL fetch failed
    /// (network, non-2xx response, or response parse failure)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The preference store rejected a read or write
    #[error("Preference store error: {0}")]
    Preference(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a fetch error from any displayable cause
    pub fn fetch(cause: impl std::fmt::Display) -> Self {
        CoreError::Fetch(cause.to_string())
    }

    /// Create a preference store error from any displayable cause
    pub fn preference(cause: impl std::fmt::Display) -> Self {
        CoreError::Preference(cause.to_string())
    }
}
