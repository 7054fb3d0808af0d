//! Error types for carnet.

use thiserror::Error;

/// Result type alias using carnet's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for carnet operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Backing item, file, or label is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stale content token rejected by the backing repository
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller supplied input that cannot be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed before a response was obtained
    #[error("Request error: {0}")]
    Request(String),

    /// Backing service returned a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for any error that means "the resource does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True for a stale-token rejection from the backing repository.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
