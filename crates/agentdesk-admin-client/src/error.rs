//! Error types for the admin client.

use thiserror::Error;

/// Errors that can occur when using the admin client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to establish connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with an error status.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// True when the server could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            ClientError::Connection(_) => true,
            ClientError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
