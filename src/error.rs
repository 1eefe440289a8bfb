//! Crate-level error type.

use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::config::ConfigError;
use crate::resilience::TimeoutError;

/// Errors returned by every client in this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    /// A required parameter is missing or malformed. Raised before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport-level failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with an error status or error envelope.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The response did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
