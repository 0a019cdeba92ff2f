//! Error handling for elecam-control
//!
//! Transport and protocol failures never show up here: they are folded into
//! `CommandResult { success: false, .. }` by the command client.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Validation error (missing or malformed camera settings)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Settings could not be persisted
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors the user fixes by supplying different settings
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
