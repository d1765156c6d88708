//! Common error types for the roster directory

use thiserror::Error;

/// Common result type for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across roster crates
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure reaching the upstream member API
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Upstream body could not be parsed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (e.g. non-numeric year)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures scoped to a single fetch attempt
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Upstream { .. } | Error::Decode(_)
        )
    }
}
