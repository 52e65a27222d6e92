//! Centralized error types for lazygrid.
//!
//! Aggregates the error kinds a host can see from this crate, with
//! user-friendly messages for the ones worth showing in a UI. Superseded
//! requests are first-class: [`Error::is_cancelled`] lets event loops drop
//! them without touching error or empty state.

use thiserror::Error;

use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::table::ColumnError;

/// The crate-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Fetch and transport errors.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// Malformed column descriptors.
    #[error("{0}")]
    Column(#[from] ColumnError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check whether this error is a superseded-request cancellation.
    ///
    /// Cancellations are expected and silent; they must never populate an
    /// error or empty state.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Fetch(e) if e.is_cancelled())
    }

    /// Get a message suitable for showing to users.
    pub fn user_message(&self) -> String {
        match self {
            Error::Config(_) => {
                "Could not load configuration. Check the config file format.".to_string()
            }
            Error::Fetch(FetchError::Cancelled) => String::new(),
            Error::Fetch(FetchError::Network(_)) => {
                "Connection failed. Please check your network.".to_string()
            }
            Error::Fetch(FetchError::NotFound(resource)) => {
                format!("'{}' was not found.", resource)
            }
            Error::Fetch(FetchError::RateLimited) => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            Error::Fetch(FetchError::Server(_)) => {
                "Server error. Please try again later.".to_string()
            }
            Error::Fetch(FetchError::InvalidResponse(_)) => {
                "Unexpected response from the server.".to_string()
            }
            Error::Column(e) => format!("Invalid column configuration: {}", e),
            Error::Io(_) => "A file operation failed.".to_string(),
            Error::Other(msg) => msg.clone(),
        }
    }
}

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
