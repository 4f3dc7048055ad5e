//! Error types for the msg-intel library.
//!
//! This module provides custom error types using `thiserror`. Most of them never
//! escape an extraction run: the session degrades a failed section to an empty one
//! and logs the error instead of aborting.

use thiserror::Error;

/// Errors that can occur while extracting and rendering message history.
#[derive(Error, Debug)]
pub enum MsgIntelError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The chat store could not be opened or read
    #[error("Chat store unavailable: {0}")]
    StoreUnavailable(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid caller input (search term, paths, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV rendering errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Property list decoding errors
    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),

    /// A draft archive was readable but did not have the expected shape
    #[error("Malformed draft archive: {0}")]
    MalformedArchive(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with `MsgIntelError`
pub type Result<T> = std::result::Result<T, MsgIntelError>;

impl From<anyhow::Error> for MsgIntelError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for MsgIntelError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::Other(format!("Rendered output is not valid UTF-8: {err}"))
    }
}
