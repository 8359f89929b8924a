//! Error types and handling infrastructure for resultsift.
//!
//! The library uses `thiserror` for its own error type; the binary wraps it with
//! `anyhow` for context. The synchronization cycle itself never returns errors:
//! everything here is raised at the host boundary (applying edits), while loading
//! input, or while reading configuration.

use thiserror::Error;

/// The main error type for resultsift operations.
#[derive(Error, Debug)]
pub enum SiftError {
    /// An edit addressed bytes outside the buffer
    #[error("Edit out of bounds: offset {offset} + length {length} exceeds text length {text_len}")]
    InvalidEdit {
        offset: usize,
        length: usize,
        text_len: usize,
    },

    /// Two edits of one batch overlap or are out of document order
    #[error("Overlapping edits in batch at offset {offset}")]
    OverlappingEdits { offset: usize },

    /// An edit boundary splits a UTF-8 sequence
    #[error("Edit offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    /// File system related errors (file not found, permission denied, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for resultsift operations.
pub type Result<T> = std::result::Result<T, SiftError>;

impl SiftError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}
