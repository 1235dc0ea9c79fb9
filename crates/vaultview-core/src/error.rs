//! Error types for the vault viewer.
//!
//! All errors in the system are represented by the [`Error`] enum.
//! This ensures composable error handling across crates.
//!
//! Messages of variants that can reach an HTTP client never carry absolute
//! filesystem paths; callers log the path separately.

use std::io;
use thiserror::Error as ThisError;

/// The core error type for all vault operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Slug contains `..`, a backslash, or resolves outside the vault root
    #[error("Path traversal detected")]
    PathTraversal,

    /// Slug contains characters outside the allow-list
    #[error("Invalid characters in path")]
    InvalidCharacters,

    /// No note exists at a (validated) slug
    #[error("Note not found: {slug}")]
    NoteNotFound { slug: String },

    /// Listing the vault root or one of its directories failed
    #[error("Failed to enumerate vault: {reason}")]
    ScanEnumeration { reason: String },

    /// The markdown pipeline could not produce HTML
    #[error("Render error: {reason}")]
    Render { reason: String },

    /// A git step of the sync sequence failed
    #[error("Sync failed: {reason}")]
    Sync { reason: String },

    /// Parse error (front-matter and other structured input)
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Concurrent access conflict
    #[error("Concurrent access conflict: {reason}")]
    ConcurrencyError { reason: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error
    pub fn io(err: io::Error) -> Self {
        Error::Io(err)
    }

    /// Create a path traversal error
    pub fn path_traversal() -> Self {
        Error::PathTraversal
    }

    /// Create an invalid character error
    pub fn invalid_characters() -> Self {
        Error::InvalidCharacters
    }

    /// Create a note not found error
    pub fn note_not_found(slug: impl Into<String>) -> Self {
        Error::NoteNotFound { slug: slug.into() }
    }

    /// Create a scan enumeration error
    pub fn scan_enumeration(reason: impl Into<String>) -> Self {
        Error::ScanEnumeration {
            reason: reason.into(),
        }
    }

    /// Create a render error
    pub fn render_error(reason: impl Into<String>) -> Self {
        Error::Render {
            reason: reason.into(),
        }
    }

    /// Create a sync error
    pub fn sync_error(reason: impl Into<String>) -> Self {
        Error::Sync {
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a concurrency error
    pub fn concurrency_error(reason: impl Into<String>) -> Self {
        Error::ConcurrencyError {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Whether the error was caused by caller input rather than server state.
    ///
    /// The HTTP layer maps these to 4xx responses.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::PathTraversal | Error::InvalidCharacters | Error::NoteNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::note_not_found("Daily/2025-01-01");
        assert!(err.to_string().contains("Note not found"));

        let err = Error::path_traversal();
        assert_eq!(err.to_string(), "Path traversal detected");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::invalid_characters().is_client_error());
        assert!(Error::path_traversal().is_client_error());
        assert!(!Error::scan_enumeration("permission denied").is_client_error());
        assert!(!Error::render_error("bad fence").is_client_error());
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
