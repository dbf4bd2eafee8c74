//! Error types for threadline

use crate::types::CommentId;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for threadline
#[derive(Debug, Error)]
pub enum ThreadlineError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Reply target is not a visible comment of the post
    #[error("Comment not found: #{0}")]
    CommentNotFound(CommentId),

    /// Posting requires a signed-in author
    #[error("You must be logged in to post a comment")]
    NotAuthenticated,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Comment store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ThreadlineError>,
    },
}

impl ThreadlineError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ThreadlineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<toml::de::Error> for ThreadlineError {
    fn from(err: toml::de::Error) -> Self {
        ThreadlineError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for ThreadlineError {
    fn from(err: toml::ser::Error) -> Self {
        ThreadlineError::Toml(err.to_string())
    }
}

/// Result type alias for threadline
pub type Result<T> = std::result::Result<T, ThreadlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ThreadlineError::CommentNotFound(CommentId(42));
        assert_eq!(err.to_string(), "Comment not found: #42");
    }

    #[test]
    fn test_not_authenticated_message() {
        let err = ThreadlineError::NotAuthenticated;
        assert_eq!(err.to_string(), "You must be logged in to post a comment");
    }

    #[test]
    fn test_error_with_context() {
        let err = ThreadlineError::Validation("empty content".to_string());
        let err = err.with_context("Failed to post reply");
        assert!(err.to_string().contains("Failed to post reply"));
        assert!(err.to_string().contains("empty content"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ThreadlineError = io_err.into();
        assert!(matches!(err, ThreadlineError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: ThreadlineError = toml_err.into();
        assert!(matches!(err, ThreadlineError::Toml(_)));
    }
}
