//! Comment validation

use crate::error::{Result, ThreadlineError};
use crate::types::Author;

/// Maximum comment length (default)
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Minimum comment length
pub const MIN_COMMENT_LENGTH: usize = 1;

/// Validator for new comments
#[derive(Debug, Clone)]
pub struct CommentValidator {
    max_length: usize,
    min_length: usize,
}

impl CommentValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            max_length: MAX_COMMENT_LENGTH,
            min_length: MIN_COMMENT_LENGTH,
        }
    }

    /// Create a new validator with custom max length
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            min_length: MIN_COMMENT_LENGTH,
        }
    }

    /// Maximum accepted content length, in characters
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Validate comment content
    pub fn validate_content(&self, content: &str) -> Result<()> {
        let length = content.trim().chars().count();

        if length < self.min_length {
            return Err(ThreadlineError::Validation(
                "Comment content cannot be empty".to_string(),
            ));
        }

        if length > self.max_length {
            return Err(ThreadlineError::Validation(format!(
                "Comment content exceeds maximum length of {} characters",
                self.max_length
            )));
        }

        Ok(())
    }

    /// Check that a signed-in author is posting
    pub fn validate_author<'a>(&self, author: Option<&'a Author>) -> Result<&'a Author> {
        match author {
            Some(author) if !author.name.trim().is_empty() => Ok(author),
            _ => Err(ThreadlineError::NotAuthenticated),
        }
    }
}

impl Default for CommentValidator {
    fn default() -> Self {
        Self::new()
    }
}
