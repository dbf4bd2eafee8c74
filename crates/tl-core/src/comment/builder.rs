//! Builder for new comments and replies

use super::model::NewComment;
use super::validator::CommentValidator;
use crate::error::{Result, ThreadlineError};
use crate::types::{CommentId, PostId};

/// Builder for creating new comments with fluent API
pub struct NewCommentBuilder {
    post_id: PostId,
    parent_id: Option<CommentId>,
    content: Option<String>,
    validator: CommentValidator,
}

impl NewCommentBuilder {
    /// Start a root comment on a post
    pub fn root(post_id: PostId) -> Self {
        Self {
            post_id,
            parent_id: None,
            content: None,
            validator: CommentValidator::new(),
        }
    }

    /// Start a reply to an existing comment
    pub fn reply(post_id: PostId, parent_id: CommentId) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::root(post_id)
        }
    }

    /// Set the comment content
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Use a custom validator
    pub fn validator(mut self, validator: CommentValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Build the payload
    pub fn build(self) -> Result<NewComment> {
        let content = self.content.ok_or_else(|| {
            ThreadlineError::Validation("Comment content is required".to_string())
        })?;

        self.validator.validate_content(&content)?;

        Ok(NewComment {
            post_id: self.post_id,
            content: content.trim().to_string(),
            parent_id: self.parent_id,
        })
    }
}
