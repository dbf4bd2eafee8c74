//! Comment source and sink contracts

use crate::comment::{CommentRecord, NewComment};
use crate::error::Result;
use crate::types::{Author, CommentId, PostId};
use std::sync::Arc;

/// Where a post's comments are fetched from
pub trait CommentSource: Send + Sync {
    /// Fetch every comment row of a post, ascending by `created_at`
    fn fetch(&self, post_id: PostId) -> Result<Vec<CommentRecord>>;
}

/// Where new comments are written to
pub trait CommentSink: Send + Sync {
    /// Insert a comment; the store assigns its id and creation time
    fn create(&self, comment: &NewComment, author: &Author) -> Result<CommentId>;
}

impl<T: CommentSource + ?Sized> CommentSource for Arc<T> {
    fn fetch(&self, post_id: PostId) -> Result<Vec<CommentRecord>> {
        (**self).fetch(post_id)
    }
}

impl<T: CommentSink + ?Sized> CommentSink for Arc<T> {
    fn create(&self, comment: &NewComment, author: &Author) -> Result<CommentId> {
        (**self).create(comment, author)
    }
}
