//! Comment data models

use crate::error::{Result, ThreadlineError};
use crate::types::{Author, AuthorId, CommentId, PostId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A comment attached to a post, optionally replying to another comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned identifier
    pub id: CommentId,
    /// Post this comment belongs to
    pub post_id: PostId,
    /// Comment this one replies to; `None` for root comments
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    /// Comment content
    pub content: String,
    /// Author user id
    pub author_id: AuthorId,
    /// Author display name
    pub author_name: String,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Check if this is a root comment
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this comment replies to another one
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Check if the comment lists itself as its parent
    pub fn is_self_referencing(&self) -> bool {
        self.parent_id == Some(self.id)
    }
}

/// A comment row as delivered by the backend
///
/// Every field is optional on the wire. [`Comment::try_from`] is the
/// validation boundary between this loose shape and [`Comment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub parent_comments_id: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ThreadlineError;

    fn try_from(record: CommentRecord) -> Result<Self> {
        let id = record.id.ok_or_else(|| missing_field("id", None))?;
        let post_id = record
            .post_id
            .ok_or_else(|| missing_field("post_id", Some(id)))?;
        let user_id = record
            .user_id
            .ok_or_else(|| missing_field("user_id", Some(id)))?;
        let author_id = AuthorId::from_string(&user_id).map_err(|e| {
            ThreadlineError::Validation(format!("Comment {} has invalid user_id: {}", id, e))
        })?;
        let author_name = record
            .author
            .ok_or_else(|| missing_field("author", Some(id)))?;
        let created_at = record
            .created_at
            .ok_or_else(|| missing_field("created_at", Some(id)))?;

        // Zero is how rows encode "no parent"; any other id must resolve
        let parent_id = record
            .parent_comments_id
            .filter(|parent| *parent != 0)
            .map(CommentId);

        Ok(Comment {
            id: CommentId(id),
            post_id: PostId(post_id),
            parent_id,
            content: record.content.unwrap_or_default(),
            author_id,
            author_name,
            created_at,
        })
    }
}

impl From<&Comment> for CommentRecord {
    fn from(comment: &Comment) -> Self {
        CommentRecord {
            id: Some(comment.id.get()),
            post_id: Some(comment.post_id.get()),
            parent_comments_id: comment.parent_id.map(CommentId::get),
            content: Some(comment.content.clone()),
            user_id: Some(comment.author_id.to_string()),
            author: Some(comment.author_name.clone()),
            created_at: Some(comment.created_at),
        }
    }
}

fn missing_field(field: &str, id: Option<i64>) -> ThreadlineError {
    match id {
        Some(id) => ThreadlineError::Validation(format!("Comment {} is missing {}", id, field)),
        None => ThreadlineError::Validation(format!("Comment record is missing {}", field)),
    }
}

/// Convert fetched rows for one post into comments
///
/// Malformed rows and rows belonging to another post are dropped with a
/// warning. Input order is kept.
pub fn comments_from_records(post_id: PostId, records: Vec<CommentRecord>) -> Vec<Comment> {
    let total = records.len();
    let mut comments = Vec::with_capacity(total);

    for record in records {
        match Comment::try_from(record) {
            Ok(comment) if comment.post_id != post_id => {
                warn!(
                    "Dropping comment {}: belongs to post {}, expected {}",
                    comment.id, comment.post_id, post_id
                );
            }
            Ok(comment) => comments.push(comment),
            Err(e) => warn!("Dropping malformed comment record: {}", e),
        }
    }

    if !is_chronological(&comments) {
        debug!(
            "Comments for post {} are not in ascending created_at order",
            post_id
        );
    }
    if comments.len() != total {
        debug!(
            "Accepted {} of {} comment records for post {}",
            comments.len(),
            total,
            post_id
        );
    }

    comments
}

/// Check the ascending `created_at` ordering the fetch layer promises
pub fn is_chronological(comments: &[Comment]) -> bool {
    comments
        .windows(2)
        .all(|pair| pair[0].created_at <= pair[1].created_at)
}

/// Payload for creating a new comment or reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Post the comment is attached to
    pub post_id: PostId,
    /// Comment content
    pub content: String,
    /// Comment being replied to
    #[serde(default)]
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    /// Check if this payload creates a reply
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Build the stored row once the store has assigned id and timestamp
    pub fn to_record(
        &self,
        id: CommentId,
        author: &Author,
        created_at: DateTime<Utc>,
    ) -> CommentRecord {
        CommentRecord {
            id: Some(id.get()),
            post_id: Some(self.post_id.get()),
            parent_comments_id: self.parent_id.map(CommentId::get),
            content: Some(self.content.clone()),
            user_id: Some(author.id.to_string()),
            author: Some(author.name.clone()),
            created_at: Some(created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_record(id: i64, parent: Option<i64>) -> CommentRecord {
        CommentRecord {
            id: Some(id),
            post_id: Some(1),
            parent_comments_id: parent,
            content: Some(format!("comment {}", id)),
            user_id: Some(AuthorId::new().to_string()),
            author: Some("alice".to_string()),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, id as u32).unwrap()),
        }
    }

    #[test]
    fn test_record_conversion() {
        let comment = Comment::try_from(create_test_record(3, Some(1))).unwrap();
        assert_eq!(comment.id, CommentId(3));
        assert_eq!(comment.post_id, PostId(1));
        assert_eq!(comment.parent_id, Some(CommentId(1)));
        assert_eq!(comment.author_name, "alice");
        assert!(comment.is_reply());
    }

    #[test]
    fn test_record_missing_id_rejected() {
        let mut record = create_test_record(3, None);
        record.id = None;
        let err = Comment::try_from(record).unwrap_err();
        assert!(err.to_string().contains("missing id"));
    }

    #[test]
    fn test_record_invalid_user_id_rejected() {
        let mut record = create_test_record(3, None);
        record.user_id = Some("nobody".to_string());
        assert!(Comment::try_from(record).is_err());
    }

    #[test]
    fn test_zero_parent_is_root() {
        let comment = Comment::try_from(create_test_record(2, Some(0))).unwrap();
        assert!(comment.is_root());
    }

    #[test]
    fn test_negative_parent_is_kept() {
        let comment = Comment::try_from(create_test_record(2, Some(-1))).unwrap();
        assert_eq!(comment.parent_id, Some(CommentId(-1)));
    }

    #[test]
    fn test_negative_parent_dangles_in_tree() {
        let records = vec![create_test_record(1, None), create_test_record(2, Some(-1))];
        let comments = comments_from_records(PostId(1), records);
        let (forest, report) =
            crate::comment::CommentTreeBuilder::new().build_with_report(&comments);

        assert_eq!(forest.len(), 1);
        assert_eq!(report.dangling, vec![CommentId(2)]);
    }

    #[test]
    fn test_missing_content_defaults_to_empty() {
        let mut record = create_test_record(2, None);
        record.content = None;
        let comment = Comment::try_from(record).unwrap();
        assert_eq!(comment.content, "");
    }

    #[test]
    fn test_backend_row_deserialization() {
        let json = r#"{
            "id": 7,
            "post_id": 1,
            "parent_comments_id": null,
            "content": "hello",
            "user_id": "6f1c8a4e-0a4b-4a51-9a38-0d6c2f1b9e2d",
            "author": "bob",
            "created_at": "2024-05-01T12:00:00.123456+00:00"
        }"#;
        let record: CommentRecord = serde_json::from_str(json).unwrap();
        let comment = Comment::try_from(record).unwrap();
        assert_eq!(comment.id, CommentId(7));
        assert!(comment.is_root());
    }

    #[test]
    fn test_comments_from_records_filters() {
        let mut other_post = create_test_record(4, None);
        other_post.post_id = Some(2);
        let mut malformed = create_test_record(5, None);
        malformed.created_at = None;

        let records = vec![
            create_test_record(1, None),
            other_post,
            malformed,
            create_test_record(2, Some(1)),
        ];
        let comments = comments_from_records(PostId(1), records);

        let ids: Vec<_> = comments.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_record_from_comment() {
        let comment = Comment::try_from(create_test_record(3, Some(1))).unwrap();
        let record = CommentRecord::from(&comment);
        assert_eq!(record.parent_comments_id, Some(1));
        assert_eq!(Comment::try_from(record).unwrap(), comment);
    }

    #[test]
    fn test_is_chronological() {
        let a = Comment::try_from(create_test_record(1, None)).unwrap();
        let b = Comment::try_from(create_test_record(2, None)).unwrap();
        assert!(is_chronological(&[a.clone(), b.clone()]));
        assert!(!is_chronological(&[b, a]));
        assert!(is_chronological(&[]));
    }

    #[test]
    fn test_self_reference_detection() {
        let comment = Comment::try_from(create_test_record(4, Some(4))).unwrap();
        assert!(comment.is_self_referencing());
    }

    #[test]
    fn test_new_comment_to_record() {
        let author = Author::new(AuthorId::new(), "carol");
        let new = NewComment {
            post_id: PostId(1),
            content: "reply".to_string(),
            parent_id: Some(CommentId(2)),
        };
        let now = Utc::now();
        let record = new.to_record(CommentId(9), &author, now);
        let comment = Comment::try_from(record).unwrap();
        assert_eq!(comment.parent_id, Some(CommentId(2)));
        assert_eq!(comment.author_id, author.id);
        assert_eq!(comment.created_at, now);
    }
}
