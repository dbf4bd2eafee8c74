//! Core type definitions for threadline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a comment, assigned by the store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl CommentId {
    /// Get the raw integer value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for CommentId {
    fn from(id: i64) -> Self {
        CommentId(id)
    }
}

impl FromStr for CommentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CommentId)
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the post a comment section belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl PostId {
    /// Get the raw integer value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for PostId {
    fn from(id: i64) -> Self {
        PostId(id)
    }
}

impl FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PostId)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a comment author, as issued by the auth backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(pub Uuid);

impl AuthorId {
    /// Generate a new random AuthorId
    pub fn new() -> Self {
        AuthorId(Uuid::new_v4())
    }

    /// Create from UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(AuthorId(Uuid::parse_str(s)?))
    }
}

impl Default for AuthorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the signed-in user posting a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Auth backend user id
    pub id: AuthorId,
    /// Display name shown next to comments
    pub name: String,
}

impl Author {
    /// Create a new author identity
    pub fn new(id: AuthorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
