/// Data models for discussion-service
///
/// This module defines structures for:
/// - Post: Top-level discussion item that owns comments
/// - Comment: Reply to a post, optionally nested under a parent comment
/// - CommentPage: One cursor-paginated slice of a post's comments
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum comment length, counted in chars.
pub const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub comments_disabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            content: content.into(),
            comments_disabled: false,
            created_at: Utc::now(),
        }
    }
}

/// Comments are immutable once the store accepts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    /// `None` for top-level comments
    pub parent_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        post_id: impl Into<String>,
        parent_id: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            post_id: post_id.into(),
            parent_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A page of comments plus the cursor to resume after it.
///
/// `next_cursor` is the id of the last item and is only set while more
/// comments remain past this page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPage {
    pub items: Vec<Comment>,
    pub next_cursor: Option<String>,
}

impl CommentPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_next_page(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Fresh opaque identifier for posts and comments.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Length of comment content in the unit used for `MAX_COMMENT_LENGTH`.
pub fn content_length(content: &str) -> usize {
    content.chars().count()
}
