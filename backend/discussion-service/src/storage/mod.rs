//! Comment store contract and its realizations.
//!
//! `MemoryStore` is the reference realization; `PostgresStore` substitutes
//! durable persistence with the same outcomes, ordering, and cursor rules.
//!
//! Cancellation: dropping a returned future cancels the call. Deadlines are
//! applied by `DiscussionService` and surface as `StoreError::Cancelled`.

pub mod memory;
pub mod pagination;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::error::{StoreError, StoreResult};
use crate::models::{content_length, Comment, CommentPage, Post, MAX_COMMENT_LENGTH};
use async_trait::async_trait;

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Create a post with comments enabled.
    async fn create_post(&self, title: &str, content: &str) -> StoreResult<Post>;

    /// Set the comments-disabled flag. Serializes with `create_comment` on
    /// the same post.
    async fn toggle_comments(&self, post_id: &str, disabled: bool) -> StoreResult<Post>;

    /// All posts, newest first.
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;

    async fn get_post(&self, post_id: &str) -> StoreResult<Post>;

    /// Append a comment to a post.
    ///
    /// Length is checked first, so `TooLong` wins over `NotFound` and
    /// `Forbidden`. The post check and the append are one atomic step.
    /// `parent_id` is stored as given and not checked against existing
    /// comments.
    async fn create_comment(
        &self,
        post_id: &str,
        parent_id: Option<&str>,
        content: &str,
    ) -> StoreResult<Comment>;

    /// Page through a post's comments in creation order.
    ///
    /// An unknown post yields an empty page, same as a post with no comments.
    async fn list_comments(
        &self,
        post_id: &str,
        first: usize,
        after: Option<&str>,
    ) -> StoreResult<CommentPage>;
}

/// Length check shared by all realizations; runs before any shared state is
/// touched.
pub fn validate_comment_length(content: &str) -> StoreResult<()> {
    let length = content_length(content);
    if length > MAX_COMMENT_LENGTH {
        return Err(StoreError::TooLong {
            length,
            max: MAX_COMMENT_LENGTH,
        });
    }
    Ok(())
}
