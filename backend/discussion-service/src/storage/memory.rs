use super::{pagination, validate_comment_length, CommentStore};
use crate::error::{StoreError, StoreResult};
use crate::models::{Comment, CommentPage, Post};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory comment store
///
/// One reader/writer lock guards all post and comment state. Reads share the
/// lock; creates and toggles take it exclusively, so the comments-disabled
/// check and the append in `create_comment` cannot interleave with a toggle.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    posts: HashMap<String, Post>,
    // post ids in insertion order
    post_order: Vec<String>,
    // post_id -> append-only comment sequence
    comments: HashMap<String, Vec<Comment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_post(&self, title: &str, content: &str) -> StoreResult<Post> {
        let post = Post::new(title, content);

        let mut guard = self.inner.write().await;
        guard.post_order.push(post.id.clone());
        guard.posts.insert(post.id.clone(), post.clone());

        debug!(post_id = %post.id, "Created post");
        Ok(post)
    }

    async fn toggle_comments(&self, post_id: &str, disabled: bool) -> StoreResult<Post> {
        let mut guard = self.inner.write().await;
        let post = guard.posts.get_mut(post_id).ok_or(StoreError::NotFound)?;
        post.comments_disabled = disabled;

        debug!(post_id, disabled, "Toggled comments");
        Ok(post.clone())
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let guard = self.inner.read().await;
        let mut posts: Vec<Post> = guard
            .post_order
            .iter()
            .rev()
            .filter_map(|id| guard.posts.get(id).cloned())
            .collect();
        // Stable sort keeps reverse insertion order for equal timestamps
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn get_post(&self, post_id: &str) -> StoreResult<Post> {
        let guard = self.inner.read().await;
        guard.posts.get(post_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn create_comment(
        &self,
        post_id: &str,
        parent_id: Option<&str>,
        content: &str,
    ) -> StoreResult<Comment> {
        validate_comment_length(content)?;

        let mut guard = self.inner.write().await;
        let post = guard.posts.get(post_id).ok_or(StoreError::NotFound)?;
        if post.comments_disabled {
            return Err(StoreError::Forbidden);
        }

        let comment = Comment::new(post_id, parent_id.map(str::to_owned), content);
        let sequence = guard.comments.entry(post_id.to_string()).or_default();
        sequence.push(comment.clone());

        debug!(
            post_id,
            comment_id = %comment.id,
            total = sequence.len(),
            "Appended comment"
        );
        Ok(comment)
    }

    async fn list_comments(
        &self,
        post_id: &str,
        first: usize,
        after: Option<&str>,
    ) -> StoreResult<CommentPage> {
        let guard = self.inner.read().await;
        let page = match guard.comments.get(post_id) {
            Some(all) => pagination::paginate(all, first, after),
            None => CommentPage::empty(),
        };
        Ok(page)
    }
}
