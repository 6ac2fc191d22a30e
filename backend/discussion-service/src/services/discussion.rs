/// Discussion service - wires the comment store to the notification broker
///
/// Every store call runs under the configured deadline. A comment is
/// published only after the store has accepted it.
use crate::broker::{CommentBroker, Subscription};
use crate::config::ServiceConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{Comment, CommentPage, Post};
use crate::storage::CommentStore;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct DiscussionService {
    store: Arc<dyn CommentStore>,
    broker: CommentBroker,
    config: ServiceConfig,
}

impl DiscussionService {
    pub fn new(store: Arc<dyn CommentStore>, broker: CommentBroker, config: ServiceConfig) -> Self {
        Self {
            store,
            broker,
            config,
        }
    }

    pub fn broker(&self) -> &CommentBroker {
        &self.broker
    }

    /// Run a store operation under the request deadline
    async fn with_deadline<T, F>(&self, operation: &'static str, future: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let timeout = self.config.request_timeout();
        match tokio::time::timeout(timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = timeout.as_millis() as u64,
                    "Store operation exceeded deadline"
                );
                Err(StoreError::Cancelled)
            }
        }
    }

    pub async fn create_post(&self, title: &str, content: &str) -> StoreResult<Post> {
        let post = self
            .with_deadline("create_post", self.store.create_post(title, content))
            .await?;

        info!(post_id = %post.id, "Post created");
        Ok(post)
    }

    pub async fn toggle_comments(&self, post_id: &str, disabled: bool) -> StoreResult<Post> {
        let post = self
            .with_deadline(
                "toggle_comments",
                self.store.toggle_comments(post_id, disabled),
            )
            .await?;

        info!(post_id, disabled, "Comments toggled");
        Ok(post)
    }

    pub async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        self.with_deadline("list_posts", self.store.list_posts())
            .await
    }

    pub async fn get_post(&self, post_id: &str) -> StoreResult<Post> {
        self.with_deadline("get_post", self.store.get_post(post_id))
            .await
    }

    /// Create a comment, then fan it out to the post's live subscribers
    pub async fn create_comment(
        &self,
        post_id: &str,
        parent_id: Option<&str>,
        content: &str,
    ) -> StoreResult<Comment> {
        let comment = self
            .with_deadline(
                "create_comment",
                self.store.create_comment(post_id, parent_id, content),
            )
            .await?;

        self.broker.publish(&comment);

        info!(
            post_id,
            comment_id = %comment.id,
            reply = !comment.is_top_level(),
            "Comment created"
        );
        Ok(comment)
    }

    /// List one page of comments; `first` defaults and is clamped per config
    pub async fn list_comments(
        &self,
        post_id: &str,
        first: Option<usize>,
        after: Option<&str>,
    ) -> StoreResult<CommentPage> {
        let first = self.page_size(first);
        self.with_deadline(
            "list_comments",
            self.store.list_comments(post_id, first, after),
        )
        .await
    }

    pub fn page_size(&self, first: Option<usize>) -> usize {
        first
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size)
    }

    /// Listen for new comments on a post
    ///
    /// The post is not required to exist; a listener on an unknown post
    /// simply never receives anything.
    pub fn subscribe(&self, post_id: &str) -> Subscription {
        self.broker.subscribe(post_id)
    }
}
