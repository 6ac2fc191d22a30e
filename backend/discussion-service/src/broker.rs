use crate::models::Comment;
use futures_util::stream::Stream;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use uuid::Uuid;

/// Per-subscriber buffer. A full buffer drops the publish for that
/// subscriber only.
pub const SUBSCRIBER_BUFFER: usize = 1;

/// Unique identifier for a comment subscriber
///
/// Each subscription gets its own ID so unsubscribe removes exactly one
/// channel even when many listeners watch the same post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Subscriber entry with ID and channel
struct Subscriber {
    id: SubscriberId,
    sender: Sender<Comment>,
}

/// In-process fan-out of new comments to live listeners, scoped per post
///
/// Subscribe and unsubscribe take the write lock. Publish only takes the
/// read lock and never waits on a subscriber, so concurrent publishes do not
/// serialize against each other and a stalled listener cannot stall writers.
#[derive(Default, Clone)]
pub struct CommentBroker {
    // post_id -> subscribers
    inner: Arc<RwLock<HashMap<String, Vec<Subscriber>>>>,
}

impl CommentBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `post_id`
    ///
    /// Publishes that start after this returns are delivered to the new
    /// subscription.
    pub fn subscribe(&self, post_id: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let subscriber_id = SubscriberId::new();

        let mut guard = self.inner.write();
        let subscribers = guard.entry(post_id.to_string()).or_default();
        subscribers.push(Subscriber {
            id: subscriber_id,
            sender: tx,
        });

        tracing::debug!(
            post_id,
            subscriber_id = %subscriber_id,
            total = subscribers.len(),
            "Added comment subscriber"
        );

        Subscription {
            id: subscriber_id,
            post_id: post_id.to_string(),
            receiver: rx,
            broker: self.clone(),
        }
    }

    /// Remove a subscriber and close its channel
    ///
    /// Dropping the sender ends the receiver's stream once any buffered
    /// comment has been taken. Removing an unknown subscriber is a no-op.
    pub fn unsubscribe(&self, post_id: &str, subscriber_id: SubscriberId) {
        let mut guard = self.inner.write();

        if let Some(subscribers) = guard.get_mut(post_id) {
            let before = subscribers.len();
            subscribers.retain(|s| s.id != subscriber_id);
            let after = subscribers.len();

            if before != after {
                tracing::debug!(
                    post_id,
                    subscriber_id = %subscriber_id,
                    remaining = after,
                    "Removed comment subscriber"
                );
            }

            // Clean up empty post entries
            if subscribers.is_empty() {
                guard.remove(post_id);
                tracing::debug!(post_id, "Removed empty post from broker");
            }
        }
    }

    /// Hand `comment` to every current subscriber of its post
    ///
    /// Best effort: a full or closed channel loses this comment silently.
    pub fn publish(&self, comment: &Comment) {
        let guard = self.inner.read();
        let Some(subscribers) = guard.get(&comment.post_id) else {
            return;
        };

        let mut delivered = 0usize;
        for subscriber in subscribers {
            match subscriber.sender.try_send(comment.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!(
                        post_id = %comment.post_id,
                        subscriber_id = %subscriber.id,
                        "Subscriber buffer full, dropping comment"
                    );
                }
                // Receiver closed without unsubscribing; nothing to deliver to
                Err(TrySendError::Closed(_)) => {}
            }
        }

        tracing::debug!(
            post_id = %comment.post_id,
            comment_id = %comment.id,
            delivered,
            subscribers = subscribers.len(),
            "Published comment"
        );
    }

    /// Get subscriber count for a post (for debugging/metrics)
    pub fn subscriber_count(&self, post_id: &str) -> usize {
        let guard = self.inner.read();
        guard.get(post_id).map(|v| v.len()).unwrap_or(0)
    }

    /// Number of posts with at least one subscriber
    pub fn active_posts(&self) -> usize {
        self.inner.read().len()
    }
}

/// Receiving side of a broker registration
///
/// Yields comments for one post until unsubscribed. Dropping the handle
/// unsubscribes it, so an abandoned listener does not linger in the broker.
pub struct Subscription {
    id: SubscriberId,
    post_id: String,
    receiver: Receiver<Comment>,
    broker: CommentBroker,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    /// Wait for the next comment; `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<Comment> {
        self.receiver.recv().await
    }

    /// Release the broker-side channel. Safe to call more than once.
    pub fn unsubscribe(&self) {
        self.broker.unsubscribe(&self.post_id, self.id);
    }
}

impl Stream for Subscription {
    type Item = Comment;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broker.unsubscribe(&self.post_id, self.id);
    }
}
