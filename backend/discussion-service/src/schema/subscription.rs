//! GraphQL Subscriptions (WebSocket support)
//! Pushes newly created comments to listeners of a post

use async_graphql::{Context, Subscription, ID};
use futures_util::stream::{Stream, StreamExt};

use super::content::{service, Comment};

#[derive(Default)]
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Emits each comment created on `postId` while the subscription is open
    ///
    /// Delivery is best effort: a client that falls behind misses comments
    /// instead of slowing down writers. Closing the subscription releases the
    /// broker registration.
    async fn comment_added(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
    ) -> async_graphql::Result<impl Stream<Item = Comment>> {
        let subscription = service(ctx)?.subscribe(post_id.as_str());

        tracing::debug!(
            post_id = %post_id.as_str(),
            subscriber_id = %subscription.id(),
            "commentAdded subscription started"
        );

        Ok(subscription.map(Comment::from))
    }
}
