//! GraphQL schema: posts, paginated comments, and live comment subscriptions

pub mod content;
pub mod subscription;

use async_graphql::{MergedObject, Object, Schema};

use crate::config::GraphQLConfig;
use crate::services::DiscussionService;

#[derive(Default)]
pub struct HealthQuery;

#[Object]
impl HealthQuery {
    async fn health(&self) -> &'static str {
        "ok"
    }
}

/// Root query object
#[derive(MergedObject, Default)]
pub struct QueryRoot(content::ContentQuery, HealthQuery);

/// Root mutation object
#[derive(MergedObject, Default)]
pub struct MutationRoot(content::ContentMutation);

/// GraphQL App Schema type with WebSocket subscriptions
pub type AppSchema = Schema<QueryRoot, MutationRoot, subscription::SubscriptionRoot>;

pub fn build_schema(service: DiscussionService, config: &GraphQLConfig) -> AppSchema {
    let builder = Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        subscription::SubscriptionRoot::default(),
    )
    .data(service);

    if config.introspection {
        builder.finish()
    } else {
        builder.disable_introspection().finish()
    }
}
