use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse, GraphQLSubscription};
use std::sync::Arc;
use tracing::info;

use discussion_service::config::{Config, StorageBackend};
use discussion_service::logging::init_tracing;
use discussion_service::schema::{build_schema, AppSchema};
use discussion_service::{CommentBroker, CommentStore, DiscussionService, MemoryStore, PostgresStore};

async fn graphql_handler(schema: web::Data<AppSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphql_subscription_handler(
    schema: web::Data<AppSchema>,
    req: actix_web::HttpRequest,
    payload: web::Payload,
) -> actix_web::Result<HttpResponse> {
    GraphQLSubscription::new(schema.as_ref().clone()).start(&req, payload)
}

async fn health_handler() -> &'static str {
    "ok"
}

/// SDL endpoint for client code generation
async fn schema_handler(schema: web::Data<AppSchema>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(schema.sdl())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn CommentStore>> {
    match config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory comment store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .context("DATABASE_URL not set")?;
            let store = PostgresStore::connect(&config.database, url)
                .await
                .context("Postgres init failed")?;
            store
                .migrate()
                .await
                .context("Failed to run database migrations")?;
            info!("Using PostgreSQL comment store");
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting discussion-service...");

    let config = Config::from_env().context("Failed to load configuration")?;
    let store = build_store(&config).await?;

    let service = DiscussionService::new(store, CommentBroker::new(), config.service.clone());
    let schema = build_schema(service, &config.graphql);

    let bind_addr = config.bind_addr();
    info!("discussion-service listening on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(schema.clone()))
            .route("/graphql", web::post().to(graphql_handler))
            // WebSocket subscriptions
            .route("/graphql", web::get().to(graphql_subscription_handler))
            .route("/ws", web::get().to(graphql_subscription_handler))
            .route("/schema", web::get().to(schema_handler))
            .route("/health", web::get().to(health_handler))
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server failed")?;

    Ok(())
}
