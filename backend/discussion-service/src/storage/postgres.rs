//! PostgreSQL-backed comment store
//!
//! Same outcomes, ordering, and cursor semantics as `MemoryStore`:
//! - per-post order is the `comments.seq` column, assigned while the post row
//!   is locked, so it matches commit order
//! - an unknown or malformed cursor restarts at the first comment
//! - malformed post ids behave like missing posts

use super::{validate_comment_length, CommentStore};
use crate::config::DatabaseConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{Comment, CommentPage, Post};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    content: String,
    comments_disabled: bool,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id.to_string(),
            title: row.title,
            content: row.content,
            comments_disabled: row.comments_disabled,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    parent_id: Option<String>,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id.to_string(),
            post_id: row.post_id.to_string(),
            parent_id: row.parent_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

/// Row limit for a page of `first`; one extra row tells us whether another
/// page exists.
fn fetch_limit(first: usize) -> i64 {
    i64::try_from(first).unwrap_or(i64::MAX).saturating_add(1)
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and verify it with a round trip
    pub async fn connect(config: &DatabaseConfig, database_url: &str) -> Result<Self, sqlx::Error> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Creating database pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        info!("Database pool created and verified successfully");

        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CommentStore for PostgresStore {
    async fn create_post(&self, title: &str, content: &str) -> StoreResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, title, content, comments_disabled, created_at)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING id, title, content, comments_disabled, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(post_id = %row.id, "Created post");
        Ok(row.into())
    }

    async fn toggle_comments(&self, post_id: &str, disabled: bool) -> StoreResult<Post> {
        let id = parse_id(post_id).ok_or(StoreError::NotFound)?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET comments_disabled = $1
            WHERE id = $2
            RETURNING id, title, content, comments_disabled, created_at
            "#,
        )
        .bind(disabled)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        debug!(post_id, disabled, "Toggled comments");
        Ok(row.into())
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, comments_disabled, created_at
            FROM posts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, post_id: &str) -> StoreResult<Post> {
        let id = parse_id(post_id).ok_or(StoreError::NotFound)?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, comments_disabled, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(row.into())
    }

    async fn create_comment(
        &self,
        post_id: &str,
        parent_id: Option<&str>,
        content: &str,
    ) -> StoreResult<Comment> {
        validate_comment_length(content)?;
        let post_uuid = parse_id(post_id).ok_or(StoreError::NotFound)?;

        let mut tx = self.pool.begin().await?;

        // Row lock conflicts with the UPDATE in toggle_comments
        let disabled: Option<bool> = sqlx::query_scalar(
            "SELECT comments_disabled FROM posts WHERE id = $1 FOR UPDATE",
        )
        .bind(post_uuid)
        .fetch_optional(&mut *tx)
        .await?;

        match disabled {
            None => return Err(StoreError::NotFound),
            Some(true) => return Err(StoreError::Forbidden),
            Some(false) => {}
        }

        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (id, post_id, parent_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, parent_id, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_uuid)
        .bind(parent_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(post_id, comment_id = %row.id, "Appended comment");
        Ok(row.into())
    }

    async fn list_comments(
        &self,
        post_id: &str,
        first: usize,
        after: Option<&str>,
    ) -> StoreResult<CommentPage> {
        let Some(post_uuid) = parse_id(post_id) else {
            return Ok(CommentPage::empty());
        };
        if first == 0 {
            return Ok(CommentPage::empty());
        }

        let limit = fetch_limit(first);
        let cursor = after.and_then(parse_id);

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, parent_id, content, created_at
            FROM comments
            WHERE post_id = $1
              AND seq > COALESCE(
                  (SELECT seq FROM comments WHERE id = $2 AND post_id = $1),
                  0
              )
            ORDER BY seq ASC
            LIMIT $3
            "#,
        )
        .bind(post_uuid)
        .bind(cursor)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let has_more = rows.len() > first;
        let items: Vec<Comment> = rows.into_iter().take(first).map(Comment::from).collect();
        let next_cursor = if has_more {
            items.last().map(|c| c.id.clone())
        } else {
            None
        };

        Ok(CommentPage { items, next_cursor })
    }
}
