//! Posts and comments schema

use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult, SimpleObject, ID};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models;
use crate::services::DiscussionService;

#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: ID,
    pub title: String,
    pub content: String,
    pub comments_disabled: bool,
    pub created_at: String,
}

impl From<models::Post> for Post {
    fn from(post: models::Post) -> Self {
        Post {
            id: ID(post.id),
            title: post.title,
            content: post.content,
            comments_disabled: post.comments_disabled,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: ID,
    pub post_id: ID,
    pub parent_id: Option<ID>,
    pub content: String,
    pub created_at: String,
}

impl From<models::Comment> for Comment {
    fn from(comment: models::Comment) -> Self {
        Comment {
            id: ID(comment.id),
            post_id: ID(comment.post_id),
            parent_id: comment.parent_id.map(ID),
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// One page of a post's comments
#[derive(SimpleObject, Clone, Debug)]
pub struct CommentConnection {
    pub items: Vec<Comment>,
    /// Pass as `after` to fetch the next page; null on the last page
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

impl From<models::CommentPage> for CommentConnection {
    fn from(page: models::CommentPage) -> Self {
        let has_next_page = page.has_next_page();
        CommentConnection {
            items: page.items.into_iter().map(Comment::from).collect(),
            next_cursor: page.next_cursor,
            has_next_page,
        }
    }
}

pub(crate) fn service<'a>(ctx: &Context<'a>) -> GraphQLResult<&'a DiscussionService> {
    ctx.data::<DiscussionService>()
        .map_err(|_| "Discussion service not available".into())
}

fn store_error(err: StoreError) -> async_graphql::Error {
    if let StoreError::Database(e) = &err {
        tracing::error!(error = %e, "Store operation failed");
    }
    err.extend()
}

#[derive(Default)]
pub struct ContentQuery;

#[Object]
impl ContentQuery {
    /// All posts, newest first
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Post>> {
        let posts = service(ctx)?.list_posts().await.map_err(store_error)?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn post(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<Option<Post>> {
        match service(ctx)?.get_post(id.as_str()).await {
            Ok(post) => Ok(Some(post.into())),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(store_error(e)),
        }
    }

    /// Comments on a post in creation order, cursor-paginated
    async fn comments(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        first: Option<i32>,
        after: Option<String>,
    ) -> GraphQLResult<CommentConnection> {
        let first = match first {
            Some(n) if n < 0 => {
                return Err(async_graphql::Error::new("'first' must be non-negative")
                    .extend_with(|_, e| e.set("code", "BAD_REQUEST")));
            }
            Some(n) => Some(n as usize),
            None => None,
        };

        let page = service(ctx)?
            .list_comments(post_id.as_str(), first, after.as_deref())
            .await
            .map_err(store_error)?;
        Ok(page.into())
    }
}

#[derive(Default)]
pub struct ContentMutation;

#[Object]
impl ContentMutation {
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        title: String,
        content: String,
    ) -> GraphQLResult<Post> {
        let post = service(ctx)?
            .create_post(&title, &content)
            .await
            .map_err(store_error)?;
        Ok(post.into())
    }

    async fn toggle_comments(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        disabled: bool,
    ) -> GraphQLResult<Post> {
        let post = service(ctx)?
            .toggle_comments(post_id.as_str(), disabled)
            .await
            .map_err(store_error)?;
        Ok(post.into())
    }

    async fn create_comment(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        parent_id: Option<ID>,
        content: String,
    ) -> GraphQLResult<Comment> {
        let comment = service(ctx)?
            .create_comment(
                post_id.as_str(),
                parent_id.as_ref().map(|id| id.as_str()),
                &content,
            )
            .await
            .map_err(store_error)?;
        Ok(comment.into())
    }
}
