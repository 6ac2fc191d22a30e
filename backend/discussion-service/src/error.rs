/// Error types for discussion-service
///
/// Store and broker outcomes are values, not panics. Every variant is
/// recoverable by the caller; the service never retries on its own.
use async_graphql::ErrorExtensions;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced post does not exist
    #[error("not found")]
    NotFound,

    /// Comments are disabled on the target post
    #[error("comments disabled")]
    Forbidden,

    #[error("comment too long ({length} > {max})")]
    TooLong { length: usize, max: usize },

    /// Caller's deadline fired before the operation completed
    #[error("operation cancelled")]
    Cancelled,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Stable machine-readable code, surfaced as `extensions.code` in GraphQL.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound => "NOT_FOUND",
            StoreError::Forbidden => "FORBIDDEN",
            StoreError::TooLong { .. } => "TOO_LONG",
            StoreError::Cancelled => "CANCELLED",
            StoreError::Database(_) => "INTERNAL",
        }
    }

    /// Returns whether retrying the same call could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Cancelled => true,
            StoreError::Database(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }
}

impl ErrorExtensions for StoreError {
    fn extend(&self) -> async_graphql::Error {
        // Database details stay in the logs
        let message = match self {
            StoreError::Database(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", self.code()))
    }
}
