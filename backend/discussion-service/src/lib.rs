//! Discussion Service Library
//!
//! Posts with nested comments, cursor-paginated listing, and live fan-out of
//! new comments to per-post subscribers.

pub mod broker;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod schema;
pub mod services;
pub mod storage;

pub use broker::{CommentBroker, SubscriberId, Subscription};
pub use error::{StoreError, StoreResult};
pub use services::DiscussionService;
pub use storage::{CommentStore, MemoryStore, PostgresStore};
