//! Content Gateway - a caching and fallback layer in front of a headless CMS
//!
//! Every content read goes through a TTL memory cache with stale-on-error
//! fallback, retries transient upstream failures with exponential backoff,
//! and ends at an error boundary that turns failures into safe defaults.

pub mod api;
pub mod boundary;
pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod retry;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use boundary::with_error_boundary;
pub use cache::MemoryCache;
pub use config::Config;
pub use content::ContentManager;
pub use error::{ApiError, ContentError};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use tasks::spawn_cleanup_task;
pub use upstream::{CmsClient, ContentSource};
