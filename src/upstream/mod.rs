//! Upstream Module
//!
//! Client side of the CMS contract: deterministic queries, the documented
//! response schema and the HTTP client.

mod client;
mod query;
pub mod schema;

pub use client::{CmsClient, ContentSource};
pub use query::ContentQuery;
