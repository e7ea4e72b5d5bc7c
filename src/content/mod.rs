//! Content Module
//!
//! View models, the CMS-to-view adapter, and the cached content manager.

mod adapter;
mod manager;
pub mod model;

pub use adapter::ContentAdapter;
pub use manager::ContentManager;
pub use model::{Article, Author, Category, Content, Image, Page, SiteSettings, Tag, TagSummary};
