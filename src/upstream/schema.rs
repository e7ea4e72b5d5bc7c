//! Upstream CMS schema.
//!
//! The documented response envelopes and record shapes. Records are flat
//! (no `attributes` nesting) with camelCase field names; nothing here tries
//! alternative layouts.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

// == Envelopes ==
/// `{ "data": [...], "meta": { "pagination": {...} } }`
///
/// Records stay as raw JSON so one malformed record can be reported and
/// skipped without losing the rest of the page.
#[derive(Debug, Deserialize)]
pub struct ListEnvelope {
    pub data: Vec<Value>,
    #[serde(default)]
    pub meta: Meta,
}

/// `{ "data": {...} | null }`
#[derive(Debug, Deserialize)]
pub struct SingleEnvelope {
    pub data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u32,
}

// == Records ==
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub id: u64,
    pub document_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub featured: bool,
    pub cover: Option<MediaRecord>,
    pub author: Option<AuthorRecord>,
    pub category: Option<CategoryRecord>,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub url: String,
    pub alternative_text: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorRecord {
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Option<MediaRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagRecord {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingsRecord {
    pub site_name: String,
    pub site_description: Option<String>,
    pub favicon: Option<MediaRecord>,
    pub default_seo: Option<SeoRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoRecord {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub share_image: Option<MediaRecord>,
}
