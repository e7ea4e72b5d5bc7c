//! Upstream → view model adapter.
//!
//! The single place that knows the CMS schema. Envelope problems are `Decode`
//! errors; an individual record that does not match is logged and skipped.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::content::model::{Article, Author, Category, Image, SiteSettings, Tag};
use crate::error::{ContentError, Result};
use crate::upstream::schema::{
    ArticleRecord, AuthorRecord, CategoryRecord, ListEnvelope, MediaRecord, Pagination,
    SingleEnvelope, SiteSettingsRecord, TagRecord,
};

const EXCERPT_CHARS: usize = 160;
const WORDS_PER_MINUTE: usize = 200;

/// Maps CMS records to view models.
#[derive(Debug, Clone)]
pub struct ContentAdapter {
    /// Prefix for media URLs the CMS returns as site-relative paths
    media_base: String,
}

impl ContentAdapter {
    pub fn new(media_base: impl Into<String>) -> Self {
        Self {
            media_base: media_base.into().trim_end_matches('/').to_string(),
        }
    }

    // == Envelopes ==
    pub fn articles(&self, endpoint: &str, body: Value) -> Result<(Vec<Article>, Option<Pagination>)> {
        let (records, pagination) = decode_list::<ArticleRecord>(endpoint, body)?;
        let articles = records.into_iter().map(|r| self.article(r)).collect();
        Ok((articles, pagination))
    }

    /// First article of a filtered list, `None` for an empty list.
    pub fn first_article(&self, endpoint: &str, body: Value) -> Result<Option<Article>> {
        let (mut articles, _) = self.articles(endpoint, body)?;
        if articles.len() > 1 {
            warn!(endpoint, "Expected at most one article, got {}", articles.len());
        }
        Ok(if articles.is_empty() {
            None
        } else {
            Some(articles.swap_remove(0))
        })
    }

    pub fn categories(
        &self,
        endpoint: &str,
        body: Value,
    ) -> Result<(Vec<Category>, Option<Pagination>)> {
        let (records, pagination) = decode_list::<CategoryRecord>(endpoint, body)?;
        Ok((records.into_iter().map(category).collect(), pagination))
    }

    /// Site settings; a `null` document yields the defaults.
    pub fn site_settings(&self, endpoint: &str, body: Value) -> Result<SiteSettings> {
        let envelope: SingleEnvelope = serde_json::from_value(body).map_err(|e| decode_error(endpoint, e))?;
        let Some(raw) = envelope.data else {
            return Ok(SiteSettings::default());
        };
        let record: SiteSettingsRecord =
            serde_json::from_value(raw).map_err(|e| decode_error(endpoint, e))?;
        Ok(self.settings(record))
    }

    // == Records ==
    fn article(&self, record: ArticleRecord) -> Article {
        let body = record.content.unwrap_or_default();
        let excerpt = match record.description.filter(|d| !d.trim().is_empty()) {
            Some(description) => description.trim().to_string(),
            None => excerpt_from(&body, EXCERPT_CHARS),
        };

        Article {
            id: record.id,
            document_id: record.document_id,
            reading_time_minutes: reading_time(&body),
            title: record.title,
            slug: record.slug,
            excerpt,
            body,
            published_at: record.published_at,
            updated_at: record.updated_at,
            featured: record.featured,
            cover: record.cover.map(|m| self.image(m)),
            author: record.author.map(|a| self.author(a)),
            category: record.category.map(category),
            tags: record.tags.into_iter().map(tag).collect(),
        }
    }

    fn author(&self, record: AuthorRecord) -> Author {
        Author {
            name: record.name,
            bio: record.bio,
            avatar: record.avatar.map(|m| self.image(m)),
        }
    }

    fn settings(&self, record: SiteSettingsRecord) -> SiteSettings {
        let defaults = SiteSettings::default();
        let site_description = record.site_description.unwrap_or_default();
        let seo = record.default_seo;

        SiteSettings {
            meta_title: seo
                .as_ref()
                .and_then(|s| s.meta_title.clone())
                .unwrap_or_else(|| record.site_name.clone()),
            meta_description: seo
                .as_ref()
                .and_then(|s| s.meta_description.clone())
                .unwrap_or_else(|| site_description.clone()),
            share_image: seo.and_then(|s| s.share_image).map(|m| self.image(m)),
            favicon: record.favicon.map(|m| self.image(m)),
            site_name: if record.site_name.trim().is_empty() {
                defaults.site_name
            } else {
                record.site_name
            },
            site_description,
        }
    }

    fn image(&self, record: MediaRecord) -> Image {
        let url = if record.url.starts_with('/') {
            format!("{}{}", self.media_base, record.url)
        } else {
            record.url
        };
        Image {
            url,
            alt: record.alternative_text.unwrap_or_default(),
            width: record.width,
            height: record.height,
        }
    }
}

fn category(record: CategoryRecord) -> Category {
    Category {
        id: record.id,
        name: record.name,
        slug: record.slug,
        description: record.description,
    }
}

fn tag(record: TagRecord) -> Tag {
    Tag {
        name: record.name,
        slug: record.slug,
    }
}

fn decode_error(endpoint: &str, err: serde_json::Error) -> ContentError {
    ContentError::Decode {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

fn decode_list<R: DeserializeOwned>(
    endpoint: &str,
    body: Value,
) -> Result<(Vec<R>, Option<Pagination>)> {
    let envelope: ListEnvelope = serde_json::from_value(body).map_err(|e| decode_error(endpoint, e))?;

    let mut records = Vec::with_capacity(envelope.data.len());
    for raw in envelope.data {
        let id = raw.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<R>(raw) {
            Ok(record) => records.push(record),
            Err(e) => warn!(endpoint, %id, "Skipping record that does not match the schema: {}", e),
        }
    }

    Ok((records, envelope.meta.pagination))
}

/// First `max_chars` characters of `text` on a word boundary, with an ellipsis
/// when truncated.
fn excerpt_from(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end())
}

fn reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}
