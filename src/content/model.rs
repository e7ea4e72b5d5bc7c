//! View models handed to the rendering layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub url: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    pub name: String,
    pub slug: String,
}

// == Article ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: u64,
    pub document_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub featured: bool,
    pub cover: Option<Image>,
    pub author: Option<Author>,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub reading_time_minutes: u32,
}

impl Article {
    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|t| t.slug == slug)
    }

    pub fn in_category(&self, slug: &str) -> bool {
        self.category.as_ref().is_some_and(|c| c.slug == slug)
    }

    /// Case-insensitive match on title, excerpt and tag names.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.excerpt.to_lowercase().contains(needle)
            || self
                .tags
                .iter()
                .any(|t| t.name.to_lowercase().contains(needle))
    }

    /// Shared tags, plus one when both sit in the same category.
    pub fn relatedness(&self, other: &Article) -> usize {
        let shared_tags = self.tags.iter().filter(|t| other.has_tag(&t.slug)).count();
        let same_category = match (&self.category, &other.category) {
            (Some(a), Some(b)) => a.slug == b.slug,
            _ => false,
        };
        shared_tags + usize::from(same_category)
    }
}

// == Site Settings ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub favicon: Option<Image>,
    pub meta_title: String,
    pub meta_description: String,
    pub share_image: Option<Image>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Blog".to_string(),
            site_description: String::new(),
            favicon: None,
            meta_title: "Blog".to_string(),
            meta_description: String::new(),
            share_image: None,
        }
    }
}

// == Pagination ==
pub const MAX_PAGE_SIZE: u32 = 100;

/// One page of a collection. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: usize,
    pub page_count: u32,
}

impl<T: Clone> Page<T> {
    /// Slices `items`; page 0 is treated as 1, `page_size` is clamped to
    /// `1..=MAX_PAGE_SIZE`. A page past the end is empty.
    pub fn paginate(items: &[T], page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let total = items.len();
        let page_count = total.div_ceil(page_size as usize) as u32;

        let start = (page as usize - 1).saturating_mul(page_size as usize);
        let items = items
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();

        Self {
            items,
            page,
            page_size,
            total,
            page_count,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagSummary {
    #[serde(flatten)]
    pub tag: Tag,
    pub count: usize,
}

// == Cached Content ==
/// What the content manager keeps in its cache, one variant per base query.
#[derive(Debug, Clone)]
pub enum Content {
    Articles(Arc<Vec<Article>>),
    Article(Option<Arc<Article>>),
    Categories(Arc<Vec<Category>>),
    Settings(Arc<SiteSettings>),
}

impl Content {
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Articles(_) => "articles",
            Content::Article(_) => "article",
            Content::Categories(_) => "categories",
            Content::Settings(_) => "settings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(slug: &str) -> Tag {
        Tag {
            name: slug.to_uppercase(),
            slug: slug.to_string(),
        }
    }

    fn article(slug: &str, category: Option<&str>, tags: &[&str]) -> Article {
        Article {
            id: 1,
            document_id: None,
            title: format!("Title {slug}"),
            slug: slug.to_string(),
            excerpt: String::new(),
            body: String::new(),
            published_at: None,
            updated_at: None,
            featured: false,
            cover: None,
            author: None,
            category: category.map(|c| Category {
                id: 1,
                name: c.to_string(),
                slug: c.to_string(),
                description: None,
            }),
            tags: tags.iter().map(|t| tag(t)).collect(),
            reading_time_minutes: 1,
        }
    }

    #[test]
    fn test_paginate_middle_and_last_page() {
        let items: Vec<u32> = (1..=7).collect();

        let page = Page::paginate(&items, 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.total, 7);
        assert!(page.has_next());

        let last = Page::paginate(&items, 3, 3);
        assert_eq!(last.items, vec![7]);
        assert!(!last.has_next());
    }

    #[test]
    fn test_paginate_out_of_range_and_clamping() {
        let items: Vec<u32> = (1..=3).collect();
        assert!(Page::paginate(&items, 9, 3).items.is_empty());

        let page = Page::paginate(&items, 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec![1]);

        assert_eq!(Page::paginate(&items, 1, 1000).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_paginate_empty() {
        let page: Page<u32> = Page::paginate(&[], 1, 10);
        assert_eq!(page.page_count, 0);
        assert_eq!(page.total, 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_article_filters() {
        let a = article("a", Some("rust"), &["async", "tokio"]);
        assert!(a.has_tag("tokio"));
        assert!(!a.has_tag("go"));
        assert!(a.in_category("rust"));
        assert!(!a.in_category("go"));
        assert!(a.matches("title a"));
        assert!(a.matches("tokio"));
        assert!(!a.matches("python"));
    }

    #[test]
    fn test_relatedness() {
        let a = article("a", Some("rust"), &["async", "tokio"]);
        let b = article("b", Some("rust"), &["tokio"]);
        let c = article("c", None, &[]);
        assert_eq!(a.relatedness(&b), 2);
        assert_eq!(a.relatedness(&c), 0);
    }
}
