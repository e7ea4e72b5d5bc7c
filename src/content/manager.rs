//! Content Manager
//!
//! The uniform "get content" surface over the CMS. Every base query goes
//! through the memory cache, retries with backoff, and ends at an error
//! boundary, so callers always receive a value. Derived views are computed
//! from the cached article snapshot instead of being cached on their own.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::boundary::with_error_boundary;
use crate::cache::{CacheStats, MemoryCache};
use crate::config::Config;
use crate::content::adapter::ContentAdapter;
use crate::content::model::{Article, Category, Content, Page, SiteSettings, TagSummary};
use crate::error::{ContentError, Result};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::upstream::schema::Pagination;
use crate::upstream::{ContentQuery, ContentSource};

/// Page size used when walking a collection.
const COLLECTION_PAGE_SIZE: u32 = 100;
/// Hard stop for collection walks.
const MAX_COLLECTION_PAGES: u32 = 50;

// == Upstream Access ==
/// Everything a fetch thunk needs, cheap to clone into a `'static` future.
#[derive(Clone)]
struct Upstream {
    source: Arc<dyn ContentSource>,
    adapter: Arc<ContentAdapter>,
    retry: RetryPolicy,
}

impl Upstream {
    async fn fetch(&self, query: &ContentQuery) -> Result<Value> {
        retry_with_backoff(&self.retry, || self.source.fetch(query)).await
    }

    /// Fetches every page of a collection reported by `meta.pagination`.
    async fn collection<T>(
        &self,
        base: &ContentQuery,
        decode: fn(&ContentAdapter, &str, Value) -> Result<(Vec<T>, Option<Pagination>)>,
    ) -> Result<Vec<T>> {
        let endpoint = base.to_string();
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let body = self.fetch(&base.with_page(page, COLLECTION_PAGE_SIZE)).await?;
            let (batch, pagination) = decode(self.adapter.as_ref(), &endpoint, body)?;
            items.extend(batch);

            let page_count = pagination.map(|p| p.page_count).unwrap_or(1);
            if page >= page_count || page >= MAX_COLLECTION_PAGES {
                break;
            }
            page += 1;
        }

        debug!("Fetched {} items from {} in {} pages", items.len(), endpoint, page);
        Ok(items)
    }
}

// == Content Manager ==
pub struct ContentManager {
    upstream: Upstream,
    cache: MemoryCache<Content>,
    settings_ttl: Option<Duration>,
}

impl ContentManager {
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: MemoryCache<Content>,
        adapter: ContentAdapter,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            upstream: Upstream {
                source,
                adapter: Arc::new(adapter),
                retry,
            },
            cache,
            settings_ttl: None,
        }
    }

    /// Wires a manager from the startup configuration.
    pub fn from_config(config: &Config, source: Arc<dyn ContentSource>) -> Self {
        Self::new(
            source,
            MemoryCache::from_config(&config.cache),
            ContentAdapter::new(config.cms.base_url.clone()),
            config.effective_retry(),
        )
        .with_settings_ttl(config.cache.settings_ttl)
    }

    pub fn with_settings_ttl(mut self, ttl: Duration) -> Self {
        self.settings_ttl = Some(ttl);
        self
    }

    pub fn cache(&self) -> &MemoryCache<Content> {
        &self.cache
    }

    // == Queries ==
    fn articles_query() -> ContentQuery {
        ContentQuery::new("articles", "articles")
            .param("populate", "*")
            .param("sort", "publishedAt:desc")
            .param("status", "published")
    }

    fn article_query(slug: &str) -> ContentQuery {
        ContentQuery::new("article_by_slug", "articles")
            .param("filters[slug][$eq]", slug)
            .param("populate", "*")
            .param("status", "published")
    }

    fn categories_query() -> ContentQuery {
        ContentQuery::new("categories", "categories").param("sort", "name:asc")
    }

    fn settings_query() -> ContentQuery {
        ContentQuery::new("site_settings", "global").param("populate", "*")
    }

    /// Cached lookup of `query`, running `load` on a miss.
    async fn load<F, Fut>(&self, query: ContentQuery, ttl: Option<Duration>, load: F) -> Result<Content>
    where
        F: FnOnce(Upstream, ContentQuery) -> Fut,
        Fut: Future<Output = Result<Content>> + Send + 'static,
    {
        let key = query.cache_key();
        let upstream = self.upstream.clone();
        self.cache.get(&key, move || load(upstream, query), ttl).await
    }

    // == Base Queries ==
    /// All published articles, newest first. Empty on failure.
    pub async fn articles(&self) -> Arc<Vec<Article>> {
        with_error_boundary(self.try_articles(), Arc::new(Vec::new()), "articles").await
    }

    async fn try_articles(&self) -> Result<Arc<Vec<Article>>> {
        let content = self
            .load(Self::articles_query(), None, |upstream, query| async move {
                let mut articles = upstream.collection(&query, ContentAdapter::articles).await?;
                articles.sort_by_key(|a| Reverse(a.published_at));
                Ok(Content::Articles(Arc::new(articles)))
            })
            .await?;

        match content {
            Content::Articles(articles) => Ok(articles),
            other => Err(kind_mismatch("articles", &other)),
        }
    }

    /// One article by slug. `None` when it does not exist or cannot be fetched.
    pub async fn article_by_slug(&self, slug: &str) -> Option<Arc<Article>> {
        let context = format!("article_by_slug({slug})");
        with_error_boundary(self.try_article_by_slug(slug), None, &context).await
    }

    async fn try_article_by_slug(&self, slug: &str) -> Result<Option<Arc<Article>>> {
        // A fresh collection holds every published article, so unknown slugs
        // are answered from it without adding cache entries.
        if let Some(Content::Articles(articles)) =
            self.cache.peek_fresh(&Self::articles_query().cache_key()).await
        {
            debug!(slug, "Resolving article from cached collection");
            return Ok(articles
                .iter()
                .find(|a| a.slug == slug)
                .map(|a| Arc::new(a.clone())));
        }

        let content = self
            .load(Self::article_query(slug), None, |upstream, query| async move {
                let body = upstream.fetch(&query).await?;
                let article = upstream.adapter.first_article(&query.to_string(), body)?;
                Ok(Content::Article(article.map(Arc::new)))
            })
            .await?;

        match content {
            Content::Article(article) => Ok(article),
            other => Err(kind_mismatch("article", &other)),
        }
    }

    /// All categories, by name. Empty on failure.
    pub async fn categories(&self) -> Arc<Vec<Category>> {
        with_error_boundary(self.try_categories(), Arc::new(Vec::new()), "categories").await
    }

    async fn try_categories(&self) -> Result<Arc<Vec<Category>>> {
        let content = self
            .load(Self::categories_query(), None, |upstream, query| async move {
                let categories = upstream.collection(&query, ContentAdapter::categories).await?;
                Ok(Content::Categories(Arc::new(categories)))
            })
            .await?;

        match content {
            Content::Categories(categories) => Ok(categories),
            other => Err(kind_mismatch("categories", &other)),
        }
    }

    /// Site-wide settings. Defaults on failure.
    pub async fn site_settings(&self) -> Arc<SiteSettings> {
        with_error_boundary(
            self.try_site_settings(),
            Arc::new(SiteSettings::default()),
            "site_settings",
        )
        .await
    }

    async fn try_site_settings(&self) -> Result<Arc<SiteSettings>> {
        let content = self
            .load(Self::settings_query(), self.settings_ttl, |upstream, query| async move {
                let body = upstream.fetch(&query).await?;
                let settings = upstream.adapter.site_settings(&query.to_string(), body)?;
                Ok(Content::Settings(Arc::new(settings)))
            })
            .await?;

        match content {
            Content::Settings(settings) => Ok(settings),
            other => Err(kind_mismatch("settings", &other)),
        }
    }

    // == Derived Views ==
    pub async fn articles_page(&self, page: u32, page_size: u32) -> Page<Article> {
        let articles = self.articles().await;
        Page::paginate(&articles, page, page_size)
    }

    pub async fn articles_by_category(&self, category_slug: &str) -> Vec<Article> {
        self.filter_articles(|a| a.in_category(category_slug)).await
    }

    pub async fn articles_by_tag(&self, tag_slug: &str) -> Vec<Article> {
        self.filter_articles(|a| a.has_tag(tag_slug)).await
    }

    /// Case-insensitive search; a blank term matches nothing.
    pub async fn search_articles(&self, term: &str) -> Vec<Article> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.filter_articles(|a| a.matches(&needle)).await
    }

    /// Articles sharing tags or the category with `slug`, most related first,
    /// newer first among equals.
    pub async fn related_articles(&self, slug: &str, limit: usize) -> Vec<Article> {
        let articles = self.articles().await;
        let Some(current) = articles.iter().find(|a| a.slug == slug) else {
            return Vec::new();
        };

        let mut scored: Vec<(usize, &Article)> = articles
            .iter()
            .filter(|a| a.slug != slug)
            .map(|a| (current.relatedness(a), a))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by_key(|(score, a)| (Reverse(*score), Reverse(a.published_at)));

        scored
            .into_iter()
            .take(limit)
            .map(|(_, a)| a.clone())
            .collect()
    }

    /// Every tag used by an article, with usage counts, most used first.
    pub async fn tags(&self) -> Vec<TagSummary> {
        let articles = self.articles().await;
        let mut counts: HashMap<&str, TagSummary> = HashMap::new();

        for tag in articles.iter().flat_map(|a| a.tags.iter()) {
            counts
                .entry(tag.slug.as_str())
                .or_insert_with(|| TagSummary {
                    tag: tag.clone(),
                    count: 0,
                })
                .count += 1;
        }

        let mut tags: Vec<TagSummary> = counts.into_values().collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.name.cmp(&b.tag.name)));
        tags
    }

    async fn filter_articles<P>(&self, predicate: P) -> Vec<Article>
    where
        P: Fn(&Article) -> bool,
    {
        let articles = self.articles().await;
        articles.iter().filter(|a| predicate(a)).cloned().collect()
    }

    // == Cache Admin ==
    pub async fn clear_cache(&self) -> usize {
        self.cache.clear().await
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.cache.delete(key).await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

fn kind_mismatch(expected: &str, found: &Content) -> ContentError {
    ContentError::Internal(format!(
        "cache entry holds {} where {} was expected",
        found.kind(),
        expected
    ))
}
