//! API Handlers
//!
//! HTTP request handlers for the content and cache admin endpoints.
//! Content handlers never fail on upstream problems: the manager has
//! already degraded to cached or fallback data by the time they return.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::CacheStats;
use crate::content::{Article, Category, ContentManager, Page, SiteSettings, TagSummary};
use crate::error::ApiError;
use crate::models::{
    ClearResponse, HealthResponse, InvalidateResponse, PageQuery, RelatedQuery, SearchQuery,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<ContentManager>,
}

impl AppState {
    pub fn new(content: ContentManager) -> Self {
        Self {
            content: Arc::new(content),
        }
    }
}

// == Content ==

/// Handler for GET /api/articles
pub async fn list_articles_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<Page<Article>> {
    Json(
        state
            .content
            .articles_page(query.page(), query.page_size())
            .await,
    )
}

/// Handler for GET /api/articles/:slug
pub async fn get_article_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Arc<Article>>, ApiError> {
    state
        .content
        .article_by_slug(&slug)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("article '{}'", slug)))
}

/// Handler for GET /api/articles/:slug/related
pub async fn related_articles_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<RelatedQuery>,
) -> Json<Vec<Article>> {
    Json(state.content.related_articles(&slug, query.limit()).await)
}

pub async fn list_categories_handler(State(state): State<AppState>) -> Json<Arc<Vec<Category>>> {
    Json(state.content.categories().await)
}

pub async fn category_articles_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Json<Vec<Article>> {
    Json(state.content.articles_by_category(&slug).await)
}

pub async fn list_tags_handler(State(state): State<AppState>) -> Json<Vec<TagSummary>> {
    Json(state.content.tags().await)
}

pub async fn tag_articles_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Json<Vec<Article>> {
    Json(state.content.articles_by_tag(&slug).await)
}

/// Handler for GET /api/search?q=
///
/// A missing or blank `q` is rejected rather than answered with an empty list.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let term = query.term().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.content.search_articles(term).await))
}

pub async fn site_settings_handler(State(state): State<AppState>) -> Json<Arc<SiteSettings>> {
    Json(state.content.site_settings().await)
}

// == Cache Admin ==

/// Handler for GET /admin/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.content.cache_stats().await)
}

/// Handler for POST /admin/cache/clear
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(ClearResponse::new(state.content.clear_cache().await))
}

/// Handler for DELETE /admin/cache/entries/:key
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    if state.content.invalidate(&key).await {
        Ok(Json(InvalidateResponse::new(key)))
    } else {
        Err(ApiError::NotFound(format!("cache key '{}'", key)))
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.content.cache();
    Json(HealthResponse::healthy(cache.is_enabled(), cache.len().await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::content::{Content, ContentAdapter};
    use crate::error::{ContentError, Result};
    use crate::retry::RetryPolicy;
    use crate::upstream::{ContentQuery, ContentSource};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;

    struct StaticSource(Result<Value>);

    #[async_trait]
    impl ContentSource for StaticSource {
        async fn fetch(&self, _query: &ContentQuery) -> Result<Value> {
            self.0.clone()
        }
    }

    fn state(response: Result<Value>) -> AppState {
        AppState::new(ContentManager::new(
            Arc::new(StaticSource(response)),
            MemoryCache::new(10, Duration::from_secs(60)),
            ContentAdapter::new("http://cms.local"),
            RetryPolicy::disabled(),
        ))
    }

    fn one_article() -> Value {
        json!({"data": [{"id": 1, "title": "Hello", "slug": "hello", "content": "Hello world"}]})
    }

    #[tokio::test]
    async fn test_get_article_found_and_missing() {
        let found = get_article_handler(State(state(Ok(one_article()))), Path("hello".to_string())).await;
        assert_eq!(found.unwrap().title, "Hello");

        let empty = state(Ok(json!({"data": []})));
        let missing = get_article_handler(State(empty), Path("nope".to_string())).await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_rejects_blank_term() {
        let result = search_handler(State(state(Ok(one_article()))), Query(SearchQuery::default())).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_list_articles_degrades_to_empty_page() {
        let failing = state(Err(ContentError::upstream(500, "/articles")));
        let page = list_articles_handler(State(failing), Query(PageQuery::default())).await;
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_invalidate_unknown_key() {
        let result = invalidate_handler(State(state(Ok(one_article()))), Path("nope".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let app = state(Ok(one_article()));
        app.content
            .cache()
            .set("k", Content::Articles(Arc::new(Vec::new())), None)
            .await;

        let stats = cache_stats_handler(State(app.clone())).await;
        assert_eq!(stats.total_entries, 1);

        let cleared = clear_cache_handler(State(app)).await;
        assert_eq!(cleared.removed, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(state(Ok(one_article())))).await;
        assert_eq!(response.status, "healthy");
        assert!(response.cache_enabled);
        assert_eq!(response.cache_entries, 0);
    }
}
