//! API Routes
//!
//! Configures the Axum router with the content and cache admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, category_articles_handler, clear_cache_handler, get_article_handler,
    health_handler, invalidate_handler, list_articles_handler, list_categories_handler,
    list_tags_handler, related_articles_handler, search_handler, site_settings_handler,
    tag_articles_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /api/articles` - Paginated article listing
/// - `GET /api/articles/:slug` - Single article
/// - `GET /api/articles/:slug/related` - Related articles
/// - `GET /api/categories` - All categories
/// - `GET /api/categories/:slug/articles` - Articles in a category
/// - `GET /api/tags` - Tags with usage counts
/// - `GET /api/tags/:slug/articles` - Articles with a tag
/// - `GET /api/search?q=` - Full-text search
/// - `GET /api/settings` - Site settings
/// - `GET /admin/cache/stats` - Cache statistics
/// - `POST /admin/cache/clear` - Drop every cache entry
/// - `DELETE /admin/cache/entries/:key` - Drop one cache entry
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let content = Router::new()
        .route("/articles", get(list_articles_handler))
        .route("/articles/:slug", get(get_article_handler))
        .route("/articles/:slug/related", get(related_articles_handler))
        .route("/categories", get(list_categories_handler))
        .route("/categories/:slug/articles", get(category_articles_handler))
        .route("/tags", get(list_tags_handler))
        .route("/tags/:slug/articles", get(tag_articles_handler))
        .route("/search", get(search_handler))
        .route("/settings", get(site_settings_handler));

    let admin = Router::new()
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/clear", post(clear_cache_handler))
        .route("/cache/entries/:key", delete(invalidate_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", content)
        .nest("/admin", admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::content::{ContentAdapter, ContentManager};
    use crate::error::Result;
    use crate::retry::RetryPolicy;
    use crate::upstream::{ContentQuery, ContentSource};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    struct EmptySource;

    #[async_trait]
    impl ContentSource for EmptySource {
        async fn fetch(&self, _query: &ContentQuery) -> Result<Value> {
            Ok(json!({"data": []}))
        }
    }

    fn create_test_app() -> Router {
        let manager = ContentManager::new(
            Arc::new(EmptySource),
            MemoryCache::new(10, Duration::from_secs(60)),
            ContentAdapter::new("http://cms.local"),
            RetryPolicy::disabled(),
        );
        create_router(AppState::new(manager))
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        create_test_app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of("GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_content_routes_are_mounted() {
        for uri in [
            "/api/articles",
            "/api/articles/some-slug/related",
            "/api/categories",
            "/api/categories/rust/articles",
            "/api/tags",
            "/api/tags/async/articles",
            "/api/search?q=rust",
            "/api/settings",
        ] {
            assert_eq!(status_of("GET", uri).await, StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_admin_routes_are_mounted() {
        assert_eq!(status_of("GET", "/admin/cache/stats").await, StatusCode::OK);
        assert_eq!(status_of("POST", "/admin/cache/clear").await, StatusCode::OK);
        assert_eq!(
            status_of("DELETE", "/admin/cache/entries/unknown").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404() {
        assert_eq!(status_of("GET", "/nonexistent").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_returns_405() {
        assert_eq!(
            status_of("GET", "/admin/cache/clear").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
