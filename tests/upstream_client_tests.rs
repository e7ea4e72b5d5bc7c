//! Integration Tests for the CMS client
//!
//! Runs a throwaway axum server on a random local port and checks how each
//! kind of response is classified.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use content_gateway::{
    config::CmsConfig,
    upstream::{ContentQuery, ContentSource},
    CmsClient, ContentError,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio_test::{assert_err, assert_ok};

const TOKEN: &str = "secret-token";

// == Helper Functions ==

async fn echo_params(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({"data": [], "params": params}))
}

async fn protected(headers: HeaderMap) -> impl IntoResponse {
    let expected = format!("Bearer {}", TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => (StatusCode::OK, Json(json!({"data": null}))),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"}))),
    }
}

async fn start_cms() -> SocketAddr {
    let app = Router::new()
        .route("/api/articles", get(echo_params))
        .route("/api/global", get(protected))
        .route("/api/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route(
            "/api/busy",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "7")], "slow down") }),
        )
        .route("/api/garbage", get(|| async { "this is not json" }))
        .route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"data": []}))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, token: Option<&str>) -> CmsClient {
    CmsClient::new(&CmsConfig {
        base_url: format!("http://{}/", addr),
        api_token: token.map(str::to_string),
        timeout: Duration::from_millis(300),
    })
    .unwrap()
}

fn query(endpoint: &str) -> ContentQuery {
    ContentQuery::new("test", endpoint)
}

// == Tests ==

#[tokio::test]
async fn test_success_returns_json_with_params() {
    let addr = start_cms().await;
    let cms = client(addr, None);

    let body = assert_ok!(
        cms.fetch(&query("articles").param("sort", "publishedAt:desc").with_page(2, 25))
            .await
    );
    assert_eq!(body["params"]["sort"], "publishedAt:desc");
    assert_eq!(body["params"]["pagination[page]"], "2");
    assert_eq!(body["params"]["pagination[pageSize]"], "25");
}

#[tokio::test]
async fn test_missing_route_is_not_found() {
    let addr = start_cms().await;
    let err = assert_err!(client(addr, None).fetch(&query("nothing-here")).await);

    assert!(matches!(err, ContentError::NotFound { .. }));
    assert!(err.is_client_error());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let addr = start_cms().await;
    let err = assert_err!(client(addr, None).fetch(&query("broken")).await);

    assert_eq!(err.status(), Some(500));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let addr = start_cms().await;
    let err = assert_err!(client(addr, None).fetch(&query("busy")).await);

    assert_eq!(err.status(), Some(429));
    assert!(err.is_retryable());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let addr = start_cms().await;

    let err = assert_err!(client(addr, None).fetch(&query("global")).await);
    assert!(err.is_auth_error());
    assert!(!err.is_retryable());

    let body = assert_ok!(client(addr, Some(TOKEN)).fetch(&query("global")).await);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let addr = start_cms().await;
    let err = assert_err!(client(addr, None).fetch(&query("garbage")).await);

    assert!(matches!(err, ContentError::Decode { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let addr = start_cms().await;
    let err = assert_err!(client(addr, None).fetch(&query("slow")).await);

    assert!(matches!(err, ContentError::Transport { timed_out: true, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = assert_err!(client(addr, None).fetch(&query("articles")).await);
    assert!(matches!(err, ContentError::Transport { timed_out: false, .. }));
}
