//! CMS HTTP client.
//!
//! Performs a single GET per call and classifies the outcome into the
//! `ContentError` taxonomy. Retrying and caching happen above this layer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::CmsConfig;
use crate::error::{ContentError, Result};
use crate::upstream::ContentQuery;

// == Content Source ==
/// Anything that can answer a `ContentQuery` with a JSON body.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, query: &ContentQuery) -> Result<Value>;
}

// == CMS Client ==
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: Client,
    base_url: String,
    api_token: Option<String>,
}

impl CmsClient {
    /// Builds the client; the configured timeout applies to every request.
    pub fn new(config: &CmsConfig) -> std::result::Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("content_gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn url_for(&self, query: &ContentQuery) -> String {
        format!("{}/api/{}", self.base_url, query.endpoint())
    }

    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn fetch(&self, query: &ContentQuery) -> Result<Value> {
        let endpoint = query.to_string();
        let mut request = self.http.get(self.url_for(query)).query(&query.params());
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        debug!("GET {}", endpoint);
        let response = request
            .send()
            .await
            .map_err(|e| ContentError::transport(&endpoint, &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound { endpoint });
        }
        if !status.is_success() {
            return Err(ContentError::Upstream {
                status: status.as_u16(),
                retry_after: parse_retry_after(response.headers()),
                endpoint,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ContentError::transport(&endpoint, &e))?;

        serde_json::from_slice(&body).map_err(|e| ContentError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
