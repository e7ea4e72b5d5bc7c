//! Deterministic upstream queries.
//!
//! A `ContentQuery` names the logical operation, the CMS endpoint and its
//! parameters. Parameters are kept sorted so the derived cache key and the
//! query string are stable regardless of the order they were added in.

use std::collections::BTreeMap;
use std::fmt;

/// One upstream request, also the identity of its cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    operation: &'static str,
    endpoint: String,
    params: BTreeMap<String, String>,
}

impl ContentQuery {
    pub fn new(operation: &'static str, endpoint: impl Into<String>) -> Self {
        Self {
            operation,
            endpoint: endpoint.into().trim_matches('/').to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Adds or replaces a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Same query with its pagination parameters set.
    pub fn with_page(&self, page: u32, page_size: u32) -> Self {
        self.clone()
            .param("pagination[page]", page)
            .param("pagination[pageSize]", page_size)
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parameters in sorted order, ready for `reqwest::RequestBuilder::query`.
    pub fn params(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// `operation:endpoint?k=v&...`, parameters sorted by name.
    pub fn cache_key(&self) -> String {
        if self.params.is_empty() {
            format!("{}:{}", self.operation, self.endpoint)
        } else {
            format!("{}:{}?{}", self.operation, self.endpoint, self.query_string())
        }
    }

    fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for ContentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "/{}", self.endpoint)
        } else {
            write!(f, "/{}?{}", self.endpoint, self.query_string())
        }
    }
}
