//! Error types for the content gateway
//!
//! `ContentError` classifies everything that can go wrong talking to the CMS.
//! `ApiError` is what the host HTTP surface returns to its own clients.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Content Error Enum ==
/// Failure of an upstream content fetch.
///
/// `Clone` so that a single in-flight result can be handed to every caller
/// waiting on the same cache key.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    /// The CMS answered with a non-success HTTP status
    #[error("Upstream {endpoint} responded with status {status}")]
    Upstream {
        status: u16,
        endpoint: String,
        /// Parsed `Retry-After` header, if the CMS sent one
        retry_after: Option<Duration>,
    },

    /// The CMS answered, and the resource does not exist
    #[error("Resource not found: {endpoint}")]
    NotFound { endpoint: String },

    /// No HTTP status was obtained (DNS, connect, timeout, broken body)
    #[error("Transport failure calling {endpoint}: {message}")]
    Transport {
        endpoint: String,
        message: String,
        timed_out: bool,
    },

    /// The response body does not follow the documented schema
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Internal invariant breach
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContentError {
    /// Builds an `Upstream` error without a `Retry-After` hint.
    pub fn upstream(status: u16, endpoint: impl Into<String>) -> Self {
        ContentError::Upstream {
            status,
            endpoint: endpoint.into(),
            retry_after: None,
        }
    }

    /// Builds a `Transport` error from a reqwest failure.
    pub fn transport(endpoint: impl Into<String>, err: &reqwest::Error) -> Self {
        ContentError::Transport {
            endpoint: endpoint.into(),
            message: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }

    /// Server-side faults, rate limiting and transport failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            ContentError::Upstream { status, .. } => *status >= 500 || *status == 429,
            ContentError::Transport { .. } => true,
            _ => false,
        }
    }

    /// 4xx answers, including a not-found.
    pub fn is_client_error(&self) -> bool {
        match self {
            ContentError::Upstream { status, .. } => (400..500).contains(status),
            ContentError::NotFound { .. } => true,
            _ => false,
        }
    }

    /// Missing or invalid CMS credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ContentError::Upstream { status: 401, .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ContentError::Upstream { status, .. } => Some(*status),
            ContentError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Delay requested by the CMS before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ContentError::Upstream { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Convenience Result type for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;

// == API Error Enum ==
/// Error returned by the host HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
