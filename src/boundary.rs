//! Error Boundary
//!
//! The one place where content failures turn into fallback values, so that
//! nothing above the content manager ever sees a content error.

use std::future::Future;

use tracing::{error, warn};

use crate::error::Result;

/// Awaits `operation`; on error logs it with `context` and returns `fallback`.
///
/// Authentication failures (401) are logged at warn with a credential hint:
/// they are expected in local and preview environments without a token.
/// Everything else is logged at error.
pub async fn with_error_boundary<T, Fut>(operation: Fut, fallback: T, context: &str) -> T
where
    Fut: Future<Output = Result<T>>,
{
    match operation.await {
        Ok(value) => value,
        Err(err) if err.is_auth_error() => {
            warn!(
                context,
                "CMS rejected the credentials ({}); serving fallback. Check CMS_API_TOKEN.",
                err
            );
            fallback
        }
        Err(err) => {
            error!(context, status = ?err.status(), "Content fetch failed: {}; serving fallback", err);
            fallback
        }
    }
}
