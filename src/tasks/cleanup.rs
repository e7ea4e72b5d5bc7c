//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired entries out of the
//! memory cache. Lookups already treat expired entries as stale, so the
//! sweep only bounds memory held by content nobody asks for anymore.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// # Arguments
/// * `cache` - handle to the shared cache
/// * `interval` - time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task<V>(cache: MemoryCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup().await;
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn cache() -> MemoryCache<String> {
        MemoryCache::new(100, Duration::from_secs(300))
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = cache();
        cache
            .set("expire_soon", "value".to_string(), Some(Duration::from_secs(1)))
            .await;

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));
        settle().await;

        advance(Duration::from_millis(2500)).await;
        settle().await;

        assert!(cache.is_empty().await, "Expired entry should have been cleaned up");
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = cache();
        cache
            .set("long_lived", "value".to_string(), Some(Duration::from_secs(3600)))
            .await;

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));
        settle().await;

        advance(Duration::from_millis(1500)).await;
        settle().await;

        assert_eq!(cache.peek_fresh("long_lived").await, Some("value".to_string()));
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(cache(), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
