//! Memory Cache Module
//!
//! Shared, cloneable handle over a `CacheStore` that adds read-through
//! fetching, stale-on-error fallback, a runtime on/off switch and coalescing
//! of concurrent fetches for the same key.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStats, CacheStore, Lookup};
use crate::config::CacheConfig;
use crate::error::{ContentError, Result};

type PendingFetch<V> = Shared<BoxFuture<'static, Result<V>>>;

// == Memory Cache ==
/// Process-wide TTL cache, constructed once and passed by handle.
pub struct MemoryCache<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    /// Fetches currently running, by cache key
    in_flight: Arc<Mutex<HashMap<String, PendingFetch<V>>>>,
    enabled: Arc<AtomicBool>,
}

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            in_flight: Arc::clone(&self.in_flight),
            enabled: Arc::clone(&self.enabled),
        }
    }
}

impl<V> MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(max_entries, default_ttl))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let cache = Self::new(config.max_entries, config.default_ttl);
        cache.set_enabled(config.enabled);
        cache
    }

    // == Runtime Switch ==
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!("Content cache {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    // == Get ==
    /// Returns the fresh value for `key`, or fetches, stores and returns it.
    ///
    /// If the fetch fails and an expired value for `key` exists, the expired
    /// value is returned instead of the error. Concurrent callers missing on
    /// the same key share a single fetch. With the cache disabled the
    /// fetcher is always called and nothing is stored.
    pub async fn get<F, Fut>(&self, key: &str, fetcher: F, ttl: Option<Duration>) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        if !self.is_enabled() {
            return fetcher().await;
        }

        let lookup = self.store.write().await.lookup(key);
        let stale = match lookup {
            Lookup::Fresh(value) => {
                debug!(key, "Cache hit");
                return Ok(value);
            }
            Lookup::Stale(value) => Some(value),
            Lookup::Missing => None,
        };

        let pending = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(key) {
                Some(existing) => {
                    debug!(key, "Joining in-flight fetch");
                    self.store.write().await.record_coalesced();
                    existing.clone()
                }
                None => {
                    // A fetch may have completed between the lookup and taking the lock
                    if let Lookup::Fresh(value) = self.store.read().await.peek(key) {
                        return Ok(value);
                    }
                    debug!(key, "Cache miss, fetching");
                    let pending = self.start_fetch(key, fetcher(), ttl);
                    in_flight.insert(key.to_string(), pending.clone());
                    pending
                }
            }
        };

        match pending.await {
            Ok(value) => Ok(value),
            Err(err) => {
                let mut store = self.store.write().await;
                match stale.or_else(|| store.peek(key).into_stale_fallback()) {
                    Some(value) => {
                        store.record_stale_served();
                        warn!(key, "Fetch failed ({}), serving stale entry", err);
                        Ok(value)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Runs `fetch` on its own task, which stores the result and clears the
    /// in-flight marker whether or not any caller is still waiting. A
    /// panicking fetch resolves to `ContentError::Internal`.
    fn start_fetch<Fut>(&self, key: &str, fetch: Fut, ttl: Option<Duration>) -> PendingFetch<V>
    where
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let in_flight = Arc::clone(&self.in_flight);
        let enabled = Arc::clone(&self.enabled);
        let key = key.to_string();

        let task = tokio::spawn(async move {
            let result = match AssertUnwindSafe(fetch).catch_unwind().await {
                Ok(result) => result,
                Err(_) => {
                    error!(key = %key, "Fetch panicked");
                    Err(ContentError::Internal(format!("fetch for '{}' panicked", key)))
                }
            };
            if let Ok(value) = &result {
                if enabled.load(Ordering::Acquire) {
                    store.write().await.set(key.clone(), value.clone(), ttl);
                }
            }
            in_flight.lock().await.remove(&key);
            result
        });

        async move {
            task.await
                .unwrap_or_else(|e| Err(ContentError::Internal(format!("fetch task failed: {}", e))))
        }
        .boxed()
        .shared()
    }

    // == Set ==
    /// Inserts or replaces `key`. No-op while the cache is disabled.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        if !self.is_enabled() {
            return;
        }
        self.store.write().await.set(key.into(), value, ttl);
    }

    /// Current value for `key` if it is still fresh. Does not count as a lookup.
    pub async fn peek_fresh(&self, key: &str) -> Option<V> {
        match self.store.read().await.peek(key) {
            Lookup::Fresh(value) => Some(value),
            _ => None,
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    pub async fn clear(&self) -> usize {
        let removed = self.store.write().await.clear();
        info!("Cache cleared: {} entries removed", removed);
        removed
    }

    /// Sweeps expired entries; returns the number removed.
    pub async fn cleanup(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats(self.is_enabled())
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Number of fetches currently running.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}
