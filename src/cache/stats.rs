//! Cache Statistics Module
//!
//! Lifetime counters plus a point-in-time snapshot of entry freshness.

use serde::Serialize;

// == Counters ==
/// Running counters kept by the store.
#[derive(Debug, Clone, Default)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub stale_served: u64,
    pub coalesced: u64,
}

impl CacheCounters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_stale_served(&mut self) {
        self.stale_served += 1;
    }

    pub fn record_coalesced(&mut self) {
        self.coalesced += 1;
    }
}

// == Cache Stats ==
/// Diagnostic snapshot of the cache. Producing it has no side effects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Whether the cache is currently switched on
    pub enabled: bool,
    /// Entries currently stored
    pub total_entries: usize,
    /// Stored entries that are still fresh
    pub valid_entries: usize,
    /// Stored entries past their TTL, not yet swept
    pub expired_entries: usize,
    /// Capacity
    pub max_entries: usize,
    /// Oldest insertion (next eviction candidate)
    pub oldest_key: Option<String>,
    /// Most recent insertion
    pub newest_key: Option<String>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Fetch failures answered with expired data
    pub stale_served: u64,
    /// Requests that joined an in-flight fetch instead of issuing their own
    pub coalesced: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    /// hits / (hits + misses), or 0.0 before any lookup.
    pub fn compute_hit_rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
