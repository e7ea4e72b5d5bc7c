//! Cache Store Module
//!
//! Bounded key-value storage with per-entry TTL and FIFO eviction. The store
//! is synchronous; `MemoryCache` wraps it for shared async use.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheCounters, CacheEntry, CacheStats, InsertionOrder};

/// Outcome of looking a key up.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// Present and within its TTL
    Fresh(V),
    /// Present but expired; usable only as a fallback
    Stale(V),
    Missing,
}

impl<V> Lookup<V> {
    pub fn into_stale_fallback(self) -> Option<V> {
        match self {
            Lookup::Fresh(v) | Lookup::Stale(v) => Some(v),
            Lookup::Missing => None,
        }
    }
}

// == Cache Store ==
/// Main cache storage.
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: InsertionOrder,
    counters: CacheCounters,
    max_entries: usize,
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` (at least one).
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            counters: CacheCounters::default(),
            max_entries: max_entries.max(1),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Set ==
    /// Inserts or replaces `key`, stamped now.
    ///
    /// A new key arriving when the store is full evicts exactly the oldest
    /// inserted entry first.
    pub fn set(&mut self, key: String, value: V, ttl: Option<Duration>) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.order.pop_oldest() {
                self.entries.remove(&evicted);
                self.counters.record_eviction();
            }
        }

        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));
        self.order.record(&key);
        self.entries.insert(key, entry);
    }

    // == Lookup ==
    /// Looks `key` up and counts the result as a hit or a miss.
    pub fn lookup(&mut self, key: &str) -> Lookup<V> {
        let found = self.peek(key);
        match found {
            Lookup::Fresh(_) => self.counters.record_hit(),
            _ => self.counters.record_miss(),
        }
        found
    }

    /// Looks `key` up without touching the counters.
    pub fn peek(&self, key: &str) -> Lookup<V> {
        match self.entries.get(key) {
            Some(entry) if entry.is_valid() => Lookup::Fresh(entry.value.clone()),
            Some(entry) => Lookup::Stale(entry.value.clone()),
            None => Lookup::Missing,
        }
    }

    // == Delete ==
    /// Removes one entry; returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes every entry; returns how many there were.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.order.clear();
        removed
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.order.remove(key);
        }

        expired_keys.len()
    }

    pub fn record_stale_served(&mut self) {
        self.counters.record_stale_served();
    }

    pub fn record_coalesced(&mut self) {
        self.counters.record_coalesced();
    }

    // == Stats ==
    /// Point-in-time snapshot.
    pub fn stats(&self, enabled: bool) -> CacheStats {
        let valid_entries = self.entries.values().filter(|e| e.is_valid()).count();
        let counters = &self.counters;

        CacheStats {
            enabled,
            total_entries: self.entries.len(),
            valid_entries,
            expired_entries: self.entries.len() - valid_entries,
            max_entries: self.max_entries,
            oldest_key: self.order.oldest().cloned(),
            newest_key: self.order.newest().cloned(),
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            stale_served: counters.stale_served,
            coalesced: counters.coalesced,
            hit_rate: CacheStats::compute_hit_rate(counters.hits, counters.misses),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
