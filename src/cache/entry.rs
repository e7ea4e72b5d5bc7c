//! Cache Entry Module
//!
//! A stored value together with the moment it was inserted and its TTL.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single cached value with its freshness metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion instant
    pub inserted_at: Instant,
    /// Time to live, fixed at insertion
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped with the current instant.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    // == Is Valid ==
    /// An entry is valid while `now - inserted_at < ttl`.
    ///
    /// Recomputed on every call; once the TTL has fully elapsed the entry is
    /// stale, and a zero TTL is never valid.
    pub fn is_valid(&self) -> bool {
        self.age() < self.ttl
    }

    pub fn is_expired(&self) -> bool {
        !self.is_valid()
    }

    /// Time since insertion.
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    /// Time left before the entry goes stale, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.age())
    }
}
