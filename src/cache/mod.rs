//! Cache Module
//!
//! In-memory caching with per-entry TTL, FIFO eviction and stale fallback.

mod entry;
mod memory;
mod order;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use memory::MemoryCache;
pub use order::InsertionOrder;
pub use stats::{CacheCounters, CacheStats};
pub use store::{CacheStore, Lookup};
