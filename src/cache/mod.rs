//! Cache Module
//!
//! Provides a bounded, thread-safe cache with Least Recently Used eviction.

mod bounded;
mod entry;
mod recency;
mod stats;


// Re-export public types
pub use bounded::{BoundedRecencyCache, CacheGuard};
pub use entry::CacheEntry;
pub use recency::{Insertion, RecencyList};
pub use stats::CacheStats;
