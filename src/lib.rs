//! Recency Cache - A bounded, thread-safe LRU cache
//!
//! Holds a fixed number of entries ordered by recency of use and evicts the
//! least recently used one on overflow.

pub mod cache;
pub mod config;
pub mod error;
pub mod workload;

pub use cache::{BoundedRecencyCache, CacheGuard, CacheStats};
pub use config::Config;
pub use error::{CacheError, Result};
pub use workload::{run_stress, StressPlan, StressReport};
