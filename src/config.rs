//! Configuration Module
//!
//! Handles loading cache and stress workload settings from environment variables.

use std::env;

use crate::error::{CacheError, Result};

/// Cache and workload configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Number of concurrent worker threads in the stress run
    pub workers: usize,
    /// Operations issued by each worker
    pub operations_per_worker: usize,
    /// Number of distinct keys the workers draw from
    pub key_space: usize,
    /// Base seed for the workers' random generators
    pub seed: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 128)
    /// - `STRESS_WORKERS` - Worker threads (default: 4)
    /// - `STRESS_OPERATIONS` - Operations per worker (default: 10000)
    /// - `STRESS_KEY_SPACE` - Distinct keys (default: 256)
    /// - `STRESS_SEED` - Random seed (default: 42)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_or("CACHE_CAPACITY", defaults.capacity),
            workers: env_or("STRESS_WORKERS", defaults.workers),
            operations_per_worker: env_or("STRESS_OPERATIONS", defaults.operations_per_worker),
            key_space: env_or("STRESS_KEY_SPACE", defaults.key_space),
            seed: env_or("STRESS_SEED", defaults.seed),
        }
    }

    /// Checks that every size is usable.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        if self.workers == 0 {
            return Err(CacheError::InvalidConfig(
                "STRESS_WORKERS must be at least 1".to_string(),
            ));
        }
        if self.key_space == 0 {
            return Err(CacheError::InvalidConfig(
                "STRESS_KEY_SPACE must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 128,
            workers: 4,
            operations_per_worker: 10_000,
            key_space: 256,
            seed: 42,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 128);
        assert_eq!(config.workers, 4);
        assert_eq!(config.operations_per_worker, 10_000);
        assert_eq!(config.key_space, 256);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("STRESS_WORKERS");
        env::remove_var("STRESS_OPERATIONS");
        env::remove_var("STRESS_KEY_SPACE");
        env::remove_var("STRESS_SEED");

        assert_eq!(Config::from_env(), Config::default());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("RECENCY_CACHE_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("RECENCY_CACHE_TEST_GARBAGE", 7usize), 7);

        env::set_var("RECENCY_CACHE_TEST_VALUE", " 12 ");
        assert_eq!(env_or("RECENCY_CACHE_TEST_VALUE", 7usize), 12);

        env::remove_var("RECENCY_CACHE_TEST_GARBAGE");
        env::remove_var("RECENCY_CACHE_TEST_VALUE");
        assert_eq!(env_or("RECENCY_CACHE_TEST_VALUE", 7usize), 7);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let config = Config {
            capacity: 0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(CacheError::InvalidCapacity(0)));

        let config = Config {
            workers: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = Config {
            key_space: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }
}
