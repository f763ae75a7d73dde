//! Concurrent Stress Workload
//!
//! Hammers one cache from scoped worker threads and checks the capacity
//! bound after every operation.

use std::panic;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{BoundedRecencyCache, CacheStats};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Parameters for one stress run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressPlan {
    pub workers: usize,
    pub operations_per_worker: usize,
    pub key_space: usize,
    pub seed: u64,
}

impl StressPlan {
    /// Checks that workers have keys to draw from.
    pub fn validate(&self) -> Result<()> {
        if self.key_space == 0 {
            return Err(CacheError::InvalidConfig(
                "stress key space must hold at least 1 key".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&Config> for StressPlan {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.workers,
            operations_per_worker: config.operations_per_worker,
            key_space: config.key_space,
            seed: config.seed,
        }
    }
}

/// Outcome of a stress run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StressReport {
    pub operations: u64,
    pub puts: u64,
    pub lookups: u64,
    pub memoized: u64,
    pub remove_passes: u64,
    /// Entries removed across all predicate passes
    pub removed: u64,
    pub max_observed_size: usize,
    /// Times a worker saw more entries than the capacity allows
    pub capacity_violations: u64,
    pub final_size: usize,
    pub stats: CacheStats,
}

impl StressReport {
    fn absorb(&mut self, tally: WorkerTally) {
        self.operations += tally.operations;
        self.puts += tally.puts;
        self.lookups += tally.lookups;
        self.memoized += tally.memoized;
        self.remove_passes += tally.remove_passes;
        self.removed += tally.removed;
        self.max_observed_size = self.max_observed_size.max(tally.max_observed_size);
        self.capacity_violations += tally.capacity_violations;
    }
}

#[derive(Debug, Default)]
struct WorkerTally {
    operations: u64,
    puts: u64,
    lookups: u64,
    memoized: u64,
    remove_passes: u64,
    removed: u64,
    max_observed_size: usize,
    capacity_violations: u64,
}

/// Runs `plan` against `cache` and blocks until every worker finishes.
///
/// Returns `CacheError::InvalidConfig` for an empty key space. A panicking
/// worker is re-raised on the calling thread.
pub fn run_stress(
    cache: &BoundedRecencyCache<String, u64>,
    plan: &StressPlan,
) -> Result<StressReport> {
    plan.validate()?;

    info!(
        "Starting stress run: workers={}, operations_per_worker={}, key_space={}, capacity={}",
        plan.workers,
        plan.operations_per_worker,
        plan.key_space,
        cache.capacity()
    );

    let mut report = StressReport::default();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..plan.workers)
            .map(|worker| scope.spawn(move || run_worker(cache, plan, worker)))
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(tally) => report.absorb(tally),
                Err(payload) => panic::resume_unwind(payload),
            }
        }
    });

    report.final_size = cache.size();
    report.stats = cache.stats();

    if report.capacity_violations > 0 {
        warn!(
            "Stress run observed {} capacity violations",
            report.capacity_violations
        );
    } else {
        info!(
            "Stress run finished: {} operations, hit rate {:.3}",
            report.operations,
            report.stats.hit_rate()
        );
    }

    Ok(report)
}

fn run_worker(
    cache: &BoundedRecencyCache<String, u64>,
    plan: &StressPlan,
    worker: usize,
) -> WorkerTally {
    let mut rng = StdRng::seed_from_u64(plan.seed.wrapping_add(worker as u64));
    let mut tally = WorkerTally::default();
    let capacity = cache.capacity();

    for _ in 0..plan.operations_per_worker {
        let slot = rng.random_range(0..plan.key_space);
        let key = format!("key:{slot}");

        match rng.random_range(0..100u32) {
            0..=44 => {
                cache.put(key, slot as u64);
                tally.puts += 1;
            }
            45..=79 => {
                cache.try_get(key.as_str());
                tally.lookups += 1;
            }
            80..=94 => {
                let value = cache.get_or_insert_with(key, || slot as u64);
                debug_assert_eq!(value, slot as u64);
                tally.memoized += 1;
            }
            _ => {
                let bucket = rng.random_range(0..16usize);
                let removed = cache.remove_if(|k| key_bucket(k) == Some(bucket));
                tally.remove_passes += 1;
                tally.removed += removed as u64;
            }
        }

        tally.operations += 1;

        let size = cache.size();
        tally.max_observed_size = tally.max_observed_size.max(size);
        if size > capacity {
            tally.capacity_violations += 1;
        }
    }

    debug!(worker, operations = tally.operations, "Worker finished");
    tally
}

/// Groups `key:<n>` keys into 16 buckets by `n`.
fn key_bucket(key: &str) -> Option<usize> {
    key.strip_prefix("key:")
        .and_then(|n| n.parse::<usize>().ok())
        .map(|n| n % 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(workers: usize, operations_per_worker: usize, key_space: usize) -> StressPlan {
        StressPlan {
            workers,
            operations_per_worker,
            key_space,
            seed: 7,
        }
    }

    #[test]
    fn test_key_bucket() {
        assert_eq!(key_bucket("key:3"), Some(3));
        assert_eq!(key_bucket("key:35"), Some(3));
        assert_eq!(key_bucket("other:3"), None);
        assert_eq!(key_bucket("key:x"), None);
    }

    #[test]
    fn test_plan_from_config() {
        let config = Config::default();
        let plan = StressPlan::from(&config);
        assert_eq!(plan.workers, config.workers);
        assert_eq!(plan.key_space, config.key_space);
        assert_eq!(plan.seed, config.seed);
    }

    #[test]
    fn test_empty_key_space_is_rejected() {
        let cache = BoundedRecencyCache::new(4).unwrap();

        let result = run_stress(&cache, &plan(1, 1, 0));

        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::new());
    }

    #[test]
    fn test_zero_workers_runs_nothing() {
        let cache = BoundedRecencyCache::new(4).unwrap();

        let report = run_stress(&cache, &plan(0, 100, 8)).unwrap();

        assert_eq!(report.operations, 0);
        assert_eq!(report.final_size, 0);
    }

    #[test]
    fn test_single_worker_counts_add_up() {
        let cache = BoundedRecencyCache::new(8).unwrap();
        let report = run_stress(&cache, &plan(1, 500, 32)).unwrap();

        assert_eq!(report.operations, 500);
        assert_eq!(
            report.puts + report.lookups + report.memoized + report.remove_passes,
            500
        );
        assert_eq!(report.capacity_violations, 0);
        assert!(report.max_observed_size <= 8);
        assert_eq!(report.final_size, cache.size());
        assert_eq!(report.stats.removals, report.removed);
    }

    #[test]
    fn test_many_workers_respect_capacity() {
        let cache = BoundedRecencyCache::new(16).unwrap();
        let report = run_stress(&cache, &plan(8, 2_000, 64)).unwrap();

        assert_eq!(report.operations, 16_000);
        assert_eq!(report.capacity_violations, 0);
        assert!(report.final_size <= 16);

        let keys = cache.keys();
        let mut unique = keys.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), keys.len(), "duplicate keys after stress run");
    }
}
