//! Workload Module
//!
//! Drives a shared cache from several threads at once.
//!
//! # Workloads
//! - Stress: seeded random mix of put, lookup, memoize and predicate removal

mod stress;

pub use stress::{run_stress, StressPlan, StressReport};
