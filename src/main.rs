//! Recency Cache stress driver
//!
//! Runs a concurrent workload against one shared cache and prints the
//! resulting statistics as JSON.

use anyhow::{ensure, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recency_cache::{run_stress, BoundedRecencyCache, Config, StressPlan};

/// Entry point for the stress driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the shared cache
/// 4. Run the stress workload
/// 5. Print the report and fail if the capacity bound was ever exceeded
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recency_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        capacity = config.capacity,
        workers = config.workers,
        operations_per_worker = config.operations_per_worker,
        key_space = config.key_space,
        seed = config.seed,
        "Configuration loaded"
    );

    let cache = BoundedRecencyCache::new(config.capacity)?;
    let report = run_stress(&cache, &StressPlan::from(&config))?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    ensure!(
        report.capacity_violations == 0,
        "cache exceeded its capacity {} times",
        report.capacity_violations
    );

    Ok(())
}
