use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::CollectorConfig;
use crate::core::system_monitor::MetricsRuntime;

/// Stream one JSON sample per tick until Ctrl+C or `--count` samples.
pub fn execute(matches: &ArgMatches, config: &CollectorConfig) -> Result<()> {
    let mut config = config.clone();
    if let Some(interval) = matches.get_one::<u64>("interval") {
        config.sample_interval_ms = *interval;
    }
    config.validate()?;

    let count = matches.get_one::<u64>("count").copied();

    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = stop.clone();
    ctrlc::set_handler(move || {
        eprintln!("{}", "Stopping after the current sample...".yellow());
        stop_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let mut runtime = MetricsRuntime::start(&config).context("Failed to start metrics runtime")?;
    let mut published = 0u64;

    while !stop.load(Ordering::Relaxed) {
        let Some(sample) = runtime.next_sample() else {
            break;
        };

        println!("{}", serde_json::to_string(sample.as_ref())?);
        published += 1;

        if count.is_some_and(|limit| published >= limit) {
            break;
        }
    }

    runtime.shutdown();
    log::debug!(
        "Published {} samples at {:?} intervals",
        published,
        Duration::from_millis(config.sample_interval_ms)
    );
    Ok(())
}
