use anyhow::Result;
use clap::ArgMatches;
use colored::*;
use std::thread;

use crate::core::config::CollectorConfig;
use crate::core::system_monitor::MetricReconciler;
use crate::ui::format_sample;

/// Prime the baselines, wait one interval and print a single sample.
pub fn execute(matches: &ArgMatches, config: &CollectorConfig) -> Result<()> {
    let json = matches.get_flag("json");

    if !json {
        println!("{}", "Sampling...".dimmed());
    }

    let mut reconciler = MetricReconciler::from_config(config);
    thread::sleep(config.sample_interval());
    let sample = reconciler.reconcile();

    if json {
        println!("{}", serde_json::to_string_pretty(&sample)?);
    } else {
        format_sample(&sample);
    }

    Ok(())
}
