// Command handlers module
pub mod processes;
pub mod run;
pub mod sensors;
pub mod snapshot;
pub mod version;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::CollectorConfig;

/// Load the collector config and apply global command-line overrides.
pub fn load_config(matches: &ArgMatches) -> Result<CollectorConfig> {
    let mut config = CollectorConfig::load().context("Failed to load configuration")?;

    if let Some(url) = matches.get_one::<String>("sensor-url") {
        config.sensor_tree_url = url.clone();
    }
    if matches.get_flag("no-vendor-tool") {
        config.enable_vendor_tool = false;
    }

    config.validate()?;
    Ok(config)
}
