use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::CollectorConfig;
use crate::core::system_monitor::SensorTreeSource;
use crate::ui::format_sensor_status;

/// Show what the sensor-tree endpoint returns and what was parsed from it.
pub fn execute(matches: &ArgMatches, config: &CollectorConfig) -> Result<()> {
    let source = SensorTreeSource::new(
        &config.sensor_tree_url,
        config.sensor_tree_ttl(),
        config.request_timeout(),
    )
    .context("Failed to create sensor tree client")?;

    let status = source.status();
    let keys = source.top_level_keys();

    if matches.get_flag("json") {
        let report = serde_json::json!({
            "endpoint": source.endpoint().as_str(),
            "status": status,
            "top_level_keys": keys,
            "readings": source.readings(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        format_sensor_status(source.endpoint().as_str(), &status, &keys);
    }

    if let Some(max_chars) = matches.get_one::<usize>("sample-chars") {
        println!("\n{}", source.document_sample(*max_chars));
    }

    Ok(())
}
