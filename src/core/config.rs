use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::HostPulseError;

/// Environment variable that overrides the sensor-tree base URL.
pub const SENSOR_URL_ENV: &str = "HOSTPULSE_SENSOR_URL";

pub const DEFAULT_SENSOR_TREE_URL: &str = "http://localhost:8085";

/// Collector tuning. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub sensor_tree_url: String,
    pub sample_interval_ms: u64,
    pub sensor_tree_ttl_ms: u64,
    pub vendor_tool_ttl_ms: u64,
    pub fallback_ttl_ms: u64,
    pub request_timeout_ms: u64,
    /// Upper bound for one vendor tool or fallback run, 2 s by default.
    ///
    /// May exceed `sample_interval_ms`. A run that slow delays its own tick and
    /// the runtime skips the ticks missed meanwhile.
    pub vendor_tool_timeout_ms: u64,
    pub enable_vendor_tool: bool,
    pub enable_platform_fallback: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            sensor_tree_url: DEFAULT_SENSOR_TREE_URL.to_string(),
            sample_interval_ms: 1000,
            sensor_tree_ttl_ms: 1000,
            vendor_tool_ttl_ms: 800,
            fallback_ttl_ms: 3000,
            request_timeout_ms: 5000,
            vendor_tool_timeout_ms: 2000,
            enable_vendor_tool: true,
            enable_platform_fallback: cfg!(windows),
        }
    }
}

impl CollectorConfig {
    /// Load from the user config directory, then apply the environment override.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_env_override(std::env::var(SENSOR_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// A missing, empty or unreadable-as-JSON file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt config file {:?}: {}", path, e);
            Self::default()
        }))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, data).with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("hostpulse").join("config.json"))
    }

    pub fn apply_env_override(&mut self, value: Option<String>) {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.sensor_tree_url = url;
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        let url = Url::parse(&self.sensor_tree_url).map_err(|e| {
            HostPulseError::config(format!(
                "Invalid sensor tree URL '{}': {}",
                self.sensor_tree_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HostPulseError::config(format!(
                "Sensor tree URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        let intervals = [
            ("sample_interval_ms", self.sample_interval_ms),
            ("sensor_tree_ttl_ms", self.sensor_tree_ttl_ms),
            ("vendor_tool_ttl_ms", self.vendor_tool_ttl_ms),
            ("fallback_ttl_ms", self.fallback_ttl_ms),
            ("request_timeout_ms", self.request_timeout_ms),
            ("vendor_tool_timeout_ms", self.vendor_tool_timeout_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, value)| *value == 0) {
            return Err(HostPulseError::config(format!("{} must be greater than 0", name)));
        }

        Ok(())
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn sensor_tree_ttl(&self) -> Duration {
        Duration::from_millis(self.sensor_tree_ttl_ms)
    }

    pub fn vendor_tool_ttl(&self) -> Duration {
        Duration::from_millis(self.vendor_tool_ttl_ms)
    }

    pub fn fallback_ttl(&self) -> Duration {
        Duration::from_millis(self.fallback_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn vendor_tool_timeout(&self) -> Duration {
        Duration::from_millis(self.vendor_tool_timeout_ms)
    }
}
