use serde::{Deserialize, Serialize};

/// Name reported for a GPU (or CPU) that could not be identified.
pub const UNAVAILABLE: &str = "N/A";

/// One tick's reconciled snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub timestamp: i64, // Unix epoch millis
    pub cpu: CpuBlock,
    pub memory: MemoryBlock,
    /// First entry of `gpus`, for consumers that only show one card
    pub gpu: Option<GpuBlock>,
    pub gpus: Vec<GpuBlock>,
    pub disk: DiskBlock,
    pub network: NetworkBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CpuBlock {
    pub name: String,
    pub usage_percent: f64,
    pub logical_processor_count: usize,
    pub temperature_celsius: Option<f64>,
}

impl Default for CpuBlock {
    fn default() -> Self {
        Self {
            name: UNAVAILABLE.to_string(),
            usage_percent: 0.0,
            logical_processor_count: 0,
            temperature_celsius: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryBlock {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpuBlock {
    pub usage_percent: f64, // 0 when unknown
    pub name: String,
    pub vram_used_bytes: u64,
    pub vram_total_bytes: u64,
    pub temperature_celsius: Option<f64>,
}

impl GpuBlock {
    /// Placeholder used when no graphics device could be enumerated.
    pub fn unavailable() -> Self {
        Self {
            usage_percent: 0.0,
            name: UNAVAILABLE.to_string(),
            vram_used_bytes: 0,
            vram_total_bytes: 0,
            temperature_celsius: None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.name == UNAVAILABLE
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiskBlock {
    pub read_bytes_per_second: u64,
    pub write_bytes_per_second: u64,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkBlock {
    pub download_bytes_per_second: u64,
    pub upload_bytes_per_second: u64,
    pub total_bytes_received: u64,
    pub total_bytes_sent: u64,
}

/// Temperatures outside (0, 150) °C are sensor noise, not readings.
pub fn is_valid_temperature(celsius: f64) -> bool {
    celsius > 0.0 && celsius < 150.0
}

pub fn is_valid_load(percent: f64) -> bool {
    (0.0..=100.0).contains(&percent)
}

pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0.
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    clamp_percent(100.0 * part as f64 / whole as f64)
}

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
