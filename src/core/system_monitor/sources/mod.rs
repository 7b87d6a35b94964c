//! Temperature and utilization sources.
//!
//! Each source implements [`ThermalSource`]. The reconciler asks the sources in
//! a fixed priority order and keeps, per field, the first value it gets.

mod discrete_gpu;
mod fallback;
mod sensor_tree_source;

pub use discrete_gpu::{parse_vendor_line, DiscreteGpuProbe, VendorGpuSample};
pub use fallback::{parse_fallback_line, FallbackTemperatureResolver};
pub use sensor_tree_source::{SensorTreeSource, SensorTreeStatus};

use crate::core::config::CollectorConfig;

/// The graphics device a reading is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceContext<'a> {
    pub index: usize,
    pub name: &'a str,
    pub is_primary: bool,
}

impl<'a> DeviceContext<'a> {
    pub fn new(index: usize, name: &'a str, is_primary: bool) -> Self {
        Self {
            index,
            name,
            is_primary,
        }
    }

    /// Names the vendor command-line tool can speak for.
    pub fn is_nvidia(&self) -> bool {
        let name = self.name.to_lowercase();
        name.contains("nvidia") || name.contains("geforce")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpuReading {
    pub temperature: Option<f64>,
    pub load: Option<f64>,
}

impl GpuReading {
    pub fn is_complete(&self) -> bool {
        self.temperature.is_some() && self.load.is_some()
    }

    /// Fill fields that are still absent from `other`.
    pub fn fill_from(&mut self, other: GpuReading) {
        self.temperature = self.temperature.or(other.temperature);
        self.load = self.load.or(other.load);
    }
}

/// A provider of CPU temperature and per-device GPU temperature/load.
///
/// Both methods default to "nothing known" so a source only implements what it
/// can actually measure.
pub trait ThermalSource: Send {
    fn name(&self) -> &'static str;

    fn cpu_temperature(&mut self) -> Option<f64> {
        None
    }

    fn gpu_reading(&mut self, _device: &DeviceContext<'_>) -> GpuReading {
        GpuReading::default()
    }
}

/// Sources in priority order: vendor tool, sensor tree, platform fallback.
pub fn default_chain(config: &CollectorConfig) -> Vec<Box<dyn ThermalSource>> {
    let mut chain: Vec<Box<dyn ThermalSource>> = Vec::new();

    if config.enable_vendor_tool {
        chain.push(Box::new(DiscreteGpuProbe::nvidia_smi(
            config.vendor_tool_ttl(),
            config.vendor_tool_timeout(),
        )));
    }

    match SensorTreeSource::new(
        &config.sensor_tree_url,
        config.sensor_tree_ttl(),
        config.request_timeout(),
    ) {
        Ok(source) => chain.push(Box::new(source)),
        Err(e) => log::warn!("Sensor tree source disabled: {}", e),
    }

    if config.enable_platform_fallback {
        chain.push(Box::new(FallbackTemperatureResolver::platform_default(
            config.fallback_ttl(),
            config.vendor_tool_timeout(),
        )));
    }

    chain
}
