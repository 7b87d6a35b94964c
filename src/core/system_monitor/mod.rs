//! System monitoring core functionality.
//!
//! Hardware counters, external temperature sources and their reconciliation
//! into one [`Sample`] per tick.

pub mod cache;
pub mod device_match;
pub mod metrics;
pub mod processes;
pub mod rate;
pub mod reconciler;
pub mod runtime;
pub mod sensor_tree;
pub mod sources;
pub mod throttle;

pub use cache::ExternalSourceCache;
pub use device_match::lookup_device;
pub use metrics::{CpuBlock, DiskBlock, GpuBlock, MemoryBlock, NetworkBlock, Sample, UNAVAILABLE};
pub use processes::{top_processes, ProcessInfo, ProcessSort};
pub use rate::RateSampler;
pub use reconciler::{cpu_usage_percent, primary_gpu_index, MetricReconciler};
pub use runtime::MetricsRuntime;
pub use sensor_tree::{parse_sensor_document, parse_sensor_tree, SensorReadings};
pub use sources::{
    DeviceContext, DiscreteGpuProbe, FallbackTemperatureResolver, GpuReading, SensorTreeSource,
    SensorTreeStatus, ThermalSource,
};
pub use throttle::LogThrottle;
