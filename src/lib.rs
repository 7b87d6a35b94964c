// hostpulse Library - Public API

// Re-export error types
pub mod error;
pub use error::{HostPulseError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::CollectorConfig;
pub use core::system_monitor::{MetricReconciler, MetricsRuntime, Sample};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
