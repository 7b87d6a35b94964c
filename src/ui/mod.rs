// UI and formatting module

pub mod formatters;
pub mod sample_formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_bytes, format_percent, format_rate, format_temperature};
pub use sample_formatters::{format_processes, format_sample, format_sensor_status};
