use colored::*;
use humansize::{format_size, BINARY, DECIMAL};

/// Sizes of memory and storage, in binary units (GiB).
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Throughput in decimal units, as network tools report it.
pub fn format_rate(bytes_per_second: u64) -> String {
    format!("{}/s", format_size(bytes_per_second, DECIMAL))
}

pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Missing readings print as "N/A"; hot readings are highlighted.
pub fn format_temperature(celsius: Option<f64>) -> ColoredString {
    match celsius {
        None => "N/A".dimmed(),
        Some(t) if t >= 85.0 => format!("{:.1} °C", t).red().bold(),
        Some(t) if t >= 70.0 => format!("{:.1} °C", t).yellow(),
        Some(t) => format!("{:.1} °C", t).green(),
    }
}

/// Load colored by severity.
pub fn format_load(percent: f64) -> ColoredString {
    let text = format_percent(percent);
    if percent >= 90.0 {
        text.red().bold()
    } else if percent >= 60.0 {
        text.yellow()
    } else {
        text.normal()
    }
}
