//! Matching enumerated GPU names against sensor-source device names.
//!
//! The hardware enumeration and the sensor tree name the same card differently
//! ("NVIDIA GeForce GTX 1650" vs "GeForce GTX 1650"), so lookups fall back from
//! exact to case-insensitive to substring matching.

use std::collections::BTreeMap;

/// Find the reading for `device_name`: exact key, then case-insensitive key,
/// then a key contained in the name or containing it.
pub fn lookup_device(map: &BTreeMap<String, f64>, device_name: &str) -> Option<f64> {
    let query = device_name.trim();
    if query.is_empty() || map.is_empty() {
        return None;
    }

    if let Some(value) = map.get(query) {
        return Some(*value);
    }

    let query_lower = query.to_lowercase();
    let lowered: Vec<(String, f64)> = map
        .iter()
        .map(|(key, value)| (key.to_lowercase(), *value))
        .collect();

    if let Some((_, value)) = lowered.iter().find(|(key, _)| *key == query_lower) {
        return Some(*value);
    }

    lowered
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .find(|(key, _)| key.contains(&query_lower) || query_lower.contains(key.as_str()))
        .map(|(_, value)| *value)
}
