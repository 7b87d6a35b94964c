//! Heuristic parser for hardware-monitor sensor trees.
//!
//! The document comes from a third-party web server (LibreHardwareMonitor's
//! `data.json` and look-alikes). Its shape is only loosely specified: nodes may
//! name themselves through `Text` or `Name`, values may be numbers or strings
//! such as `"45.0 °C"`, and the tree may be wrapped in an extra object. The
//! parser walks whatever it finds and classifies sensors by keyword.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::metrics::{is_valid_load, is_valid_temperature};

/// Device display name -> reading.
pub type DeviceReadings = BTreeMap<String, f64>;

static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+-]?\d+(?:\.\d+)?").expect("number pattern is valid"));

const CPU_SENSOR_MARKERS: &[&str] = &[
    "core #",
    "package",
    "tctl",
    "tdie",
    "ccd1",
    "ccd2",
    "ccd ",
    "core (smu)",
    "cpu package",
];
const CPU_SECTION_MARKERS: &[&str] = &["cpu", "ryzen", "intel", "core", "package"];
const GPU_SECTION_MARKERS: &[&str] = &["gpu", "nvidia", "radeon", "graphics"];
const GPU_NAME_MARKERS: &[&str] = &["gpu", "graphics", "radeon", "nvidia", "geforce"];

const NVIDIA_SENSOR_ID: &str = "/gpu-nvidia/0/";
const AMD_SENSOR_ID: &str = "/gpu-amd/0/";

/// Everything one parse of a sensor document yielded.
///
/// Built fresh on every parse; nothing carries over from a previous document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorReadings {
    pub cpu_temperature: Option<f64>,
    /// Hottest GPU reading seen anywhere in the document.
    pub gpu_temperature: Option<f64>,
    pub gpu_load: Option<f64>,
    pub gpu_temperatures_by_device: DeviceReadings,
    pub gpu_loads_by_device: DeviceReadings,
}

impl SensorReadings {
    pub fn has_temperatures(&self) -> bool {
        self.cpu_temperature.is_some() || self.gpu_temperature.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_temperatures()
            && self.gpu_load.is_none()
            && self.gpu_temperatures_by_device.is_empty()
            && self.gpu_loads_by_device.is_empty()
    }
}

/// Parse a raw document. Malformed JSON yields empty readings.
pub fn parse_sensor_document(body: &str) -> SensorReadings {
    match serde_json::from_str::<Value>(body) {
        Ok(root) => parse_sensor_tree(&root),
        Err(e) => {
            log::debug!("Failed to parse sensor document: {}", e);
            SensorReadings::default()
        }
    }
}

/// Walk a parsed document and collect CPU/GPU temperatures and GPU loads.
pub fn parse_sensor_tree(root: &Value) -> SensorReadings {
    let mut readings = SensorReadings::default();

    if let Some(children) = top_level_children(root) {
        for child in children {
            visit(child, "", None, &mut readings);
        }
    }

    if let Some(sensors) = root.get("Sensors").and_then(Value::as_array) {
        for sensor in sensors {
            scan_flat_sensor(sensor, &mut readings);
        }
    }

    if readings.gpu_temperature.is_none() {
        readings.gpu_temperature = max_value(&readings.gpu_temperatures_by_device);
    }
    if readings.gpu_load.is_none() {
        readings.gpu_load = max_value(&readings.gpu_loads_by_device);
    }

    readings
}

/// Extract the first signed decimal number from a formatted reading.
pub fn extract_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return value.is_finite().then_some(value);
    }
    NUMBER_PATTERN
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Bare array, `{"Children": [...]}`, or `{"<anything>": {"Children": [...]}}`.
fn top_level_children(root: &Value) -> Option<&Vec<Value>> {
    if let Some(children) = root.as_array().filter(|c| !c.is_empty()) {
        return Some(children);
    }
    if let Some(children) = children_of(root).filter(|c| !c.is_empty()) {
        return Some(children);
    }
    root.as_object()?
        .values()
        .find_map(|wrapped| children_of(wrapped).filter(|c| !c.is_empty()))
}

fn visit<'a>(
    node: &'a Value,
    path: &str,
    gpu_device: Option<&'a str>,
    acc: &mut SensorReadings,
) {
    let text = display_text(node).unwrap_or("");
    let identifier = identifier(node).unwrap_or("");
    let combined = format!("{} {} {}", path, text, identifier).to_lowercase();
    let sensor_type = sensor_type(node);
    let value = reading(node);
    let children = children_of(node);

    let text_lower = text.to_lowercase();
    let type_is = |expected: &str| sensor_type.is_some_and(|t| t.eq_ignore_ascii_case(expected));

    let is_cpu_sensor = contains_any(&combined, CPU_SENSOR_MARKERS);
    let is_gpu_sensor = text_lower.contains("gpu") || text_lower.contains("graphics");
    let mentions_gpu = combined.contains("gpu") || combined.contains("graphics");
    let mentions_cpu_vendor = combined.contains("ryzen") || combined.contains("intel");

    let is_cpu = (contains_any(&combined, CPU_SECTION_MARKERS) && (!mentions_gpu || is_cpu_sensor))
        || (type_is("Temperature") && mentions_cpu_vendor && !is_gpu_sensor);
    let is_gpu = contains_any(&combined, GPU_SECTION_MARKERS)
        && !combined.contains("core #")
        && (is_gpu_sensor || !mentions_cpu_vendor);
    let is_temp = type_is("Temperature") || type_is("Temp") || combined.contains("temp");
    let is_load = type_is("Load");

    if let (Some(device), Some(v)) = (gpu_device.filter(|d| !d.is_empty()), value) {
        if is_temp && (is_gpu_sensor || is_gpu) && is_valid_temperature(v) {
            keep_max_in(&mut acc.gpu_temperatures_by_device, device, v);
        }
        if is_load && is_gpu && is_valid_load(v) {
            keep_max_in(&mut acc.gpu_loads_by_device, device, v);
        }
    }

    if let Some(v) = value.filter(|v| is_valid_temperature(*v)) {
        let untyped_core_reading =
            sensor_type.is_none() && (combined.contains("package") || combined.contains("core"));
        if is_temp || untyped_core_reading {
            if is_cpu_sensor {
                keep_max(&mut acc.cpu_temperature, v);
            } else if is_gpu_sensor {
                keep_max(&mut acc.gpu_temperature, v);
            } else if is_cpu {
                // Also covers nodes that look like both; CPU wins the tie.
                keep_max(&mut acc.cpu_temperature, v);
            } else if is_gpu {
                keep_max(&mut acc.gpu_temperature, v);
            }
        }
    }

    if let Some(v) = value.filter(|v| is_load && is_gpu && is_valid_load(*v)) {
        keep_max(&mut acc.gpu_load, v);
    }

    let Some(children) = children else {
        return;
    };

    let next_device = if looks_like_gpu_device(text) {
        Some(text.trim())
    } else {
        gpu_device
    };

    for child in children {
        visit(child, &combined, next_device, acc);
    }
}

fn scan_flat_sensor(sensor: &Value, acc: &mut SensorReadings) {
    let Some(value) = reading(sensor) else {
        return;
    };
    let name = flat_name(sensor).map(str::to_lowercase);
    let sensor_id = flat_sensor_id(sensor).map(str::to_lowercase);
    let device_key = sensor_id.as_deref().and_then(|id| {
        if id.contains(NVIDIA_SENSOR_ID) {
            Some("nvidia")
        } else if id.contains(AMD_SENSOR_ID) {
            Some("amd")
        } else {
            None
        }
    });
    let names_gpu = name.as_deref().is_some_and(|n| contains_any(n, GPU_NAME_MARKERS));

    match sensor_type(sensor) {
        Some(t) if t.eq_ignore_ascii_case("Temperature") && is_valid_temperature(value) => {
            if let Some(n) = name.as_deref() {
                if n.contains("cpu") && !n.contains("gpu") {
                    keep_max(&mut acc.cpu_temperature, value);
                }
            }
            if names_gpu {
                keep_max(&mut acc.gpu_temperature, value);
            }
            if let Some(key) = device_key {
                keep_max_in(&mut acc.gpu_temperatures_by_device, key, value);
            }
        }
        Some(t) if t.eq_ignore_ascii_case("Load") && is_valid_load(value) => {
            if names_gpu {
                keep_max(&mut acc.gpu_load, value);
            }
            if let Some(key) = device_key {
                keep_max_in(&mut acc.gpu_loads_by_device, key, value);
            }
        }
        _ => {}
    }
}

fn looks_like_gpu_device(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("nvidia")
        || lower.contains("geforce")
        || lower.contains("radeon")
        || (lower.contains("amd") && lower.contains("graphics"))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn keep_max(slot: &mut Option<f64>, value: f64) {
    if slot.map_or(true, |current| value > current) {
        *slot = Some(value);
    }
}

fn keep_max_in(map: &mut DeviceReadings, key: &str, value: f64) {
    map.entry(key.to_string())
        .and_modify(|current| {
            if value > *current {
                *current = value;
            }
        })
        .or_insert(value);
}

fn max_value(map: &DeviceReadings) -> Option<f64> {
    map.values().copied().reduce(f64::max)
}

fn first_str<'a>(node: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| node.get(key).and_then(Value::as_str))
}

fn display_text(node: &Value) -> Option<&str> {
    first_str(node, &["Text", "Name"])
}

fn flat_name(node: &Value) -> Option<&str> {
    first_str(node, &["Name", "Text"])
}

fn identifier(node: &Value) -> Option<&str> {
    first_str(node, &["Identifier", "Id"])
}

fn flat_sensor_id(node: &Value) -> Option<&str> {
    first_str(node, &["SensorId", "Identifier"])
}

fn sensor_type(node: &Value) -> Option<&str> {
    first_str(node, &["SensorType", "Type", "type"])
}

fn children_of(node: &Value) -> Option<&Vec<Value>> {
    node.get("Children").and_then(Value::as_array)
}

fn reading(node: &Value) -> Option<f64> {
    let raw = ["Value", "value", "CurrentValue"]
        .iter()
        .find_map(|key| node.get(key))?;
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => extract_number(s),
        _ => None,
    }
}
