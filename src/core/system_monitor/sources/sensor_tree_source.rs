//! Hardware-monitor web server client.
//!
//! Fetches `{base}/data.json`, parses it with [`parse_sensor_document`] and
//! memoizes the readings for one TTL window. An unreachable server is the
//! normal state on most machines, so it is logged at most once a minute.

use parking_lot::Mutex;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::{DeviceContext, GpuReading, ThermalSource};
use crate::core::system_monitor::cache::ExternalSourceCache;
use crate::core::system_monitor::device_match::lookup_device;
use crate::core::system_monitor::sensor_tree::{parse_sensor_document, SensorReadings};
use crate::core::system_monitor::throttle::LogThrottle;
use crate::error::{HostPulseError, Result};

const DOCUMENT_PATH: &str = "data.json";

/// Reachability and last values, for the debug surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorTreeStatus {
    /// At least one temperature parsed from the last document.
    pub reachable: bool,
    pub http_ok: bool,
    pub cpu_temp: Option<f64>,
    pub gpu_temp: Option<f64>,
    pub gpu_load: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Diagnostics {
    http_ok: bool,
    last_error: Option<String>,
    unreachable_log: LogThrottle,
    nothing_parsed_log: LogThrottle,
}

pub struct SensorTreeSource {
    base_url: String,
    endpoint: Url,
    client: Client,
    cache: ExternalSourceCache<SensorReadings>,
    diagnostics: Mutex<Diagnostics>,
}

impl SensorTreeSource {
    pub fn new(base_url: &str, ttl: Duration, timeout: Duration) -> Result<Self> {
        let endpoint = document_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hostpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            endpoint,
            client,
            cache: ExternalSourceCache::new(ttl),
            diagnostics: Mutex::new(Diagnostics::default()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Parsed readings, refreshed at most once per TTL. Empty when unreachable.
    pub fn readings(&self) -> SensorReadings {
        self.cache
            .get_or_fetch(|| self.refresh())
            .unwrap_or_default()
    }

    pub fn status(&self) -> SensorTreeStatus {
        let readings = self.readings();
        let diagnostics = self.diagnostics.lock();

        SensorTreeStatus {
            reachable: readings.has_temperatures(),
            http_ok: diagnostics.http_ok,
            cpu_temp: readings.cpu_temperature,
            gpu_temp: readings.gpu_temperature,
            gpu_load: readings.gpu_load,
            error: diagnostics.last_error.clone(),
        }
    }

    /// Keys of the raw document's top-level object, fetched fresh.
    pub fn top_level_keys(&self) -> Vec<String> {
        self.document_keys()
            .unwrap_or_else(|e| vec![describe_failure(&e)])
    }

    fn document_keys(&self) -> Result<Vec<String>> {
        let body = self.fetch_document()?;

        match serde_json::from_str::<serde_json::Value>(&body)? {
            serde_json::Value::Object(map) => Ok(map.keys().cloned().collect()),
            _ => Ok(Vec::new()),
        }
    }

    /// The first `max_chars` characters of the raw document, fetched fresh.
    pub fn document_sample(&self, max_chars: usize) -> String {
        match self.fetch_document() {
            Ok(body) => truncate_document(&body, max_chars),
            Err(e) => describe_failure(&e),
        }
    }

    fn fetch_document(&self) -> Result<String> {
        let response = self.client.get(self.endpoint.clone()).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostPulseError::source_unavailable(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        Ok(response.text()?)
    }

    fn refresh(&self) -> Result<SensorReadings> {
        let outcome = self.fetch_document();
        let mut diagnostics = self.diagnostics.lock();

        let body = match outcome {
            Ok(body) => body,
            Err(e) => {
                diagnostics.http_ok = false;
                diagnostics.last_error = Some(e.to_string());

                match &e {
                    HostPulseError::SourceUnavailable(status) => {
                        log::debug!("Sensor tree at {} returned {}", self.base_url, status);
                    }
                    _ if diagnostics.unreachable_log.should_log() => {
                        log::info!(
                            "Sensor tree not reachable at {} (is the hardware monitor's web server running?): {}",
                            self.base_url,
                            e
                        );
                    }
                    _ => {}
                }
                return Err(e);
            }
        };

        diagnostics.http_ok = true;
        diagnostics.last_error = None;

        let readings = parse_sensor_document(&body);
        if readings.has_temperatures() {
            log::debug!(
                "Sensor tree temps: CPU={:?} °C, GPU={:?} °C",
                readings.cpu_temperature,
                readings.gpu_temperature
            );
        } else if !body.is_empty() && diagnostics.nothing_parsed_log.should_log() {
            log::warn!(
                "Sensor tree returned {} chars but no temperatures parsed; run `hostpulse sensors` to inspect it",
                body.len()
            );
        }

        Ok(readings)
    }
}

impl ThermalSource for SensorTreeSource {
    fn name(&self) -> &'static str {
        "sensor-tree"
    }

    fn cpu_temperature(&mut self) -> Option<f64> {
        self.readings().cpu_temperature
    }

    fn gpu_reading(&mut self, device: &DeviceContext<'_>) -> GpuReading {
        let readings = self.readings();

        let mut reading = GpuReading {
            temperature: lookup_device(&readings.gpu_temperatures_by_device, device.name),
            load: lookup_device(&readings.gpu_loads_by_device, device.name),
        };

        // Aggregates cannot be attributed to a card, so only the primary gets them.
        if device.is_primary {
            reading.fill_from(GpuReading {
                temperature: readings.gpu_temperature,
                load: readings.gpu_load,
            });
        }

        reading
    }
}

/// `{base}/data.json`, keeping any path prefix on the base URL.
pub fn document_url(base_url: &str) -> Result<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    Url::parse(&base)
        .and_then(|url| url.join(DOCUMENT_PATH))
        .map_err(|e| HostPulseError::config(format!("Invalid sensor tree URL '{}': {}", base_url, e)))
}

fn describe_failure(error: &HostPulseError) -> String {
    match error {
        HostPulseError::SourceUnavailable(status) => status.clone(),
        other => format!("error: {}", other),
    }
}

fn truncate_document(body: &str, max_chars: usize) -> String {
    let total = body.chars().count();
    if total <= max_chars {
        return body.to_string();
    }

    let head: String = body.chars().take(max_chars).collect();
    format!("{}\n... (truncated, total {} chars)", head, total)
}
