use std::time::Duration;

use hostpulse::core::system_monitor::{
    DeviceContext, MetricReconciler, SensorTreeSource, ThermalSource,
};

use super::support::{serve, FakeHardware};

const TTL: Duration = Duration::from_secs(60);
const TIMEOUT: Duration = Duration::from_secs(5);

const LAPTOP_DOCUMENT: &str = r#"{
  "id": 0,
  "Text": "Sensor",
  "Children": [{
    "Text": "LAPTOP-01",
    "Children": [
      {
        "Text": "AMD Ryzen 7 5800H",
        "Children": [{
          "Text": "Temperatures",
          "Children": [{"Text": "Core (Tctl/Tdie)", "Type": "Temperature", "Value": "63.5 °C"}]
        }]
      },
      {
        "Text": "NVIDIA GeForce RTX 3060 Laptop GPU",
        "Children": [
          {"Text": "Temperatures", "Children": [{"Text": "GPU Core", "Type": "Temperature", "Value": "61.0 °C"}]},
          {"Text": "Load", "Children": [{"Text": "GPU Core", "Type": "Load", "Value": "22.0 %"}]}
        ]
      },
      {
        "Text": "AMD Radeon(TM) Graphics",
        "Children": [{
          "Text": "Temperatures",
          "Children": [{"Text": "GPU VR SoC", "Type": "Temperature", "Value": "47.0 °C"}]
        }]
      }
    ]
  }]
}"#;

const UNATTRIBUTED_GPU_DOCUMENT: &str = r#"{
  "Children": [{
    "Text": "Discrete GPU",
    "Children": [
      {"Text": "GPU Core", "Type": "Temperature", "Value": 58.0},
      {"Text": "GPU Core", "Type": "Load", "Value": 33.0}
    ]
  }]
}"#;

fn source(base_url: &str) -> SensorTreeSource {
    SensorTreeSource::new(base_url, TTL, TIMEOUT).unwrap()
}

#[test]
fn test_readings_fetched_once_per_ttl() {
    let (base_url, server) = serve(vec![(200, LAPTOP_DOCUMENT.to_string())]);
    let mut tree = source(&base_url);

    assert_eq!(tree.cpu_temperature(), Some(63.5));
    // served from the cache; the server only answers once
    assert_eq!(tree.cpu_temperature(), Some(63.5));

    let status = tree.status();
    assert!(status.reachable);
    assert!(status.http_ok);
    assert_eq!(status.gpu_temp, Some(61.0));
    assert_eq!(status.error, None);

    let requests = server.join().unwrap();
    assert_eq!(requests, vec!["GET /data.json HTTP/1.1".to_string()]);
}

#[test]
fn test_per_device_lookup_by_display_name() {
    let (base_url, server) = serve(vec![(200, LAPTOP_DOCUMENT.to_string())]);
    let mut tree = source(&base_url);

    let nvidia = tree.gpu_reading(&DeviceContext::new(0, "NVIDIA GeForce RTX 3060 Laptop GPU", true));
    assert_eq!(nvidia.temperature, Some(61.0));
    assert_eq!(nvidia.load, Some(22.0));

    let radeon = tree.gpu_reading(&DeviceContext::new(1, "Radeon(TM) Graphics", false));
    assert_eq!(radeon.temperature, Some(47.0));
    assert_eq!(radeon.load, None);

    server.join().unwrap();
}

#[test]
fn test_global_readings_only_reach_primary_device() {
    let (base_url, server) = serve(vec![(200, UNATTRIBUTED_GPU_DOCUMENT.to_string())]);
    let hardware = FakeHardware::new().with_gpus(&["NVIDIA GeForce GTX 1650", "Intel(R) UHD Graphics 630"]);

    let mut reconciler = MetricReconciler::new(Box::new(hardware), vec![Box::new(source(&base_url))]);
    let sample = reconciler.reconcile();

    assert_eq!(sample.gpus[0].temperature_celsius, Some(58.0));
    assert_eq!(sample.gpus[0].usage_percent, 33.0);
    assert_eq!(sample.gpus[1].temperature_celsius, None);
    assert_eq!(sample.gpus[1].usage_percent, 0.0);

    server.join().unwrap();
}

#[test]
fn test_http_error_status_yields_absence() {
    let (base_url, server) = serve(vec![
        (503, "busy".to_string()),
        (503, "busy".to_string()),
    ]);
    let mut tree = source(&base_url);

    assert_eq!(tree.cpu_temperature(), None);
    let status = tree.status();
    assert!(!status.reachable);
    assert!(!status.http_ok);
    assert_eq!(status.error.as_deref(), Some("Source unavailable: HTTP 503"));

    // uncached debug fetch
    assert_eq!(tree.top_level_keys(), vec!["HTTP 503".to_string()]);

    server.join().unwrap();
}

#[test]
fn test_unreachable_server_yields_absence() {
    let mut tree = source("http://127.0.0.1:1");

    assert_eq!(tree.cpu_temperature(), None);
    let reading = tree.gpu_reading(&DeviceContext::new(0, "NVIDIA GeForce GTX 1650", true));
    assert_eq!(reading.temperature, None);
    assert_eq!(reading.load, None);

    let status = tree.status();
    assert!(!status.reachable);
    assert!(!status.http_ok);
    assert!(status.error.is_some());
    assert!(tree.top_level_keys()[0].starts_with("error: "));
    assert!(tree.document_sample(100).starts_with("error: "));
}

#[test]
fn test_debug_views_of_raw_document() {
    let (base_url, server) = serve(vec![
        (200, LAPTOP_DOCUMENT.to_string()),
        (200, LAPTOP_DOCUMENT.to_string()),
    ]);
    let tree = source(&base_url);

    let keys = tree.top_level_keys();
    assert!(keys.contains(&"Children".to_string()));
    assert!(keys.contains(&"Text".to_string()));

    let sample = tree.document_sample(10);
    assert!(sample.starts_with("{\n  \"id\": "));
    assert!(sample.contains("(truncated, total "));

    server.join().unwrap();
}

#[test]
fn test_malformed_document_is_reachable_but_empty() {
    let (base_url, server) = serve(vec![
        (200, "<html>not json</html>".to_string()),
        (200, "<html>not json</html>".to_string()),
    ]);
    let mut tree = source(&base_url);

    assert_eq!(tree.cpu_temperature(), None);
    let status = tree.status();
    assert!(status.http_ok);
    assert!(!status.reachable);

    let keys = tree.top_level_keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("error: JSON error: "));

    server.join().unwrap();
}
