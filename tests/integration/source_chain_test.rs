use std::time::Duration;

use hostpulse::core::config::CollectorConfig;
use hostpulse::core::system_monitor::sources::default_chain;
use hostpulse::core::system_monitor::{
    DiscreteGpuProbe, FallbackTemperatureResolver, MetricReconciler, SensorTreeSource,
    ThermalSource,
};

use super::support::{serve, FakeHardware};

const TTL: Duration = Duration::from_secs(60);
const TIMEOUT: Duration = Duration::from_secs(5);

const NVIDIA_GPU: &str = "NVIDIA GeForce RTX 3060 Laptop GPU";

const DESKTOP_DOCUMENT: &str = r#"{
  "Text": "Sensor",
  "Children": [{
    "Text": "DESKTOP-7",
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
      }
    ]
  }]
}"#;

const GPU_ONLY_DOCUMENT: &str = r#"{
  "Children": [{
    "Text": "NVIDIA GeForce RTX 3060 Laptop GPU",
    "Children": [{"Text": "GPU Core", "Type": "Temperature", "Value": 61.0}]
  }]
}"#;

#[test]
fn test_default_chain_order() {
    let config = CollectorConfig {
        enable_vendor_tool: true,
        enable_platform_fallback: true,
        ..Default::default()
    };
    let reconciler = MetricReconciler::new(Box::new(FakeHardware::new()), default_chain(&config));
    assert_eq!(
        reconciler.source_names(),
        vec!["vendor-tool", "sensor-tree", "platform-fallback"]
    );

    let config = CollectorConfig {
        enable_vendor_tool: false,
        enable_platform_fallback: false,
        ..Default::default()
    };
    let reconciler = MetricReconciler::new(Box::new(FakeHardware::new()), default_chain(&config));
    assert_eq!(reconciler.source_names(), vec!["sensor-tree"]);
}

#[cfg(unix)]
#[test]
fn test_vendor_tool_wins_over_sensor_tree_for_nvidia_device() {
    let (base_url, server) = serve(vec![(200, DESKTOP_DOCUMENT.to_string())]);

    let sources: Vec<Box<dyn ThermalSource>> = vec![
        Box::new(DiscreteGpuProbe::with_command(
            "sh",
            &["-c", "echo '90, 80'"],
            Duration::from_millis(800),
            Duration::from_secs(2),
        )),
        Box::new(SensorTreeSource::new(&base_url, TTL, TIMEOUT).unwrap()),
    ];
    let hardware = FakeHardware::new().with_gpus(&[NVIDIA_GPU]);
    let mut reconciler = MetricReconciler::new(Box::new(hardware), sources);

    let sample = reconciler.reconcile();
    assert_eq!(sample.gpus[0].temperature_celsius, Some(80.0));
    assert_eq!(sample.gpus[0].usage_percent, 90.0);
    // CPU temperature is not something the vendor tool reports
    assert_eq!(sample.cpu.temperature_celsius, Some(63.5));

    server.join().unwrap();
}

#[cfg(unix)]
#[test]
fn test_platform_fallback_only_after_sensor_tree() {
    let (base_url, server) = serve(vec![
        (200, DESKTOP_DOCUMENT.to_string()),
        (200, GPU_ONLY_DOCUMENT.to_string()),
    ]);

    let chain = |base_url: &str| -> Vec<Box<dyn ThermalSource>> {
        vec![
            Box::new(SensorTreeSource::new(base_url, TTL, TIMEOUT).unwrap()),
            Box::new(FallbackTemperatureResolver::with_command(
                "sh",
                &["-c", "echo 41.0"],
                Duration::from_secs(3),
                Duration::from_secs(2),
            )),
        ]
    };

    // the sensor tree has a CPU reading
    let mut reconciler = MetricReconciler::new(Box::new(FakeHardware::new()), chain(&base_url));
    assert_eq!(reconciler.reconcile().cpu.temperature_celsius, Some(63.5));

    // the sensor tree has none, so the fallback answers
    let mut reconciler = MetricReconciler::new(Box::new(FakeHardware::new()), chain(&base_url));
    assert_eq!(reconciler.reconcile().cpu.temperature_celsius, Some(41.0));

    server.join().unwrap();
}
