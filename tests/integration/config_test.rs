use std::fs;
use tempfile::TempDir;

use hostpulse::core::config::CollectorConfig;

#[test]
fn test_missing_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = CollectorConfig::load_from(&temp_dir.path().join("config.json")).unwrap();
    assert_eq!(config, CollectorConfig::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"sensor_tree_url": "http://192.168.1.20:8085", "vendor_tool_ttl_ms": 1500}"#,
    )
    .unwrap();

    let config = CollectorConfig::load_from(&path).unwrap();
    assert_eq!(config.sensor_tree_url, "http://192.168.1.20:8085");
    assert_eq!(config.vendor_tool_ttl_ms, 1500);
    assert_eq!(config.sample_interval_ms, 1000);
    assert_eq!(config.fallback_ttl_ms, 3000);
}

#[test]
fn test_corrupt_or_empty_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    fs::write(&path, "{ not json").unwrap();
    assert_eq!(CollectorConfig::load_from(&path).unwrap(), CollectorConfig::default());

    fs::write(&path, "").unwrap();
    assert_eq!(CollectorConfig::load_from(&path).unwrap(), CollectorConfig::default());
}

#[test]
fn test_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let config = CollectorConfig {
        sensor_tree_url: "https://sensors.lan".to_string(),
        enable_vendor_tool: false,
        ..Default::default()
    };
    config.save_to(&path).unwrap();

    let reloaded = CollectorConfig::load_from(&path).unwrap();
    assert_eq!(reloaded, config);
    assert!(reloaded.validate().is_ok());
}
