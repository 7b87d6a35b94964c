use hostpulse::core::system_monitor::{GpuReading, MetricReconciler, ThermalSource, UNAVAILABLE};

use super::support::{FakeHardware, FixedSource};

fn reconciler(hardware: FakeHardware, sources: Vec<Box<dyn ThermalSource>>) -> MetricReconciler {
    MetricReconciler::new(Box::new(hardware), sources)
}

#[test]
fn test_zero_gpus_yield_one_sentinel() {
    let mut reconciler = reconciler(FakeHardware::new(), Vec::new());
    let sample = reconciler.reconcile();

    assert_eq!(sample.gpus.len(), 1);
    let gpu = &sample.gpus[0];
    assert_eq!(gpu.name, UNAVAILABLE);
    assert_eq!(gpu.usage_percent, 0.0);
    assert_eq!(gpu.vram_total_bytes, 0);
    assert_eq!(gpu.temperature_celsius, None);
    assert_eq!(sample.gpu.as_ref(), Some(gpu));
}

#[test]
fn test_cpu_memory_disk_network_blocks() {
    let mut reconciler = reconciler(FakeHardware::new(), Vec::new());
    let sample = reconciler.reconcile();

    assert_eq!(sample.cpu.name, "Fake CPU 9000");
    assert_eq!(sample.cpu.logical_processor_count, 8);
    assert_eq!(sample.cpu.usage_percent, 40.0);
    assert_eq!(sample.cpu.temperature_celsius, None);

    assert_eq!(sample.memory.total_bytes, 16_000);
    assert_eq!(sample.memory.used_bytes, 12_000);
    assert_eq!(sample.memory.usage_percent, 75.0);

    assert_eq!(sample.disk.total_bytes, 1_000);
    assert_eq!(sample.disk.used_bytes, 750);
    assert!(sample.disk.read_bytes_per_second > 0);
    assert_eq!(sample.disk.write_bytes_per_second, 0);

    // loopback excluded from totals
    assert_eq!(sample.network.total_bytes_received, 4096);
    assert_eq!(sample.network.total_bytes_sent, 2048);
    assert!(sample.network.download_bytes_per_second > 0);
    assert!(sample.timestamp > 0);
}

#[test]
fn test_failing_category_gets_placeholder() {
    let mut hardware = FakeHardware::new().with_gpus(&["NVIDIA GeForce GTX 1650"]);
    hardware.fail_memory = true;
    hardware.fail_gpus = true;

    let sample = reconciler(hardware, Vec::new()).reconcile();

    assert_eq!(sample.memory.total_bytes, 0);
    assert_eq!(sample.memory.usage_percent, 0.0);
    assert_eq!(sample.gpus.len(), 1);
    assert!(sample.gpus[0].is_unavailable());
    // unaffected categories are still reported
    assert_eq!(sample.cpu.usage_percent, 40.0);
    assert_eq!(sample.disk.total_bytes, 1_000);
}

#[test]
fn test_native_cpu_temperature_wins() {
    let mut hardware = FakeHardware::new();
    hardware.native_cpu_temperature = Some(48.5);
    let sources: Vec<Box<dyn ThermalSource>> = vec![Box::new(FixedSource {
        matching: "",
        cpu: Some(70.0),
        gpu: GpuReading::default(),
    })];

    let sample = reconciler(hardware, sources).reconcile();
    assert_eq!(sample.cpu.temperature_celsius, Some(48.5));
}

#[test]
fn test_cpu_temperature_falls_through_chain() {
    let sources: Vec<Box<dyn ThermalSource>> = vec![
        Box::new(FixedSource {
            matching: "",
            cpu: None,
            gpu: GpuReading::default(),
        }),
        Box::new(FixedSource {
            matching: "",
            cpu: Some(66.0),
            gpu: GpuReading::default(),
        }),
    ];

    let sample = reconciler(FakeHardware::new(), sources).reconcile();
    assert_eq!(sample.cpu.temperature_celsius, Some(66.0));
}

#[test]
fn test_gpu_fields_resolve_independently_in_priority_order() {
    let hardware = FakeHardware::new().with_gpus(&["NVIDIA GeForce RTX 3060", "Intel(R) UHD Graphics"]);
    let sources: Vec<Box<dyn ThermalSource>> = vec![
        Box::new(FixedSource {
            matching: "NVIDIA",
            cpu: None,
            gpu: GpuReading {
                temperature: Some(71.0),
                load: None,
            },
        }),
        Box::new(FixedSource {
            matching: "",
            cpu: None,
            gpu: GpuReading {
                temperature: Some(50.0),
                load: Some(12.5),
            },
        }),
    ];

    let sample = reconciler(hardware, sources).reconcile();

    assert_eq!(sample.gpus.len(), 2);
    assert_eq!(sample.gpus[0].name, "NVIDIA GeForce RTX 3060");
    assert_eq!(sample.gpus[0].temperature_celsius, Some(71.0));
    assert_eq!(sample.gpus[0].usage_percent, 12.5);
    assert_eq!(sample.gpus[0].vram_used_bytes, 1 << 30);

    assert_eq!(sample.gpus[1].temperature_celsius, Some(50.0));
    assert_eq!(sample.gpus[1].usage_percent, 12.5);
}

#[test]
fn test_gpu_without_readings_keeps_absent_temperature() {
    let hardware = FakeHardware::new().with_gpus(&["Intel(R) Arc A380"]);
    let sample = reconciler(hardware, Vec::new()).reconcile();

    assert_eq!(sample.gpus[0].name, "Intel(R) Arc A380");
    assert_eq!(sample.gpus[0].temperature_celsius, None);
    assert_eq!(sample.gpus[0].usage_percent, 0.0);
}
