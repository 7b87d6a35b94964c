use std::time::Duration;

use hostpulse::core::system_monitor::{MetricReconciler, MetricsRuntime};

use super::support::FakeHardware;

#[test]
fn test_runtime_publishes_samples_in_order() {
    let hardware = FakeHardware::new().with_gpus(&["AMD Radeon RX 6600"]);
    let reconciler = MetricReconciler::new(Box::new(hardware), Vec::new());
    let mut runtime = MetricsRuntime::with_reconciler(reconciler, Duration::from_millis(50)).unwrap();

    let first = runtime.next_sample().unwrap();
    let second = runtime.next_sample().unwrap();

    assert!(second.timestamp > first.timestamp);
    assert_eq!(first.cpu.usage_percent, 40.0);
    assert_eq!(second.gpus[0].name, "AMD Radeon RX 6600");
    assert!(runtime.latest().timestamp >= second.timestamp);

    runtime.shutdown();
}

#[test]
fn test_reconciler_handle_is_usable_between_ticks() {
    let reconciler = MetricReconciler::new(Box::new(FakeHardware::new()), Vec::new());
    let mut runtime = MetricsRuntime::with_reconciler(reconciler, Duration::from_millis(50)).unwrap();

    runtime.next_sample().unwrap();
    let handle = runtime.reconciler();
    assert!(handle.lock().source_names().is_empty());

    runtime.shutdown();
}

#[test]
fn test_subscribers_see_published_samples() {
    let reconciler = MetricReconciler::new(Box::new(FakeHardware::new()), Vec::new());
    let mut runtime = MetricsRuntime::with_reconciler(reconciler, Duration::from_millis(50)).unwrap();
    let subscriber = runtime.subscribe();

    let sample = runtime.next_sample().unwrap();
    assert!(subscriber.borrow().timestamp >= sample.timestamp);

    runtime.shutdown();
}
