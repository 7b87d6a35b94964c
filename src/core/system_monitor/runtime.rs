//! Tokio runtime and orchestrator for metrics collection.
//!
//! One orchestrator task owns the sampling clock. Each tick runs the blocking
//! reconciliation on the blocking pool and waits for it, so ticks never
//! overlap; ticks missed while a slow source was blocking are skipped.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval, MissedTickBehavior};

use super::metrics::Sample;
use super::reconciler::MetricReconciler;
use crate::core::config::CollectorConfig;

/// Background sampling loop publishing one [`Sample`] per tick.
pub struct MetricsRuntime {
    /// Receiver for the latest Sample
    pub snapshot_rx: watch::Receiver<Arc<Sample>>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    runtime: tokio::runtime::Runtime,

    /// Dropped after `runtime`.
    reconciler: Arc<Mutex<MetricReconciler>>,
}

impl MetricsRuntime {
    /// Start sampling with the platform probe and the default source chain.
    pub fn start(config: &CollectorConfig) -> anyhow::Result<Self> {
        Self::with_reconciler(MetricReconciler::from_config(config), config.sample_interval())
    }

    pub fn with_reconciler(reconciler: MetricReconciler, period: Duration) -> anyhow::Result<Self> {
        log::info!(
            "Starting metrics runtime ({} ms period, sources: {})",
            period.as_millis(),
            reconciler.source_names().join(", ")
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("hostpulse-worker")
            .build()?;

        let reconciler = Arc::new(Mutex::new(reconciler));
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Sample::default()));
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        runtime.spawn(orchestrator_task(
            Arc::clone(&reconciler),
            period,
            snapshot_tx,
            shutdown_tx.subscribe(),
        ));

        Ok(Self {
            snapshot_rx,
            shutdown_tx,
            runtime,
            reconciler,
        })
    }

    /// A fresh receiver; `changed()` resolves on every published sample.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Sample>> {
        self.snapshot_rx.clone()
    }

    pub fn latest(&self) -> Arc<Sample> {
        Arc::clone(&self.snapshot_rx.borrow())
    }

    /// Shared handle to the reconciler, locked between ticks.
    pub fn reconciler(&self) -> Arc<Mutex<MetricReconciler>> {
        Arc::clone(&self.reconciler)
    }

    /// Block the calling thread until the next sample is published.
    ///
    /// Returns `None` once the orchestrator has stopped.
    pub fn next_sample(&mut self) -> Option<Arc<Sample>> {
        let rx = &mut self.snapshot_rx;
        self.runtime.block_on(async move {
            rx.changed().await.ok()?;
            Some(Arc::clone(&rx.borrow_and_update()))
        })
    }

    /// Shutdown the runtime gracefully.
    pub fn shutdown(self) {
        log::info!("Shutting down metrics runtime");
        let _ = self.shutdown_tx.send(());
        self.runtime.shutdown_timeout(Duration::from_secs(3));
        // reconciler (and its HTTP client) drops here, outside the runtime
    }
}

/// Drive the reconciler on a fixed period until shutdown.
async fn orchestrator_task(
    reconciler: Arc<Mutex<MetricReconciler>>,
    period: Duration,
    snapshot_tx: watch::Sender<Arc<Sample>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::debug!("Orchestrator task started");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The reconciler primed its baselines at construction; the immediate
    // first tick would report rates over a near-zero window.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let reconciler = Arc::clone(&reconciler);
                let tick = tokio::task::spawn_blocking(move || reconciler.lock().reconcile());

                match tick.await {
                    Ok(sample) => {
                        // only fails when every receiver is gone
                        if snapshot_tx.send(Arc::new(sample)).is_err() {
                            log::debug!("No sample receivers left, stopping orchestrator");
                            break;
                        }
                    }
                    Err(e) => log::error!("Reconciliation task failed: {}", e),
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Orchestrator task shutting down");
                break;
            }
        }
    }
}
