//! Per-tick merge of hardware counters and thermal sources into one [`Sample`].
//!
//! Every category is collected independently. A failing category is replaced
//! by its placeholder and logged; the rest of the sample is still produced.

use std::collections::HashSet;
use std::time::Instant;

use super::metrics::{
    clamp_percent, percent_of, round_to, CpuBlock, DiskBlock, GpuBlock, MemoryBlock, NetworkBlock,
    Sample, UNAVAILABLE,
};
use super::rate::RateSampler;
use super::sources::{default_chain, DeviceContext, GpuReading, ThermalSource};
use crate::core::config::CollectorConfig;
use crate::error::Result;
use crate::platform::hardware::{
    CpuTicks, DiskIoCounters, FileStore, GraphicsDevice, HardwareProbe, InterfaceCounters,
    SysinfoProbe,
};

pub struct MetricReconciler {
    hardware: Box<dyn HardwareProbe>,
    sources: Vec<Box<dyn ThermalSource>>,
    cpu_baseline: Option<CpuTicks>,
    disk_read: RateSampler,
    disk_write: RateSampler,
    net_download: RateSampler,
    net_upload: RateSampler,
}

impl MetricReconciler {
    /// Build a reconciler and record the CPU and throughput baselines, so the
    /// first [`reconcile`](Self::reconcile) already reports real rates.
    pub fn new(hardware: Box<dyn HardwareProbe>, sources: Vec<Box<dyn ThermalSource>>) -> Self {
        let mut reconciler = Self {
            hardware,
            sources,
            cpu_baseline: None,
            disk_read: RateSampler::new(),
            disk_write: RateSampler::new(),
            net_download: RateSampler::new(),
            net_upload: RateSampler::new(),
        };
        reconciler.prime();
        reconciler
    }

    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(Box::new(SysinfoProbe::new()), default_chain(config))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    fn prime(&mut self) {
        let now = Instant::now();

        match self.hardware.cpu_ticks() {
            Ok(ticks) => self.cpu_baseline = ticks,
            Err(e) => log::debug!("No CPU tick baseline: {}", e),
        }

        match self.hardware.disk_io() {
            Ok(disks) => {
                let (read, written) = disk_totals(&disks);
                self.disk_read.sample_at(read, now);
                self.disk_write.sample_at(written, now);
            }
            Err(e) => log::debug!("No disk counter baseline: {}", e),
        }

        match self.hardware.network_interfaces() {
            Ok(interfaces) => {
                let (received, sent) = network_totals(&interfaces);
                self.net_download.sample_at(received, now);
                self.net_upload.sample_at(sent, now);
            }
            Err(e) => log::debug!("No network counter baseline: {}", e),
        }
    }

    /// Produce one complete sample. Never fails.
    pub fn reconcile(&mut self) -> Sample {
        let cpu = self.collect_cpu();
        let cpu = or_placeholder("CPU", cpu, CpuBlock::default);

        let memory = self.collect_memory();
        let memory = or_placeholder("memory", memory, MemoryBlock::default);

        let gpus = self.collect_gpus();
        let gpus = or_placeholder("GPU", gpus, || vec![GpuBlock::unavailable()]);

        let disk = self.collect_disk();
        let disk = or_placeholder("disk", disk, DiskBlock::default);

        let network = self.collect_network();
        let network = or_placeholder("network", network, NetworkBlock::default);

        Sample {
            timestamp: chrono::Utc::now().timestamp_millis(),
            cpu,
            memory,
            gpu: gpus.first().cloned(),
            gpus,
            disk,
            network,
        }
    }

    fn collect_cpu(&mut self) -> Result<CpuBlock> {
        let ticks = self.hardware.cpu_ticks()?;
        let usage = cpu_usage_percent(self.cpu_baseline.as_ref(), ticks.as_ref());
        self.cpu_baseline = ticks;

        let temperature = match self.hardware.cpu_temperature() {
            Some(celsius) => Some(celsius),
            None => self
                .sources
                .iter_mut()
                .find_map(|source| source.cpu_temperature()),
        };

        Ok(CpuBlock {
            name: self
                .hardware
                .cpu_name()
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            usage_percent: usage,
            logical_processor_count: self.hardware.logical_cpu_count(),
            temperature_celsius: temperature,
        })
    }

    fn collect_memory(&mut self) -> Result<MemoryBlock> {
        let totals = self.hardware.memory()?;
        let used = totals.total_bytes.saturating_sub(totals.available_bytes);

        Ok(MemoryBlock {
            total_bytes: totals.total_bytes,
            used_bytes: used,
            available_bytes: totals.available_bytes,
            usage_percent: round_to(percent_of(used, totals.total_bytes), 2),
        })
    }

    fn collect_gpus(&mut self) -> Result<Vec<GpuBlock>> {
        let devices = self.hardware.graphics_devices()?;
        if devices.is_empty() {
            return Ok(vec![GpuBlock::unavailable()]);
        }

        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        let primary = primary_gpu_index(&names);

        Ok(devices
            .iter()
            .enumerate()
            .map(|(index, device)| {
                let context = DeviceContext::new(index, &device.name, index == primary);
                let reading = resolve_gpu_reading(&mut self.sources, &context);
                gpu_block(device, reading)
            })
            .collect())
    }

    fn collect_disk(&mut self) -> Result<DiskBlock> {
        let now = Instant::now();
        let (read, written) = disk_totals(&self.hardware.disk_io()?);
        let (total_bytes, used_bytes) = capacity_totals(&self.hardware.file_stores()?);

        Ok(DiskBlock {
            read_bytes_per_second: self.disk_read.sample_at(read, now),
            write_bytes_per_second: self.disk_write.sample_at(written, now),
            total_bytes,
            used_bytes,
            usage_percent: round_to(percent_of(used_bytes, total_bytes), 2),
        })
    }

    fn collect_network(&mut self) -> Result<NetworkBlock> {
        let now = Instant::now();
        let (received, sent) = network_totals(&self.hardware.network_interfaces()?);

        Ok(NetworkBlock {
            download_bytes_per_second: self.net_download.sample_at(received, now),
            upload_bytes_per_second: self.net_upload.sample_at(sent, now),
            total_bytes_received: received,
            total_bytes_sent: sent,
        })
    }
}

fn or_placeholder<T>(category: &str, result: Result<T>, placeholder: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|e| {
        log::warn!("{} metrics unavailable, publishing placeholder: {}", category, e);
        placeholder()
    })
}

/// Ask each source in order, keeping the first value seen for each field.
fn resolve_gpu_reading(
    sources: &mut [Box<dyn ThermalSource>],
    device: &DeviceContext<'_>,
) -> GpuReading {
    let mut reading = GpuReading::default();
    for source in sources.iter_mut() {
        if reading.is_complete() {
            break;
        }
        reading.fill_from(source.gpu_reading(device));
    }
    reading
}

fn gpu_block(device: &GraphicsDevice, reading: GpuReading) -> GpuBlock {
    let name = device.name.trim();

    GpuBlock {
        usage_percent: round_to(clamp_percent(reading.load.unwrap_or(0.0)), 2),
        name: if name.is_empty() {
            UNAVAILABLE.to_string()
        } else {
            name.to_string()
        },
        vram_used_bytes: device.vram_used_bytes.unwrap_or(0),
        vram_total_bytes: device.vram_total_bytes,
        temperature_celsius: reading.temperature,
    }
}

/// Index of the card aggregate readings belong to: the first NVIDIA card,
/// else the first AMD card, else the first card.
pub fn primary_gpu_index<S: AsRef<str>>(names: &[S]) -> usize {
    let lowered: Vec<String> = names.iter().map(|n| n.as_ref().to_lowercase()).collect();

    let position = |markers: &[&str]| {
        lowered
            .iter()
            .position(|name| markers.iter().any(|m| name.contains(m)))
    };

    position(&["nvidia", "geforce"])
        .or_else(|| position(&["amd", "radeon"]))
        .unwrap_or(0)
}

/// Busy share of the CPU between two tick snapshots, in percent.
///
/// Missing or mismatched snapshots and a zero total delta give 0.
pub fn cpu_usage_percent(previous: Option<&CpuTicks>, current: Option<&CpuTicks>) -> f64 {
    let (Some(previous), Some(current)) = (previous, current) else {
        return 0.0;
    };

    if previous.values.len() != current.values.len()
        || previous.idle_index != current.idle_index
        || current.idle_index >= current.values.len()
    {
        return 0.0;
    }

    let total_delta = current.total().saturating_sub(previous.total());
    if total_delta == 0 {
        return 0.0;
    }
    let idle_delta = current.idle().saturating_sub(previous.idle());

    let busy = 100.0 * (1.0 - idle_delta as f64 / total_delta as f64);
    round_to(clamp_percent(busy), 2)
}

/// Cumulative read/written bytes, counting each device name once.
fn disk_totals(disks: &[DiskIoCounters]) -> (u64, u64) {
    let mut seen = HashSet::new();
    disks
        .iter()
        .filter(|disk| seen.insert(disk.name.as_str()))
        .fold((0u64, 0u64), |(read, written), disk| {
            (
                read.saturating_add(disk.read_bytes),
                written.saturating_add(disk.written_bytes),
            )
        })
}

/// Total and used bytes over fixed stores, or over every store when the fixed
/// ones add up to nothing.
fn capacity_totals(stores: &[FileStore]) -> (u64, u64) {
    let sum = |fixed_only: bool| {
        let mut seen = HashSet::new();
        stores
            .iter()
            .filter(|store| !fixed_only || !store.removable)
            .filter(|store| seen.insert(store.name.as_str()))
            .fold((0u64, 0u64), |(total, used), store| {
                (
                    total.saturating_add(store.total_bytes),
                    used.saturating_add(store.total_bytes.saturating_sub(store.available_bytes)),
                )
            })
    };

    match sum(true) {
        (0, _) => sum(false),
        totals => totals,
    }
}

fn is_loopback(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower == "lo" || lower.contains("loopback")
}

/// Cumulative received/sent bytes over every non-loopback interface.
fn network_totals(interfaces: &[InterfaceCounters]) -> (u64, u64) {
    interfaces
        .iter()
        .filter(|iface| !is_loopback(&iface.name))
        .fold((0u64, 0u64), |(received, sent), iface| {
            (
                received.saturating_add(iface.received_bytes),
                sent.saturating_add(iface.sent_bytes),
            )
        })
}
