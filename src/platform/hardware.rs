//! Raw hardware access.
//!
//! The reconciler only sees the [`HardwareProbe`] trait. [`SysinfoProbe`] is the
//! production implementation: sysinfo for memory, disks, networks and sensors,
//! the kernel tick counters for CPU usage, and the GPU enumerators in
//! [`crate::platform::gpu`].

use serde::Serialize;
use sysinfo::{
    Components, CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System,
};

use crate::core::system_monitor::metrics::{is_valid_temperature, round_to};
use crate::error::Result;
use crate::platform::gpu::GpuEnumerator;

/// Cumulative CPU time counters, one entry per tick type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTicks {
    pub values: Vec<u64>,
    pub idle_index: usize,
}

impl CpuTicks {
    pub fn idle(&self) -> u64 {
        self.values.get(self.idle_index).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryTotals {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskIoCounters {
    pub name: String,
    pub read_bytes: u64,
    pub written_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStore {
    pub name: String,
    pub mount_point: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub removable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub name: String,
    pub received_bytes: u64,
    pub sent_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphicsDevice {
    pub name: String,
    pub vram_total_bytes: u64,
    /// Only known when a vendor library reports it.
    pub vram_used_bytes: Option<u64>,
}

/// Everything the reconciler needs from the machine.
///
/// Every call returns fresh values; implementations refresh internally.
pub trait HardwareProbe: Send {
    fn cpu_name(&self) -> Option<String>;

    fn logical_cpu_count(&self) -> usize;

    /// Cumulative tick counters, or `None` when the platform does not expose them.
    fn cpu_ticks(&mut self) -> Result<Option<CpuTicks>>;

    fn memory(&mut self) -> Result<MemoryTotals>;

    fn disk_io(&mut self) -> Result<Vec<DiskIoCounters>>;

    fn file_stores(&mut self) -> Result<Vec<FileStore>>;

    fn network_interfaces(&mut self) -> Result<Vec<InterfaceCounters>>;

    fn graphics_devices(&mut self) -> Result<Vec<GraphicsDevice>>;

    /// CPU temperature from an on-board sensor, if the OS exposes one.
    fn cpu_temperature(&mut self) -> Option<f64>;
}

/// Component labels that belong to the CPU package or its cores.
const CPU_COMPONENT_MARKERS: &[&str] = &["package", "tctl", "tdie", "cpu", "core", "k10temp"];

/// [`HardwareProbe`] backed by sysinfo and the platform GPU enumerators.
pub struct SysinfoProbe {
    system: System,
    components: Components,
    disks: Disks,
    networks: Networks,
    gpus: GpuEnumerator,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        Self {
            system: System::new_with_specifics(refresh_kind),
            components: Components::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            gpus: GpuEnumerator::new(),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareProbe for SysinfoProbe {
    fn cpu_name(&self) -> Option<String> {
        self.system
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
    }

    fn logical_cpu_count(&self) -> usize {
        self.system.cpus().len()
    }

    fn cpu_ticks(&mut self) -> Result<Option<CpuTicks>> {
        read_cpu_ticks()
    }

    fn memory(&mut self) -> Result<MemoryTotals> {
        self.system.refresh_memory();
        Ok(MemoryTotals {
            total_bytes: self.system.total_memory(),
            available_bytes: self.system.available_memory(),
        })
    }

    fn disk_io(&mut self) -> Result<Vec<DiskIoCounters>> {
        self.disks.refresh(true);
        Ok(self
            .disks
            .iter()
            .map(|disk| {
                let usage = disk.usage();
                DiskIoCounters {
                    name: disk.name().to_string_lossy().to_string(),
                    read_bytes: usage.total_read_bytes,
                    written_bytes: usage.total_written_bytes,
                }
            })
            .collect())
    }

    fn file_stores(&mut self) -> Result<Vec<FileStore>> {
        // disk_io already refreshed the list this tick
        Ok(self
            .disks
            .iter()
            .map(|disk| FileStore {
                name: disk.name().to_string_lossy().to_string(),
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                total_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
                removable: disk.is_removable(),
            })
            .collect())
    }

    fn network_interfaces(&mut self) -> Result<Vec<InterfaceCounters>> {
        self.networks.refresh(true);
        Ok(self
            .networks
            .iter()
            .map(|(name, data)| InterfaceCounters {
                name: name.to_string(),
                received_bytes: data.total_received(),
                sent_bytes: data.total_transmitted(),
            })
            .collect())
    }

    fn graphics_devices(&mut self) -> Result<Vec<GraphicsDevice>> {
        self.gpus.enumerate()
    }

    fn cpu_temperature(&mut self) -> Option<f64> {
        self.components.refresh(true);
        self.components
            .iter()
            .filter(|component| {
                let label = component.label().to_lowercase();
                CPU_COMPONENT_MARKERS.iter().any(|m| label.contains(m))
            })
            .filter_map(|component| component.temperature())
            .map(f64::from)
            .filter(|celsius| is_valid_temperature(*celsius))
            .reduce(f64::max)
            .map(|celsius| round_to(celsius, 1))
    }
}

#[cfg(target_os = "linux")]
fn read_cpu_ticks() -> Result<Option<CpuTicks>> {
    let stat = std::fs::read_to_string("/proc/stat")?;
    Ok(parse_proc_stat(&stat))
}

#[cfg(windows)]
fn read_cpu_ticks() -> Result<Option<CpuTicks>> {
    use windows_sys::Win32::Foundation::FILETIME;
    use windows_sys::Win32::System::Threading::GetSystemTimes;

    let zero = || FILETIME {
        dwLowDateTime: 0,
        dwHighDateTime: 0,
    };
    let (mut idle, mut kernel, mut user) = (zero(), zero(), zero());

    // SAFETY: all three pointers reference live, writable FILETIME values.
    let ok = unsafe { GetSystemTimes(&mut idle, &mut kernel, &mut user) };
    if ok == 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    let as_ticks = |ft: FILETIME| ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64;
    let idle = as_ticks(idle);
    // Kernel time includes idle time.
    let system = as_ticks(kernel).saturating_sub(idle);

    Ok(Some(CpuTicks {
        values: vec![as_ticks(user), system, idle],
        idle_index: 2,
    }))
}

#[cfg(not(any(target_os = "linux", windows)))]
fn read_cpu_ticks() -> Result<Option<CpuTicks>> {
    Ok(None)
}

/// Parse the aggregate `cpu` line of `/proc/stat`.
///
/// Keeps user, nice, system, idle, iowait, irq, softirq and steal; guest time
/// is already folded into user.
pub fn parse_proc_stat(stat: &str) -> Option<CpuTicks> {
    let line = stat.lines().find(|line| line.starts_with("cpu "))?;
    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|field| field.parse::<u64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    if values.len() < 4 {
        return None;
    }

    Some(CpuTicks {
        values,
        idle_index: 3,
    })
}
