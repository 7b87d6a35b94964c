//! Top processes by resource, for the "who is using this" view.

use serde::Serialize;
use std::str::FromStr;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, MINIMUM_CPU_UPDATE_INTERVAL};

use super::metrics::{clamp_percent, round_to};
use crate::error::HostPulseError;

pub const DEFAULT_PROCESS_LIMIT: usize = 25;
pub const MAX_PROCESS_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessSort {
    #[default]
    Cpu,
    Memory,
    Disk,
}

impl FromStr for ProcessSort {
    type Err = HostPulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" => Ok(ProcessSort::Cpu),
            "memory" | "mem" => Ok(ProcessSort::Memory),
            "disk" => Ok(ProcessSort::Disk),
            other => Err(HostPulseError::config(format!(
                "Unknown process sort '{}' (expected cpu, memory or disk)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    /// Share of the whole machine, 0-100.
    pub cpu_percent: f64,
    pub memory_bytes: u64,
    pub disk_read_bytes: u64,
    pub disk_write_bytes: u64,
}

impl ProcessInfo {
    fn disk_bytes(&self) -> u64 {
        self.disk_read_bytes.saturating_add(self.disk_write_bytes)
    }
}

/// 0 means "use the default"; anything above the maximum is capped.
pub fn effective_limit(limit: usize) -> usize {
    match limit {
        0 => DEFAULT_PROCESS_LIMIT,
        n => n.min(MAX_PROCESS_LIMIT),
    }
}

/// Snapshot the process table and return the heaviest processes for `sort`.
///
/// Blocks for sysinfo's minimum CPU update interval so CPU figures are real.
pub fn top_processes(sort: ProcessSort, limit: usize) -> Vec<ProcessInfo> {
    let refresh = ProcessRefreshKind::nothing()
        .with_cpu()
        .with_memory()
        .with_disk_usage();

    let mut system = System::new();
    system.refresh_cpu_usage();
    system.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    system.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);

    let cpu_count = system.cpus().len().max(1) as f64;

    let processes = system
        .processes()
        .values()
        .map(|process| {
            let disk = process.disk_usage();
            ProcessInfo {
                pid: process.pid().as_u32(),
                name: process.name().to_string_lossy().to_string(),
                cpu_percent: f64::from(process.cpu_usage()) / cpu_count,
                memory_bytes: process.memory(),
                disk_read_bytes: disk.total_read_bytes,
                disk_write_bytes: disk.total_written_bytes,
            }
        })
        .collect();

    rank_processes(processes, sort, limit)
}

/// Drop pid 0, name anonymous processes, sort descending and truncate.
pub fn rank_processes(
    processes: Vec<ProcessInfo>,
    sort: ProcessSort,
    limit: usize,
) -> Vec<ProcessInfo> {
    let mut ranked: Vec<ProcessInfo> = processes
        .into_iter()
        .filter(|p| p.pid > 0)
        .map(|mut p| {
            if p.name.trim().is_empty() {
                p.name = format!("[{}]", p.pid);
            }
            p.cpu_percent = round_to(clamp_percent(p.cpu_percent), 2);
            p
        })
        .collect();

    match sort {
        ProcessSort::Cpu => ranked.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent)),
        ProcessSort::Memory => ranked.sort_by(|a, b| b.memory_bytes.cmp(&a.memory_bytes)),
        ProcessSort::Disk => ranked.sort_by_key(|p| std::cmp::Reverse(p.disk_bytes())),
    }

    ranked.truncate(effective_limit(limit));
    ranked
}
