//! Fakes shared by the integration tests.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use hostpulse::core::system_monitor::{DeviceContext, GpuReading, ThermalSource};
use hostpulse::platform::hardware::{
    CpuTicks, DiskIoCounters, FileStore, GraphicsDevice, HardwareProbe, InterfaceCounters,
    MemoryTotals,
};
use hostpulse::{HostPulseError, Result};

/// Deterministic machine: every tick adds 100 CPU ticks (60 idle), 4 KiB of
/// disk reads and 2 KiB of network traffic.
pub struct FakeHardware {
    pub gpus: Vec<GraphicsDevice>,
    pub native_cpu_temperature: Option<f64>,
    pub fail_memory: bool,
    pub fail_gpus: bool,
    ticks: u64,
    disk_reads: u64,
    net_bytes: u64,
}

impl FakeHardware {
    pub fn new() -> Self {
        Self {
            gpus: Vec::new(),
            native_cpu_temperature: None,
            fail_memory: false,
            fail_gpus: false,
            ticks: 0,
            disk_reads: 0,
            net_bytes: 0,
        }
    }

    pub fn with_gpus(mut self, names: &[&str]) -> Self {
        self.gpus = names
            .iter()
            .map(|name| GraphicsDevice {
                name: name.to_string(),
                vram_total_bytes: 4 << 30,
                vram_used_bytes: Some(1 << 30),
            })
            .collect();
        self
    }
}

impl HardwareProbe for FakeHardware {
    fn cpu_name(&self) -> Option<String> {
        Some("Fake CPU 9000".to_string())
    }

    fn logical_cpu_count(&self) -> usize {
        8
    }

    fn cpu_ticks(&mut self) -> Result<Option<CpuTicks>> {
        self.ticks += 1;
        let n = self.ticks;
        Ok(Some(CpuTicks {
            values: vec![30 * n, 0, 10 * n, 60 * n],
            idle_index: 3,
        }))
    }

    fn memory(&mut self) -> Result<MemoryTotals> {
        if self.fail_memory {
            return Err(HostPulseError::metric_collection("memory counters unavailable"));
        }
        Ok(MemoryTotals {
            total_bytes: 16_000,
            available_bytes: 4_000,
        })
    }

    fn disk_io(&mut self) -> Result<Vec<DiskIoCounters>> {
        self.disk_reads += 4096;
        Ok(vec![DiskIoCounters {
            name: "nvme0n1".to_string(),
            read_bytes: self.disk_reads,
            written_bytes: 0,
        }])
    }

    fn file_stores(&mut self) -> Result<Vec<FileStore>> {
        Ok(vec![FileStore {
            name: "nvme0n1p2".to_string(),
            mount_point: "/".to_string(),
            total_bytes: 1_000,
            available_bytes: 250,
            removable: false,
        }])
    }

    fn network_interfaces(&mut self) -> Result<Vec<InterfaceCounters>> {
        self.net_bytes += 2048;
        Ok(vec![
            InterfaceCounters {
                name: "lo".to_string(),
                received_bytes: 1 << 40,
                sent_bytes: 1 << 40,
            },
            InterfaceCounters {
                name: "eth0".to_string(),
                received_bytes: self.net_bytes,
                sent_bytes: self.net_bytes / 2,
            },
        ])
    }

    fn graphics_devices(&mut self) -> Result<Vec<GraphicsDevice>> {
        if self.fail_gpus {
            return Err(HostPulseError::gpu_not_available("driver crashed"));
        }
        Ok(self.gpus.clone())
    }

    fn cpu_temperature(&mut self) -> Option<f64> {
        self.native_cpu_temperature
    }
}

/// Reports fixed values for devices whose name contains `matching`.
pub struct FixedSource {
    pub matching: &'static str,
    pub cpu: Option<f64>,
    pub gpu: GpuReading,
}

impl ThermalSource for FixedSource {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn cpu_temperature(&mut self) -> Option<f64> {
        self.cpu
    }

    fn gpu_reading(&mut self, device: &DeviceContext<'_>) -> GpuReading {
        if device.name.contains(self.matching) {
            self.gpu
        } else {
            GpuReading::default()
        }
    }
}

/// Serve `responses` in order, one per connection, on an ephemeral port.
///
/// Returns the base URL and a handle yielding the request lines received.
pub fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request).to_string();
            requests.push(request.lines().next().unwrap_or_default().to_string());

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
        requests
    });

    (base_url, handle)
}
