use std::process::Command;
use std::time::{Duration, Instant};

use super::{DeviceContext, GpuReading, ThermalSource};
use crate::core::system_monitor::cache::ExternalSourceCache;
use crate::core::system_monitor::metrics::{is_valid_load, is_valid_temperature};
use crate::error::HostPulseError;
use crate::platform::command::{first_line, run_with_timeout};

const NVIDIA_SMI: &str = "nvidia-smi";
const NVIDIA_SMI_ARGS: &[&str] = &[
    "--query-gpu=utilization.gpu,temperature.gpu",
    "--format=csv,noheader,nounits",
];

/// One line of vendor tool output. Fields parse independently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VendorGpuSample {
    pub utilization: Option<f64>,
    pub temperature: Option<f64>,
}

/// GPU utilization and temperature from the vendor command-line tool.
///
/// Only consulted for NVIDIA devices. While the tool is missing from `PATH`
/// the probe spawns nothing and repeats the lookup once per TTL.
pub struct DiscreteGpuProbe {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    cache: ExternalSourceCache<VendorGpuSample>,
    /// Last lookup result and when it was made.
    installed: Option<(bool, Instant)>,
}

impl DiscreteGpuProbe {
    pub fn nvidia_smi(ttl: Duration, timeout: Duration) -> Self {
        Self::with_command(NVIDIA_SMI, NVIDIA_SMI_ARGS, ttl, timeout)
    }

    pub fn with_command<S: AsRef<str>>(
        program: &str,
        args: &[S],
        ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
            timeout,
            cache: ExternalSourceCache::new(ttl),
            installed: None,
        }
    }

    fn is_installed(&mut self) -> bool {
        let now = Instant::now();
        match self.installed {
            Some((true, _)) => return true,
            Some((false, checked)) if now.duration_since(checked) < self.cache.ttl() => return false,
            _ => {}
        }

        let found = which::which(&self.program).is_ok();
        if !found && self.installed.is_none() {
            log::debug!("{} not found on PATH, vendor GPU probe idle", self.program);
        }
        self.installed = Some((found, now));
        found
    }

    /// Latest parsed output, refreshed at most once per TTL.
    pub fn sample(&mut self) -> Option<VendorGpuSample> {
        if !self.is_installed() {
            return None;
        }

        let (program, args, timeout) = (&self.program, &self.args, self.timeout);
        self.cache.get_or_fetch(|| -> crate::Result<VendorGpuSample> {
            let output = run_with_timeout(Command::new(program).args(args), timeout).map_err(|e| {
                log::trace!("{} failed: {}", program, e);
                e
            })?;
            first_line(&output)
                .and_then(parse_vendor_line)
                .ok_or_else(|| HostPulseError::malformed(format!("unparsable {} output", program)))
        })
    }

    /// True when at least one field parsed in the current cache window.
    pub fn has_data(&mut self) -> bool {
        self.sample().is_some()
    }
}

impl ThermalSource for DiscreteGpuProbe {
    fn name(&self) -> &'static str {
        "vendor-tool"
    }

    fn gpu_reading(&mut self, device: &DeviceContext<'_>) -> GpuReading {
        if !device.is_nvidia() {
            return GpuReading::default();
        }

        self.sample()
            .map(|sample| GpuReading {
                temperature: sample.temperature,
                load: sample.utilization,
            })
            .unwrap_or_default()
    }
}

/// Parse `"<utilization>, <temperature>"`. `None` when neither field is usable.
pub fn parse_vendor_line(line: &str) -> Option<VendorGpuSample> {
    let mut fields = line.split(',').map(|field| field.trim().parse::<f64>().ok());

    let utilization = fields.next().flatten().filter(|v| is_valid_load(*v));
    let temperature = fields
        .next()
        .flatten()
        .filter(|v| is_valid_temperature(*v));

    if utilization.is_none() && temperature.is_none() {
        return None;
    }

    Some(VendorGpuSample {
        utilization,
        temperature,
    })
}
