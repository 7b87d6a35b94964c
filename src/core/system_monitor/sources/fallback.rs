use std::process::Command;
use std::time::Duration;

use super::ThermalSource;
use crate::core::system_monitor::cache::ExternalSourceCache;
use crate::core::system_monitor::metrics::{is_valid_temperature, round_to};
use crate::error::HostPulseError;
use crate::platform::command::{first_line, run_with_timeout};

/// Reads the ACPI thermal zone (tenths of Kelvin) and prints degrees Celsius.
const THERMAL_ZONE_SCRIPT: &str = "try { $t = (Get-CimInstance -ClassName MSAcpi_ThermalZoneTemperature \
    -Namespace root/wmi -ErrorAction Stop | Select-Object -First 1).CurrentTemperature; \
    [math]::Round(($t/10.0)-273.15,1) } catch { '' }";

/// Last-resort CPU temperature from a slow platform command.
///
/// Works only where the firmware exposes an ACPI thermal zone, so absence is
/// the common outcome.
pub struct FallbackTemperatureResolver {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    cache: ExternalSourceCache<f64>,
}

impl FallbackTemperatureResolver {
    pub fn platform_default(ttl: Duration, timeout: Duration) -> Self {
        Self::with_command(
            "powershell",
            &["-NoProfile", "-NonInteractive", "-Command", THERMAL_ZONE_SCRIPT],
            ttl,
            timeout,
        )
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
        }
    }

    pub fn read(&self) -> Option<f64> {
        let (program, args, timeout) = (&self.program, &self.args, self.timeout);
        self.cache.get_or_fetch(|| -> crate::Result<f64> {
            let output = run_with_timeout(Command::new(program).args(args), timeout).map_err(|e| {
                log::trace!("CPU temperature fallback not available: {}", e);
                e
            })?;
            first_line(&output)
                .and_then(parse_fallback_line)
                .ok_or_else(|| HostPulseError::malformed("no usable thermal zone reading"))
        })
    }
}

impl ThermalSource for FallbackTemperatureResolver {
    fn name(&self) -> &'static str {
        "platform-fallback"
    }

    fn cpu_temperature(&mut self) -> Option<f64> {
        self.read()
    }
}

/// Degrees Celsius in (0, 150), rounded to 0.1. Accepts a decimal comma.
pub fn parse_fallback_line(line: &str) -> Option<f64> {
    line.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|celsius| is_valid_temperature(*celsius))
        .map(|celsius| round_to(celsius, 1))
}
