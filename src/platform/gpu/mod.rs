//! Graphics device enumeration.
//!
//! NVIDIA cards come from NVML when the `nvml` feature is on. Everything else
//! comes from the OS: DRM sysfs on Linux, `Win32_VideoController` on Windows.

mod nvidia;

#[cfg(target_os = "linux")]
mod drm;
#[cfg(windows)]
mod wmi_controllers;

use crate::error::Result;
use crate::platform::hardware::GraphicsDevice;

/// Lists the machine's graphics devices in a stable order.
#[derive(Debug, Default)]
pub struct GpuEnumerator {
    _private: (),
}

impl GpuEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(target_os = "linux")]
    pub fn enumerate(&self) -> Result<Vec<GraphicsDevice>> {
        let mut devices = nvidia::devices();
        let nvml_present = !devices.is_empty();

        for card in drm::cards()? {
            if card.vendor == drm::Vendor::Nvidia && nvml_present {
                continue;
            }
            devices.push(card.into_device());
        }

        Ok(devices)
    }

    #[cfg(windows)]
    pub fn enumerate(&self) -> Result<Vec<GraphicsDevice>> {
        let controllers = wmi_controllers::video_controllers()?;
        Ok(merge_vendor_memory(controllers, &nvidia::devices()))
    }

    #[cfg(not(any(target_os = "linux", windows)))]
    pub fn enumerate(&self) -> Result<Vec<GraphicsDevice>> {
        Ok(nvidia::devices())
    }
}

/// Replace OS-reported VRAM with the vendor library's figures where the names
/// agree. `AdapterRAM` saturates at 4 GiB, NVML does not.
pub fn merge_vendor_memory(
    mut devices: Vec<GraphicsDevice>,
    vendor: &[GraphicsDevice],
) -> Vec<GraphicsDevice> {
    let mut used = vec![false; vendor.len()];

    for device in devices.iter_mut() {
        let name = device.name.to_lowercase();
        let matched = vendor.iter().enumerate().find(|(i, candidate)| {
            !used[*i] && {
                let candidate = candidate.name.to_lowercase();
                candidate.contains(&name) || name.contains(&candidate)
            }
        });

        if let Some((index, candidate)) = matched {
            used[index] = true;
            device.vram_total_bytes = candidate.vram_total_bytes;
            device.vram_used_bytes = candidate.vram_used_bytes;
        }
    }

    devices
}
