#[cfg(feature = "nvml")]
use nvml_wrapper::Nvml;
#[cfg(feature = "nvml")]
use once_cell::sync::Lazy;

use crate::platform::hardware::GraphicsDevice;

/// NVML may only be initialised once per process.
#[cfg(feature = "nvml")]
static NVML: Lazy<Option<Nvml>> = Lazy::new(|| match Nvml::init() {
    Ok(nvml) => Some(nvml),
    Err(e) => {
        log::debug!("NVML unavailable: {}", e);
        None
    }
});

/// NVIDIA devices as NVML reports them; empty when the driver is absent.
#[cfg(feature = "nvml")]
pub fn devices() -> Vec<GraphicsDevice> {
    let Some(nvml) = NVML.as_ref() else {
        return Vec::new();
    };

    let count = nvml.device_count().unwrap_or(0);
    (0..count)
        .filter_map(|index| {
            let device = nvml
                .device_by_index(index)
                .map_err(|e| log::debug!("NVML device {} skipped: {}", index, e))
                .ok()?;
            let name = device.name().ok()?;
            let memory = device.memory_info().ok();

            Some(GraphicsDevice {
                name,
                vram_total_bytes: memory.as_ref().map(|m| m.total).unwrap_or(0),
                vram_used_bytes: memory.map(|m| m.used),
            })
        })
        .collect()
}

#[cfg(not(feature = "nvml"))]
pub fn devices() -> Vec<GraphicsDevice> {
    Vec::new()
}
