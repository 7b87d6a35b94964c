use serde::Deserialize;
use wmi::WMIConnection;

use crate::error::{HostPulseError, Result};
use crate::platform::hardware::GraphicsDevice;

#[derive(Deserialize, Debug)]
#[serde(rename = "Win32_VideoController")]
#[serde(rename_all = "PascalCase")]
struct VideoController {
    name: Option<String>,
    adapter_ram: Option<u32>,
}

pub fn video_controllers() -> Result<Vec<GraphicsDevice>> {
    let connection = WMIConnection::new()
        .map_err(|e| HostPulseError::metric_collection(format!("Failed to connect to WMI: {}", e)))?;

    let controllers: Vec<VideoController> = connection
        .query()
        .map_err(|e| HostPulseError::gpu_not_available(format!("Win32_VideoController query failed: {}", e)))?;

    Ok(controllers
        .into_iter()
        .filter_map(|controller| {
            let name = controller.name?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(GraphicsDevice {
                name,
                vram_total_bytes: controller.adapter_ram.map(u64::from).unwrap_or(0),
                vram_used_bytes: None,
            })
        })
        .collect())
}
