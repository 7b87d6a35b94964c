//! `/sys/class/drm` card enumeration.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::platform::hardware::GraphicsDevice;

const DRM_ROOT: &str = "/sys/class/drm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Amd,
    Intel,
    Nvidia,
    Other(u32),
}

impl Vendor {
    pub fn from_pci_id(id: u32) -> Self {
        match id {
            0x1002 => Vendor::Amd,
            0x8086 => Vendor::Intel,
            0x10de => Vendor::Nvidia,
            other => Vendor::Other(other),
        }
    }

    fn display_name(&self) -> String {
        match self {
            Vendor::Amd => "AMD Radeon Graphics".to_string(),
            Vendor::Intel => "Intel Graphics".to_string(),
            Vendor::Nvidia => "NVIDIA Graphics".to_string(),
            Vendor::Other(id) => format!("GPU {:04x}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrmCard {
    pub vendor: Vendor,
    pub name: String,
    pub vram_total_bytes: u64,
    pub vram_used_bytes: Option<u64>,
}

impl DrmCard {
    pub fn into_device(self) -> GraphicsDevice {
        GraphicsDevice {
            name: self.name,
            vram_total_bytes: self.vram_total_bytes,
            vram_used_bytes: self.vram_used_bytes,
        }
    }
}

pub fn cards() -> Result<Vec<DrmCard>> {
    cards_in(Path::new(DRM_ROOT))
}

/// Scan `root` for `cardN` entries; connector entries such as `card0-HDMI-A-1`
/// are skipped.
pub fn cards_in(root: &Path) -> Result<Vec<DrmCard>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<(u32, std::path::PathBuf)> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let index = name.strip_prefix("card")?.parse::<u32>().ok()?;
            Some((index, entry.path()))
        })
        .collect();
    entries.sort_by_key(|(index, _)| *index);

    Ok(entries
        .into_iter()
        .filter_map(|(_, path)| read_card(&path.join("device")))
        .collect())
}

fn read_card(device: &Path) -> Option<DrmCard> {
    let vendor = read_hex(&device.join("vendor")).map(Vendor::from_pci_id)?;

    let name = read_trimmed(&device.join("product_name"))
        .or_else(|| read_trimmed(&device.join("label")))
        .unwrap_or_else(|| vendor.display_name());

    Some(DrmCard {
        vendor,
        name,
        vram_total_bytes: read_u64(&device.join("mem_info_vram_total")).unwrap_or(0),
        vram_used_bytes: read_u64(&device.join("mem_info_vram_used")),
    })
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_u64(path: &Path) -> Option<u64> {
    read_trimmed(path)?.parse().ok()
}

fn read_hex(path: &Path) -> Option<u32> {
    let raw = read_trimmed(path)?;
    u32::from_str_radix(raw.trim_start_matches("0x"), 16).ok()
}
