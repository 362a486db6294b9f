//! macOS `.icns` composition from staged PNG icons
//!
//! The images directory holds files named by pixel size (`16.png`,
//! `512.png`, ...). Each ICNS slot is filled with the staged image of the
//! exact size when there is one, otherwise with a Lanczos3 downscale of the
//! largest staged image. Slots larger than the largest image stay empty.
//!
//! Container layout (all integers big-endian):
//! - `icns` magic, `u32` total file length
//! - per entry: 4-byte type code, `u32` entry length (including this
//!   8-byte header), PNG bytes

use async_trait::async_trait;
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::IconTranscoder;
use crate::error::{BuildError, Result};

/// ICNS type codes that carry PNG data, with their pixel size
pub const ICNS_SLOTS: [(&[u8; 4], u32); 11] = [
    (b"icp4", 16),
    (b"icp5", 32),
    (b"icp6", 64),
    (b"ic07", 128),
    (b"ic08", 256),
    (b"ic09", 512),
    (b"ic10", 1024),
    (b"ic11", 32),
    (b"ic12", 64),
    (b"ic13", 256),
    (b"ic14", 512),
];

struct StagedIcon {
    bytes: Vec<u8>,
    image: DynamicImage,
}

/// [`IconTranscoder`] producing a native `.icns` without external tools
#[derive(Debug, Clone, Copy, Default)]
pub struct IcnsTranscoder;

fn read_staged(images_dir: &Path) -> Result<BTreeMap<u32, StagedIcon>> {
    let entries = fs::read_dir(images_dir).map_err(|e| {
        BuildError::conversion(format!("Failed to read {}: {}", images_dir.display(), e))
            .with_source(e)
    })?;

    let mut staged = BTreeMap::new();
    for entry in entries {
        let path = entry
            .map_err(|e| BuildError::conversion(e.to_string()).with_source(e))?
            .path();
        let is_png = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        let named_by_size = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.parse::<u32>().is_ok())
            .unwrap_or(false);
        if !is_png || !named_by_size {
            continue;
        }

        let bytes = fs::read(&path).map_err(|e| {
            BuildError::conversion(format!("Failed to read {}: {}", path.display(), e))
                .with_source(e)
        })?;
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png).map_err(|e| {
            BuildError::conversion(format!("Failed to decode {}: {}", path.display(), e))
                .with_source(e)
        })?;
        if image.width() != image.height() {
            return Err(BuildError::conversion(format!(
                "Icon {} must be square, got {}x{}",
                path.display(),
                image.width(),
                image.height()
            )));
        }
        debug!(path = %path.display(), size = image.width(), "icns.staged");
        staged.insert(image.width(), StagedIcon { bytes, image });
    }
    Ok(staged)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| BuildError::conversion(format!("Failed to encode PNG: {}", e)).with_source(e))?;
    Ok(buffer)
}

/// Build the ICNS container from icons keyed by pixel size
fn compose(staged: &BTreeMap<u32, StagedIcon>) -> Result<Vec<u8>> {
    let (&largest_size, largest) = staged
        .iter()
        .next_back()
        .ok_or_else(|| BuildError::conversion("No PNG icons to convert"))?;

    let mut entries: Vec<(&[u8; 4], Vec<u8>)> = Vec::new();
    for (code, size) in ICNS_SLOTS {
        let data = match staged.get(&size) {
            Some(icon) => icon.bytes.clone(),
            None if size < largest_size => {
                encode_png(&largest.image.resize_exact(size, size, FilterType::Lanczos3))?
            }
            None => continue,
        };
        entries.push((code, data));
    }
    if entries.is_empty() {
        return Err(BuildError::conversion(format!(
            "Staged icons are too small for any ICNS slot (largest is {}px)",
            largest_size
        )));
    }

    let total: usize = 8 + entries.iter().map(|(_, data)| 8 + data.len()).sum::<usize>();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"icns");
    out.extend_from_slice(&(total as u32).to_be_bytes());
    for (code, data) in entries {
        out.extend_from_slice(code);
        out.extend_from_slice(&((data.len() + 8) as u32).to_be_bytes());
        out.extend_from_slice(&data);
    }
    Ok(out)
}

fn convert(images_dir: &Path, dest: &Path) -> Result<()> {
    let staged = read_staged(images_dir)?;
    if staged.is_empty() {
        return Err(BuildError::conversion(format!(
            "No PNG icons found in {}",
            images_dir.display()
        )));
    }
    let icns = compose(&staged)?;
    fs::write(dest, icns).map_err(|e| {
        BuildError::conversion(format!("Failed to write {}: {}", dest.display(), e)).with_source(e)
    })
}

#[async_trait]
impl IconTranscoder for IcnsTranscoder {
    async fn transcode(
        &self,
        images_dir: &Path,
        output_dir: &Path,
        artifact_name: &str,
    ) -> Result<PathBuf> {
        let dest = output_dir.join(format!("{}.icns", artifact_name));
        info!(dest = %dest.display(), "Creating the app icon...");

        let (source, target) = (images_dir.to_path_buf(), dest.clone());
        tokio::task::spawn_blocking(move || convert(&source, &target))
            .await
            .map_err(|e| BuildError::conversion(format!("Icon task failed: {}", e)).with_source(e))??;
        Ok(dest)
    }
}
