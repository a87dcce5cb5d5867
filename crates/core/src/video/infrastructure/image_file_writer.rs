use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes RGB frames with the `image` crate, format chosen by extension.
///
/// The image is encoded to a sibling temp file and renamed over the target,
/// so a failed write never leaves a truncated artifact behind.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let rgb = frame
            .to_rgb()
            .ok_or_else(|| format!("Cannot encode frame with {} channels", frame.channels()))?;
        let (width, height) = rgb.dimensions();
        let img = image::RgbImage::from_raw(width, height, rgb.into_data())
            .ok_or("Failed to create image from frame data")?;

        let format = image::ImageFormat::from_path(path)?;
        let temp = temp_path_for(path);
        if let Err(e) = img.save_with_format(&temp, format) {
            let _ = std::fs::remove_file(&temp);
            return Err(e.into());
        }
        std::fs::rename(&temp, path)?;
        Ok(())
    }
}
