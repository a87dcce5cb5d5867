use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::heatmap::domain::colormap::Colormap;
use crate::shared::constants::{
    DEFAULT_BLEND_ALPHA, DEFAULT_DECAY_CONSTANT, DEFAULT_EMIT_QUEUE_CAPACITY, DEFAULT_GRID_HEIGHT,
    DEFAULT_GRID_WIDTH, DEFAULT_OUTPUT_PATH, DEFAULT_RENDER_INTERVAL, DEFAULT_STAMP_INCREMENT,
    DEFAULT_STAMP_RADIUS, IMAGE_EXTENSIONS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    InvalidGridDimensions { width: u32, height: u32 },
    #[error("blend alpha must be between 0.0 and 1.0, got {0}")]
    InvalidBlendAlpha(f32),
    #[error("render interval must be at least 1")]
    InvalidRenderInterval,
    #[error("emit queue capacity must be at least 1")]
    InvalidQueueCapacity,
    #[error("unsupported output image format: {0}")]
    UnsupportedOutputFormat(PathBuf),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tunables for one heatmap stream.
///
/// Negative decay, radius or increment cannot be expressed: the fields are
/// unsigned and a negative JSON value fails to parse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct HeatmapConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    pub decay_constant: u16,
    pub stamp_radius: u32,
    pub stamp_increment: u16,
    pub blend_alpha: f32,
    #[serde(rename = "renderIntervalK")]
    pub render_interval: u64,
    pub colormap: Colormap,
    pub output_path: PathBuf,
    pub emit_queue_capacity: usize,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            decay_constant: DEFAULT_DECAY_CONSTANT,
            stamp_radius: DEFAULT_STAMP_RADIUS,
            stamp_increment: DEFAULT_STAMP_INCREMENT,
            blend_alpha: DEFAULT_BLEND_ALPHA,
            render_interval: DEFAULT_RENDER_INTERVAL,
            colormap: Colormap::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            emit_queue_capacity: DEFAULT_EMIT_QUEUE_CAPACITY,
        }
    }
}

impl HeatmapConfig {
    /// Reads a JSON config file. Missing keys fall back to defaults; the
    /// result is validated before it is returned.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::InvalidGridDimensions {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if !(0.0..=1.0).contains(&self.blend_alpha) {
            return Err(ConfigError::InvalidBlendAlpha(self.blend_alpha));
        }
        if self.render_interval < 1 {
            return Err(ConfigError::InvalidRenderInterval);
        }
        if self.emit_queue_capacity < 1 {
            return Err(ConfigError::InvalidQueueCapacity);
        }
        if !has_image_extension(&self.output_path) {
            return Err(ConfigError::UnsupportedOutputFormat(
                self.output_path.clone(),
            ));
        }
        Ok(())
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
