use std::path::{Path, PathBuf};

use crate::heatmap::domain::colorizer::Colorizer;
use crate::heatmap::domain::compositor::Compositor;
use crate::heatmap::domain::emit_error::EmitError;
use crate::heatmap::domain::heatmap_engine::EmitRequest;
use crate::shared::heatmap_config::HeatmapConfig;
use crate::video::domain::image_writer::ImageWriter;

/// Turns an [`EmitRequest`] into the overlay artifact on disk:
/// colorize → composite → write.
pub struct HeatmapRenderer {
    colorizer: Colorizer,
    compositor: Compositor,
    writer: Box<dyn ImageWriter>,
    output_path: PathBuf,
}

impl HeatmapRenderer {
    pub fn new(
        colorizer: Colorizer,
        compositor: Compositor,
        writer: Box<dyn ImageWriter>,
        output_path: PathBuf,
    ) -> Self {
        Self {
            colorizer,
            compositor,
            writer,
            output_path,
        }
    }

    pub fn from_config(config: &HeatmapConfig, writer: Box<dyn ImageWriter>) -> Self {
        Self::new(
            Colorizer::new(config.colormap),
            Compositor::new(config.blend_alpha),
            writer,
            config.output_path.clone(),
        )
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn render(&self, request: &EmitRequest) -> Result<(), EmitError> {
        let heatmap = self.colorizer.colorize(&request.grid)?;
        let overlay = self.compositor.composite(&request.frame, &heatmap)?;
        self.writer
            .write(&self.output_path, &overlay)
            .map_err(|e| EmitError::Write(e.to_string()))?;
        log::info!(
            "Tick {}: heatmap written to {}",
            request.sequence,
            self.output_path.display()
        );
        Ok(())
    }
}
