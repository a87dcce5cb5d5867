use crate::heatmap::domain::colormap::Colormap;
use crate::heatmap::domain::density_grid::DensityGrid;
use crate::heatmap::domain::emit_error::EmitError;
use crate::shared::frame::Frame;

/// Maps a density grid to an RGB image through a fixed palette.
///
/// Cells above 255 are clamped to the hottest colour. Output depends on the
/// grid contents only.
pub struct Colorizer {
    colormap: Colormap,
    lut: [[u8; 3]; 256],
}

impl Colorizer {
    pub fn new(colormap: Colormap) -> Self {
        Self {
            colormap,
            lut: colormap.lut(),
        }
    }

    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    pub fn colorize(&self, grid: &DensityGrid) -> Result<Frame, EmitError> {
        let bytes = (grid.width() as usize) * (grid.height() as usize) * 3;
        let mut data: Vec<u8> = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|source| EmitError::ScratchAllocation { bytes, source })?;

        for value in grid.values() {
            let level = value.min(255) as usize;
            data.extend_from_slice(&self.lut[level]);
        }

        Ok(Frame::new(data, grid.width(), grid.height(), 3, 0))
    }
}

impl Default for Colorizer {
    fn default() -> Self {
        Self::new(Colormap::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 3] {
        let offset = ((y * frame.width() + x) * 3) as usize;
        let d = frame.data();
        [d[offset], d[offset + 1], d[offset + 2]]
    }

    #[test]
    fn test_output_matches_grid_dimensions() {
        let grid = DensityGrid::zeros(7, 5);
        let image = Colorizer::default().colorize(&grid).unwrap();
        assert_eq!(image.dimensions(), (7, 5));
        assert_eq!(image.channels(), 3);
    }

    #[test]
    fn test_zero_grid_is_coldest_colour() {
        let grid = DensityGrid::zeros(4, 4);
        let image = Colorizer::new(Colormap::Jet).colorize(&grid).unwrap();
        let cold = Colormap::Jet.lut()[0];
        assert!(image.data().chunks(3).all(|px| px == cold));
    }

    #[test]
    fn test_values_above_255_clamp_to_hottest() {
        let mut grid = DensityGrid::zeros(3, 1);
        grid.set(0, 0, 255);
        grid.set(1, 0, 256);
        grid.set(2, 0, u16::MAX);
        let image = Colorizer::new(Colormap::Hot).colorize(&grid).unwrap();
        let hot = Colormap::Hot.lut()[255];
        assert_eq!(pixel(&image, 0, 0), hot);
        assert_eq!(pixel(&image, 1, 0), hot);
        assert_eq!(pixel(&image, 2, 0), hot);
    }

    #[test]
    fn test_cell_maps_to_same_pixel_position() {
        let mut grid = DensityGrid::zeros(5, 3);
        grid.set(3, 2, 200);
        let image = Colorizer::default().colorize(&grid).unwrap();
        assert_eq!(pixel(&image, 3, 2), Colormap::Jet.lut()[200]);
        assert_eq!(pixel(&image, 2, 2), Colormap::Jet.lut()[0]);
    }

    #[test]
    fn test_colorize_is_deterministic() {
        let mut grid = DensityGrid::zeros(16, 16);
        grid.stamp_disc(8, 8, 5, 40);
        grid.stamp_disc(3, 12, 2, 200);
        let colorizer = Colorizer::default();
        let first = colorizer.colorize(&grid).unwrap();
        let second = colorizer.colorize(&grid).unwrap();
        assert_eq!(first.data(), second.data());
    }
}
