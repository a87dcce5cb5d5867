use crate::heatmap::domain::emit_error::EmitError;
use crate::shared::frame::Frame;

/// Blends a colorized heatmap over the live frame:
/// `out = alpha * frame + (1 - alpha) * heatmap`, rounded and saturated.
pub struct Compositor {
    alpha: f32,
}

impl Compositor {
    /// `alpha` is expected in `[0, 1]`; values outside are clamped.
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Returns the composite carrying the source frame's index. RGBA
    /// frames are read in place with their alpha ignored; the only
    /// allocation is the fallibly reserved output buffer.
    pub fn composite(&self, frame: &Frame, heatmap: &Frame) -> Result<Frame, EmitError> {
        let stride = match frame.channels() {
            3 | 4 => usize::from(frame.channels()),
            other => {
                return Err(EmitError::Conversion(format!(
                    "unsupported frame layout with {other} channels"
                )))
            }
        };
        if heatmap.channels() != 3 {
            return Err(EmitError::Conversion(format!(
                "heatmap must be RGB, got {} channels",
                heatmap.channels()
            )));
        }
        if frame.dimensions() != heatmap.dimensions() {
            return Err(EmitError::Conversion(format!(
                "frame is {}x{} but heatmap is {}x{}",
                frame.width(),
                frame.height(),
                heatmap.width(),
                heatmap.height()
            )));
        }

        let bytes = heatmap.data().len();
        let mut out: Vec<u8> = Vec::new();
        out.try_reserve_exact(bytes)
            .map_err(|source| EmitError::ScratchAllocation { bytes, source })?;

        let beta = 1.0 - self.alpha;
        for (f, h) in frame
            .data()
            .chunks_exact(stride)
            .zip(heatmap.data().chunks_exact(3))
        {
            out.extend((0..3).map(|c| blend(f[c], h[c], self.alpha, beta)));
        }

        Ok(Frame::new(
            out,
            frame.width(),
            frame.height(),
            3,
            frame.index(),
        ))
    }
}

fn blend(frame: u8, heatmap: u8, alpha: f32, beta: f32) -> u8 {
    (alpha * f32::from(frame) + beta * f32::from(heatmap))
        .round()
        .clamp(0.0, 255.0) as u8
}
