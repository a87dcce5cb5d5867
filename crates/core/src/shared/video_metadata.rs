use std::path::PathBuf;

/// Stream properties reported by a [`VideoReader`](crate::video::domain::video_reader::VideoReader).
///
/// `width`/`height` are the delivered (scaled) frame size, not the source's.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}
