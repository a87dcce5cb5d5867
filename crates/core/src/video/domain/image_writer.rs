use std::path::Path;

use crate::shared::frame::Frame;

/// Persists a rendered frame, replacing whatever is at `path`.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
