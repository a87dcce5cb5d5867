use std::path::PathBuf;

use thiserror::Error;

use crate::shared::detection::Detection;

#[derive(Debug, Error)]
pub enum DetectionSourceError {
    #[error("failed to open detections {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read detections: {0}")]
    Read(#[source] std::io::Error),
    #[error("malformed detection record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplies the upstream detector's output for each decoded frame.
///
/// Frames are requested in increasing index order, one call per frame.
pub trait DetectionSource: Send {
    fn detections_for(&mut self, frame_index: usize)
        -> Result<Vec<Detection>, DetectionSourceError>;
}
