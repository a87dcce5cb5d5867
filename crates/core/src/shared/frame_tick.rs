use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Everything the engine receives for one processed frame.
///
/// `frame` is `None` when the pixel buffer could not be read for this tick;
/// detections may still be present since they travel as metadata.
#[derive(Clone, Debug)]
pub struct FrameTick {
    pub sequence: u64,
    pub detections: Vec<Detection>,
    pub frame: Option<Frame>,
}

impl FrameTick {
    pub fn new(sequence: u64, detections: Vec<Detection>, frame: Frame) -> Self {
        Self {
            sequence,
            detections,
            frame: Some(frame),
        }
    }

    pub fn without_frame(sequence: u64, detections: Vec<Detection>) -> Self {
        Self {
            sequence,
            detections,
            frame: None,
        }
    }
}
