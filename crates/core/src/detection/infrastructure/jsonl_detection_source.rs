use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

use crate::detection::domain::detection_source::{DetectionSource, DetectionSourceError};
use crate::shared::detection::Detection;

#[derive(Debug, Deserialize)]
struct FrameRecord {
    frame: usize,
    #[serde(default)]
    objects: Vec<Detection>,
}

/// Streams a JSON-lines detection log, one record per frame:
///
/// ```text
/// {"frame": 0, "objects": [{"classId": 0, "left": 10, "top": 20, "width": 30, "height": 60}]}
/// ```
///
/// Records must be sorted by frame. Frames without a record have no
/// detections; blank lines are ignored.
pub struct JsonlDetectionSource<R> {
    reader: R,
    line_number: usize,
    pending: Option<FrameRecord>,
    exhausted: bool,
}

impl JsonlDetectionSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, DetectionSourceError> {
        let file = File::open(path).map_err(|source| DetectionSourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonlDetectionSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            pending: None,
            exhausted: false,
        }
    }

    /// Reads the next non-blank record, or `None` at end of input.
    fn next_record(&mut self) -> Result<Option<FrameRecord>, DetectionSourceError> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(DetectionSourceError::Read)?;
            if read == 0 {
                self.exhausted = true;
                return Ok(None);
            }
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            return serde_json::from_str(&line)
                .map(Some)
                .map_err(|source| DetectionSourceError::Parse {
                    line: self.line_number,
                    source,
                });
        }
    }
}

impl<R: BufRead + Send> DetectionSource for JsonlDetectionSource<R> {
    fn detections_for(
        &mut self,
        frame_index: usize,
    ) -> Result<Vec<Detection>, DetectionSourceError> {
        loop {
            if let Some(record) = self.pending.take() {
                if record.frame == frame_index {
                    return Ok(record.objects);
                }
                if record.frame > frame_index {
                    self.pending = Some(record);
                    return Ok(Vec::new());
                }
                log::warn!(
                    "Dropping detections for frame {} (already past it)",
                    record.frame
                );
            } else if self.exhausted {
                return Ok(Vec::new());
            }
            self.pending = self.next_record()?;
        }
    }
}
