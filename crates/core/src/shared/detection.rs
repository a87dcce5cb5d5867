use serde::{Deserialize, Serialize};

/// Detector class id for people.
pub const PERSON_CLASS_ID: i32 = 0;
/// Detector class id for vehicles. Counted, never accumulated.
pub const VEHICLE_CLASS_ID: i32 = 1;

/// Axis-aligned box in output-resolution pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// One object reported by the upstream detector for a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub class_id: i32,
    #[serde(flatten)]
    pub bounding_box: BoundingBox,
}

impl Detection {
    pub fn new(class_id: i32, left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            class_id,
            bounding_box: BoundingBox {
                left,
                top,
                width,
                height,
            },
        }
    }

    pub fn is_person(&self) -> bool {
        self.class_id == PERSON_CLASS_ID
    }
}

/// Per-frame tally of people and vehicles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectCounts {
    pub persons: usize,
    pub vehicles: usize,
}

impl ObjectCounts {
    pub fn tally(detections: &[Detection]) -> Self {
        detections
            .iter()
            .fold(Self::default(), |mut counts, d| match d.class_id {
                PERSON_CLASS_ID => {
                    counts.persons += 1;
                    counts
                }
                VEHICLE_CLASS_ID => {
                    counts.vehicles += 1;
                    counts
                }
                _ => counts,
            })
    }
}

impl std::fmt::Display for ObjectCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Person = {} Vehicle = {}", self.persons, self.vehicles)
    }
}
