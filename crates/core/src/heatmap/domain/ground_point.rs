use crate::shared::detection::Detection;

/// Pixel where a detected person touches the ground: bottom-centre of the box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroundPoint {
    pub x: i32,
    pub y: i32,
}

impl GroundPoint {
    /// Returns the ground point of a PERSON detection, `None` for any other class.
    pub fn from_detection(detection: &Detection) -> Option<Self> {
        if !detection.is_person() {
            return None;
        }
        let b = detection.bounding_box;
        Some(Self {
            x: b.left.saturating_add(b.width / 2),
            y: b.top.saturating_add(b.height),
        })
    }

    pub fn extract_all(detections: &[Detection]) -> Vec<Self> {
        detections.iter().filter_map(Self::from_detection).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::detection::{PERSON_CLASS_ID, VEHICLE_CLASS_ID};
    use rstest::rstest;

    #[rstest]
    #[case::even_width(Detection::new(PERSON_CLASS_ID, 600, 580, 80, 200), GroundPoint { x: 640, y: 780 })]
    #[case::odd_width_truncates(Detection::new(PERSON_CLASS_ID, 10, 10, 5, 20), GroundPoint { x: 12, y: 30 })]
    #[case::negative_origin(Detection::new(PERSON_CLASS_ID, -20, -40, 10, 30), GroundPoint { x: -15, y: -10 })]
    fn test_ground_point_is_bottom_centre(#[case] detection: Detection, #[case] expected: GroundPoint) {
        assert_eq!(GroundPoint::from_detection(&detection), Some(expected));
    }

    #[rstest]
    #[case(VEHICLE_CLASS_ID)]
    #[case(2)]
    #[case(-1)]
    fn test_non_person_yields_nothing(#[case] class_id: i32) {
        let detection = Detection::new(class_id, 0, 0, 10, 10);
        assert_eq!(GroundPoint::from_detection(&detection), None);
    }

    #[test]
    fn test_extract_all_keeps_people_only() {
        let detections = vec![
            Detection::new(PERSON_CLASS_ID, 0, 0, 10, 10),
            Detection::new(VEHICLE_CLASS_ID, 50, 50, 10, 10),
            Detection::new(PERSON_CLASS_ID, 20, 0, 4, 8),
        ];
        let points = GroundPoint::extract_all(&detections);
        assert_eq!(points, vec![GroundPoint { x: 5, y: 10 }, GroundPoint { x: 22, y: 8 }]);
    }
}
