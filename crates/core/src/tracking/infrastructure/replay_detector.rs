use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::tracking::domain::face_detector::FaceDetector;

/// One frame's detections in the sidecar file: `{"frame": 0, "boxes":
/// [[x, y, width, height], ...]}`.
#[derive(Debug, Deserialize)]
struct FrameDetections {
    frame: usize,
    boxes: Vec<[f64; 4]>,
}

/// `FaceDetector` fed from precomputed per-frame detections.
///
/// Lets the control loop run against the output of any external
/// detector (exported as a JSON sidecar) without linking its runtime.
/// Frames absent from the sidecar read as "no faces", matching the
/// detector contract that a miss is not an error.
pub struct ReplayDetector {
    by_frame: HashMap<usize, Vec<BoundingBox>>,
}

impl ReplayDetector {
    pub fn new(detections: Vec<(usize, Vec<BoundingBox>)>) -> Self {
        Self {
            by_frame: detections.into_iter().collect(),
        }
    }

    pub fn from_json_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)?;
        let parsed: Vec<FrameDetections> = serde_json::from_str(&text)?;
        let by_frame = parsed
            .into_iter()
            .map(|entry| {
                let boxes = entry
                    .boxes
                    .into_iter()
                    .map(|[x, y, w, h]| BoundingBox::new(x, y, w, h))
                    .collect();
                (entry.frame, boxes)
            })
            .collect();
        Ok(Self { by_frame })
    }
}

impl FaceDetector for ReplayDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        Ok(self
            .by_frame
            .get(&frame.index())
            .cloned()
            .unwrap_or_default())
    }
}
