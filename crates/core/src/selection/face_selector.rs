use thiserror::Error;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame_size::FrameSize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("at least one candidate region must be provided")]
    NoCandidates,
}

/// Chooses the candidate whose center lies closest to the frame center.
///
/// The subject of interest is assumed to keep itself near the camera's
/// focal point, so plain Euclidean distance decides. Ties go to the
/// first candidate in input order; the input is never re-sorted, which
/// keeps selection deterministic for a given detector output.
pub fn select(candidates: &[BoundingBox], frame: FrameSize) -> Result<BoundingBox, SelectionError> {
    let (frame_cx, frame_cy) = frame.center();

    let mut nearest: Option<(f64, BoundingBox)> = None;
    for candidate in candidates {
        let (cx, cy) = candidate.center();
        let dist = ((cx - frame_cx).powi(2) + (cy - frame_cy).powi(2)).sqrt();
        match nearest {
            Some((best, _)) if dist >= best => {}
            _ => nearest = Some((dist, *candidate)),
        }
    }

    nearest
        .map(|(_, candidate)| candidate)
        .ok_or(SelectionError::NoCandidates)
}
