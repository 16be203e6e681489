use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for single-object tracking.
///
/// `initialize` binds the tracker to a region on the given frame and
/// may be called again to re-bind after the track is abandoned. An
/// initialization error means the tracking subsystem itself is broken
/// and the run cannot continue.
///
/// `update` advances the estimate by one frame; `None` signals a
/// tracking failure for that frame only, not a permanent loss.
pub trait ObjectTracker: Send {
    fn initialize(
        &mut self,
        frame: &Frame,
        region: BoundingBox,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn update(&mut self, frame: &Frame) -> Option<BoundingBox>;
}
