use crate::shared::frame::Frame;

/// Blocking frame supplier for the control loop.
///
/// `Ok(None)` signals end of stream and terminates the run cleanly;
/// `Err` is a genuine read failure. Implementations handle decoding so
/// the loop only ever sees `Frame` values.
pub trait VideoSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;
}
