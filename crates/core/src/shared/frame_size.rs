use crate::shared::frame::Frame;

/// Pixel dimensions of a frame, used to locate its geometric center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Frame center with real-valued division; a 0×0 frame centers at
    /// the origin.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Tagged input for code that needs frame dimensions.
///
/// Callers decide at the call boundary whether they hold pixel data or
/// a precomputed size pair, so no runtime type inspection is needed.
#[derive(Clone, Copy, Debug)]
pub enum FrameOrSize<'a> {
    Frame(&'a Frame),
    Size(FrameSize),
}

impl FrameOrSize<'_> {
    pub fn dimensions(&self) -> FrameSize {
        match self {
            FrameOrSize::Frame(frame) => frame.size(),
            FrameOrSize::Size(size) => *size,
        }
    }
}
