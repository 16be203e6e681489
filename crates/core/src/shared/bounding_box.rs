/// A rectangular region reported by a detector or tracker.
///
/// A new box is produced for each frame; boxes are never mutated in
/// place. The selector reads the four fields as-is and performs no
/// validation, so degenerate widths/heights pass through unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Geometric center: `(x + width/2, y + height/2)`.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}
