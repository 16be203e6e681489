/// Per-frame outcome records kept for diagnostics (~4 seconds at 30 fps).
pub const DEFAULT_HISTORY_CAPACITY: usize = 120;

/// Pixels the template tracker searches around the last known position.
pub const DEFAULT_SEARCH_MARGIN: usize = 24;

/// Minimum normalized correlation score for a tracker update to count
/// as a hit.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.55;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
