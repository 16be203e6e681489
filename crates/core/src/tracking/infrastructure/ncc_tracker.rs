use ndarray::{s, Array2, ArrayView2};

use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{DEFAULT_MATCH_THRESHOLD, DEFAULT_SEARCH_MARGIN};
use crate::shared::frame::Frame;
use crate::tracking::domain::object_tracker::ObjectTracker;

#[derive(Clone, Copy, Debug)]
pub struct NccTrackerConfig {
    /// How far (in pixels) to search around the last known position.
    pub search_margin: usize,
    /// Scores below this count as a tracking failure for the frame.
    pub match_threshold: f32,
}

impl Default for NccTrackerConfig {
    fn default() -> Self {
        Self {
            search_margin: DEFAULT_SEARCH_MARGIN,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

struct Template {
    pixels: Array2<f32>,
    x: usize,
    y: usize,
    /// Original box dimensions, reproduced in every reported region.
    box_width: f64,
    box_height: f64,
}

/// Template tracker using zero-mean normalized cross-correlation.
///
/// `initialize` crops the selected region from the frame as a grayscale
/// template; `update` slides it over a window around the last known
/// position and accepts the best-scoring offset. The template is not
/// refreshed between frames, so appearance changes eventually drop the
/// score below the threshold and the update reports a loss.
pub struct NccTracker {
    config: NccTrackerConfig,
    template: Option<Template>,
}

impl NccTracker {
    pub fn new(config: NccTrackerConfig) -> Self {
        Self {
            config,
            template: None,
        }
    }
}

impl Default for NccTracker {
    fn default() -> Self {
        Self::new(NccTrackerConfig::default())
    }
}

impl ObjectTracker for NccTracker {
    fn initialize(
        &mut self,
        frame: &Frame,
        region: BoundingBox,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let luma = to_luma(frame);
        let (frame_h, frame_w) = luma.dim();

        let x0 = (region.x.round().max(0.0) as usize).min(frame_w);
        let y0 = (region.y.round().max(0.0) as usize).min(frame_h);
        let x1 = ((region.x + region.width).round().max(0.0) as usize).min(frame_w);
        let y1 = ((region.y + region.height).round().max(0.0) as usize).min(frame_h);
        if x1 <= x0 || y1 <= y0 {
            return Err("selected region lies outside the frame".into());
        }

        let pixels = luma.slice(s![y0..y1, x0..x1]).to_owned();
        self.template = Some(Template {
            pixels,
            x: x0,
            y: y0,
            box_width: region.width,
            box_height: region.height,
        });
        Ok(())
    }

    fn update(&mut self, frame: &Frame) -> Option<BoundingBox> {
        let template = self.template.as_ref()?;
        let luma = to_luma(frame);
        let (frame_h, frame_w) = luma.dim();
        let (tpl_h, tpl_w) = template.pixels.dim();
        if tpl_h > frame_h || tpl_w > frame_w {
            return None;
        }

        let margin = self.config.search_margin;
        let x0 = template.x.saturating_sub(margin);
        let y0 = template.y.saturating_sub(margin);
        let x1 = (template.x + margin).min(frame_w - tpl_w);
        let y1 = (template.y + margin).min(frame_h - tpl_h);

        let mut best_score = f32::MIN;
        let mut best_pos = (template.x, template.y);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let window = luma.slice(s![y..y + tpl_h, x..x + tpl_w]);
                let score = ncc(template.pixels.view(), window);
                if score > best_score {
                    best_score = score;
                    best_pos = (x, y);
                }
            }
        }

        if best_score < self.config.match_threshold {
            return None;
        }

        let (box_width, box_height) = (template.box_width, template.box_height);
        if let Some(t) = self.template.as_mut() {
            t.x = best_pos.0;
            t.y = best_pos.1;
        }
        Some(BoundingBox::new(
            best_pos.0 as f64,
            best_pos.1 as f64,
            box_width,
            box_height,
        ))
    }
}

/// Rec. 601 luma; single-channel frames pass through unchanged.
fn to_luma(frame: &Frame) -> Array2<f32> {
    let view = frame.as_ndarray();
    let (h, w) = (frame.height() as usize, frame.width() as usize);
    let mut out = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            out[[y, x]] = if frame.channels() >= 3 {
                0.299 * view[[y, x, 0]] as f32
                    + 0.587 * view[[y, x, 1]] as f32
                    + 0.114 * view[[y, x, 2]] as f32
            } else {
                view[[y, x, 0]] as f32
            };
        }
    }
    out
}

/// Zero-mean normalized cross-correlation in [-1, 1]; 0 when either
/// patch has no variance.
fn ncc(a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>) -> f32 {
    let n = a.len() as f32;
    let mean_a = a.sum() / n;
    let mean_b = b.sum() / n;

    let mut cross = 0.0_f32;
    let mut var_a = 0.0_f32;
    let mut var_b = 0.0_f32;
    for (&pa, &pb) in a.iter().zip(b.iter()) {
        let da = pa - mean_a;
        let db = pb - mean_b;
        cross += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    cross / denom
}
