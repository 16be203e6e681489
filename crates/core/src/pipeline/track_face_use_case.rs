use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::tracking::domain::face_detector::FaceDetector;
use crate::tracking::domain::object_tracker::ObjectTracker;
use crate::tracking::domain::orchestrator::{
    FrameOutcome, OrchestratorConfig, TrackerState, TrackingOrchestrator,
};
use crate::video::domain::video_source::VideoSource;

/// Configuration for one tracking run.
pub struct RunConfig {
    pub orchestrator: OrchestratorConfig,
    /// Stop after this many frames even if the source has more.
    pub max_frames: Option<usize>,
    /// Called after each frame with `(frame_index, outcome)`; return
    /// `false` to stop the run.
    pub on_frame: Option<Box<dyn Fn(usize, &FrameOutcome) -> bool + Send>>,
    /// Cooperative cancellation, checked between frames.
    pub cancelled: Arc<AtomicBool>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig::default(),
            max_frames: None,
            on_frame: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_processed: usize,
    pub frames_tracked: usize,
    pub frames_lost: usize,
    pub final_state: TrackerState,
}

/// Drives the detect-then-track loop over a frame source.
///
/// One frame at a time, strictly synchronous: read, step the
/// orchestrator, report. A tracker initialization failure aborts the
/// run with an error; end of stream, cancellation, and the frame limit
/// end it cleanly.
pub struct TrackFaceUseCase {
    source: Box<dyn VideoSource>,
    orchestrator: TrackingOrchestrator,
    max_frames: Option<usize>,
    on_frame: Option<Box<dyn Fn(usize, &FrameOutcome) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl TrackFaceUseCase {
    pub fn new(
        source: Box<dyn VideoSource>,
        detector: Box<dyn FaceDetector>,
        tracker: Box<dyn ObjectTracker>,
        config: RunConfig,
    ) -> Self {
        let orchestrator = TrackingOrchestrator::new(detector, tracker, config.orchestrator);
        Self {
            source,
            orchestrator,
            max_frames: config.max_frames,
            on_frame: config.on_frame,
            cancelled: config.cancelled,
        }
    }

    pub fn execute(&mut self) -> Result<RunSummary, Box<dyn std::error::Error>> {
        let mut frames_tracked = 0;
        let mut frames_lost = 0;

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                info!("run cancelled after {} frames", self.orchestrator.frames_processed());
                break;
            }
            if self
                .max_frames
                .is_some_and(|limit| self.orchestrator.frames_processed() >= limit)
            {
                break;
            }
            let Some(frame) = self.source.next_frame()? else {
                info!(
                    "end of stream after {} frames",
                    self.orchestrator.frames_processed()
                );
                break;
            };

            let index = frame.index();
            let outcome = self.orchestrator.step(&frame)?;
            match outcome {
                FrameOutcome::Tracked(_) => frames_tracked += 1,
                FrameOutcome::Lost => frames_lost += 1,
                FrameOutcome::Searching { .. } => {}
            }

            if let Some(callback) = &self.on_frame {
                if !callback(index, &outcome) {
                    break;
                }
            }
        }

        Ok(RunSummary {
            frames_processed: self.orchestrator.frames_processed(),
            frames_tracked,
            frames_lost,
            final_state: self.orchestrator.state(),
        })
    }

    /// The orchestrator, for reading state and history after (or
    /// between) runs.
    pub fn orchestrator(&self) -> &TrackingOrchestrator {
        &self.orchestrator
    }
}
