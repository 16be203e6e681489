use log::{debug, info, warn};
use thiserror::Error;

use crate::selection::face_selector::{select, SelectionError};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::DEFAULT_HISTORY_CAPACITY;
use crate::shared::frame::Frame;
use crate::shared::frame_size::FrameOrSize;
use crate::tracking::domain::face_detector::FaceDetector;
use crate::tracking::domain::object_tracker::ObjectTracker;
use crate::tracking::domain::track_history::{TrackHistory, TrackRecord};

/// Phase of the detect-then-track control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    /// No tracker bound; the detector runs every frame until it finds
    /// at least one candidate.
    Searching,
    /// A tracker is bound and updated every frame.
    Tracking,
    /// The most recent tracker update failed. Transient: the tracker
    /// is still consulted on the next frame.
    Lost,
}

/// What a single orchestrator step produced.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// Still searching; carries how many candidates the detector saw.
    Searching { candidates: usize },
    /// The region chosen at initialization or reported by the tracker.
    Tracked(BoundingBox),
    /// Tracker update failed for this frame.
    Lost,
}

impl FrameOutcome {
    pub fn region(&self) -> Option<BoundingBox> {
        match self {
            FrameOutcome::Tracked(region) => Some(*region),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackingError {
    /// The tracking subsystem rejected the selected region; the run
    /// cannot proceed.
    #[error("tracker failed to initialize on the selected region: {0}")]
    TrackerInitialization(Box<dyn std::error::Error>),
    #[error("face detector failed: {0}")]
    Detector(Box<dyn std::error::Error>),
}

#[derive(Clone, Copy, Debug)]
pub struct OrchestratorConfig {
    /// Abandon the tracker and return to detection after this many
    /// consecutive lost frames. `None` keeps calling `update` forever,
    /// treating `Lost` as advisory only.
    pub redetect_after: Option<usize>,
    pub history_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            redetect_after: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Per-frame state machine over `Searching` / `Tracking` / `Lost`.
///
/// Owns the detector, the tracker, and all mutable loop state; nothing
/// else reads or writes them. Each call to `step` performs exactly one
/// detector call or one tracker call, never both.
pub struct TrackingOrchestrator {
    detector: Box<dyn FaceDetector>,
    tracker: Box<dyn ObjectTracker>,
    config: OrchestratorConfig,
    state: TrackerState,
    consecutive_lost: usize,
    frame_count: usize,
    last_outcome: Option<FrameOutcome>,
    history: TrackHistory,
}

impl TrackingOrchestrator {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        tracker: Box<dyn ObjectTracker>,
        config: OrchestratorConfig,
    ) -> Self {
        let history = TrackHistory::new(config.history_capacity);
        Self {
            detector,
            tracker,
            config,
            state: TrackerState::Searching,
            consecutive_lost: 0,
            frame_count: 0,
            last_outcome: None,
            history,
        }
    }

    /// Consumes one frame and advances the state machine.
    ///
    /// Selection failures are absorbed here and never surface to the
    /// caller; only detector I/O errors and tracker initialization
    /// failures end the run.
    pub fn step(&mut self, frame: &Frame) -> Result<FrameOutcome, TrackingError> {
        let outcome = match self.state {
            TrackerState::Searching => self.search(frame)?,
            TrackerState::Tracking | TrackerState::Lost => self.track(frame),
        };

        self.history.push(TrackRecord {
            frame_index: frame.index(),
            region: outcome.region(),
        });
        self.frame_count += 1;
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    fn search(&mut self, frame: &Frame) -> Result<FrameOutcome, TrackingError> {
        let candidates = self
            .detector
            .detect(frame)
            .map_err(TrackingError::Detector)?;
        debug!(
            "frame {}: detector returned {} candidate(s)",
            frame.index(),
            candidates.len()
        );

        // An empty set is the normal miss; any other selection failure
        // is tolerated the same way and keeps the search going.
        let chosen = match select(&candidates, FrameOrSize::Frame(frame).dimensions()) {
            Ok(region) => region,
            Err(SelectionError::NoCandidates) => {
                return Ok(FrameOutcome::Searching {
                    candidates: candidates.len(),
                });
            }
        };

        self.tracker
            .initialize(frame, chosen)
            .map_err(TrackingError::TrackerInitialization)?;
        info!(
            "frame {}: tracker initialized at ({:.0}, {:.0}) size {:.0}x{:.0}",
            frame.index(),
            chosen.x,
            chosen.y,
            chosen.width,
            chosen.height
        );
        self.state = TrackerState::Tracking;
        self.consecutive_lost = 0;
        Ok(FrameOutcome::Tracked(chosen))
    }

    fn track(&mut self, frame: &Frame) -> FrameOutcome {
        match self.tracker.update(frame) {
            Some(region) => {
                if self.state == TrackerState::Lost {
                    info!("frame {}: track re-acquired", frame.index());
                }
                self.state = TrackerState::Tracking;
                self.consecutive_lost = 0;
                FrameOutcome::Tracked(region)
            }
            None => {
                self.consecutive_lost += 1;
                self.state = TrackerState::Lost;
                warn!(
                    "frame {}: tracking failure ({} consecutive)",
                    frame.index(),
                    self.consecutive_lost
                );
                if let Some(limit) = self.config.redetect_after {
                    if self.consecutive_lost >= limit {
                        info!(
                            "frame {}: {limit} consecutive losses, returning to detection",
                            frame.index()
                        );
                        self.state = TrackerState::Searching;
                        self.consecutive_lost = 0;
                    }
                }
                FrameOutcome::Lost
            }
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn last_outcome(&self) -> Option<&FrameOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn history(&self) -> &TrackHistory {
        &self.history
    }

    pub fn frames_processed(&self) -> usize {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 100 * 100 * 3], 100, 100, 3, index)
    }

    fn bbox(x: f64, y: f64) -> BoundingBox {
        BoundingBox::new(x, y, 20.0, 20.0)
    }

    /// Detector fed a script of per-call results; repeats the last
    /// entry once exhausted.
    struct ScriptedDetector {
        script: Vec<Vec<BoundingBox>>,
        calls: usize,
    }

    impl ScriptedDetector {
        fn new(script: Vec<Vec<BoundingBox>>) -> Self {
            Self { script, calls: 0 }
        }
    }

    impl FaceDetector for ScriptedDetector {
        fn detect(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
            let result = self
                .script
                .get(self.calls)
                .or_else(|| self.script.last())
                .cloned()
                .unwrap_or_default();
            self.calls += 1;
            Ok(result)
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
            Err("camera unplugged".into())
        }
    }

    /// Tracker scripted with per-update results; records every
    /// initialization region.
    struct ScriptedTracker {
        init_ok: bool,
        updates: Vec<Option<BoundingBox>>,
        update_calls: usize,
        init_regions: Arc<Mutex<Vec<BoundingBox>>>,
    }

    impl ScriptedTracker {
        fn new(updates: Vec<Option<BoundingBox>>) -> Self {
            Self {
                init_ok: true,
                updates,
                update_calls: 0,
                init_regions: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing_init() -> Self {
            Self {
                init_ok: false,
                ..Self::new(Vec::new())
            }
        }
    }

    impl ObjectTracker for ScriptedTracker {
        fn initialize(
            &mut self,
            _frame: &Frame,
            region: BoundingBox,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.init_regions.lock().unwrap().push(region);
            if self.init_ok {
                Ok(())
            } else {
                Err("tracker backend unavailable".into())
            }
        }

        fn update(&mut self, _frame: &Frame) -> Option<BoundingBox> {
            let result = self
                .updates
                .get(self.update_calls)
                .copied()
                .unwrap_or(None);
            self.update_calls += 1;
            result
        }
    }

    fn orchestrator(
        detector: ScriptedDetector,
        tracker: ScriptedTracker,
        config: OrchestratorConfig,
    ) -> TrackingOrchestrator {
        TrackingOrchestrator::new(Box::new(detector), Box::new(tracker), config)
    }

    #[test]
    fn test_starts_searching() {
        let o = orchestrator(
            ScriptedDetector::new(vec![]),
            ScriptedTracker::new(vec![]),
            OrchestratorConfig::default(),
        );
        assert_eq!(o.state(), TrackerState::Searching);
        assert!(o.last_outcome().is_none());
    }

    #[test]
    fn test_stays_searching_while_detector_empty_then_transitions() {
        // Three empty frames, then one hit.
        let script = vec![vec![], vec![], vec![], vec![bbox(40.0, 40.0)]];
        let mut o = orchestrator(
            ScriptedDetector::new(script),
            ScriptedTracker::new(vec![]),
            OrchestratorConfig::default(),
        );

        for i in 0..3 {
            let outcome = o.step(&frame(i)).unwrap();
            assert_eq!(outcome, FrameOutcome::Searching { candidates: 0 });
            assert_eq!(o.state(), TrackerState::Searching);
        }
        let outcome = o.step(&frame(3)).unwrap();
        assert_eq!(outcome, FrameOutcome::Tracked(bbox(40.0, 40.0)));
        assert_eq!(o.state(), TrackerState::Tracking);
    }

    #[test]
    fn test_centermost_candidate_is_handed_to_tracker() {
        // Frame center (50, 50): (45, 45) wins over (0, 0).
        let script = vec![vec![bbox(0.0, 0.0), bbox(45.0, 45.0)]];
        let tracker = ScriptedTracker::new(vec![]);
        let init_regions = tracker.init_regions.clone();
        let mut o = orchestrator(
            ScriptedDetector::new(script),
            tracker,
            OrchestratorConfig::default(),
        );

        o.step(&frame(0)).unwrap();
        assert_eq!(init_regions.lock().unwrap().as_slice(), &[bbox(45.0, 45.0)]);
    }

    #[test]
    fn test_tracker_init_failure_is_fatal() {
        let script = vec![vec![bbox(40.0, 40.0)]];
        let mut o = orchestrator(
            ScriptedDetector::new(script),
            ScriptedTracker::failing_init(),
            OrchestratorConfig::default(),
        );

        let err = o.step(&frame(0)).unwrap_err();
        assert!(matches!(err, TrackingError::TrackerInitialization(_)));
    }

    #[test]
    fn test_detector_error_propagates() {
        let mut o = TrackingOrchestrator::new(
            Box::new(FailingDetector),
            Box::new(ScriptedTracker::new(vec![])),
            OrchestratorConfig::default(),
        );
        let err = o.step(&frame(0)).unwrap_err();
        assert!(matches!(err, TrackingError::Detector(_)));
    }

    #[test]
    fn test_update_failure_is_lost_for_that_frame_only() {
        let script = vec![vec![bbox(40.0, 40.0)]];
        let updates = vec![Some(bbox(41.0, 40.0)), None, Some(bbox(42.0, 40.0))];
        let mut o = orchestrator(
            ScriptedDetector::new(script),
            ScriptedTracker::new(updates),
            OrchestratorConfig::default(),
        );

        o.step(&frame(0)).unwrap(); // init
        assert_eq!(
            o.step(&frame(1)).unwrap(),
            FrameOutcome::Tracked(bbox(41.0, 40.0))
        );

        assert_eq!(o.step(&frame(2)).unwrap(), FrameOutcome::Lost);
        assert_eq!(o.state(), TrackerState::Lost);

        // Next frame still consults the tracker and recovers.
        assert_eq!(
            o.step(&frame(3)).unwrap(),
            FrameOutcome::Tracked(bbox(42.0, 40.0))
        );
        assert_eq!(o.state(), TrackerState::Tracking);
    }

    #[test]
    fn test_default_policy_never_returns_to_searching() {
        let script = vec![vec![bbox(40.0, 40.0)]];
        let updates = vec![None; 10];
        let mut o = orchestrator(
            ScriptedDetector::new(script),
            ScriptedTracker::new(updates),
            OrchestratorConfig::default(),
        );

        o.step(&frame(0)).unwrap();
        for i in 1..=10 {
            assert_eq!(o.step(&frame(i)).unwrap(), FrameOutcome::Lost);
            assert_eq!(o.state(), TrackerState::Lost);
        }
    }

    #[test]
    fn test_redetect_after_threshold_returns_to_searching() {
        // Init on frame 0, then two losses trip the threshold; the
        // detector is consulted again and re-binds the tracker.
        let script = vec![
            vec![bbox(40.0, 40.0)],
            vec![bbox(30.0, 30.0)], // second search hit
        ];
        let tracker = ScriptedTracker::new(vec![None, None]);
        let init_regions = tracker.init_regions.clone();
        let mut o = orchestrator(
            ScriptedDetector::new(script),
            tracker,
            OrchestratorConfig {
                redetect_after: Some(2),
                ..OrchestratorConfig::default()
            },
        );

        o.step(&frame(0)).unwrap();
        assert_eq!(o.step(&frame(1)).unwrap(), FrameOutcome::Lost);
        assert_eq!(o.state(), TrackerState::Lost);
        assert_eq!(o.step(&frame(2)).unwrap(), FrameOutcome::Lost);
        assert_eq!(o.state(), TrackerState::Searching);

        let outcome = o.step(&frame(3)).unwrap();
        assert_eq!(outcome, FrameOutcome::Tracked(bbox(30.0, 30.0)));
        assert_eq!(o.state(), TrackerState::Tracking);
        assert_eq!(
            init_regions.lock().unwrap().as_slice(),
            &[bbox(40.0, 40.0), bbox(30.0, 30.0)]
        );
    }

    #[test]
    fn test_history_records_every_frame() {
        let script = vec![vec![], vec![bbox(40.0, 40.0)]];
        let updates = vec![Some(bbox(41.0, 40.0)), None];
        let mut o = orchestrator(
            ScriptedDetector::new(script),
            ScriptedTracker::new(updates),
            OrchestratorConfig::default(),
        );

        for i in 0..4 {
            o.step(&frame(i)).unwrap();
        }

        let regions: Vec<Option<BoundingBox>> =
            o.history().iter().map(|r| r.region).collect();
        assert_eq!(
            regions,
            vec![
                None,                     // searching miss
                Some(bbox(40.0, 40.0)),   // initialized
                Some(bbox(41.0, 40.0)),   // tracked
                None,                     // lost
            ]
        );
        assert_eq!(o.frames_processed(), 4);
    }

    #[test]
    fn test_last_outcome_tracks_most_recent_step() {
        let script = vec![vec![bbox(40.0, 40.0)]];
        let mut o = orchestrator(
            ScriptedDetector::new(script),
            ScriptedTracker::new(vec![None]),
            OrchestratorConfig::default(),
        );

        o.step(&frame(0)).unwrap();
        assert_eq!(
            o.last_outcome(),
            Some(&FrameOutcome::Tracked(bbox(40.0, 40.0)))
        );
        o.step(&frame(1)).unwrap();
        assert_eq!(o.last_outcome(), Some(&FrameOutcome::Lost));
    }
}
