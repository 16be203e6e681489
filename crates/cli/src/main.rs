use std::path::PathBuf;
use std::process;

use clap::Parser;

use facetrack_core::pipeline::track_face_use_case::{RunConfig, TrackFaceUseCase};
use facetrack_core::shared::constants::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_MATCH_THRESHOLD, DEFAULT_SEARCH_MARGIN,
};
use facetrack_core::tracking::domain::orchestrator::{FrameOutcome, OrchestratorConfig};
use facetrack_core::tracking::infrastructure::ncc_tracker::{NccTracker, NccTrackerConfig};
use facetrack_core::tracking::infrastructure::replay_detector::ReplayDetector;
use facetrack_core::video::infrastructure::image_sequence_source::ImageSequenceSource;

/// Detect a face in a frame sequence and track it across frames.
#[derive(Parser)]
#[command(name = "facetrack")]
struct Cli {
    /// Directory of image frames, read in filename order.
    frames: PathBuf,

    /// JSON sidecar with per-frame detections:
    /// [{"frame": 0, "boxes": [[x, y, width, height], ...]}, ...]
    #[arg(long)]
    detections: PathBuf,

    /// Re-run detection after this many consecutive lost frames
    /// (default: keep polling the tracker forever).
    #[arg(long)]
    redetect_after: Option<usize>,

    /// Per-frame outcome records kept for diagnostics.
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history: usize,

    /// Tracker search window margin in pixels.
    #[arg(long, default_value_t = DEFAULT_SEARCH_MARGIN)]
    search_margin: usize,

    /// Minimum template match score (0.0-1.0) for a tracker update.
    #[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
    match_threshold: f32,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let source = ImageSequenceSource::open(&cli.frames)?;
    log::info!(
        "opened {} with {} frame(s)",
        cli.frames.display(),
        source.frame_count()
    );
    let detector = ReplayDetector::from_json_path(&cli.detections)?;
    let tracker = NccTracker::new(NccTrackerConfig {
        search_margin: cli.search_margin,
        match_threshold: cli.match_threshold,
    });

    let config = RunConfig {
        orchestrator: OrchestratorConfig {
            redetect_after: cli.redetect_after,
            history_capacity: cli.history,
        },
        max_frames: cli.max_frames,
        on_frame: Some(Box::new(print_outcome)),
        ..RunConfig::default()
    };

    let mut use_case = TrackFaceUseCase::new(
        Box::new(source),
        Box::new(detector),
        Box::new(tracker),
        config,
    );
    let summary = use_case.execute()?;

    println!(
        "{} frame(s) processed: {} tracked, {} lost, final state {:?}",
        summary.frames_processed, summary.frames_tracked, summary.frames_lost, summary.final_state
    );
    Ok(())
}

fn print_outcome(index: usize, outcome: &FrameOutcome) -> bool {
    match outcome {
        FrameOutcome::Searching { candidates } => {
            println!("frame {index}: searching ({candidates} candidate(s))");
        }
        FrameOutcome::Tracked(region) => {
            println!(
                "frame {index}: tracking at ({:.0}, {:.0}) size {:.0}x{:.0}",
                region.x, region.y, region.width, region.height
            );
        }
        FrameOutcome::Lost => {
            println!("frame {index}: tracking failure");
        }
    }
    true
}
