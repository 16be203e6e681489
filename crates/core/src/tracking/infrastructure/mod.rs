pub mod ncc_tracker;
pub mod replay_detector;
