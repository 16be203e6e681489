pub mod face_detector;
pub mod object_tracker;
pub mod orchestrator;
pub mod track_history;
