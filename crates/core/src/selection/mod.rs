pub mod face_selector;
