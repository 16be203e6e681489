pub mod track_face_use_case;
