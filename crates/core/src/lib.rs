pub mod pipeline;
pub mod selection;
pub mod shared;
pub mod tracking;
pub mod video;
