use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::video_source::VideoSource;

/// Reads a directory of image files as a frame stream.
///
/// Files are consumed in lexicographic filename order, so sequences
/// should use zero-padded numbering (`frame_0001.png`, ...). Non-image
/// files in the directory are ignored.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_image(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(format!("no image frames found in {}", dir.display()).into());
        }
        Ok(Self { paths, next: 0 })
    }

    pub fn frame_count(&self) -> usize {
        self.paths.len()
    }
}

impl VideoSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        let image = image::open(path)?.to_rgb8();
        let (width, height) = image.dimensions();
        let frame = Frame::new(image.into_raw(), width, height, 3, self.next);
        self.next += 1;
        Ok(Some(frame))
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}
