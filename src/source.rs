// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Capture devices backed by files.
//!
//! Live camera capture is outside this crate; these sources let the detection loop
//! run over still images, directories of frames, or a blank canvas of fixed size.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::detect::CaptureDevice;
use crate::error::{Result, TrackerError};

/// Represents different frame sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// List of image paths.
    ImageList(Vec<PathBuf>),
    /// Directory containing images, read in sorted order.
    Directory(PathBuf),
    /// Glob pattern for images, e.g. `frames/*.png`.
    Glob(String),
}

impl Source {
    /// Resolve the source into an ordered list of image paths.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read.
    pub fn image_paths(&self) -> Result<Vec<PathBuf>> {
        match self {
            Self::Image(path) => Ok(vec![path.clone()]),
            Self::ImageList(paths) => Ok(paths.clone()),
            Self::Directory(dir) => collect_images_from_dir(dir),
            Self::Glob(pattern) => collect_images_from_glob(pattern),
        }
    }
}

/// Convert from a string path to Source.
impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if s.contains('*') {
            return Self::Glob(s.to_string());
        }
        let path = PathBuf::from(s);
        if path.is_dir() {
            return Self::Directory(path);
        }
        Self::Image(path)
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

/// Collect image paths from a directory.
fn collect_images_from_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TrackerError::IoError(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_image_file(path))
        .collect();

    paths.sort();
    Ok(paths)
}

/// Collect image paths from a simple `dir/*.ext` glob pattern.
fn collect_images_from_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(star_pos) = pattern.find('*') else {
        return Ok(vec![PathBuf::from(pattern)]);
    };

    let dir_part = &pattern[..star_pos];
    let dir = if dir_part.is_empty() {
        Path::new(".")
    } else {
        Path::new(dir_part.trim_end_matches('/').trim_end_matches('\\'))
    };

    // "*.jpg" -> "jpg"
    let ext_filter: Option<String> = pattern[star_pos..]
        .strip_prefix("*.")
        .map(str::to_lowercase);

    let mut paths: Vec<PathBuf> = collect_images_from_dir(dir)?
        .into_iter()
        .filter(|path| {
            ext_filter.as_ref().is_none_or(|ext| {
                path.extension()
                    .is_some_and(|e| e.to_string_lossy().to_lowercase() == *ext)
            })
        })
        .collect();

    paths.sort();
    Ok(paths)
}

/// Check if a path is an image file based on extension.
fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "bmp")
    })
}

/// Plays image files back as a capture device, one file per frame.
#[derive(Debug)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    next: usize,
    dims: (u32, u32),
}

impl ImageSequence {
    /// Open a source. Frame dimensions are taken from the first image.
    ///
    /// # Errors
    ///
    /// Returns an error if the source contains no images or the first one cannot be read.
    pub fn open(source: &Source) -> Result<Self> {
        let paths = source.image_paths()?;
        let first = paths
            .first()
            .ok_or_else(|| TrackerError::IoError(format!("No images found in {source:?}")))?;
        let dims = image::image_dimensions(first)?;
        Ok(Self {
            paths,
            next: 0,
            dims,
        })
    }

    /// Number of frames in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if the sequence holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl CaptureDevice for ImageSequence {
    fn is_ready(&self) -> bool {
        self.next < self.paths.len()
    }

    fn dimensions(&self) -> (u32, u32) {
        self.dims
    }

    fn frame(&mut self) -> Option<RgbImage> {
        let path = self.paths.get(self.next)?;
        self.next += 1;
        match image::open(path) {
            Ok(img) => {
                let img = img.to_rgb8();
                self.dims = img.dimensions();
                Some(img)
            }
            Err(e) => {
                crate::warn!("Skipping unreadable frame {}: {e}", path.display());
                None
            }
        }
    }

    fn is_open(&self) -> bool {
        self.is_ready()
    }
}

/// Produces plain frames of a fixed size, for running without video.
#[derive(Debug, Clone)]
pub struct BlankCanvas {
    width: u32,
    height: u32,
    remaining: Option<usize>,
}

impl BlankCanvas {
    /// A canvas producing frames forever.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            remaining: None,
        }
    }

    /// Stop after `frames` frames.
    #[must_use]
    pub const fn with_frame_limit(mut self, frames: usize) -> Self {
        self.remaining = Some(frames);
        self
    }
}

impl CaptureDevice for BlankCanvas {
    fn is_ready(&self) -> bool {
        self.remaining != Some(0)
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame(&mut self) -> Option<RgbImage> {
        match &mut self.remaining {
            Some(0) => return None,
            Some(n) => *n -= 1,
            None => {}
        }
        Some(RgbImage::from_pixel(self.width, self.height, Rgb([39, 39, 42])))
    }

    fn is_open(&self) -> bool {
        self.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_str() {
        assert_eq!(
            Source::from("frames/*.png"),
            Source::Glob("frames/*.png".to_string())
        );
        assert_eq!(
            Source::from("does-not-exist.jpg"),
            Source::Image(PathBuf::from("does-not-exist.jpg"))
        );
    }

    #[test]
    fn test_image_sequence_reads_sorted_frames() {
        let dir = tempfile::tempdir().unwrap();
        for (name, width) in [("b.png", 8), ("a.png", 4), ("notes.txt", 0)] {
            let path = dir.path().join(name);
            if width > 0 {
                RgbImage::new(width, 3).save(&path).unwrap();
            } else {
                std::fs::write(&path, "not an image").unwrap();
            }
        }

        let mut seq = ImageSequence::open(&Source::from(dir.path().to_path_buf())).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.dimensions(), (4, 3));
        assert_eq!(seq.frame().unwrap().width(), 4);
        assert_eq!(seq.frame().unwrap().width(), 8);
        assert!(!seq.is_open());
        assert!(seq.frame().is_none());
    }

    #[test]
    fn test_glob_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::new(2, 2).save(dir.path().join("x.png")).unwrap();
        RgbImage::new(2, 2).save(dir.path().join("y.bmp")).unwrap();

        let pattern = format!("{}/*.png", dir.path().display());
        let paths = Source::from(pattern.as_str()).image_paths().unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("x.png"));
    }

    #[test]
    fn test_empty_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageSequence::open(&Source::Directory(dir.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_blank_canvas_limit() {
        let mut canvas = BlankCanvas::new(16, 9).with_frame_limit(2);
        assert!(canvas.is_ready());
        assert_eq!(canvas.frame().unwrap().dimensions(), (16, 9));
        assert!(canvas.frame().is_some());
        assert!(canvas.frame().is_none());
        assert!(!canvas.is_open());

        let mut endless = BlankCanvas::new(2, 2);
        for _ in 0..10 {
            assert!(endless.frame().is_some());
        }
        assert!(endless.is_open());
    }
}
