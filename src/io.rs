// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! I/O utilities for recordings, screenshots and saved frames.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage, codecs::jpeg::JpegEncoder};

use crate::error::{Result, TrackerError};

/// Destination for a finished recording.
pub trait RecordingSink {
    /// Store one finished recording.
    ///
    /// # Errors
    ///
    /// Returns an error if the recording cannot be stored.
    fn persist(&mut self, blob: &[u8]) -> Result<()>;
}

/// Accumulates encoded frames of one recording.
///
/// Each pushed frame becomes one JPEG chunk; [`Recorder::finish`] concatenates the
/// chunks into a Motion-JPEG stream and hands it to a [`RecordingSink`].
#[derive(Debug, Default)]
pub struct Recorder {
    chunks: Vec<Vec<u8>>,
}

impl Recorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a composited frame and append it as a chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if JPEG encoding fails.
    pub fn push_frame(&mut self, frame: &RgbImage, quality: u8) -> Result<()> {
        let mut chunk = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut chunk, quality);
        frame
            .write_with_encoder(encoder)
            .map_err(|e| TrackerError::RecordingError(format!("Failed to encode frame: {e}")))?;
        self.chunks.push(chunk);
        Ok(())
    }

    /// Number of buffered chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if no frames were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Hand the recording to `sink` and reset the buffer.
    ///
    /// Returns the number of frames written, or `None` if nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails; the buffer is reset either way.
    pub fn finish(&mut self, sink: &mut dyn RecordingSink) -> Result<Option<usize>> {
        if self.chunks.is_empty() {
            return Ok(None);
        }
        let chunks = std::mem::take(&mut self.chunks);
        let frames = chunks.len();
        sink.persist(&chunks.concat())?;
        Ok(Some(frames))
    }
}

/// Writes recordings as numbered `.mjpeg` files into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Create a sink writing into `dir`, created on first use.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl RecordingSink for FileSink {
    fn persist(&mut self, blob: &[u8]) -> Result<()> {
        ensure_dir(&self.dir)?;
        let path = next_numbered_path(&self.dir, "recording", "mjpeg");
        std::fs::write(&path, blob).map_err(|e| {
            TrackerError::RecordingError(format!("Failed to write {}: {e}", path.display()))
        })?;
        self.written.push(path);
        Ok(())
    }
}

/// Save a composited frame as a PNG screenshot in `dir`.
///
/// Returns the written path, or `None` if no frame is available yet.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the image cannot be written.
pub fn save_screenshot(dir: &Path, frame: Option<&RgbImage>) -> Result<Option<PathBuf>> {
    let Some(frame) = frame else {
        return Ok(None);
    };
    ensure_dir(dir)?;
    let path = next_numbered_path(dir, "screenshot", "png");
    frame.save_with_format(&path, ImageFormat::Png)?;
    Ok(Some(path))
}

/// Saves every composited frame of a run as numbered JPEG files.
#[derive(Debug, Clone)]
pub struct SaveResults {
    save_dir: PathBuf,
    quality: u8,
}

impl SaveResults {
    /// Create a new `SaveResults`.
    ///
    /// # Arguments
    ///
    /// * `save_dir` - Directory to save frames.
    /// * `quality` - JPEG quality, 1-100.
    #[must_use]
    pub const fn new(save_dir: PathBuf, quality: u8) -> Self {
        Self { save_dir, quality }
    }

    /// Directory frames are written to.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Save one composited frame.
    ///
    /// # Errors
    ///
    /// Returns an error if saving the image fails.
    pub fn save(&self, frame_idx: usize, frame: &RgbImage) -> Result<PathBuf> {
        ensure_dir(&self.save_dir)?;
        let path = self.save_dir.join(format!("frame_{frame_idx:05}.jpg"));
        let mut bytes = Vec::new();
        frame.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, self.quality))?;
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Find the next available run directory (`track`, `track2`, `track3`, ...).
#[must_use]
pub fn find_next_run_dir(base: &Path, prefix: &str) -> PathBuf {
    let first = base.join(prefix);
    if !first.exists() {
        return first;
    }

    (2..)
        .map(|i| base.join(format!("{prefix}{i}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

fn next_numbered_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    (1..)
        .map(|i| dir.join(format!("{stem}_{i:03}.{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| dir.join(format!("{stem}.{ext}")))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| {
            TrackerError::IoError(format!("Failed to create directory {}: {e}", dir.display()))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemorySink {
        blobs: Vec<Vec<u8>>,
    }

    impl RecordingSink for MemorySink {
        fn persist(&mut self, blob: &[u8]) -> Result<()> {
            self.blobs.push(blob.to_vec());
            Ok(())
        }
    }

    struct FailingSink;

    impl RecordingSink for FailingSink {
        fn persist(&mut self, _blob: &[u8]) -> Result<()> {
            Err(TrackerError::RecordingError("disk full".to_string()))
        }
    }

    fn frame(shade: u8) -> RgbImage {
        RgbImage::from_pixel(8, 8, image::Rgb([shade, shade, shade]))
    }

    #[test]
    fn test_finish_concatenates_chunks() {
        let mut recorder = Recorder::new();
        recorder.push_frame(&frame(10), 85).unwrap();
        recorder.push_frame(&frame(200), 85).unwrap();
        let expected: Vec<u8> = recorder.chunks.concat();

        let mut sink = MemorySink::default();
        assert_eq!(recorder.finish(&mut sink).unwrap(), Some(2));
        assert_eq!(sink.blobs, vec![expected]);
        assert!(recorder.is_empty());

        // every chunk is a standalone JPEG
        let blob = &sink.blobs[0];
        assert_eq!(&blob[..2], &[0xFF, 0xD8]);
        assert_eq!(&blob[blob.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_finish_empty_recording_is_skipped() {
        let mut sink = MemorySink::default();
        assert_eq!(Recorder::new().finish(&mut sink).unwrap(), None);
        assert!(sink.blobs.is_empty());
    }

    #[test]
    fn test_failed_sink_still_resets() {
        let mut recorder = Recorder::new();
        recorder.push_frame(&frame(1), 50).unwrap();
        assert!(recorder.finish(&mut FailingSink).is_err());
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_file_sink_numbers_recordings() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("rec"));
        sink.persist(b"one").unwrap();
        sink.persist(b"two").unwrap();

        assert_eq!(sink.written().len(), 2);
        assert!(sink.written()[0].ends_with("recording_001.mjpeg"));
        assert_eq!(std::fs::read(&sink.written()[1]).unwrap(), b"two");
    }

    #[test]
    fn test_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_screenshot(dir.path(), None).unwrap().is_none());

        let path = save_screenshot(dir.path(), Some(&frame(5))).unwrap().unwrap();
        assert_eq!(image::open(path).unwrap().width(), 8);
    }

    #[test]
    fn test_save_results() {
        let dir = tempfile::tempdir().unwrap();
        let saver = SaveResults::new(dir.path().join("frames"), 90);
        let path = saver.save(3, &frame(128)).unwrap();
        assert!(path.ends_with("frame_00003.jpg"));
        assert!(path.exists());
    }

    #[test]
    fn test_find_next_run_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_next_run_dir(dir.path(), "track"), dir.path().join("track"));

        std::fs::create_dir(dir.path().join("track")).unwrap();
        std::fs::create_dir(dir.path().join("track2")).unwrap();
        assert_eq!(find_next_run_dir(dir.path(), "track"), dir.path().join("track3"));
    }
}
