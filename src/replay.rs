// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Replay of recorded pose-model output.
//!
//! Each non-empty line of a replay file is one JSON array holding the poses the model
//! returned for one frame, in the model's own shape:
//!
//! ```json
//! [{"score": 0.8, "keypoints": [{"name": "nose", "x": 312.5, "y": 140.2, "score": 0.91}, ...]}]
//! ```
//!
//! `null` coordinates mark keypoints the model could not place.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use image::RgbImage;
use serde::Deserialize;

use crate::detect::PoseEstimator;
use crate::error::{Result, TrackerError};
use crate::keypoint::{KEYPOINT_NAMES, Keypoint, PoseFrame};

#[derive(Debug, Deserialize)]
struct RawPose {
    #[serde(default)]
    score: Option<f32>,
    keypoints: Vec<RawKeypoint>,
}

#[derive(Debug, Deserialize)]
struct RawKeypoint {
    #[serde(default)]
    name: Option<String>,
    x: Option<f32>,
    y: Option<f32>,
    #[serde(default, alias = "confidence")]
    score: f32,
}

impl RawPose {
    fn into_frame(self) -> PoseFrame {
        let keypoints = self
            .keypoints
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| {
                let name = raw.name.unwrap_or_else(|| {
                    KEYPOINT_NAMES
                        .get(idx)
                        .map_or_else(|| format!("keypoint_{idx}"), |n| (*n).to_string())
                });
                Keypoint::new(
                    name,
                    raw.x.unwrap_or(f32::NAN),
                    raw.y.unwrap_or(f32::NAN),
                    raw.score,
                )
            })
            .collect();
        PoseFrame {
            keypoints,
            score: self.score,
        }
    }
}

/// Parse one replay line into the poses of one frame.
///
/// # Errors
///
/// Returns [`TrackerError::ReplayError`] if the line is not a JSON array of poses.
pub fn parse_line(line: &str) -> Result<Vec<PoseFrame>> {
    let raw: Vec<RawPose> = serde_json::from_str(line)?;
    Ok(raw.into_iter().map(RawPose::into_frame).collect())
}

/// A [`PoseEstimator`] that returns recorded results, one frame per call.
///
/// Once the recording is exhausted every call returns no poses.
#[derive(Debug, Default)]
pub struct ReplayEstimator {
    frames: VecDeque<Vec<PoseFrame>>,
}

impl ReplayEstimator {
    /// Load a replay file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line cannot be parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            TrackerError::IoError(format!("Failed to open {}: {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read replay lines from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error on read failure or on the first malformed line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames = VecDeque::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let poses = parse_line(&line)
                .map_err(|e| TrackerError::ReplayError(format!("line {}: {e}", idx + 1)))?;
            frames.push_back(poses);
        }
        Ok(Self { frames })
    }

    /// Number of frames left to replay.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the recording is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PoseEstimator for ReplayEstimator {
    fn estimate(&mut self, _frame: &RgbImage) -> Result<Vec<PoseFrame>> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}
