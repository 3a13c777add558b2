// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Form Tracker
//!
//! Exercise form tracking on top of a pose-keypoint model. Given the 17 COCO body
//! keypoints a pose model reports for each video frame, this crate draws the skeleton
//! overlay, lets the user pick joints whose motion is traced while recording, and counts
//! push-ups, pull-ups and squats with a two-phase state machine.
//!
//! The pose model itself is external: anything implementing [`PoseEstimator`] can be
//! attached to the [`DetectionLoop`]. [`ReplayEstimator`] plays back recorded model
//! output from a JSON-lines file.
//!
//! ## Features
//!
//! - **Skeleton Overlay** - Confidence-gated keypoint markers and limbs on a transparent surface
//! - **Joint Selection** - Click-to-toggle nearest keypoint within a fixed radius
//! - **Motion Traces** - Persistent trails for selected joints while recording
//! - **Rep Counting** - Push-up, pull-up and squat counters tolerant of keypoint dropout
//! - **Detection Loop** - Fixed-period capture with a single in-flight estimate
//! - **Recording** - Composited frames collected into a Motion-JPEG stream
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use std::sync::mpsc;
//! use form_tracker::{
//!     BlankCanvas, DetectionLoop, Exercise, ReplayEstimator, SessionEvent, SessionState,
//!     TickReport, TrackerConfig,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let replay = ReplayEstimator::open("squats.jsonl")?;
//!     let capture = BlankCanvas::new(640, 480).with_frame_limit(replay.len());
//!     let config = TrackerConfig::default();
//!
//!     let state = SessionState::new()
//!         .apply(SessionEvent::ExerciseSelected(Exercise::Squat), &config)
//!         .apply(SessionEvent::RecordingToggled, &config);
//!
//!     let mut detection = DetectionLoop::new(capture, config, |report: &TickReport<'_>| {
//!         if let Some(rep) = report.rep {
//!             println!("{} #{}", rep.exercise, rep.rep_count);
//!         }
//!     });
//!     detection.attach(replay);
//!
//!     let (_events, receiver) = mpsc::channel();
//!     let state = detection.run(state, &receiver);
//!     println!("Counted {} squats", state.exercise.rep_count);
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Count squats from recorded poses on a blank canvas
//! form-tracker track --poses squats.jsonl --exercise squat --record
//!
//! # Overlay poses on frames, trace the wrists and save everything
//! form-tracker track -p pushups.jsonl -s frames/ -e push-up \
//!     --select left_wrist --select right_wrist --record --save
//!
//! # Interactive window (click joints, 0-3 exercise, R record, D detection, S screenshot)
//! form-tracker track -p session.jsonl -s "frames/*.jpg" --show --font DejaVuSans.ttf
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`keypoint`] | [`Keypoint`] and [`PoseFrame`], COCO keypoint names |
//! | [`selection`] | [`SelectionSet`] and nearest-keypoint hit testing |
//! | [`annotate`] | Overlay rendering, traces, compositing and HUD |
//! | [`exercise`] | [`Exercise`] definitions and the [`ExerciseState`] rep counter |
//! | [`session`] | [`SessionState`], [`SessionEvent`] and the per-tick [`step`] |
//! | [`detect`] | [`DetectionLoop`], [`PoseEstimator`], [`CaptureDevice`] |
//! | [`replay`] | [`ReplayEstimator`] for recorded model output |
//! | [`source`] | File-backed capture devices |
//! | [`io`] | Recorder, recording sinks and screenshots |
//! | [`config`] | [`TrackerConfig`] thresholds and timing |
//! | [`error`] | Error types ([`TrackerError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `visualize` | Interactive window display (default) |
//!
//! ## License
//!
//! This project is licensed under [AGPL-3.0](https://ultralytics.com/license).

// Modules
pub mod annotate;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod exercise;
pub mod io;
pub mod keypoint;
pub mod replay;
pub mod selection;
pub mod session;
pub mod source;
pub mod utils;
pub mod visualizer;

// Re-export main types for convenience
pub use config::TrackerConfig;
pub use detect::{CaptureDevice, DetectionLoop, InferenceWorker, PoseEstimator, TickReport};
pub use error::{Result, TrackerError};
pub use exercise::{Exercise, ExerciseState, Phase, RepEvent};
pub use io::{FileSink, Recorder, RecordingSink};
pub use keypoint::{Keypoint, PoseFrame};
pub use replay::ReplayEstimator;
pub use selection::SelectionSet;
pub use session::{SessionEvent, SessionState, StepOutcome, step};
pub use source::{BlankCanvas, ImageSequence, Source};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        // Version should be semver format like "0.1.0"
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "form-tracker");
    }
}
