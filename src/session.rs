// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Session state, user events, and the per-tick step function.
//!
//! All mutable state of a viewing session lives in one [`SessionState`] value that is
//! moved into and returned from [`SessionState::apply`] (user events) and [`step`]
//! (detection results), so both can be exercised in isolation.
//!
//! Lifetimes:
//! - the selection lives for the viewing session and is cleared when detection is
//!   switched off;
//! - the trace lives for one recording and is discarded when recording starts or stops;
//! - selecting an exercise restarts its count but keeps selection and trace;
//! - stopping a recording resets the count of the active exercise.

use image::RgbaImage;

use crate::annotate::render_overlay;
use crate::config::TrackerConfig;
use crate::exercise::{Exercise, ExerciseState, RepEvent};
use crate::keypoint::PoseFrame;
use crate::selection::SelectionSet;

/// User interactions that change the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// The user picked an exercise to count.
    ExerciseSelected(Exercise),
    /// The user clicked the surface at source-pixel coordinates.
    KeypointClicked {
        /// Horizontal click position.
        x: f32,
        /// Vertical click position.
        y: f32,
    },
    /// Start or stop recording.
    RecordingToggled,
    /// Start or stop pose detection.
    DetectionToggled,
    /// Stop the detection loop.
    Shutdown,
}

/// Everything that persists between ticks of one viewing session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Whether frames are sent to the pose estimator.
    pub detection_enabled: bool,
    /// Whether a recording is in progress.
    pub recording: bool,
    /// Number of recordings started so far; identifies the current one.
    pub recording_id: u32,
    /// Counter of the active exercise.
    pub exercise: ExerciseState,
    /// Joints of interest.
    pub selection: SelectionSet,
    /// Accumulated trace ink of the current recording.
    pub trace: Option<RgbaImage>,
    /// Primary pose of the last tick that detected one, used for traces.
    pub previous: Option<PoseFrame>,
    /// Most recent primary pose, used for click hit-testing.
    pub latest: Option<PoseFrame>,
    /// Set once a shutdown was requested.
    pub shutdown: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            detection_enabled: true,
            recording: false,
            recording_id: 0,
            exercise: ExerciseState::default(),
            selection: SelectionSet::new(),
            trace: None,
            previous: None,
            latest: None,
            shutdown: false,
        }
    }
}

impl SessionState {
    /// Create a session with detection enabled and nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one user event.
    #[must_use]
    pub fn apply(mut self, event: SessionEvent, config: &TrackerConfig) -> Self {
        match event {
            SessionEvent::ExerciseSelected(exercise) => {
                self.exercise = ExerciseState::new(exercise);
            }
            SessionEvent::KeypointClicked { x, y } => {
                self.selection = self.selection.toggle_nearest(
                    x,
                    y,
                    self.latest.as_ref(),
                    config.selection_radius,
                );
            }
            SessionEvent::RecordingToggled => {
                self.recording = !self.recording;
                self.trace = None;
                if self.recording {
                    self.recording_id = self.recording_id.wrapping_add(1);
                    self.previous = None;
                } else {
                    self.exercise.reset();
                }
            }
            SessionEvent::DetectionToggled => {
                self.detection_enabled = !self.detection_enabled;
                if !self.detection_enabled {
                    self.selection.clear();
                    self.trace = None;
                    self.previous = None;
                    self.latest = None;
                }
            }
            SessionEvent::Shutdown => self.shutdown = true,
        }
        self
    }
}

/// Result of one detection tick.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Session state after the tick.
    pub state: SessionState,
    /// Repetition completed during this tick, if any.
    pub rep: Option<RepEvent>,
}

/// Process one detection result.
///
/// While recording, the first pose feeds the active exercise counter. The overlay is
/// always redrawn into `surface`. The first pose, if any, becomes the previous and
/// latest frame; a tick without poses leaves them untouched.
#[must_use]
pub fn step(
    mut state: SessionState,
    poses: &[PoseFrame],
    dims: (u32, u32),
    surface: &mut RgbaImage,
    config: &TrackerConfig,
) -> StepOutcome {
    let primary = poses.first();

    let rep = if state.recording && primary.is_some() {
        state.exercise.update(primary)
    } else {
        None
    };

    let trace = state.trace.take();
    state.trace = render_overlay(
        surface,
        dims,
        poses,
        state.previous.as_ref(),
        &state.selection,
        trace,
        state.recording,
        config,
    );

    if let Some(primary) = primary {
        state.previous = Some(primary.clone());
        state.latest = Some(primary.clone());
    }

    StepOutcome { state, rep }
}
