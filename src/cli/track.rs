// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use ab_glyph::FontVec;
use image::RgbImage;

use crate::annotate::{composite, draw_hud, load_font};
use crate::cli::args::TrackArgs;
use crate::config::TrackerConfig;
use crate::detect::{CaptureDevice, DetectionLoop, TickReport};
use crate::error::{Result, TrackerError};
use crate::io::{FileSink, Recorder, SaveResults, find_next_run_dir, save_screenshot};
use crate::keypoint::keypoint_index;
use crate::replay::ReplayEstimator;
use crate::session::{SessionEvent, SessionState};
use crate::source::{BlankCanvas, ImageSequence, Source};
use crate::utils::pluralize;
use crate::{VERSION, error, info, rep, section, success, verbose, warn};

#[cfg(feature = "visualize")]
use crate::visualizer::{Viewer, ViewerAction};

/// Per-run output handling driven from the frame callback and the tick hook.
struct FrameSink {
    run_dir: PathBuf,
    font: Option<FontVec>,
    quality: u8,
    recorder: Recorder,
    recordings: FileSink,
    /// Recording the buffered frames belong to.
    recording_id: Option<u32>,
    saver: Option<SaveResults>,
    #[cfg_attr(not(feature = "visualize"), allow(dead_code))]
    events: Sender<SessionEvent>,
    last_frame: Option<RgbImage>,
    frames: usize,
    reps: usize,
    #[cfg(feature = "visualize")]
    viewer: Option<Viewer>,
    #[cfg(feature = "visualize")]
    show: bool,
}

impl FrameSink {
    fn new(
        run_dir: &Path,
        font: Option<FontVec>,
        quality: u8,
        saver: Option<SaveResults>,
        events: Sender<SessionEvent>,
        show: bool,
    ) -> Self {
        #[cfg(not(feature = "visualize"))]
        let _ = show;
        Self {
            run_dir: run_dir.to_path_buf(),
            font,
            quality,
            recorder: Recorder::new(),
            recordings: FileSink::new(run_dir),
            recording_id: None,
            saver,
            events,
            last_frame: None,
            frames: 0,
            reps: 0,
            #[cfg(feature = "visualize")]
            viewer: None,
            #[cfg(feature = "visualize")]
            show,
        }
    }

    fn handle(&mut self, report: &TickReport<'_>) {
        self.sync_recording(report.state);

        let mut frame = composite(report.frame, report.overlay);
        if let Some(font) = &self.font {
            draw_hud(
                &mut frame,
                &report.state.exercise,
                report.state.recording,
                font,
            );
        }
        self.frames += 1;

        if let Some(rep) = report.rep {
            self.reps += 1;
            rep!(rep, self.frames);
        }

        if report.state.recording
            && let Err(e) = self.recorder.push_frame(&frame, self.quality)
        {
            warn!("Dropping recorded frame: {e}");
        }

        if let Some(saver) = &self.saver
            && let Err(e) = saver.save(self.frames, &frame)
        {
            error!("Failed to save frame: {e}");
        }

        #[cfg(feature = "visualize")]
        self.show_frame(&frame);

        self.last_frame = Some(frame);
    }

    /// Runs after every tick, whether or not a frame was reported.
    fn on_tick(&mut self, state: &SessionState) {
        self.sync_recording(state);

        #[cfg(feature = "visualize")]
        self.pump_viewer();
    }

    /// Finish the buffered recording once the session has stopped or restarted it.
    fn sync_recording(&mut self, state: &SessionState) {
        let active = state.recording.then_some(state.recording_id);
        if active != self.recording_id {
            self.finish_recording();
            self.recording_id = active;
        }
    }

    fn finish_recording(&mut self) {
        match self.recorder.finish(&mut self.recordings) {
            Ok(Some(frames)) => {
                if let Some(path) = self.recordings.written().last() {
                    success!(
                        "Recording saved to {} ({})",
                        path.display(),
                        pluralize("frame", frames)
                    );
                }
            }
            Ok(None) => {}
            Err(e) => error!("Failed to save recording: {e}"),
        }
    }

    #[cfg_attr(not(feature = "visualize"), allow(dead_code))]
    fn screenshot(&self) {
        match save_screenshot(&self.run_dir, self.last_frame.as_ref()) {
            Ok(Some(path)) => success!("Screenshot saved to {}", path.display()),
            Ok(None) => verbose!("No frame to capture yet"),
            Err(e) => error!("Failed to save screenshot: {e}"),
        }
    }

    #[cfg(feature = "visualize")]
    fn show_frame(&mut self, frame: &RgbImage) {
        if !self.show {
            return;
        }
        if self.viewer.is_none() {
            let (w, h) = (frame.width() as usize, frame.height() as usize);
            match Viewer::new("Form Tracker", w, h) {
                Ok(v) => self.viewer = Some(v),
                Err(e) => {
                    error!("{e}");
                    self.show = false;
                    return;
                }
            }
        }
        if let Some(viewer) = &mut self.viewer
            && let Err(e) = viewer.show(frame)
        {
            warn!("{e}");
        }
    }

    /// Keep the window responsive and forward user input, also while detection is off.
    #[cfg(feature = "visualize")]
    fn pump_viewer(&mut self) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        if let Err(e) = viewer.refresh() {
            warn!("{e}");
        }
        for action in viewer.poll_actions() {
            match action {
                ViewerAction::Session(event) => {
                    let _ = self.events.send(event);
                }
                ViewerAction::Screenshot => self.screenshot(),
            }
        }
    }
}

/// Reject flags that need a feature this build was compiled without.
fn check_features(args: &TrackArgs) -> Result<()> {
    if args.show && !cfg!(feature = "visualize") {
        return Err(TrackerError::FeatureNotEnabled(
            "--show requires the 'visualize' feature. Compile with --features visualize to enable it."
                .to_string(),
        ));
    }
    Ok(())
}

fn open_capture(args: &TrackArgs, frames: usize) -> Result<Box<dyn CaptureDevice>> {
    Ok(match &args.source {
        Some(s) => {
            let seq = ImageSequence::open(&Source::from(s.as_str()))?;
            verbose!("Source: {s} ({})", pluralize("frame", seq.len()));
            Box::new(seq)
        }
        None => {
            verbose!("Source: blank {}x{} canvas", args.width, args.height);
            Box::new(BlankCanvas::new(args.width, args.height).with_frame_limit(frames))
        }
    })
}

fn initial_state(args: &TrackArgs, config: &TrackerConfig) -> SessionState {
    let mut state =
        SessionState::new().apply(SessionEvent::ExerciseSelected(args.exercise), config);
    for name in &args.select {
        if keypoint_index(name).is_some() {
            state.selection.toggle(name);
        } else {
            warn!("Unknown joint '{name}', ignoring");
        }
    }
    if args.record {
        state = state.apply(SessionEvent::RecordingToggled, config);
    }
    state
}

/// Run the `track` command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a flag needs a disabled feature,
/// or the inputs cannot be opened.
pub fn run_tracking(args: &TrackArgs) -> Result<()> {
    check_features(args)?;
    crate::cli::logging::set_verbose(args.verbose);

    let config = TrackerConfig::new()
        .with_keypoint_threshold(args.kpt_conf)
        .with_skeleton_threshold(args.skeleton_conf)
        .with_tick_interval(Duration::from_millis(args.interval_ms));
    config.validate()?;

    info!("Form Tracker {VERSION} 🚀 Rust");

    let replay = ReplayEstimator::open(&args.poses)?;
    verbose!(
        "Poses: {} ({})",
        args.poses.display(),
        pluralize("frame", replay.len())
    );
    let capture = open_capture(args, replay.len())?;

    let font = args.font.as_deref().map(load_font).transpose()?;
    if font.is_none() && args.exercise.definition().is_some() {
        verbose!("No --font given, rep counter is logged but not drawn");
    }

    let run_dir = find_next_run_dir(Path::new("runs"), "track");
    let state = initial_state(args, &config);
    if state.recording {
        verbose!(
            "Recording {} with {} selected",
            state.exercise.exercise,
            pluralize("joint", state.selection.len())
        );
    }

    let (events_tx, events_rx) = mpsc::channel();
    let saver = args
        .save
        .then(|| SaveResults::new(run_dir.join("frames"), config.jpeg_quality));
    let sink = RefCell::new(FrameSink::new(
        &run_dir,
        font,
        config.jpeg_quality,
        saver,
        events_tx,
        args.show,
    ));

    section!("Tracking");
    let final_state = {
        let mut detection =
            DetectionLoop::new(capture, config.clone(), |report: &TickReport<'_>| {
                sink.borrow_mut().handle(report);
            });
        detection.attach(replay);
        detection.run_with(state, &events_rx, |state| sink.borrow_mut().on_tick(state))
    };

    // Recording is finalized on every exit path
    let mut sink = sink.into_inner();
    sink.finish_recording();

    info!(
        "Processed {}, {} counted",
        pluralize("frame", sink.frames),
        pluralize("rep", sink.reps)
    );
    if final_state.exercise.exercise.definition().is_some() {
        verbose!(
            "Final count: {} {}",
            final_state.exercise.exercise, final_state.exercise.rep_count
        );
    }
    if run_dir.exists() {
        verbose!("Results saved to {}", run_dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use crate::exercise::Exercise;
    use clap::Parser;
    use image::RgbaImage;

    fn track_args(argv: &[&str]) -> TrackArgs {
        let mut full = vec!["app", "track"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Track(args) => args,
        }
    }

    #[test]
    fn test_initial_state_from_flags() {
        let args = track_args(&[
            "-p",
            "x.jsonl",
            "-e",
            "squat",
            "--select",
            "left_knee",
            "--select",
            "elbow_of_doom",
            "--record",
        ]);
        let state = initial_state(&args, &TrackerConfig::default());
        assert_eq!(state.exercise.exercise, Exercise::Squat);
        assert!(state.recording);
        assert_eq!(state.selection.len(), 1);
        assert!(state.selection.contains("left_knee"));
    }

    #[test]
    fn test_blank_canvas_matches_replay_length() {
        let args = track_args(&["-p", "x.jsonl", "--width", "32", "--height", "24"]);
        let mut capture = open_capture(&args, 2).unwrap();
        assert_eq!(capture.dimensions(), (32, 24));
        assert!(capture.frame().is_some());
        assert!(capture.frame().is_some());
        assert!(!capture.is_open());
    }

    #[test]
    fn test_show_needs_visualize_feature() {
        let args = track_args(&["-p", "x.jsonl", "--show"]);
        if cfg!(feature = "visualize") {
            assert!(check_features(&args).is_ok());
        } else {
            assert!(matches!(
                check_features(&args),
                Err(TrackerError::FeatureNotEnabled(_))
            ));
        }
        assert!(check_features(&track_args(&["-p", "x.jsonl"])).is_ok());
    }

    fn report_frame(sink: &mut FrameSink, state: &SessionState) {
        let frame = RgbImage::new(8, 6);
        let overlay = RgbaImage::new(8, 6);
        sink.handle(&TickReport {
            frame: &frame,
            overlay: &overlay,
            poses: &[],
            state,
            rep: None,
        });
    }

    #[test]
    fn test_recording_finalized_on_toggle_without_frames() {
        let dir = tempfile::tempdir().unwrap();
        let (events, _rx) = mpsc::channel();
        let mut sink = FrameSink::new(dir.path(), None, 90, None, events, false);
        let config = TrackerConfig::default();
        let toggle = |state: SessionState| state.apply(SessionEvent::RecordingToggled, &config);

        let first = toggle(SessionState::new());
        report_frame(&mut sink, &first);
        assert_eq!(sink.recorder.len(), 1);

        // stop and restart between two ticks starts a separate file
        let second = toggle(toggle(first));
        sink.on_tick(&second);
        assert_eq!(sink.recordings.written().len(), 1);
        report_frame(&mut sink, &second);
        assert_eq!(sink.recorder.len(), 1);

        // stopped with detection off: no frame is reported, the tick still finishes it
        let idle = toggle(second).apply(SessionEvent::DetectionToggled, &config);
        sink.on_tick(&idle);
        assert_eq!(sink.recordings.written().len(), 2);
        assert!(sink.recorder.is_empty());
        assert!(sink.recordings.written().iter().all(|p| p.exists()));
    }
}
