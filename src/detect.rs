// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Detection loop orchestration.
//!
//! The [`DetectionLoop`] pulls frames from a [`CaptureDevice`] on a fixed period,
//! hands them to a [`PoseEstimator`] running on an [`InferenceWorker`] thread, and
//! feeds finished estimates through [`session::step`](crate::session::step). At most
//! one estimate is outstanding at any time: while the worker is busy, ticks skip
//! submitting new frames instead of queueing them.

use std::sync::mpsc::{
    Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError, sync_channel,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use image::{RgbImage, RgbaImage};

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::exercise::RepEvent;
use crate::keypoint::PoseFrame;
use crate::session::{SessionEvent, SessionState, step};

/// External pose model: one video frame in, zero or more poses out.
pub trait PoseEstimator: Send {
    /// Estimate the poses visible in `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails on this frame.
    fn estimate(&mut self, frame: &RgbImage) -> Result<Vec<PoseFrame>>;
}

impl<T: PoseEstimator + ?Sized> PoseEstimator for Box<T> {
    fn estimate(&mut self, frame: &RgbImage) -> Result<Vec<PoseFrame>> {
        (**self).estimate(frame)
    }
}

/// Source of video frames.
pub trait CaptureDevice {
    /// Whether a frame can be read right now.
    fn is_ready(&self) -> bool;

    /// Current frame dimensions (width, height).
    fn dimensions(&self) -> (u32, u32);

    /// Read the current frame.
    fn frame(&mut self) -> Option<RgbImage>;

    /// Whether more frames may follow. Live devices stay open until released.
    fn is_open(&self) -> bool {
        true
    }
}

impl<T: CaptureDevice + ?Sized> CaptureDevice for Box<T> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn frame(&mut self) -> Option<RgbImage> {
        (**self).frame()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// A finished estimate together with the frame it was computed on.
#[derive(Debug)]
pub struct Estimate {
    /// Frame sent to the estimator.
    pub frame: RgbImage,
    /// Poses found, or the estimator's error.
    pub result: Result<Vec<PoseFrame>>,
}

/// Runs a [`PoseEstimator`] on a background thread, one request at a time.
pub struct InferenceWorker {
    requests: Option<SyncSender<RgbImage>>,
    results: Receiver<Estimate>,
    in_flight: bool,
    handle: Option<JoinHandle<()>>,
}

impl InferenceWorker {
    /// Move `estimator` onto a new worker thread.
    pub fn spawn<E: PoseEstimator + 'static>(mut estimator: E) -> Self {
        let (request_tx, request_rx) = sync_channel::<RgbImage>(1);
        let (result_tx, result_rx) = sync_channel::<Estimate>(1);

        let handle = thread::spawn(move || {
            for frame in request_rx {
                let result = estimator.estimate(&frame);
                if result_tx.send(Estimate { frame, result }).is_err() {
                    break; // Receiver dropped
                }
            }
        });

        Self {
            requests: Some(request_tx),
            results: result_rx,
            in_flight: false,
            handle: Some(handle),
        }
    }

    /// Whether an estimate is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Whether the worker thread is still running.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Send `frame` for estimation unless a request is already in flight.
    ///
    /// Returns `true` if the frame was accepted.
    pub fn try_submit(&mut self, frame: RgbImage) -> bool {
        if self.in_flight {
            return false;
        }
        let Some(requests) = &self.requests else {
            return false;
        };
        match requests.try_send(frame) {
            Ok(()) => {
                self.in_flight = true;
                true
            }
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }

    /// Take a finished estimate without blocking.
    pub fn poll(&mut self) -> Option<Estimate> {
        match self.results.try_recv() {
            Ok(estimate) => {
                self.in_flight = false;
                Some(estimate)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.in_flight = false;
                None
            }
        }
    }

    /// Wait up to `timeout` for the outstanding estimate.
    pub fn wait(&mut self, timeout: Duration) -> Option<Estimate> {
        if !self.in_flight {
            return None;
        }
        match self.results.recv_timeout(timeout) {
            Ok(estimate) => {
                self.in_flight = false;
                Some(estimate)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.in_flight = false;
                None
            }
        }
    }
}

impl Drop for InferenceWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker's receive loop
        self.requests = None;
        // Unblock a worker waiting to hand over a result
        while self.results.try_recv().is_ok() {}
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// What the loop produced on a tick that processed an estimate.
#[derive(Debug)]
pub struct TickReport<'a> {
    /// Video frame the estimate was computed on.
    pub frame: &'a RgbImage,
    /// Overlay rendered for this frame.
    pub overlay: &'a RgbaImage,
    /// Poses found in the frame.
    pub poses: &'a [PoseFrame],
    /// Session state after the tick.
    pub state: &'a SessionState,
    /// Repetition completed on this tick.
    pub rep: Option<RepEvent>,
}

/// Fixed-period loop driving capture, estimation, counting, and rendering.
///
/// The callback receives a [`TickReport`] for every processed estimate.
pub struct DetectionLoop<C, F>
where
    C: CaptureDevice,
    F: FnMut(&TickReport<'_>),
{
    capture: C,
    worker: Option<InferenceWorker>,
    surface: RgbaImage,
    config: TrackerConfig,
    on_frame: F,
}

impl<C, F> DetectionLoop<C, F>
where
    C: CaptureDevice,
    F: FnMut(&TickReport<'_>),
{
    /// Create a loop with no estimator attached yet.
    pub fn new(capture: C, config: TrackerConfig, on_frame: F) -> Self {
        Self {
            capture,
            worker: None,
            surface: RgbaImage::new(0, 0),
            config,
            on_frame,
        }
    }

    /// Attach the estimator once it is available.
    pub fn attach<E: PoseEstimator + 'static>(&mut self, estimator: E) {
        self.worker = Some(InferenceWorker::spawn(estimator));
    }

    /// Whether an estimator is attached.
    #[must_use]
    pub const fn has_estimator(&self) -> bool {
        self.worker.is_some()
    }

    /// Whether an estimate is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.worker.as_ref().is_some_and(InferenceWorker::is_busy)
    }

    /// The capture device.
    pub const fn capture(&self) -> &C {
        &self.capture
    }

    /// The overlay drawn on the last processed tick.
    pub const fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// Run one tick.
    ///
    /// Without an attached estimator this is a no-op. A finished estimate is rendered
    /// and counted; estimator errors are logged and dropped. Then, if detection is
    /// enabled, the device is ready, and the worker is idle, the next frame is submitted.
    pub fn tick(&mut self, mut state: SessionState) -> SessionState {
        let Some(worker) = self.worker.as_mut() else {
            return state;
        };

        if let Some(estimate) = worker.poll() {
            match estimate.result {
                Ok(poses) if state.detection_enabled => {
                    let dims = estimate.frame.dimensions();
                    let outcome = step(state, &poses, dims, &mut self.surface, &self.config);
                    state = outcome.state;
                    (self.on_frame)(&TickReport {
                        frame: &estimate.frame,
                        overlay: &self.surface,
                        poses: &poses,
                        state: &state,
                        rep: outcome.rep,
                    });
                }
                Ok(_) => {} // Detection switched off while the estimate was in flight
                Err(e) => {
                    crate::warn!("Pose estimation failed: {e}");
                }
            }
        }

        if state.detection_enabled
            && self.capture.is_ready()
            && !worker.is_busy()
            && let Some(frame) = self.capture.frame()
        {
            worker.try_submit(frame);
        }

        state
    }

    /// Tick on the configured period until shutdown.
    ///
    /// Events are applied at tick boundaries. The loop ends on [`SessionEvent::Shutdown`],
    /// when `events` disconnects, when the estimator thread dies, or when the capture
    /// device closes and no estimate is outstanding. A tick that overruns its period
    /// skips the missed periods instead of running them back to back.
    pub fn run(&mut self, state: SessionState, events: &Receiver<SessionEvent>) -> SessionState {
        self.run_with(state, events, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_tick` after every tick.
    ///
    /// `on_tick` runs whether or not the tick processed an estimate, so a front-end can
    /// read user input and feed it back through `events` while detection is switched off.
    pub fn run_with<H>(
        &mut self,
        mut state: SessionState,
        events: &Receiver<SessionEvent>,
        mut on_tick: H,
    ) -> SessionState
    where
        H: FnMut(&SessionState),
    {
        let period = self.config.tick_interval;
        let mut next = Instant::now();

        loop {
            loop {
                match events.try_recv() {
                    Ok(event) => state = state.apply(event, &self.config),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        state.shutdown = true;
                        break;
                    }
                }
            }
            if state.shutdown {
                break;
            }

            state = self.tick(state);
            on_tick(&state);

            if !self.capture.is_open() && !self.is_busy() {
                break;
            }
            if let Some(worker) = &self.worker
                && !worker.is_alive()
                && !worker.is_busy()
            {
                crate::warn!("Pose estimator stopped unexpectedly");
                break;
            }

            next += period;
            let now = Instant::now();
            while next <= now {
                next += period;
            }
            thread::sleep(next - now);
        }

        state
    }
}
