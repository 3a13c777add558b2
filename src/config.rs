// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Tracker configuration.
//!
//! This module defines the [`TrackerConfig`] struct, which controls the confidence
//! thresholds used when drawing the overlay, the click hit-test radius, marker and
//! line sizes, and the cadence of the detection loop.

use std::time::Duration;

use crate::error::{Result, TrackerError};

/// Configuration for overlay rendering and the detection loop.
///
/// It uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use form_tracker::TrackerConfig;
/// use std::time::Duration;
///
/// let config = TrackerConfig::new()
///     .with_keypoint_threshold(0.2)
///     .with_skeleton_threshold(0.4)
///     .with_tick_interval(Duration::from_millis(50));
/// ```
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Minimum confidence for a keypoint marker to be drawn (0.0 to 1.0).
    /// Lower than [`skeleton_threshold`](Self::skeleton_threshold) so joints are shown
    /// more liberally than the limbs connecting them.
    pub keypoint_threshold: f32,
    /// Minimum confidence both endpoints of a skeleton edge need before the edge is drawn.
    pub skeleton_threshold: f32,
    /// Maximum distance, in source pixels, between a click and the keypoint it selects.
    pub selection_radius: f32,
    /// Radius of keypoint markers in pixels.
    pub keypoint_radius: i32,
    /// Thickness of skeleton edges in pixels.
    pub line_thickness: u32,
    /// Thickness of motion traces in pixels.
    pub trace_thickness: u32,
    /// Period of the detection loop.
    pub tick_interval: Duration,
    /// JPEG quality of recorded frames (1 to 100).
    pub jpeg_quality: u8,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            keypoint_threshold: 0.3,
            skeleton_threshold: 0.5,
            selection_radius: 30.0,
            keypoint_radius: 10,
            line_thickness: 2,
            trace_thickness: 3,
            tick_interval: Duration::from_millis(100),
            jpeg_quality: 85,
        }
    }
}

impl TrackerConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keypoint visibility threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum confidence score (0.0 to 1.0).
    #[must_use]
    pub const fn with_keypoint_threshold(mut self, threshold: f32) -> Self {
        self.keypoint_threshold = threshold;
        self
    }

    /// Set the skeleton edge threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum confidence score of both endpoints (0.0 to 1.0).
    #[must_use]
    pub const fn with_skeleton_threshold(mut self, threshold: f32) -> Self {
        self.skeleton_threshold = threshold;
        self
    }

    /// Set the click hit-test radius.
    #[must_use]
    pub const fn with_selection_radius(mut self, radius: f32) -> Self {
        self.selection_radius = radius;
        self
    }

    /// Set the keypoint marker radius.
    #[must_use]
    pub const fn with_keypoint_radius(mut self, radius: i32) -> Self {
        self.keypoint_radius = radius;
        self
    }

    /// Set the skeleton line thickness.
    #[must_use]
    pub const fn with_line_thickness(mut self, thickness: u32) -> Self {
        self.line_thickness = thickness;
        self
    }

    /// Set the motion trace thickness.
    #[must_use]
    pub const fn with_trace_thickness(mut self, thickness: u32) -> Self {
        self.trace_thickness = thickness;
        self
    }

    /// Set the detection loop period.
    #[must_use]
    pub const fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the JPEG quality used for recorded frames.
    #[must_use]
    pub const fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Check that thresholds and sizes are usable.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ConfigError`] if a threshold is outside `[0, 1]`,
    /// the tick interval is zero, or the JPEG quality is outside `1..=100`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("keypoint_threshold", self.keypoint_threshold),
            ("skeleton_threshold", self.skeleton_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrackerError::ConfigError(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.selection_radius.is_nan() || self.selection_radius < 0.0 {
            return Err(TrackerError::ConfigError(format!(
                "selection_radius must be non-negative, got {}",
                self.selection_radius
            )));
        }
        if self.tick_interval.is_zero() {
            return Err(TrackerError::ConfigError(
                "tick_interval must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(TrackerError::ConfigError(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}
