// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the form tracker.

use std::fmt;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Main error type for the form tracker.
#[derive(Debug)]
pub enum TrackerError {
    /// The pose estimator failed to produce an estimate.
    EstimatorError(String),
    /// Recorded pose data could not be parsed.
    ReplayError(String),
    /// Error processing or encoding images.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// IO error described by a message.
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Recording sink failure.
    RecordingError(String),
    /// Visualizer error.
    VisualizerError(String),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EstimatorError(msg) => write!(f, "Estimator error: {msg}"),
            Self::ReplayError(msg) => write!(f, "Replay error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::RecordingError(msg) => write!(f, "Recording error: {msg}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for TrackerError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::ReplayError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::EstimatorError("test".to_string());
        assert_eq!(err.to_string(), "Estimator error: test");

        let err = TrackerError::ReplayError("line 3".to_string());
        assert_eq!(err.to_string(), "Replay error: line 3");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = TrackerError::from(std::io::Error::other("disk full"));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "IO error: disk full");
    }
}
