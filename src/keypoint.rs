// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint and pose frame types.
//!
//! A [`PoseFrame`] holds the keypoints of one detected subject in the fixed
//! COCO-17 order produced by the upstream pose model, so joints can be compared
//! by index across frames.

/// Number of keypoints in the COCO-17 body topology.
pub const NUM_KEYPOINTS: usize = 17;

/// Joint names in COCO-17 index order.
pub const KEYPOINT_NAMES: [&str; NUM_KEYPOINTS] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// Left shoulder index.
pub const LEFT_SHOULDER: usize = 5;
/// Right shoulder index.
pub const RIGHT_SHOULDER: usize = 6;
/// Left elbow index.
pub const LEFT_ELBOW: usize = 7;
/// Right elbow index.
pub const RIGHT_ELBOW: usize = 8;
/// Left hip index.
pub const LEFT_HIP: usize = 11;
/// Right hip index.
pub const RIGHT_HIP: usize = 12;
/// Left knee index.
pub const LEFT_KNEE: usize = 13;
/// Right knee index.
pub const RIGHT_KNEE: usize = 14;

/// Look up the COCO-17 index of a joint name.
#[must_use]
pub fn keypoint_index(name: &str) -> Option<usize> {
    KEYPOINT_NAMES.iter().position(|&n| n == name)
}

/// A single named landmark in source-frame pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Keypoint {
    /// Stable joint identifier, e.g. `left_shoulder`.
    pub name: String,
    /// Horizontal position in source pixels.
    pub x: f32,
    /// Vertical position in source pixels (grows downward).
    pub y: f32,
    /// Detection confidence (0.0 to 1.0).
    pub confidence: f32,
}

impl Keypoint {
    /// Create a new keypoint.
    pub fn new(name: impl Into<String>, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            confidence,
        }
    }

    /// A keypoint the model reported without a position.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::new(name, f32::NAN, f32::NAN, 0.0)
    }

    /// Whether both coordinates are usable numbers.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whether the keypoint is present and at least as confident as `threshold`.
    #[must_use]
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.is_present() && self.confidence >= threshold
    }

    /// Euclidean distance to a point.
    #[must_use]
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        crate::utils::distance((self.x, self.y), (x, y))
    }

    /// Position as a tuple.
    #[must_use]
    pub const fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// The keypoints of one detected subject at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseFrame {
    /// Keypoints in topology order.
    pub keypoints: Vec<Keypoint>,
    /// Overall pose score reported by the model, if any.
    pub score: Option<f32>,
}

impl PoseFrame {
    /// Create a pose frame from keypoints in topology order.
    #[must_use]
    pub const fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            score: None,
        }
    }

    /// Build a COCO-17 frame from `(x, y, confidence)` triples, naming each
    /// keypoint after its index.
    #[must_use]
    pub fn from_coco(points: &[(f32, f32, f32)]) -> Self {
        let keypoints = points
            .iter()
            .zip(KEYPOINT_NAMES)
            .map(|(&(x, y, conf), name)| Keypoint::new(name, x, y, conf))
            .collect();
        Self::new(keypoints)
    }

    /// Number of keypoints carried by this frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// Check if the frame has no keypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Keypoint at `index`, or `None` if out of range or missing.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.get(index).filter(|kp| kp.is_present())
    }

    /// Keypoint named `name`, or `None` if absent or missing.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints
            .iter()
            .find(|kp| kp.name == name)
            .filter(|kp| kp.is_present())
    }

    /// Iterate over keypoints that have a position.
    pub fn present(&self) -> impl Iterator<Item = &Keypoint> {
        self.keypoints.iter().filter(|kp| kp.is_present())
    }
}
