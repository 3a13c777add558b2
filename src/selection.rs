// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! User-selected keypoints and the click hit test that toggles them.

use std::collections::BTreeSet;

use crate::keypoint::{Keypoint, PoseFrame};

/// Joint names the user marked as being of interest.
///
/// Selected joints are highlighted and, while recording, leave motion traces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    names: BTreeSet<String>,
}

impl SelectionSet {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is selected.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of selected joints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over selected names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Add `name` if absent, remove it if present.
    pub fn toggle(&mut self, name: &str) {
        if !self.names.remove(name) {
            self.names.insert(name.to_string());
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Toggle the keypoint of `frame` nearest to the click, if one lies within `radius`.
    ///
    /// Without a frame, or without a keypoint in range, the selection is returned unchanged.
    #[must_use]
    pub fn toggle_nearest(
        mut self,
        click_x: f32,
        click_y: f32,
        frame: Option<&PoseFrame>,
        radius: f32,
    ) -> Self {
        if let Some(target) = frame.and_then(|f| nearest_keypoint(f, click_x, click_y, radius)) {
            self.toggle(&target.name);
        }
        self
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Find the keypoint closest to `(x, y)` within `radius`.
///
/// Ties keep the first keypoint in topology order.
#[must_use]
pub fn nearest_keypoint(frame: &PoseFrame, x: f32, y: f32, radius: f32) -> Option<&Keypoint> {
    let mut best: Option<(&Keypoint, f32)> = None;
    for kp in frame.present() {
        let dist = kp.distance_to(x, y);
        if dist.is_nan() || dist > radius {
            continue;
        }
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((kp, dist));
        }
    }
    best.map(|(kp, _)| kp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> PoseFrame {
        PoseFrame::new(vec![
            Keypoint::new("nose", 100.0, 100.0, 0.9),
            Keypoint::new("left_eye", 110.0, 100.0, 0.9),
            Keypoint::new("right_eye", 90.0, 100.0, 0.9),
            Keypoint::missing("left_ear"),
            Keypoint::new("left_wrist", 300.0, 300.0, 0.1),
        ])
    }

    #[test]
    fn test_toggle_selects_nearest() {
        let selection = SelectionSet::new().toggle_nearest(108.0, 101.0, Some(&frame()), 30.0);
        assert!(selection.contains("left_eye"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let f = frame();
        let original: SelectionSet = ["right_eye"].into_iter().collect();
        let once = original.clone().toggle_nearest(101.0, 99.0, Some(&f), 30.0);
        assert!(once.contains("nose"));
        let twice = once.toggle_nearest(101.0, 99.0, Some(&f), 30.0);
        assert_eq!(twice, original);
    }

    #[test]
    fn test_click_out_of_range_is_noop() {
        let selection = SelectionSet::new().toggle_nearest(500.0, 10.0, Some(&frame()), 30.0);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_no_frame_is_noop() {
        let original: SelectionSet = ["nose"].into_iter().collect();
        let selection = original.clone().toggle_nearest(100.0, 100.0, None, 30.0);
        assert_eq!(selection, original);
    }

    #[test]
    fn test_tie_keeps_first_in_scan_order() {
        // both eyes are 20px from the click
        let f = PoseFrame::new(vec![
            Keypoint::new("left_eye", 80.0, 0.0, 0.9),
            Keypoint::new("right_eye", 120.0, 0.0, 0.9),
        ]);
        let kp = nearest_keypoint(&f, 100.0, 0.0, 30.0);
        assert_eq!(kp.map(|k| k.name.as_str()), Some("left_eye"));
    }

    #[test]
    fn test_low_confidence_keypoints_are_still_clickable() {
        let selection = SelectionSet::new().toggle_nearest(300.0, 305.0, Some(&frame()), 30.0);
        assert!(selection.contains("left_wrist"));
    }

    #[test]
    fn test_missing_keypoints_are_ignored() {
        let f = PoseFrame::new(vec![Keypoint::missing("left_ear")]);
        assert!(nearest_keypoint(&f, f32::NAN, 0.0, 30.0).is_none());
        assert!(nearest_keypoint(&f, 0.0, 0.0, 30.0).is_none());
    }
}
