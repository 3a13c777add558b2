// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Overlay rendering.
//!
//! [`render_overlay`] draws motion traces, skeleton edges, and keypoint markers onto a
//! transparent RGBA surface. Trace ink is kept in a separate raster that the caller
//! threads from one call to the next so traces accumulate across frames while the
//! rest of the overlay is redrawn from scratch.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::exercise::{Exercise, ExerciseState};
use crate::keypoint::PoseFrame;
use crate::selection::SelectionSet;
use crate::utils::pluralize;
use crate::visualizer::Color;
use crate::visualizer::skeleton::{KPT_COLOR_INDICES, LIMB_COLOR_INDICES, SKELETON};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Render one tick of overlay and return the trace raster to keep for the next tick.
///
/// Steps run in a fixed order: the surface is resized to `dims` and cleared, the
/// previous trace is blitted back (recording with a non-empty selection only), trace
/// segments are drawn from `previous` to each pose and captured, then skeleton edges
/// and keypoint markers are drawn on top.
///
/// Returns `None` when traces are not being kept (not recording, or nothing selected).
#[allow(clippy::too_many_arguments)]
pub fn render_overlay(
    surface: &mut RgbaImage,
    dims: (u32, u32),
    poses: &[PoseFrame],
    previous: Option<&PoseFrame>,
    selection: &SelectionSet,
    trace: Option<RgbaImage>,
    recording: bool,
    config: &TrackerConfig,
) -> Option<RgbaImage> {
    reset_surface(surface, dims);

    let tracing = recording && !selection.is_empty();
    let mut trace = trace.filter(|t| tracing && t.dimensions() == dims);
    if let Some(prior) = &trace {
        image::imageops::replace(surface, prior, 0, 0);
    }

    for pose in poses {
        if tracing {
            if let Some(previous) = previous {
                draw_traces(surface, pose, previous, selection, config);
            }
            trace = Some(surface.clone());
        }
        draw_skeleton(surface, pose, config);
        draw_keypoints(surface, pose, selection, config);
    }

    trace
}

/// Resize to `dims` if needed and clear to transparent.
fn reset_surface(surface: &mut RgbaImage, (width, height): (u32, u32)) {
    if surface.dimensions() == (width, height) {
        surface.pixels_mut().for_each(|p| *p = TRANSPARENT);
    } else {
        *surface = RgbaImage::new(width, height);
    }
}

/// Draw a segment from each selected joint's previous position to its current one.
fn draw_traces(
    surface: &mut RgbaImage,
    pose: &PoseFrame,
    previous: &PoseFrame,
    selection: &SelectionSet,
    config: &TrackerConfig,
) {
    for name in selection.iter() {
        let (Some(from), Some(to)) = (previous.by_name(name), pose.by_name(name)) else {
            continue;
        };
        draw_thick_line(
            surface,
            from.position(),
            to.position(),
            config.trace_thickness,
            Color::TRACE.to_rgba(),
        );
    }
}

/// Connect adjacent joints whose endpoints are both confident.
fn draw_skeleton(surface: &mut RgbaImage, pose: &PoseFrame, config: &TrackerConfig) {
    for (edge, &[a, b]) in SKELETON.iter().enumerate() {
        let (Some(start), Some(end)) = (pose.point(a), pose.point(b)) else {
            continue;
        };
        if start.confidence < config.skeleton_threshold
            || end.confidence < config.skeleton_threshold
        {
            continue;
        }
        let color = Color::from_pose_index(LIMB_COLOR_INDICES[edge]);
        draw_thick_line(
            surface,
            start.position(),
            end.position(),
            config.line_thickness,
            color.to_rgba(),
        );
    }
}

/// Draw a filled marker for every visible keypoint, highlighting selected ones.
#[allow(clippy::cast_possible_truncation)]
fn draw_keypoints(
    surface: &mut RgbaImage,
    pose: &PoseFrame,
    selection: &SelectionSet,
    config: &TrackerConfig,
) {
    for (idx, kp) in pose.keypoints.iter().enumerate() {
        if !kp.is_visible(config.keypoint_threshold) {
            continue;
        }
        let color = if selection.contains(&kp.name) {
            Color::SELECTED
        } else {
            KPT_COLOR_INDICES
                .get(idx)
                .map_or(Color::RED, |&c| Color::from_pose_index(c))
        };
        let center = (kp.x.round() as i32, kp.y.round() as i32);
        draw_filled_circle_mut(surface, center, config.keypoint_radius, color.to_rgba());
    }
}

/// Draw a line `thickness` pixels wide as parallel one-pixel segments.
#[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
fn draw_thick_line(
    surface: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    thickness: u32,
    color: Rgba<u8>,
) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let len = dx.hypot(dy);
    let normal = if len > f32::EPSILON {
        (-dy / len, dx / len)
    } else {
        (0.0, 0.0)
    };

    let thickness = thickness.max(1) as i32;
    for i in 0..thickness {
        let offset = (i - (thickness - 1) / 2) as f32;
        let (ox, oy) = (normal.0 * offset, normal.1 * offset);
        draw_line_segment_mut(
            surface,
            (start.0 + ox, start.1 + oy),
            (end.0 + ox, end.1 + oy),
            color,
        );
    }
}

/// Alpha-blend the overlay onto a copy of the video frame.
#[must_use]
pub fn composite(frame: &RgbImage, overlay: &RgbaImage) -> RgbImage {
    let mut canvas = DynamicImage::ImageRgb8(frame.clone()).to_rgba8();
    image::imageops::overlay(&mut canvas, overlay, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Load a TrueType/OpenType font for the heads-up display.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid font.
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    FontVec::try_from_vec(data).map_err(|e| {
        TrackerError::ConfigError(format!("Invalid font {}: {e}", path.display()))
    })
}

/// Heads-up label for the active exercise, e.g. `SQUAT  3 reps`.
#[must_use]
pub fn hud_label(state: &ExerciseState, recording: bool) -> Option<String> {
    if state.exercise == Exercise::None {
        return recording.then(|| "REC".to_string());
    }
    let label = format!(
        "{}  {}",
        state.exercise.as_str().to_uppercase(),
        pluralize("rep", state.rep_count as usize)
    );
    Some(if recording {
        format!("REC  {label}")
    } else {
        label
    })
}

/// Write the heads-up label in the top-left corner of a composited frame.
pub fn draw_hud(image: &mut RgbImage, state: &ExerciseState, recording: bool, font: &FontVec) {
    let Some(label) = hud_label(state, recording) else {
        return;
    };
    let color = if recording {
        Rgb([255, 68, 79])
    } else {
        Rgb([255, 255, 255])
    };
    draw_text_mut(image, color, 10, 10, PxScale::from(24.0), font, &label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::tests::uniform_frame;
    use crate::keypoint::{KEYPOINT_NAMES, Keypoint, LEFT_SHOULDER, RIGHT_SHOULDER};
    use crate::visualizer::color::POSE_COLORS;

    const DIMS: (u32, u32) = (200, 200);

    /// Frame where only the shoulders are present.
    fn shoulders(conf: f32) -> PoseFrame {
        let mut keypoints: Vec<Keypoint> = KEYPOINT_NAMES
            .iter()
            .map(|&n| Keypoint::missing(n))
            .collect();
        keypoints[LEFT_SHOULDER] = Keypoint::new("left_shoulder", 20.0, 100.0, conf);
        keypoints[RIGHT_SHOULDER] = Keypoint::new("right_shoulder", 180.0, 100.0, conf);
        PoseFrame::new(keypoints)
    }

    fn render(
        surface: &mut RgbaImage,
        pose: &PoseFrame,
        previous: Option<&PoseFrame>,
        selection: &SelectionSet,
        trace: Option<RgbaImage>,
        recording: bool,
    ) -> Option<RgbaImage> {
        let config = TrackerConfig::default();
        render_overlay(
            surface,
            DIMS,
            std::slice::from_ref(pose),
            previous,
            selection,
            trace,
            recording,
            &config,
        )
    }

    #[test]
    fn test_surface_is_resized_and_cleared() {
        let mut surface = RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255]));
        render_overlay(
            &mut surface,
            DIMS,
            &[],
            None,
            &SelectionSet::new(),
            None,
            false,
            &TrackerConfig::default(),
        );
        assert_eq!(surface.dimensions(), DIMS);
        assert!(surface.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_confident_edge_is_drawn() {
        let mut surface = RgbaImage::new(1, 1);
        render(&mut surface, &shoulders(0.9), None, &SelectionSet::new(), None, false);

        // shoulder-to-shoulder is the eighth skeleton edge
        let [r, g, b] = POSE_COLORS[LIMB_COLOR_INDICES[7]];
        assert_eq!(*surface.get_pixel(100, 100), Rgba([r, g, b, 255]));
    }

    #[test]
    fn test_low_confidence_edge_is_skipped() {
        let mut surface = RgbaImage::new(1, 1);
        render(&mut surface, &shoulders(0.4), None, &SelectionSet::new(), None, false);

        assert_eq!(*surface.get_pixel(100, 100), TRANSPARENT);
        // markers are still shown above the keypoint threshold
        assert_ne!(*surface.get_pixel(20, 100), TRANSPARENT);
    }

    #[test]
    fn test_low_confidence_keypoint_is_hidden() {
        let mut surface = RgbaImage::new(1, 1);
        render(&mut surface, &shoulders(0.2), None, &SelectionSet::new(), None, false);
        assert!(surface.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_selected_keypoint_uses_distinct_color() {
        let selection: SelectionSet = ["left_shoulder"].into_iter().collect();
        let mut surface = RgbaImage::new(1, 1);
        render(&mut surface, &shoulders(0.9), None, &selection, None, false);

        assert_eq!(*surface.get_pixel(20, 100), Color::SELECTED.to_rgba());
        assert_ne!(*surface.get_pixel(180, 100), Color::SELECTED.to_rgba());
    }

    #[test]
    fn test_short_frame_does_not_panic() {
        let pose = PoseFrame::from_coco(&[(50.0, 50.0, 0.9); 7]);
        let mut surface = RgbaImage::new(1, 1);
        render(&mut surface, &pose, Some(&pose), &SelectionSet::new(), None, false);
        assert_eq!(surface.dimensions(), DIMS);
    }

    #[test]
    fn test_trace_accumulates_while_recording() {
        let selection: SelectionSet = ["nose"].into_iter().collect();
        let config = TrackerConfig::default().with_keypoint_threshold(1.0);
        let mut surface = RgbaImage::new(1, 1);

        let mut first = uniform_frame(0.1);
        first.keypoints[0] = Keypoint::new("nose", 20.0, 20.0, 0.1);
        let mut second = first.clone();
        second.keypoints[0].x = 60.0;
        let mut third = first.clone();
        third.keypoints[0].x = 100.0;

        let mut trace = None;
        for (pose, previous) in [(&second, &first), (&third, &second)] {
            trace = render_overlay(
                &mut surface,
                DIMS,
                std::slice::from_ref(pose),
                Some(previous),
                &selection,
                trace,
                true,
                &config,
            );
        }

        let trace = trace.unwrap();
        // both segments persist in the trace buffer and on the surface
        assert_eq!(*trace.get_pixel(40, 20), Color::TRACE.to_rgba());
        assert_eq!(*trace.get_pixel(80, 20), Color::TRACE.to_rgba());
        assert_eq!(*surface.get_pixel(40, 20), Color::TRACE.to_rgba());
    }

    #[test]
    fn test_trace_is_stable_for_identical_frames() {
        let selection: SelectionSet = ["left_shoulder"].into_iter().collect();
        let pose = shoulders(0.9);
        let mut surface = RgbaImage::new(1, 1);

        let first = render(&mut surface, &pose, Some(&pose), &selection, None, true);
        let second = render(&mut surface, &pose, Some(&pose), &selection, first.clone(), true);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_trace_dropped_when_not_recording() {
        let selection: SelectionSet = ["left_shoulder"].into_iter().collect();
        let pose = shoulders(0.9);
        let mut surface = RgbaImage::new(1, 1);

        let trace = render(&mut surface, &pose, Some(&pose), &selection, None, true);
        let trace = render(&mut surface, &pose, Some(&pose), &selection, trace, false);
        assert!(trace.is_none());

        let trace = render(&mut surface, &pose, Some(&pose), &SelectionSet::new(), None, true);
        assert!(trace.is_none());
    }

    #[test]
    fn test_trace_kept_across_empty_ticks() {
        let selection: SelectionSet = ["left_shoulder"].into_iter().collect();
        let pose = shoulders(0.9);
        let mut surface = RgbaImage::new(1, 1);
        let config = TrackerConfig::default();

        let trace = render(&mut surface, &pose, Some(&pose), &selection, None, true);
        let kept = render_overlay(
            &mut surface,
            DIMS,
            &[],
            Some(&pose),
            &selection,
            trace.clone(),
            true,
            &config,
        );
        assert_eq!(kept, trace);
    }

    #[test]
    fn test_composite_blends_overlay() {
        let frame = RgbImage::from_pixel(4, 4, Rgb([10, 10, 10]));
        let mut overlay = RgbaImage::new(4, 4);
        overlay.put_pixel(1, 1, Rgba([255, 0, 0, 255]));

        let out = composite(&frame, &overlay);
        assert_eq!(*out.get_pixel(1, 1), Rgb([255, 0, 0]));
        assert_eq!(*out.get_pixel(2, 2), Rgb([10, 10, 10]));
    }

    #[test]
    fn test_hud_label() {
        let mut state = ExerciseState::new(Exercise::Squat);
        state.rep_count = 3;
        assert_eq!(hud_label(&state, false).as_deref(), Some("SQUAT  3 reps"));
        assert_eq!(hud_label(&state, true).as_deref(), Some("REC  SQUAT  3 reps"));
        assert!(hud_label(&ExerciseState::default(), false).is_none());
        assert_eq!(hud_label(&ExerciseState::default(), true).as_deref(), Some("REC"));
    }
}
