// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Interactive window showing composited frames.
//!
//! Keys: `0`-`3` pick none/push-up/pull-up/squat, `R` toggles recording, `D` toggles
//! detection, `S` takes a screenshot, `Esc`/`Q` quit. A left click toggles the
//! selection of the nearest keypoint.

use image::RgbImage;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::{Result, TrackerError};
use crate::exercise::Exercise;
use crate::session::SessionEvent;

/// Something the user asked for in the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerAction {
    /// A change to the session.
    Session(SessionEvent),
    /// Save the current composited frame.
    Screenshot,
}

/// Map a pressed key to its action.
#[must_use]
pub const fn action_for_key(key: Key) -> Option<ViewerAction> {
    let event = match key {
        Key::Key0 | Key::NumPad0 => SessionEvent::ExerciseSelected(Exercise::None),
        Key::Key1 | Key::NumPad1 => SessionEvent::ExerciseSelected(Exercise::PushUp),
        Key::Key2 | Key::NumPad2 => SessionEvent::ExerciseSelected(Exercise::PullUp),
        Key::Key3 | Key::NumPad3 => SessionEvent::ExerciseSelected(Exercise::Squat),
        Key::R => SessionEvent::RecordingToggled,
        Key::D => SessionEvent::DetectionToggled,
        Key::Escape | Key::Q => SessionEvent::Shutdown,
        Key::S => return Some(ViewerAction::Screenshot),
        _ => return None,
    };
    Some(ViewerAction::Session(event))
}

/// A simple image viewer using minifb.
pub struct Viewer {
    window: Window,
    width: usize,
    height: usize,
    buffer: Vec<u32>,
    mouse_was_down: bool,
}

impl Viewer {
    /// Create a new viewer window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be created.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| TrackerError::VisualizerError(format!("Failed to create window: {e}")))?;

        // Limit update rate
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));

        Ok(Self {
            window,
            width,
            height,
            buffer: vec![0; width * height],
            mouse_was_down: false,
        })
    }

    /// Check if the window is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Show a composited frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be updated.
    pub fn show(&mut self, image: &RgbImage) -> Result<()> {
        let (img_width, img_height) = (image.width() as usize, image.height() as usize);
        self.buffer.clear();
        // 0x00RRGGBB
        self.buffer.extend(
            image
                .pixels()
                .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2])),
        );
        self.width = img_width;
        self.height = img_height;
        self.refresh()
    }

    /// Redraw the last frame, keeping the window responsive between frames.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be updated.
    pub fn refresh(&mut self) -> Result<()> {
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| TrackerError::VisualizerError(format!("Failed to update window: {e}")))
    }

    /// Collect actions since the last call.
    ///
    /// Click positions are mapped from window to frame coordinates. A closed window
    /// reports [`SessionEvent::Shutdown`].
    #[must_use]
    pub fn poll_actions(&mut self) -> Vec<ViewerAction> {
        if !self.window.is_open() {
            return vec![ViewerAction::Session(SessionEvent::Shutdown)];
        }

        let mut actions: Vec<ViewerAction> = self
            .window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(action_for_key)
            .collect();

        let down = self.window.get_mouse_down(MouseButton::Left);
        if down
            && !self.mouse_was_down
            && let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Discard)
        {
            let (win_w, win_h) = self.window.get_size();
            #[allow(clippy::cast_precision_loss)]
            let (sx, sy) = (
                self.width as f32 / win_w.max(1) as f32,
                self.height as f32 / win_h.max(1) as f32,
            );
            actions.push(ViewerAction::Session(SessionEvent::KeypointClicked {
                x: x * sx,
                y: y * sy,
            }));
        }
        self.mouse_was_down = down;

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            action_for_key(Key::Key3),
            Some(ViewerAction::Session(SessionEvent::ExerciseSelected(
                Exercise::Squat
            )))
        );
        assert_eq!(
            action_for_key(Key::R),
            Some(ViewerAction::Session(SessionEvent::RecordingToggled))
        );
        assert_eq!(
            action_for_key(Key::Escape),
            Some(ViewerAction::Session(SessionEvent::Shutdown))
        );
        assert_eq!(action_for_key(Key::S), Some(ViewerAction::Screenshot));
        assert_eq!(action_for_key(Key::Z), None);
    }
}
