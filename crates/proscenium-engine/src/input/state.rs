use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Keyboard state visible to a stage during `perform_logic`.
///
/// `keys_down` persists across frames. `pressed` / `released` only hold the
/// transitions of the current frame and are reset by [`InputState::begin_frame`].
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    keys_down: HashSet<Key>,
    pressed: HashSet<Key>,
    released: HashSet<Key>,
}

impl InputState {
    /// Empty key state with the given focus.
    pub fn with_focus(focused: bool) -> Self {
        Self {
            focused,
            ..Self::default()
        }
    }

    /// Clears the per-frame transition sets.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    /// Applies one event.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Quit => {}

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck keys when focus changes mid-press.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        self.pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(key) {
                        self.released.insert(*key);
                    }
                }
            },
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// True if `key` went down during the current frame.
    pub fn key_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// True if `key` went up during the current frame.
    pub fn key_released(&self, key: Key) -> bool {
        self.released.contains(&key)
    }

    /// Returns `(dx, dy)` in `{-1, 0, 1}` from the arrow keys and WASD.
    pub fn direction(&self) -> (i32, i32) {
        let axis = |neg: [Key; 2], pos: [Key; 2]| {
            let n = neg.iter().any(|k| self.key_down(*k)) as i32;
            let p = pos.iter().any(|k| self.key_down(*k)) as i32;
            p - n
        };
        (
            axis([Key::ArrowLeft, Key::A], [Key::ArrowRight, Key::D]),
            axis([Key::ArrowUp, Key::W], [Key::ArrowDown, Key::S]),
        )
    }
}
