/// Keyboard key identifier.
///
/// Only keys a game screen is likely to bind are named; everything else maps
/// to `Key::Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Events produced by an input source.
///
/// `Quit` is the termination request: once the driver sees it, no further
/// stage operation runs that frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Quit,

    Key {
        key: Key,
        state: KeyState,
        /// True when the event is an OS key-repeat.
        repeat: bool,
    },

    /// Window focus change.
    Focused(bool),
}

impl InputEvent {
    pub fn is_quit(&self) -> bool {
        matches!(self, InputEvent::Quit)
    }

    /// Shorthand for a non-repeat key press.
    pub fn key_pressed(key: Key) -> Self {
        InputEvent::Key { key, state: KeyState::Pressed, repeat: false }
    }

    /// Shorthand for a key release.
    pub fn key_released(key: Key) -> Self {
        InputEvent::Key { key, state: KeyState::Released, repeat: false }
    }
}
