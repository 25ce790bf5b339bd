//! Input subsystem (the input-source collaborator).
//!
//! Public API is platform-agnostic and does not expose winit types. The
//! window runtime translates platform events into [`InputEvent`]s and pushes
//! them onto an [`EventQueue`]; the driver drains the queue once per frame.

pub mod platform;

mod source;
mod state;
mod types;

pub use source::{EventQueue, InputSource, ScriptedInput};
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState};
