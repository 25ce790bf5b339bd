//! Proscenium engine crate.
//!
//! Drives exactly one pluggable [`stage::Stage`] through its lifecycle:
//! `init` once, then `perform_logic` / `render_scene` every frame, then
//! `destroy` once at shutdown. The driver loop only ever sees the abstract
//! stage capability, never a concrete screen type.

pub mod coords;
pub mod device;
pub mod driver;
pub mod entity;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod stage;
pub mod surface;
pub mod time;
pub mod window;
