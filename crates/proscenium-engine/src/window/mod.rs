//! Window + runtime loop.
//!
//! Owns the `winit` event loop and the single window, and drives the stage
//! against a `WgpuSurface` bound to it.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
