//! GPU rendering.
//!
//! Sprite positions are logical pixels (top-left origin, +Y down); the vertex
//! shader maps them to NDC through a viewport uniform.

mod sprite;

pub use sprite::{GpuImage, Sprite, SpriteDevice, SpritePass, SpriteRenderer};
