//! Render surface (the drawing collaborator).
//!
//! A stage never touches wgpu directly. It loads images and draws them at
//! integer positions through [`RenderSurface`]; the driver clears and presents
//! around the stage's logic and render steps.
//!
//! Two implementations ship with the engine:
//! - [`WgpuSurface`]: window-bound, GPU-backed.
//! - [`HeadlessSurface`]: records draw calls, used by tests and headless runs.

mod decode;
mod error;
mod gpu;
mod headless;
mod handle;

use std::path::Path;

use crate::coords::Viewport;

pub use error::{LoadError, LoadErrorKind};
pub use gpu::WgpuSurface;
pub use headless::{DrawCall, HeadlessSurface};
pub use handle::{ImageHandle, ImageId, ImageRegistry};

/// Drawing operations available to the driver and to stages.
pub trait RenderSurface {
    /// Starts a frame by filling the surface with its clear color.
    fn clear(&mut self);

    /// Finishes the frame and shows it.
    fn present(&mut self);

    /// Loads an image file and uploads it for drawing.
    ///
    /// The returned handle keeps the image alive; once every clone is dropped
    /// the backing resource is released on a later `present`.
    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, LoadError>;

    /// Queues `image` at `(x, y)` using its native size as the target rect.
    ///
    /// Failures are logged, never returned: a missing sprite must not stop the frame.
    fn draw(&mut self, image: &ImageHandle, x: i32, y: i32);

    /// Current drawable area in logical pixels.
    fn viewport(&self) -> Viewport;

    /// True once the surface can no longer present (e.g. GPU out of memory).
    fn is_lost(&self) -> bool {
        false
    }
}
