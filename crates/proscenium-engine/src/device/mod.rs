//! GPU device + surface management.
//!
//! Creates the wgpu device/queue, configures the swapchain for the window and
//! hands out per-frame encoders.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
