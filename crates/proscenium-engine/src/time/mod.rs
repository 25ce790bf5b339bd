//! Frame timing.
//!
//! The driver ticks one `FrameClock` per presented frame and hands the
//! resulting `FrameTime` to the stage's logic step.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
