//! Pluggable game screens.
//!
//! A stage is one screen (title card, gameplay, pause...) exposing a fixed
//! four-operation lifecycle: `init`, `perform_logic`, `render_scene`,
//! `destroy`. The driver holds exactly one stage as a trait object and never
//! learns its concrete type.
//!
//! Two ways to write one:
//! - implement [`Stage`] on your own type, or
//! - keep the screen's state in a plain struct and bind four free functions to
//!   it through a `'static` [`StageInterface`] table, wrapped by [`TableStage`].
//!   A table with a missing operation is rejected at construction.
//!
//! Either way the result is wrapped in an [`ActiveStage`], which enforces
//! ordering (init before frames, destroy exactly once) and destroys the stage
//! when dropped.

mod active;
mod contract;
mod table;

pub use active::{ActiveStage, StagePhase};
pub use contract::{FrameInput, Stage};
pub use table::{DestroyFn, InitFn, LogicFn, RenderFn, StageInterface, TableStage};
