//! Demo screens.
//!
//! `gameplay` implements `Stage` directly; `title` is a plain struct wired up
//! through a `StageInterface` table.

mod gameplay;
mod title;

pub use gameplay::gameplay_stage;
pub use title::title_stage;
