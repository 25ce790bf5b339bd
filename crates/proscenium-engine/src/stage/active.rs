use anyhow::{Context, Result};

use crate::surface::RenderSurface;

use super::contract::{FrameInput, Stage};

/// Where an [`ActiveStage`] is in its lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StagePhase {
    /// Constructed; `init` has not succeeded yet.
    Created,
    /// `init` succeeded; frames may run.
    Running,
    /// `destroy` ran. Terminal.
    Destroyed,
}

/// The single stage owned by the driver.
///
/// Enforces the lifecycle contract around any [`Stage`]:
/// - `init` succeeds at most once, before any frame
/// - `perform_logic` / `render_scene` only while running
/// - `destroy` reaches the stage at most once, and dropping the wrapper
///   destroys the stage if nobody did
///
/// Ordering violations are programming errors and panic.
pub struct ActiveStage {
    stage: Box<dyn Stage>,
    phase: StagePhase,
}

impl ActiveStage {
    pub fn new<S>(stage: S) -> Self
    where
        S: Stage + 'static,
    {
        Self::from_boxed(Box::new(stage))
    }

    pub fn from_boxed(stage: Box<dyn Stage>) -> Self {
        log::debug!("stage `{}` created", stage.name());
        Self {
            stage,
            phase: StagePhase::Created,
        }
    }

    pub fn name(&self) -> &str {
        self.stage.name()
    }

    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    /// Runs the stage's `init`.
    ///
    /// A failed `init` leaves the stage in `Created`; the error carries the
    /// stage name.
    ///
    /// # Panics
    ///
    /// If the stage is already running or destroyed.
    pub fn init(&mut self, surface: &mut dyn RenderSurface) -> Result<()> {
        assert!(
            self.phase == StagePhase::Created,
            "stage `{}`: init called while {:?}",
            self.stage.name(),
            self.phase
        );

        self.stage
            .init(surface)
            .with_context(|| format!("failed to initialize stage `{}`", self.stage.name()))?;

        self.phase = StagePhase::Running;
        log::debug!("stage `{}` initialized", self.stage.name());
        Ok(())
    }

    /// # Panics
    ///
    /// Unless the stage is running.
    pub fn perform_logic(&mut self, frame: &FrameInput<'_>) {
        self.expect_running("perform_logic");
        self.stage.perform_logic(frame);
    }

    /// # Panics
    ///
    /// Unless the stage is running.
    pub fn render_scene(&mut self, surface: &mut dyn RenderSurface) {
        self.expect_running("render_scene");
        self.stage.render_scene(surface);
    }

    /// Runs the stage's `destroy` unless it already ran. Idempotent.
    pub fn destroy(&mut self) {
        if self.phase == StagePhase::Destroyed {
            return;
        }
        self.stage.destroy();
        self.phase = StagePhase::Destroyed;
        log::debug!("stage `{}` destroyed", self.stage.name());
    }

    fn expect_running(&self, op: &str) {
        assert!(
            self.phase == StagePhase::Running,
            "stage `{}`: {op} called while {:?}",
            self.stage.name(),
            self.phase
        );
    }
}

impl Drop for ActiveStage {
    fn drop(&mut self) {
        self.destroy();
    }
}
