use anyhow::Result;

use crate::coords::Viewport;
use crate::input::InputState;
use crate::surface::RenderSurface;
use crate::time::FrameTime;

/// Read-only view of the current frame handed to `perform_logic`.
#[derive(Debug, Copy, Clone)]
pub struct FrameInput<'a> {
    pub input: &'a InputState,
    pub time: FrameTime,
    /// Drawable area at the start of the frame.
    pub viewport: Viewport,
}

/// The capability set every game screen provides.
///
/// Operations run on the driver's thread, to completion, one at a time.
pub trait Stage {
    /// Name used in log messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Acquires the stage's resources (images, entities). Called exactly once,
    /// before the first frame.
    fn init(&mut self, surface: &mut dyn RenderSurface) -> Result<()>;

    /// Releases everything `init` (and the constructor) acquired. Called
    /// exactly once, at shutdown.
    fn destroy(&mut self);

    /// Advances the stage by one frame.
    fn perform_logic(&mut self, frame: &FrameInput<'_>);

    /// Draws the stage. Runs after `perform_logic` in the same frame.
    fn render_scene(&mut self, surface: &mut dyn RenderSurface);
}

impl<S> Stage for Box<S>
where
    S: Stage + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self, surface: &mut dyn RenderSurface) -> Result<()> {
        (**self).init(surface)
    }

    fn destroy(&mut self) {
        (**self).destroy();
    }

    fn perform_logic(&mut self, frame: &FrameInput<'_>) {
        (**self).perform_logic(frame);
    }

    fn render_scene(&mut self, surface: &mut dyn RenderSurface) {
        (**self).render_scene(surface);
    }
}
