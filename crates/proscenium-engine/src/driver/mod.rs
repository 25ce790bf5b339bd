//! Per-frame loop around the active stage.
//!
//! One frame is, in order: `clear`, drain input, `perform_logic`,
//! `render_scene`, `present`. A `Quit` event ends the frame right after the
//! drain, so no stage operation runs and nothing is presented.

use anyhow::{Result, bail};

use crate::input::{InputSource, InputState};
use crate::stage::{ActiveStage, FrameInput, Stage};
use crate::surface::RenderSurface;
use crate::time::FrameClock;

/// What the caller should do after a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Owns the single stage and the per-frame state handed to it.
pub struct Driver {
    stage: ActiveStage,
    input: InputState,
    clock: FrameClock,
}

impl Driver {
    pub fn new<S>(stage: S) -> Self
    where
        S: Stage + 'static,
    {
        Self::from_boxed(Box::new(stage))
    }

    pub fn from_boxed(stage: Box<dyn Stage>) -> Self {
        Self {
            stage: ActiveStage::from_boxed(stage),
            input: InputState::with_focus(true),
            clock: FrameClock::new(),
        }
    }

    pub fn stage(&self) -> &ActiveStage {
        &self.stage
    }

    /// Frames fully driven (logic, render and present) so far.
    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }

    /// Initializes the stage. Must run once before the first `frame`.
    pub fn start(&mut self, surface: &mut dyn RenderSurface) -> Result<()> {
        self.stage.init(surface)?;
        self.clock.reset();
        log::info!("stage `{}` started", self.stage.name());
        Ok(())
    }

    /// Drives one frame.
    pub fn frame(
        &mut self,
        surface: &mut dyn RenderSurface,
        source: &mut dyn InputSource,
    ) -> LoopControl {
        surface.clear();

        self.input.begin_frame();
        let mut quit = false;
        for ev in source.poll() {
            if ev.is_quit() {
                quit = true;
            } else {
                self.input.apply_event(&ev);
            }
        }
        if quit {
            log::info!("quit requested after {} frames", self.clock.frames());
            return LoopControl::Exit;
        }

        let frame = FrameInput {
            input: &self.input,
            time: self.clock.tick(),
            viewport: surface.viewport(),
        };
        self.stage.perform_logic(&frame);
        self.stage.render_scene(surface);
        surface.present();

        LoopControl::Continue
    }

    /// Destroys the stage. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.stage.destroy();
    }

    /// Runs `start`, then frames until `Quit`, `max_frames` or a lost surface,
    /// then `shutdown`. Returns the number of frames driven.
    pub fn run(
        &mut self,
        surface: &mut dyn RenderSurface,
        source: &mut dyn InputSource,
        max_frames: Option<u64>,
    ) -> Result<u64> {
        self.start(surface)?;

        while max_frames.is_none_or(|max| self.clock.frames() < max) {
            if self.frame(surface, source) == LoopControl::Exit {
                break;
            }
            if surface.is_lost() {
                self.shutdown();
                bail!("render surface lost after {} frames", self.clock.frames());
            }
        }

        self.shutdown();
        Ok(self.clock.frames())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use super::*;
    use crate::coords::Viewport;
    use crate::input::{InputEvent, Key, ScriptedInput};
    use crate::stage::StageInterface;
    use crate::stage::TableStage;
    use crate::surface::{ImageHandle, LoadError, LoadErrorKind};

    type Trace = Rc<RefCell<Vec<String>>>;

    /// Surface that only logs which operations ran.
    struct TraceSurface {
        trace: Trace,
    }

    impl RenderSurface for TraceSurface {
        fn clear(&mut self) {
            self.trace.borrow_mut().push("clear".into());
        }

        fn present(&mut self) {
            self.trace.borrow_mut().push("present".into());
        }

        fn load_image(&mut self, path: &Path) -> Result<ImageHandle, LoadError> {
            Err(LoadError::new(path, LoadErrorKind::NotFound))
        }

        fn draw(&mut self, _: &ImageHandle, _: i32, _: i32) {}

        fn viewport(&self) -> Viewport {
            Viewport::new(100.0, 100.0)
        }
    }

    struct TraceStage {
        trace: Trace,
    }

    impl Stage for TraceStage {
        fn init(&mut self, _: &mut dyn RenderSurface) -> Result<()> {
            self.trace.borrow_mut().push("init".into());
            Ok(())
        }

        fn destroy(&mut self) {
            self.trace.borrow_mut().push("destroy".into());
        }

        fn perform_logic(&mut self, frame: &FrameInput<'_>) {
            let mut trace = self.trace.borrow_mut();
            trace.push("perform_logic".into());
            if !frame.input.focused {
                trace.push("unfocused".into());
            }
            if frame.input.key_pressed(Key::Space) {
                trace.push("space".into());
            }
        }

        fn render_scene(&mut self, _: &mut dyn RenderSurface) {
            self.trace.borrow_mut().push("render_scene".into());
        }
    }

    fn traced() -> (Driver, TraceSurface, Trace) {
        let trace = Trace::default();
        let driver = Driver::new(TraceStage { trace: trace.clone() });
        let surface = TraceSurface { trace: trace.clone() };
        (driver, surface, trace)
    }

    fn stage_calls(trace: &Trace) -> Vec<String> {
        trace
            .borrow()
            .iter()
            .filter(|s| !matches!(s.as_str(), "clear" | "present"))
            .cloned()
            .collect()
    }

    #[test]
    fn init_once_then_alternating_logic_render() {
        let (mut driver, mut surface, trace) = traced();
        let frames = driver
            .run(&mut surface, &mut ScriptedInput::idle(10), Some(4))
            .unwrap();
        assert_eq!(frames, 4);

        let mut expected = vec!["init".to_string()];
        for _ in 0..4 {
            expected.push("perform_logic".into());
            expected.push("render_scene".into());
        }
        expected.push("destroy".into());
        assert_eq!(stage_calls(&trace), expected);
    }

    #[test]
    fn frame_brackets_stage_between_clear_and_present() {
        let (mut driver, mut surface, trace) = traced();
        driver.start(&mut surface).unwrap();
        trace.borrow_mut().clear();

        let control = driver.frame(&mut surface, &mut ScriptedInput::idle(1));
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(
            *trace.borrow(),
            ["clear", "perform_logic", "render_scene", "present"]
        );
    }

    #[test]
    fn quit_stops_before_stage_and_present() {
        let (mut driver, mut surface, trace) = traced();
        let mut input = ScriptedInput::new([
            vec![],
            vec![InputEvent::key_pressed(Key::Space), InputEvent::Quit],
        ]);

        let frames = driver.run(&mut surface, &mut input, None).unwrap();
        assert_eq!(frames, 1);

        let trace = trace.borrow();
        let tail: Vec<&str> = trace.iter().rev().take(3).rev().map(String::as_str).collect();
        assert_eq!(tail, ["present", "clear", "destroy"]);
        assert!(!trace.iter().any(|s| s == "space"));
    }

    #[test]
    fn input_reaches_logic_in_the_same_frame() {
        let (mut driver, mut surface, trace) = traced();
        let mut input = ScriptedInput::new([vec![InputEvent::key_pressed(Key::Space)]]).quit_when_done();

        driver.run(&mut surface, &mut input, None).unwrap();
        assert_eq!(
            stage_calls(&trace),
            ["init", "perform_logic", "space", "render_scene", "destroy"]
        );
    }

    #[test]
    fn window_starts_focused_until_told_otherwise() {
        let (mut driver, mut surface, trace) = traced();
        let mut input = ScriptedInput::new([vec![], vec![InputEvent::Focused(false)]]).quit_when_done();

        driver.run(&mut surface, &mut input, None).unwrap();
        assert_eq!(
            stage_calls(&trace),
            [
                "init",
                "perform_logic",
                "render_scene",
                "perform_logic",
                "unfocused",
                "render_scene",
                "destroy",
            ]
        );
    }

    #[test]
    fn shutdown_twice_destroys_once() {
        let (mut driver, mut surface, trace) = traced();
        driver.start(&mut surface).unwrap();
        driver.shutdown();
        driver.shutdown();
        drop(driver);

        let destroys = trace.borrow().iter().filter(|s| *s == "destroy").count();
        assert_eq!(destroys, 1);
    }

    #[derive(Default)]
    struct Counter {
        count: u32,
        seen: Rc<RefCell<Vec<u32>>>,
        released: bool,
    }

    fn counter_init(_: &mut Counter, _: &mut dyn RenderSurface) -> Result<()> {
        Ok(())
    }

    fn counter_destroy(c: &mut Counter) {
        c.released = true;
    }

    fn counter_logic(c: &mut Counter, _: &FrameInput<'_>) {
        c.count += 1;
    }

    fn counter_render(c: &mut Counter, _: &mut dyn RenderSurface) {
        c.seen.borrow_mut().push(c.count);
    }

    static COUNTER: StageInterface<Counter> = StageInterface {
        init: Some(counter_init),
        destroy: Some(counter_destroy),
        perform_logic: Some(counter_logic),
        render_scene: Some(counter_render),
    };

    static COUNTER_NO_RENDER: StageInterface<Counter> = StageInterface {
        init: Some(counter_init),
        destroy: Some(counter_destroy),
        perform_logic: Some(counter_logic),
        render_scene: None,
    };

    #[test]
    fn counter_records_one_two_three() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let counter = Counter { seen: seen.clone(), ..Counter::default() };
        let mut driver = Driver::new(TableStage::new(counter, &COUNTER));
        let mut surface = crate::surface::HeadlessSurface::new(64.0, 64.0);

        let frames = driver
            .run(&mut surface, &mut ScriptedInput::idle(3).quit_when_done(), None)
            .unwrap();

        assert_eq!(frames, 3);
        assert_eq!(*seen.borrow(), [1, 2, 3]);
        assert_eq!(surface.presents(), 3);
        assert_eq!(surface.clears(), 4);
    }

    #[test]
    #[should_panic(expected = "missing render_scene")]
    fn missing_render_scene_fails_before_any_frame() {
        let _ = Driver::new(TableStage::new(Counter::default(), &COUNTER_NO_RENDER));
    }

    #[test]
    #[should_panic(expected = "perform_logic called while Created")]
    fn frame_without_start_panics() {
        let (mut driver, mut surface, _) = traced();
        driver.frame(&mut surface, &mut ScriptedInput::idle(1));
    }

    #[test]
    fn failed_start_skips_frames() {
        struct NeedsAsset;

        impl Stage for NeedsAsset {
            fn init(&mut self, surface: &mut dyn RenderSurface) -> Result<()> {
                surface.load_image(Path::new("missing.png"))?;
                Ok(())
            }
            fn destroy(&mut self) {}
            fn perform_logic(&mut self, _: &FrameInput<'_>) {
                unreachable!()
            }
            fn render_scene(&mut self, _: &mut dyn RenderSurface) {
                unreachable!()
            }
        }

        let trace = Trace::default();
        let mut surface = TraceSurface { trace: trace.clone() };
        let mut driver = Driver::new(NeedsAsset);

        let err = driver
            .run(&mut surface, &mut ScriptedInput::idle(5), None)
            .unwrap_err();
        assert!(format!("{err:#}").contains("missing.png"));
        assert!(trace.borrow().is_empty());
    }
}
