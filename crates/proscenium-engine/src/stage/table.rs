use anyhow::Result;

use crate::surface::RenderSurface;

use super::contract::{FrameInput, Stage};

pub type InitFn<T> = fn(&mut T, &mut dyn RenderSurface) -> Result<()>;
pub type DestroyFn<T> = fn(&mut T);
pub type LogicFn<T> = fn(&mut T, &FrameInput<'_>);
pub type RenderFn<T> = fn(&mut T, &mut dyn RenderSurface);

/// Operation table for instances of `T`.
///
/// One `'static` table is shared by every instance of a stage type:
///
/// ```rust,ignore
/// static TITLE: StageInterface<TitleCard> = StageInterface {
///     init: Some(title_init),
///     destroy: Some(title_destroy),
///     perform_logic: Some(title_logic),
///     render_scene: Some(title_render),
/// };
///
/// let stage = TableStage::new(TitleCard::default(), &TITLE);
/// ```
///
/// `destroy` must release everything the instance's constructor and `init`
/// acquired.
pub struct StageInterface<T> {
    pub init: Option<InitFn<T>>,
    pub destroy: Option<DestroyFn<T>>,
    pub perform_logic: Option<LogicFn<T>>,
    pub render_scene: Option<RenderFn<T>>,
}

impl<T> StageInterface<T> {
    /// A table with every slot unset.
    pub const fn empty() -> Self {
        Self {
            init: None,
            destroy: None,
            perform_logic: None,
            render_scene: None,
        }
    }

    /// Names of the unset slots, in declaration order.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("init", self.init.is_none()),
            ("destroy", self.destroy.is_none()),
            ("perform_logic", self.perform_logic.is_none()),
            ("render_scene", self.render_scene.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, unset)| unset.then_some(name))
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// The four operations, resolved once at construction.
struct Bound<T> {
    init: InitFn<T>,
    destroy: DestroyFn<T>,
    perform_logic: LogicFn<T>,
    render_scene: RenderFn<T>,
}

/// A stage made of an instance and the table that interprets it.
///
/// The instance is owned and only ever touched by the table's operations.
pub struct TableStage<T: 'static> {
    name: String,
    instance: T,
    interface: &'static StageInterface<T>,
    ops: Bound<T>,
}

impl<T: 'static> TableStage<T> {
    /// Pairs `instance` with `interface`. No operation is invoked.
    ///
    /// # Panics
    ///
    /// If any of the four slots in `interface` is unset. An incompletely
    /// wired stage is a programming error and is never patched with a no-op.
    pub fn new(instance: T, interface: &'static StageInterface<T>) -> Self {
        let name = std::any::type_name::<T>();
        let StageInterface {
            init: Some(init),
            destroy: Some(destroy),
            perform_logic: Some(perform_logic),
            render_scene: Some(render_scene),
        } = *interface
        else {
            panic!(
                "stage `{name}` has an incomplete interface: missing {}",
                interface.missing().join(", ")
            );
        };

        Self {
            name: name.to_owned(),
            instance,
            interface,
            ops: Bound {
                init,
                destroy,
                perform_logic,
                render_scene,
            },
        }
    }

    /// Overrides the log name (defaults to the instance type name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The shared table this stage dispatches through.
    pub fn interface(&self) -> &'static StageInterface<T> {
        self.interface
    }

    pub fn instance(&self) -> &T {
        &self.instance
    }
}

impl<T: 'static> Stage for TableStage<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, surface: &mut dyn RenderSurface) -> Result<()> {
        (self.ops.init)(&mut self.instance, surface)
    }

    fn destroy(&mut self) {
        (self.ops.destroy)(&mut self.instance)
    }

    fn perform_logic(&mut self, frame: &FrameInput<'_>) {
        (self.ops.perform_logic)(&mut self.instance, frame)
    }

    fn render_scene(&mut self, surface: &mut dyn RenderSurface) {
        (self.ops.render_scene)(&mut self.instance, surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;
    use crate::surface::HeadlessSurface;
    use crate::time::FrameClock;

    #[derive(Default)]
    struct Probe {
        calls: Vec<&'static str>,
    }

    fn probe_init(p: &mut Probe, _: &mut dyn RenderSurface) -> Result<()> {
        p.calls.push("init");
        Ok(())
    }
    fn probe_destroy(p: &mut Probe) {
        p.calls.push("destroy");
    }
    fn probe_logic(p: &mut Probe, _: &FrameInput<'_>) {
        p.calls.push("perform_logic");
    }
    fn probe_render(p: &mut Probe, _: &mut dyn RenderSurface) {
        p.calls.push("render_scene");
    }

    const PROBE_OPS: StageInterface<Probe> = StageInterface {
        init: Some(probe_init),
        destroy: Some(probe_destroy),
        perform_logic: Some(probe_logic),
        render_scene: Some(probe_render),
    };

    static PROBE: StageInterface<Probe> = PROBE_OPS;

    static NO_RENDER: StageInterface<Probe> = StageInterface {
        render_scene: None,
        ..PROBE_OPS
    };

    static EMPTY: StageInterface<Probe> = StageInterface::empty();

    static ONLY_INIT: StageInterface<Probe> = StageInterface {
        init: Some(probe_init),
        ..StageInterface::empty()
    };

    #[test]
    fn construct_invokes_nothing() {
        let stage = TableStage::new(Probe::default(), &PROBE);
        assert!(stage.instance().calls.is_empty());
    }

    #[test]
    fn each_operation_forwards_exactly_once() {
        let mut stage = TableStage::new(Probe::default(), &PROBE);
        let mut surface = HeadlessSurface::new(64.0, 64.0);
        let input = InputState::default();
        let frame = FrameInput {
            input: &input,
            time: FrameClock::new().tick(),
            viewport: surface.viewport(),
        };

        stage.init(&mut surface).unwrap();
        assert_eq!(stage.instance().calls, ["init"]);

        stage.perform_logic(&frame);
        assert_eq!(stage.instance().calls, ["init", "perform_logic"]);

        stage.render_scene(&mut surface);
        assert_eq!(stage.instance().calls, ["init", "perform_logic", "render_scene"]);

        stage.destroy();
        assert_eq!(
            stage.instance().calls,
            ["init", "perform_logic", "render_scene", "destroy"]
        );
    }

    #[test]
    fn instances_share_one_table() {
        let a = TableStage::new(Probe::default(), &PROBE);
        let b = TableStage::new(Probe::default(), &PROBE);
        assert!(std::ptr::eq(a.interface(), b.interface()));
    }

    #[test]
    fn name_defaults_to_instance_type() {
        let stage = TableStage::new(Probe::default(), &PROBE);
        assert!(stage.name().ends_with("Probe"));
        assert_eq!(stage.with_name("probe").name(), "probe");
    }

    #[test]
    fn missing_lists_unset_slots_in_order() {
        assert!(PROBE.is_complete());
        assert_eq!(NO_RENDER.missing(), ["render_scene"]);
        assert_eq!(ONLY_INIT.missing(), ["destroy", "perform_logic", "render_scene"]);
        assert_eq!(EMPTY.missing().len(), 4);
    }

    #[test]
    #[should_panic(expected = "missing render_scene")]
    fn construct_rejects_missing_render_scene() {
        let _ = TableStage::new(Probe::default(), &NO_RENDER);
    }

    #[test]
    #[should_panic(expected = "missing destroy, perform_logic, render_scene")]
    fn construct_rejects_partial_table() {
        let _ = TableStage::new(Probe::default(), &ONLY_INIT);
    }

    #[test]
    #[should_panic(expected = "incomplete interface")]
    fn construct_rejects_empty_table() {
        let _ = TableStage::new(Probe::default(), &EMPTY);
    }
}
