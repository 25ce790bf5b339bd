use anyhow::{Context, Result, anyhow};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::GpuInit;
use crate::driver::{Driver, LoopControl};
use crate::input::platform::winit::translate_window_event;
use crate::input::EventQueue;
use crate::paint::Color;
use crate::stage::Stage;
use crate::surface::{RenderSurface, WgpuSurface};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Colour every frame starts from.
    pub clear_color: Color,
    pub gpu: GpuInit,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Proscenium".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            clear_color: Color::SKY,
            gpu: GpuInit::default(),
        }
    }
}

/// Entry point for windowed runs.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `stage` until the window is closed.
    ///
    /// Window or GPU setup failures and stage `init` failures are returned.
    /// The stage is destroyed before the surface and window go away.
    pub fn run<S>(config: RuntimeConfig, stage: S) -> Result<()>
    where
        S: Stage + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, Driver::new(stage));

        let outcome = event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error");

        state.teardown();
        outcome?;

        match state.error.take() {
            Some(err) => Err(err),
            None => {
                log::info!("exited cleanly after {} frames", state.driver.frames());
                Ok(())
            }
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    surface: WgpuSurface<'this>,
}

struct AppState {
    config: RuntimeConfig,
    driver: Driver,
    events: EventQueue,

    entry: Option<WindowEntry>,
    error: Option<anyhow::Error>,
    exit_requested: bool,
}

impl AppState {
    fn new(config: RuntimeConfig, driver: Driver) -> Self {
        Self {
            config,
            driver,
            events: EventQueue::new(),
            entry: None,
            error: None,
            exit_requested: false,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        let clear_color = self.config.clear_color;

        WindowEntryTryBuilder {
            window,
            surface_builder: |w| {
                pollster::block_on(WgpuSurface::new(w, gpu_init, clear_color))
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut entry = self.create_window_entry(event_loop)?;

        let driver = &mut self.driver;
        entry.with_surface_mut(|surface| driver.start(surface))?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        self.request_exit(event_loop);
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    /// Destroys the stage, then the surface and window.
    fn teardown(&mut self) {
        self.driver.shutdown();
        self.entry = None;
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Self { driver, events, entry, .. } = &mut *self;
        let Some(entry) = entry.as_mut() else {
            return;
        };

        let (control, lost) = entry.with_surface_mut(|surface| {
            let control = driver.frame(surface, events);
            (control, surface.is_lost())
        });

        if lost {
            let frames = driver.frames();
            self.fail(event_loop, anyhow!("render surface lost after {frames} frames"));
        } else if control == LoopControl::Exit {
            self.request_exit(event_loop);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(err) = self.open(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; FIFO presentation paces the loop.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if let Some(ev) = translate_window_event(&event) {
            self.events.push(ev);
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        match &event {
            WindowEvent::Resized(new_size) => {
                entry.with_surface_mut(|surface| surface.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_surface_mut(|surface| surface.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            // Ends the loop on the next frame, once the queued `Quit` is drained.
            WindowEvent::CloseRequested => {
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
