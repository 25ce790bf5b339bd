use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use proscenium_engine::driver::Driver;
use proscenium_engine::input::{InputEvent, Key, ScriptedInput};
use proscenium_engine::logging::{init_logging, LoggingConfig};
use proscenium_engine::stage::Stage;
use proscenium_engine::surface::HeadlessSurface;
use proscenium_engine::window::{Runtime, RuntimeConfig};

mod stages;

use stages::{gameplay_stage, title_stage};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum StageKind {
    Title,
    Gameplay,
}

#[derive(Parser)]
#[command(name = "proscenium-demo")]
#[command(about = "Drives one demo stage in a window or headless")]
#[command(version)]
struct Cli {
    /// Stage to run
    #[arg(short, long, value_enum, default_value = "gameplay")]
    stage: StageKind,

    /// Run without a window, against a recording surface
    #[arg(long)]
    headless: bool,

    /// Frames to drive in headless mode
    #[arg(short, long, default_value = "120")]
    frames: u64,

    /// Directory holding the demo images
    #[arg(short, long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))]
    assets: PathBuf,

    /// Log filter, e.g. "debug" or "proscenium_engine=trace" (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = match &cli.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    };
    init_logging(logging);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let stage: Box<dyn Stage> = match cli.stage {
        StageKind::Title => Box::new(title_stage(&cli.assets)),
        StageKind::Gameplay => Box::new(gameplay_stage(&cli.assets)),
    };

    if cli.headless {
        run_headless(stage, cli.frames)
    } else {
        Runtime::run(RuntimeConfig::default(), stage)
    }
}

fn run_headless(stage: Box<dyn Stage>, frames: u64) -> Result<()> {
    let config = RuntimeConfig::default();
    let mut surface = HeadlessSurface::new(
        config.initial_size.width as f32,
        config.initial_size.height as f32,
    );
    let mut input = demo_script(frames);

    let mut driver = Driver::from_boxed(stage);
    let driven = driver.run(&mut surface, &mut input, Some(frames))?;

    log::info!(
        "headless run finished: {driven} frames, {} draws in the last one",
        surface.last_frame().len()
    );
    Ok(())
}

/// Holds the right arrow for the first half of the run.
fn demo_script(frames: u64) -> ScriptedInput {
    let half = (frames / 2).clamp(1, 600) as usize;
    let mut batches = vec![Vec::new(); half];
    batches[0].push(InputEvent::key_pressed(Key::ArrowRight));
    batches.push(vec![InputEvent::key_released(Key::ArrowRight)]);
    ScriptedInput::new(batches)
}
