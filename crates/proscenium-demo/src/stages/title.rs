use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use proscenium_engine::entity::Entity;
use proscenium_engine::stage::{FrameInput, StageInterface, TableStage};
use proscenium_engine::surface::RenderSurface;

/// Frames the prompt stays on (and then off) while blinking.
const BLINK_FRAMES: u64 = 30;

/// Logo with a blinking "press start" prompt under it.
#[derive(Default)]
pub struct TitleCard {
    assets: PathBuf,
    logo: Option<Entity>,
    prompt: Option<Entity>,
    ticks: u64,
}

static TITLE: StageInterface<TitleCard> = StageInterface {
    init: Some(title_init),
    destroy: Some(title_destroy),
    perform_logic: Some(title_logic),
    render_scene: Some(title_render),
};

pub fn title_stage(assets: &Path) -> TableStage<TitleCard> {
    let card = TitleCard {
        assets: assets.to_path_buf(),
        ..TitleCard::default()
    };
    TableStage::new(card, &TITLE).with_name("title")
}

impl TitleCard {
    fn prompt_visible(&self) -> bool {
        (self.ticks / BLINK_FRAMES) % 2 == 0
    }
}

fn title_init(card: &mut TitleCard, surface: &mut dyn RenderSurface) -> Result<()> {
    let logo = surface
        .load_image(&card.assets.join("title.png"))
        .context("title logo")?;
    let prompt = surface
        .load_image(&card.assets.join("prompt.png"))
        .context("title prompt")?;

    card.logo = Some(Entity::new(logo, 0, 0));
    card.prompt = Some(Entity::new(prompt, 0, 0));
    card.ticks = 0;
    Ok(())
}

fn title_destroy(card: &mut TitleCard) {
    card.logo = None;
    card.prompt = None;
}

fn title_logic(card: &mut TitleCard, frame: &FrameInput<'_>) {
    let (Some(logo), Some(prompt)) = (card.logo.as_mut(), card.prompt.as_mut()) else {
        return;
    };

    // Re-centre every frame so window resizes are picked up.
    let vw = frame.viewport.width as i32;
    let vh = frame.viewport.height as i32;
    let (lw, lh) = logo.size();
    let (pw, _) = prompt.size();

    let logo_y = vh / 3 - lh as i32 / 2;
    logo.set_position((vw - lw as i32) / 2, logo_y);
    prompt.set_position((vw - pw as i32) / 2, logo_y + lh as i32 + 24);

    card.ticks = card.ticks.wrapping_add(1);
}

fn title_render(card: &mut TitleCard, surface: &mut dyn RenderSurface) {
    if let Some(logo) = &card.logo {
        logo.draw(surface);
    }
    if card.prompt_visible() {
        if let Some(prompt) = &card.prompt {
            prompt.draw(surface);
        }
    }
}
