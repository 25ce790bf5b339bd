use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use proscenium_engine::coords::Viewport;
use proscenium_engine::entity::Entity;
use proscenium_engine::stage::{FrameInput, Stage};
use proscenium_engine::surface::RenderSurface;

/// Pixels moved per frame while a direction key is held.
const PLAYER_STEP: i32 = 4;

/// A single player sprite steered with the arrow keys or WASD.
pub struct Gameplay {
    assets: PathBuf,
    player: Option<Entity>,
}

pub fn gameplay_stage(assets: &Path) -> Gameplay {
    Gameplay {
        assets: assets.to_path_buf(),
        player: None,
    }
}

impl Gameplay {
    pub fn player(&self) -> Option<&Entity> {
        self.player.as_ref()
    }
}

impl Stage for Gameplay {
    fn name(&self) -> &str {
        "gameplay"
    }

    fn init(&mut self, surface: &mut dyn RenderSurface) -> Result<()> {
        let image = surface
            .load_image(&self.assets.join("player.png"))
            .context("player sprite")?;

        let viewport = surface.viewport();
        let (w, h) = image.size();
        let x = (viewport.width as i32 - w as i32) / 2;
        let y = (viewport.height as i32 - h as i32) / 2;

        self.player = Some(Entity::new(image, x, y));
        Ok(())
    }

    fn destroy(&mut self) {
        self.player = None;
    }

    fn perform_logic(&mut self, frame: &FrameInput<'_>) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let (dx, dy) = frame.input.direction();
        player.translate(dx * PLAYER_STEP, dy * PLAYER_STEP);
        keep_inside(player, frame.viewport);
    }

    fn render_scene(&mut self, surface: &mut dyn RenderSurface) {
        if let Some(player) = &self.player {
            player.draw(surface);
        }
    }
}

fn keep_inside(entity: &mut Entity, viewport: Viewport) {
    let (w, h) = entity.size();
    let max_x = (viewport.width as i32 - w as i32).max(0);
    let max_y = (viewport.height as i32 - h as i32).max(0);
    let (x, y) = entity.position();
    entity.set_position(x.clamp(0, max_x), y.clamp(0, max_y));
}
