use std::path::Path;

use crate::coords::Viewport;

use super::decode::{check_texture_fits, decode_rgba};
use super::{ImageHandle, ImageId, ImageRegistry, LoadError, RenderSurface};

/// One recorded `draw` call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub image: ImageId,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Render surface without a GPU or window.
///
/// Images are decoded (so load failures behave like the GPU surface) but
/// only their size is kept. Every frame's draw calls are recorded and can be
/// inspected after `present`.
pub struct HeadlessSurface {
    viewport: Viewport,
    max_texture_side: u32,
    images: ImageRegistry<()>,
    pending: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
    clears: u64,
    presents: u64,
}

/// `max_texture_dimension_2d` of wgpu's default limits.
const DEFAULT_MAX_TEXTURE_SIDE: u32 = 8192;

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl HeadlessSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            max_texture_side: DEFAULT_MAX_TEXTURE_SIDE,
            images: ImageRegistry::new(),
            pending: Vec::new(),
            last_frame: Vec::new(),
            clears: 0,
            presents: 0,
        }
    }

    /// Rejects images larger than `side` on either axis, like a GPU with that limit.
    pub fn with_texture_limit(mut self, side: u32) -> Self {
        self.max_texture_side = side;
        self
    }

    /// Draw calls of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }

    /// Draw calls queued since the last `clear`.
    pub fn pending(&self) -> &[DrawCall] {
        &self.pending
    }

    pub fn clears(&self) -> u64 {
        self.clears
    }

    pub fn presents(&self) -> u64 {
        self.presents
    }

    /// Images still referenced by at least one handle, as of the last `present`.
    pub fn live_images(&self) -> usize {
        self.images.len()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }
}

impl RenderSurface for HeadlessSurface {
    fn clear(&mut self) {
        self.clears += 1;
        self.pending.clear();
    }

    fn present(&mut self) {
        self.presents += 1;
        self.last_frame = std::mem::take(&mut self.pending);
        self.images.collect_released();
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, LoadError> {
        let rgba = decode_rgba(path)?;
        let (w, h) = rgba.dimensions();
        check_texture_fits(path, w, h, self.max_texture_side)?;
        let handle = self.images.insert(w, h, path, ());
        log::debug!("loaded {} ({w}x{h}) from {}", handle.id(), path.display());
        Ok(handle)
    }

    fn draw(&mut self, image: &ImageHandle, x: i32, y: i32) {
        if self.images.get(image).is_none() {
            log::warn!(
                "unable to draw {} ({}): not loaded on this surface",
                image.id(),
                image.path().display()
            );
            return;
        }
        let (width, height) = image.size();
        self.pending.push(DrawCall {
            image: image.id(),
            x,
            y,
            width,
            height,
        });
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::LoadErrorKind;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        image::RgbaImage::new(w, h).save(&path).unwrap();
        path
    }

    #[test]
    fn draw_uses_native_image_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = HeadlessSurface::new(640.0, 480.0);
        let img = surface.load_image(&write_png(dir.path(), "p.png", 16, 24)).unwrap();

        surface.clear();
        surface.draw(&img, 5, -3);
        surface.present();

        assert_eq!(
            surface.last_frame(),
            &[DrawCall { image: img.id(), x: 5, y: -3, width: 16, height: 24 }]
        );
    }

    #[test]
    fn clear_discards_unpresented_draws() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = HeadlessSurface::new(64.0, 64.0);
        let img = surface.load_image(&write_png(dir.path(), "p.png", 1, 1)).unwrap();

        surface.clear();
        surface.draw(&img, 0, 0);
        surface.clear();
        assert!(surface.pending().is_empty());
        assert_eq!(surface.clears(), 2);
    }

    #[test]
    fn foreign_image_is_skipped() {
        let mut surface = HeadlessSurface::new(64.0, 64.0);
        let foreign = ImageHandle::new(ImageId(42), 4, 4, "elsewhere.png");

        surface.clear();
        surface.draw(&foreign, 0, 0);
        surface.present();
        assert!(surface.last_frame().is_empty());
    }

    #[test]
    fn present_releases_dropped_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = HeadlessSurface::new(64.0, 64.0);
        let img = surface.load_image(&write_png(dir.path(), "p.png", 2, 2)).unwrap();
        surface.present();
        assert_eq!(surface.live_images(), 1);

        drop(img);
        surface.present();
        assert_eq!(surface.live_images(), 0);
    }

    #[test]
    fn loaded_handle_remembers_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "hero.png", 3, 3);
        let mut surface = HeadlessSurface::new(64.0, 64.0);

        let img = surface.load_image(&path).unwrap();
        assert_eq!(img.path(), path.as_path());
    }

    #[test]
    fn image_over_texture_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 8, 2);
        let mut surface = HeadlessSurface::new(64.0, 64.0).with_texture_limit(4);

        let err = surface.load_image(&path).unwrap_err();
        assert!(matches!(err.kind, LoadErrorKind::TooLarge { width: 8, height: 2, max: 4 }));
        assert_eq!(surface.live_images(), 0);
    }

    #[test]
    fn resize_changes_reported_viewport() {
        let mut surface = HeadlessSurface::new(64.0, 48.0);
        assert_eq!(surface.viewport(), Viewport::new(64.0, 48.0));

        surface.resize(800.0, 600.0);
        assert_eq!(surface.viewport(), Viewport::new(800.0, 600.0));
    }

    #[test]
    fn missing_file_reports_load_error() {
        let mut surface = HeadlessSurface::new(64.0, 64.0);
        let err = surface.load_image(Path::new("/definitely/missing.png")).unwrap_err();
        assert!(err.is_not_found());
    }
}
