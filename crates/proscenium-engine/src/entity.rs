//! Positioned drawable.

use crate::surface::{ImageHandle, RenderSurface};

/// An image at a position, in logical pixels from the top-left corner.
///
/// The entity holds a shared handle, so the image stays loaded for as long
/// as the entity lives.
#[derive(Debug, Clone)]
pub struct Entity {
    pub x: i32,
    pub y: i32,
    image: ImageHandle,
}

impl Entity {
    pub fn new(image: ImageHandle, x: i32, y: i32) -> Self {
        Self { x, y, image }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    pub fn image(&self) -> &ImageHandle {
        &self.image
    }

    /// Native size of the image.
    pub fn size(&self) -> (u32, u32) {
        self.image.size()
    }

    pub fn draw(&self, surface: &mut dyn RenderSurface) {
        surface.draw(&self.image, self.x, self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, HeadlessSurface};

    fn surface_with_image(w: u32, h: u32) -> (HeadlessSurface, ImageHandle, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e.png");
        image::RgbaImage::new(w, h).save(&path).unwrap();

        let mut surface = HeadlessSurface::new(320.0, 240.0);
        let img = surface.load_image(&path).unwrap();
        (surface, img, dir)
    }

    #[test]
    fn draw_places_image_at_entity_position() {
        let (mut surface, img, _dir) = surface_with_image(8, 12);
        let mut player = Entity::new(img.clone(), 10, 20);
        player.translate(5, -4);

        surface.clear();
        player.draw(&mut surface);
        surface.present();

        assert_eq!(player.position(), (15, 16));
        assert_eq!(
            surface.last_frame(),
            &[DrawCall { image: img.id(), x: 15, y: 16, width: 8, height: 12 }]
        );
    }

    #[test]
    fn entities_share_one_image() {
        let (mut surface, img, _dir) = surface_with_image(4, 4);
        let a = Entity::new(img.clone(), 0, 0);
        let b = Entity::new(img, 50, 0);
        assert_eq!(a.image(), b.image());
        assert_eq!(a.size(), (4, 4));

        drop(a);
        surface.present();
        assert_eq!(surface.live_images(), 1);

        drop(b);
        surface.present();
        assert_eq!(surface.live_images(), 0);
    }

    #[test]
    fn translate_saturates() {
        let (_surface, img, _dir) = surface_with_image(1, 1);
        let mut e = Entity::new(img, i32::MAX - 1, 0);
        e.translate(10, 0);
        assert_eq!(e.x, i32::MAX);

        e.set_position(-3, 7);
        assert_eq!(e.position(), (-3, 7));
    }
}
