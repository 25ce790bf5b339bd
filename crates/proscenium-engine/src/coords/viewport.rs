/// Viewport size in logical pixels.
///
/// The sprite shader uses this as the basis for converting logical px
/// positions to NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns true when the integer rectangle `(x, y, w, h)` overlaps the viewport.
    pub fn intersects(self, x: i32, y: i32, w: u32, h: u32) -> bool {
        let (x0, y0) = (x as f32, y as f32);
        let (x1, y1) = (x0 + w as f32, y0 + h as f32);
        x1 > 0.0 && y1 > 0.0 && x0 < self.width && y0 < self.height
    }
}
