/// Linear premultiplied RGBA color.
///
/// Invariant: `rgb` components are linear-light and multiplied by `a`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    /// Sky blue, sRGB `(77, 165, 255)`; the default clear colour.
    ///
    /// Stored pre-decoded so it can be a constant; equals
    /// `Color::from_srgb_u8(77, 165, 255, 255)`.
    pub const SKY: Color = Color::from_premul(0.074_213_57, 0.376_262_12, 1.0, 1.0);

    /// Creates a color from straight-alpha sRGB bytes (`0`–`255`).
    ///
    /// The rgb channels are decoded to linear light; alpha is already linear.
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let decode = |c: u8| srgb_to_linear(c as f32 / 255.0);
        Self::from_straight(decode(r), decode(g), decode(b), a as f32 / 255.0)
    }

    /// Creates a premultiplied color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Clear value for a target of `format`.
    ///
    /// sRGB targets encode on write, so they take linear values as-is.
    /// Anything else stores raw values and gets the sRGB encoding up front.
    pub(crate) fn to_wgpu(self, format: wgpu::TextureFormat) -> wgpu::Color {
        let c = if format.is_srgb() { self } else { self.encoded_srgb() };
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }

    fn encoded_srgb(self) -> Self {
        if self.a <= 0.0 {
            return Self::default();
        }
        let encode = |c: f32| linear_to_srgb(c / self.a) * self.a;
        Self {
            r: encode(self.r),
            g: encode(self.g),
            b: encode(self.b),
            a: self.a,
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
