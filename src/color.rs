/// RGBA in `0.0..=1.0`, laid out for the particle instance buffer.
///
/// Components are sRGB encoded unless converted with [`Rgba::to_linear`].
#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Decodes the colour channels for a surface that encodes sRGB on write.
    /// Alpha is left alone.
    pub fn to_linear(self) -> Self {
        let [r, g, b] =
            [self.r, self.g, self.b].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let linear = egui::Rgba::from_srgba_unmultiplied(r, g, b, 255);
        Self::new(linear.r(), linear.g(), linear.b(), self.a)
    }
}

/// Hue in degrees, saturation and lightness in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }
}

impl From<Hsl> for Rgba {
    fn from(hsl: Hsl) -> Self {
        let h = hsl.h.rem_euclid(360.0) / 60.0;
        let s = hsl.s.clamp(0.0, 1.0);
        let l = hsl.l.clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        let m = l - chroma / 2.0;
        Rgba::new(r + m, g + m, b + m, 1.0)
    }
}
