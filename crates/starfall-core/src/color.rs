//! HSL colour templates.

/// A hue/saturation/lightness colour without alpha.
///
/// Stars keep one of these as their base colour; the alpha is supplied at draw
/// time from the star's current opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in degrees (0-360).
    pub h: f32,
    /// Saturation (0.0-1.0).
    pub s: f32,
    /// Lightness (0.0-1.0).
    pub l: f32,
}

impl Hsl {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }
}
