//! Colour utilities for the backdrop.

use ratatui::style::Color;
use starfall_core::Hsl;

/// Deep space blue at the top of the backdrop (#020617).
pub const BACKDROP_TOP: Rgb = Rgb::new(2.0, 6.0, 23.0);
/// Slightly lighter blue at the bottom (#0f172a).
pub const BACKDROP_BOTTOM: Rgb = Rgb::new(15.0, 23.0, 42.0);

/// An RGB colour with channels in `0.0..=255.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation toward `other`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(channel(self.r), channel(self.g), channel(self.b))
    }
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Convert HSL to RGB color.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let Hsl { h, s, l } = hsl;
    if s == 0.0 {
        let v = l * 255.0;
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let h = h / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Rgb::new(r * 255.0, g * 255.0, b * 255.0)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 1.0, 0.5)).to_color(), Color::Rgb(255, 0, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(240.0, 1.0, 0.5)).to_color(), Color::Rgb(0, 0, 255));
        assert_eq!(hsl_to_rgb(Hsl::new(77.0, 0.0, 1.0)).to_color(), Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_star_palette_is_blue_purple() {
        let rgb = hsl_to_rgb(Hsl::new(250.0, 0.8, 0.85));
        assert!(rgb.b > rgb.r && rgb.b > rgb.g);
    }

    #[test]
    fn test_to_color_clamps() {
        assert_eq!(Rgb::new(-4.0, 300.0, 127.6).to_color(), Color::Rgb(0, 255, 128));
    }
}
