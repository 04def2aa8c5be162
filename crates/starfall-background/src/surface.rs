//! Drawing surface abstraction and the terminal raster behind it.

use ratatui::{
    style::Style,
    text::{Line, Span},
};
use starfall_core::{Point, Viewport};
use thiserror::Error;

use crate::color::Rgb;

/// How a paint operation combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Alpha compositing over the destination.
    Over,
    /// Add the source scaled by alpha (lighten).
    Add,
}

/// A colour stop of a radial gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, `0.0..=1.0`.
    pub offset: f32,
    pub color: Rgb,
    pub alpha: f32,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgb, alpha: f32) -> Self {
        Self {
            offset,
            color,
            alpha,
        }
    }
}

/// A concentric radial gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient<'a> {
    pub center: Point,
    /// Radius where the first stop applies.
    pub inner: f32,
    /// Radius where the last stop applies.
    pub outer: f32,
    pub stops: &'a [GradientStop],
}

impl RadialGradient<'_> {
    /// Colour and alpha at `distance` from the centre.
    pub fn sample(&self, distance: f32) -> (Rgb, f32) {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return (Rgb::default(), 0.0);
        };
        let span = self.outer - self.inner;
        let t = if span > 0.0 {
            ((distance - self.inner) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };

        if t <= first.offset {
            return (first.color, first.alpha);
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let local = if b.offset > a.offset {
                    (t - a.offset) / (b.offset - a.offset)
                } else {
                    1.0
                };
                return (
                    a.color.lerp(b.color, local),
                    a.alpha + (b.alpha - a.alpha) * local,
                );
            }
        }
        (last.color, last.alpha)
    }
}

/// Something the backdrop can be drawn onto. Coordinates are virtual pixels.
pub trait Surface {
    fn viewport(&self) -> Viewport;

    /// Reset every pixel to black.
    fn clear(&mut self);

    /// Opaque vertical gradient over the whole surface.
    fn fill_vertical_gradient(&mut self, top: Rgb, bottom: Rgb);

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32, blend: Blend);

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgb, alpha: f32);

    /// Paint a radial gradient, limited to a circle of `clip` radius or the whole surface.
    fn fill_radial_gradient(&mut self, gradient: &RadialGradient<'_>, clip: Option<f32>, blend: Blend);
}

/// Errors acquiring a terminal raster.
#[derive(Debug, Error, PartialEq)]
pub enum SurfaceError {
    #[error("drawing area is empty ({cols}x{rows} cells)")]
    Empty { cols: u16, rows: u16 },
    #[error("pixels_per_cell must be positive, got {0}")]
    Scale(f32),
    #[error("terminal does not advertise truecolor support")]
    NoTruecolor,
}

/// Lines drawn by strokes thinner than this fraction of a dot are boosted to it.
const MIN_LINE_COVERAGE: f32 = 0.35;

/// An RGB pixel buffer rendered with upper half blocks.
///
/// One terminal cell holds two vertically stacked dots; every dot covers
/// `scale` by `scale` virtual pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    cols: u16,
    rows: u16,
    scale: f32,
    pixels: Vec<Rgb>,
}

impl Raster {
    /// Create a raster for a `cols` x `rows` cell area.
    pub fn new(cols: u16, rows: u16, scale: f32) -> Result<Self, SurfaceError> {
        if cols == 0 || rows == 0 {
            return Err(SurfaceError::Empty { cols, rows });
        }
        if scale.is_nan() || scale <= 0.0 {
            return Err(SurfaceError::Scale(scale));
        }
        Ok(Self {
            cols,
            rows,
            scale,
            pixels: vec![Rgb::default(); cols as usize * rows as usize * 2],
        })
    }

    /// Viewport in virtual pixels for a cell area at the given scale.
    pub fn viewport_for(cols: u16, rows: u16, scale: f32) -> Viewport {
        Viewport::new(
            f32::from(cols) * scale,
            f32::from(rows) * 2.0 * scale,
        )
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    fn dot_rows(&self) -> usize {
        self.rows as usize * 2
    }

    /// Pixel at dot coordinates.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.cols as usize || y >= self.dot_rows() {
            return None;
        }
        self.pixels.get(y * self.cols as usize + x).copied()
    }

    /// Blend onto the dot at (x, y), ignoring out-of-range dots.
    fn blend_dot(&mut self, x: i64, y: i64, color: Rgb, alpha: f32, blend: Blend) {
        if x < 0 || y < 0 || x >= i64::from(self.cols) || y >= self.dot_rows() as i64 {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let idx = y as usize * self.cols as usize + x as usize;
        let Some(dst) = self.pixels.get_mut(idx) else {
            return;
        };
        *dst = match blend {
            Blend::Over => dst.lerp(color, alpha),
            Blend::Add => Rgb::new(
                (dst.r + color.r * alpha).min(255.0),
                (dst.g + color.g * alpha).min(255.0),
                (dst.b + color.b * alpha).min(255.0),
            ),
        };
    }

    fn dot_center(&self, x: i64, y: i64) -> Point {
        Point::new(
            (x as f32 + 0.5) * self.scale,
            (y as f32 + 0.5) * self.scale,
        )
    }

    /// Dot index range covering `lo..=hi` virtual pixels on an axis of `len` dots.
    fn dot_span(&self, lo: f32, hi: f32, len: usize) -> std::ops::Range<i64> {
        let start = (lo / self.scale).floor().max(0.0) as i64;
        let end = ((hi / self.scale).floor() as i64 + 1).min(len as i64);
        start..end.max(start)
    }

    /// Convert to one line per terminal row.
    pub fn to_lines(&self) -> Vec<Line<'static>> {
        (0..self.rows as usize)
            .map(|row| {
                let spans: Vec<Span> = (0..self.cols as usize)
                    .map(|col| {
                        let top = self.pixel(col, row * 2).unwrap_or_default();
                        let bottom = self.pixel(col, row * 2 + 1).unwrap_or_default();
                        Span::styled(
                            "▀",
                            Style::new().fg(top.to_color()).bg(bottom.to_color()),
                        )
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Surface for Raster {
    fn viewport(&self) -> Viewport {
        Raster::viewport_for(self.cols, self.rows, self.scale)
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgb::default());
    }

    fn fill_vertical_gradient(&mut self, top: Rgb, bottom: Rgb) {
        let dot_rows = self.dot_rows();
        let cols = self.cols as usize;
        for (y, row) in self.pixels.chunks_mut(cols).enumerate() {
            let color = top.lerp(bottom, (y as f32 + 0.5) / dot_rows as f32);
            row.fill(color);
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32, blend: Blend) {
        if radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        // Box-filtered coverage: a dot is fully covered once its centre is
        // half a dot inside the edge
        let reach = radius + self.scale * 0.5;
        let xs = self.dot_span(center.x - reach, center.x + reach, self.cols as usize);
        let ys = self.dot_span(center.y - reach, center.y + reach, self.dot_rows());
        for y in ys {
            for x in xs.clone() {
                let distance = self.dot_center(x, y).distance(center);
                let coverage = ((reach - distance) / self.scale).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_dot(x, y, color, alpha * coverage, blend);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgb, alpha: f32) {
        if alpha <= 0.0 || width <= 0.0 {
            return;
        }
        let coverage = (width / self.scale).clamp(MIN_LINE_COVERAGE, 1.0);
        let length = from.distance(to);
        let samples = ((length / (self.scale * 0.5)).ceil() as usize).max(1);

        let mut last = None;
        for i in 0..=samples {
            let t = i as f32 / samples as f32;
            let x = ((from.x + (to.x - from.x) * t) / self.scale).floor() as i64;
            let y = ((from.y + (to.y - from.y) * t) / self.scale).floor() as i64;
            // Consecutive samples often land in the same dot
            if last == Some((x, y)) {
                continue;
            }
            last = Some((x, y));
            self.blend_dot(x, y, color, alpha * coverage, Blend::Over);
        }
    }

    fn fill_radial_gradient(&mut self, gradient: &RadialGradient<'_>, clip: Option<f32>, blend: Blend) {
        let (xs, ys) = match clip {
            Some(radius) => (
                self.dot_span(gradient.center.x - radius, gradient.center.x + radius, self.cols as usize),
                self.dot_span(gradient.center.y - radius, gradient.center.y + radius, self.dot_rows()),
            ),
            None => (0..i64::from(self.cols), 0..self.dot_rows() as i64),
        };
        for y in ys {
            for x in xs.clone() {
                let distance = self.dot_center(x, y).distance(gradient.center);
                if clip.is_some_and(|radius| distance > radius) {
                    continue;
                }
                let (color, alpha) = gradient.sample(distance);
                if alpha > 0.0 {
                    self.blend_dot(x, y, color, alpha, blend);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BACKDROP_BOTTOM, BACKDROP_TOP};

    const WHITE: Rgb = Rgb::new(255.0, 255.0, 255.0);

    fn raster() -> Raster {
        Raster::new(10, 5, 8.0).unwrap()
    }

    #[test]
    fn test_lines_match_cell_grid() {
        let raster = raster();
        assert_eq!((raster.cols(), raster.rows()), (10, 5));
        let lines = raster.to_lines();
        assert_eq!(lines.len(), usize::from(raster.rows()));
        assert!(lines.iter().all(|line| line.width() == usize::from(raster.cols())));
    }

    #[test]
    fn test_empty_area_is_rejected() {
        assert_eq!(
            Raster::new(0, 5, 8.0),
            Err(SurfaceError::Empty { cols: 0, rows: 5 })
        );
        assert!(matches!(Raster::new(3, 3, 0.0), Err(SurfaceError::Scale(_))));
    }

    #[test]
    fn test_viewport_in_virtual_pixels() {
        assert_eq!(raster().viewport(), Viewport::new(80.0, 80.0));
    }

    #[test]
    fn test_vertical_gradient_runs_top_to_bottom() {
        let mut raster = raster();
        raster.fill_vertical_gradient(BACKDROP_TOP, BACKDROP_BOTTOM);
        let top = raster.pixel(0, 0).unwrap();
        let bottom = raster.pixel(9, 9).unwrap();
        assert!(top.b < bottom.b);
        assert!((top.b - BACKDROP_TOP.b).abs() < 2.0);
        assert!((bottom.b - BACKDROP_BOTTOM.b).abs() < 2.0);
        assert_eq!(raster.pixel(3, 0), raster.pixel(7, 0));
    }

    #[test]
    fn test_small_circle_lights_its_dot() {
        let mut raster = raster();
        raster.fill_circle(Point::new(20.0, 20.0), 1.0, WHITE, 1.0, Blend::Over);
        let lit = raster.pixel(2, 2).unwrap();
        assert!(lit.r > 100.0);
        assert_eq!(raster.pixel(5, 5), Some(Rgb::default()));
    }

    #[test]
    fn test_additive_blend_accumulates() {
        let mut raster = raster();
        let gradient = RadialGradient {
            center: Point::new(40.0, 40.0),
            inner: 0.0,
            outer: 100.0,
            stops: &[
                GradientStop::new(0.0, Rgb::new(100.0, 0.0, 0.0), 0.5),
                GradientStop::new(1.0, Rgb::new(100.0, 0.0, 0.0), 0.5),
            ],
        };
        raster.fill_radial_gradient(&gradient, None, Blend::Add);
        raster.fill_radial_gradient(&gradient, None, Blend::Add);
        assert_eq!(raster.pixel(4, 4).unwrap().r, 100.0);
    }

    #[test]
    fn test_clip_limits_gradient() {
        let mut raster = raster();
        let stops = [
            GradientStop::new(0.0, WHITE, 1.0),
            GradientStop::new(1.0, WHITE, 1.0),
        ];
        let gradient = RadialGradient {
            center: Point::new(4.0, 4.0),
            inner: 0.0,
            outer: 10.0,
            stops: &stops,
        };
        raster.fill_radial_gradient(&gradient, Some(6.0), Blend::Over);
        assert_eq!(raster.pixel(0, 0), Some(WHITE));
        assert_eq!(raster.pixel(3, 3), Some(Rgb::default()));
    }

    #[test]
    fn test_gradient_sampling() {
        let stops = [
            GradientStop::new(0.0, Rgb::new(0.0, 0.0, 0.0), 1.0),
            GradientStop::new(0.5, Rgb::new(100.0, 0.0, 0.0), 0.5),
            GradientStop::new(1.0, Rgb::new(200.0, 0.0, 0.0), 0.0),
        ];
        let gradient = RadialGradient {
            center: Point::default(),
            inner: 10.0,
            outer: 30.0,
            stops: &stops,
        };
        assert_eq!(gradient.sample(0.0), (Rgb::new(0.0, 0.0, 0.0), 1.0));
        assert_eq!(gradient.sample(20.0), (Rgb::new(100.0, 0.0, 0.0), 0.5));
        assert_eq!(gradient.sample(25.0), (Rgb::new(150.0, 0.0, 0.0), 0.25));
        assert_eq!(gradient.sample(99.0), (Rgb::new(200.0, 0.0, 0.0), 0.0));
    }

    #[test]
    fn test_line_touches_both_ends() {
        let mut raster = raster();
        raster.stroke_line(
            Point::new(4.0, 4.0),
            Point::new(76.0, 4.0),
            8.0,
            WHITE,
            1.0,
        );
        assert_eq!(raster.pixel(0, 0), Some(WHITE));
        assert_eq!(raster.pixel(9, 0), Some(WHITE));
        assert_eq!(raster.pixel(0, 1), Some(Rgb::default()));
    }

    #[test]
    fn test_lines_use_half_blocks() {
        let mut raster = raster();
        raster.fill_vertical_gradient(BACKDROP_TOP, BACKDROP_BOTTOM);
        let lines = raster.to_lines();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].spans.len(), 10);
        assert_eq!(lines[0].spans[0].content, "▀");
    }
}
