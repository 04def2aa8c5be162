//! Draw functions for every layer of the backdrop.

use starfall_core::{Point, Viewport};

use crate::animations::meteor::Meteor;
use crate::animations::star::{Star, WRAP_MARGIN};
use crate::color::{BACKDROP_BOTTOM, BACKDROP_TOP, Rgb, hsl_to_rgb};
use crate::field::Starfield;
use crate::surface::{Blend, GradientStop, RadialGradient, Surface};

/// Star trails are drawn at this fraction of the star's opacity.
pub const TRAIL_OPACITY_SCALE: f32 = 0.5;

const METEOR_TRAIL: Rgb = Rgb::new(150.0, 180.0, 255.0);
const METEOR_HEAD: Rgb = Rgb::new(200.0, 220.0, 255.0);

const VIGNETTE: [GradientStop; 2] = [
    GradientStop::new(0.0, Rgb::new(25.0, 33.0, 68.0), 0.2),
    GradientStop::new(1.0, Rgb::new(9.0, 12.0, 25.0), 0.0),
];

const NEBULA: [GradientStop; 3] = [
    GradientStop::new(0.0, Rgb::new(63.0, 81.0, 181.0), 0.02),
    GradientStop::new(0.5, Rgb::new(103.0, 58.0, 183.0), 0.015),
    GradientStop::new(1.0, Rgb::new(33.0, 33.0, 33.0), 0.0),
];

/// Paint the deep navy gradient behind everything.
pub fn draw_backdrop<S: Surface + ?Sized>(surface: &mut S) {
    surface.fill_vertical_gradient(BACKDROP_TOP, BACKDROP_BOTTOM);
}

/// Whether a star's scroll-adjusted position is close enough to the viewport to draw.
pub fn is_star_visible(star: &Star, scroll_y: f32, viewport: Viewport) -> bool {
    let y = star.effective_y(scroll_y);
    y > -WRAP_MARGIN && y < viewport.height + WRAP_MARGIN
}

/// Draw a star's trail, disc and (for larger stars) glow, shifted by scroll parallax.
pub fn draw_star<S: Surface + ?Sized>(surface: &mut S, star: &Star, scroll_y: f32) {
    let shift = star.scroll_shift(scroll_y);
    let shifted = |p: Point| Point::new(p.x, p.y - shift);
    let color = hsl_to_rgb(star.color);
    let pos = shifted(star.pos);

    if !star.trail.is_empty() {
        let alpha = star.opacity * TRAIL_OPACITY_SCALE;
        let points: Vec<Point> = star
            .trail
            .iter()
            .copied()
            .map(shifted)
            .chain(std::iter::once(pos))
            .collect();
        for pair in points.windows(2) {
            surface.stroke_line(pair[0], pair[1], 1.0, color, alpha);
        }
    }

    surface.fill_circle(pos, star.radius, color, star.opacity, Blend::Over);

    if star.has_glow() {
        let stops = [
            GradientStop::new(0.0, color, 0.3),
            GradientStop::new(1.0, color, 0.0),
        ];
        let glow = RadialGradient {
            center: pos,
            inner: star.radius * 0.5,
            outer: star.radius * 3.0,
            stops: &stops,
        };
        surface.fill_radial_gradient(&glow, Some(star.radius * 2.0), Blend::Add);
    }
}

/// Draw a meteor's fading trail, bright head and soft glow.
pub fn draw_meteor<S: Surface + ?Sized>(surface: &mut S, meteor: &Meteor) {
    let len = meteor.trail.len() as f32;
    for (i, (prev, point)) in meteor
        .trail
        .iter()
        .zip(meteor.trail.iter().skip(1))
        .enumerate()
    {
        let i = (i + 1) as f32;
        surface.stroke_line(
            prev.pos,
            point.pos,
            meteor.size * (1.0 - i / len),
            METEOR_TRAIL,
            point.opacity * 0.7,
        );
    }

    surface.fill_circle(meteor.pos, meteor.size * 1.5, METEOR_HEAD, 0.8, Blend::Over);

    let stops = [
        GradientStop::new(0.0, METEOR_TRAIL, 0.4),
        GradientStop::new(1.0, METEOR_TRAIL, 0.0),
    ];
    let glow = RadialGradient {
        center: meteor.pos,
        inner: 0.0,
        outer: meteor.size * 6.0,
        stops: &stops,
    };
    surface.fill_radial_gradient(&glow, Some(meteor.size * 6.0), Blend::Add);
}

/// Large radial vignette centred on the viewport, moving up with scroll.
pub fn draw_vignette<S: Surface + ?Sized>(surface: &mut S, viewport: Viewport, scroll_y: f32) {
    let center = viewport.center();
    let gradient = RadialGradient {
        center: Point::new(center.x, center.y - scroll_y),
        inner: 0.0,
        outer: viewport.max_dimension() / 1.5,
        stops: &VIGNETTE,
    };
    surface.fill_radial_gradient(&gradient, None, Blend::Add);
}

/// Faint nebula glow toward the upper-right corner.
pub fn draw_nebula<S: Surface + ?Sized>(surface: &mut S, viewport: Viewport, scroll_y: f32) {
    let gradient = RadialGradient {
        center: Point::new(viewport.width * 0.8, viewport.height * 0.2 - scroll_y * 0.2),
        inner: 0.0,
        outer: viewport.width * 0.4,
        stops: &NEBULA,
    };
    surface.fill_radial_gradient(&gradient, None, Blend::Add);
}

/// Render one complete frame of the field.
pub fn render_frame<S: Surface + ?Sized>(surface: &mut S, field: &Starfield) {
    let viewport = field.viewport();
    let scroll_y = field.scroll_y();

    surface.clear();
    draw_backdrop(surface);

    for star in field
        .stars()
        .iter()
        .filter(|star| is_star_visible(star, scroll_y, viewport))
    {
        draw_star(surface, star, scroll_y);
    }

    for meteor in field.meteors().iter().filter(|meteor| meteor.active) {
        draw_meteor(surface, meteor);
    }

    draw_vignette(surface, viewport, scroll_y);
    draw_nebula(surface, viewport, scroll_y);
}
