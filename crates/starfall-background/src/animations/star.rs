//! Stars: batch generation, the density formula and per-frame physics.

use std::collections::VecDeque;
use std::f32::consts::PI;

use rand::Rng;
use starfall_core::{Hsl, Point, Viewport};

/// Distance beyond the viewport edge at which a star wraps to the other side.
pub const WRAP_MARGIN: f32 = 50.0;
/// Pointer influence radius.
pub const POINTER_RADIUS: f32 = 250.0;
/// Push applied to a star sitting right under the pointer.
pub const POINTER_FORCE: f32 = 3.0;
/// Fraction of the offset from origin recovered each update.
pub const RETURN_RATE: f32 = 0.03;
/// Regular stars per virtual pixel of the larger viewport dimension.
pub const DENSITY: f64 = 0.07;
/// Cap on regular stars.
pub const MAX_REGULAR_STARS: usize = 250;
/// Large, bright, trail-less stars added on top of the regular batch.
pub const BRIGHT_STARS: usize = 15;
/// Twinkle bounds.
pub const MIN_OPACITY: f32 = 0.2;
pub const MAX_OPACITY: f32 = 1.0;
/// Scroll parallax per unit of radius.
pub const PARALLAX_PER_RADIUS: f32 = 0.1;
/// Stars larger than this get a glow.
pub const GLOW_RADIUS: f32 = 1.0;

/// A single star.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Current position.
    pub pos: Point,
    /// Rest position the star eases back to.
    pub origin: Point,
    pub radius: f32,
    /// Base colour; opacity is applied when drawing.
    pub color: Hsl,
    /// Drift speed.
    pub speed: f32,
    /// Drift direction in radians.
    pub angle: f32,
    /// Maximum number of trail points (0 means no trail).
    pub trail_length: usize,
    /// Recent positions, oldest first.
    pub trail: VecDeque<Point>,
    pub opacity: f32,
    /// Accumulated time in milliseconds.
    pub time_ms: f32,
    pub twinkle_speed: f32,
    pub twinkle_amplitude: f32,
}

impl Star {
    /// Create a star at `pos` with randomized angle, phase and twinkle.
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        pos: Point,
        radius: f32,
        color: Hsl,
        speed: f32,
        trail_length: usize,
    ) -> Self {
        Self {
            pos,
            origin: pos,
            radius,
            color,
            speed,
            angle: rng.r#gen::<f32>() * PI * 2.0,
            trail_length,
            trail: VecDeque::with_capacity(trail_length),
            opacity: rng.r#gen::<f32>() * 0.5 + 0.5,
            time_ms: rng.r#gen::<f32>() * 1000.0,
            twinkle_speed: rng.r#gen::<f32>() * 0.01 + 0.003,
            twinkle_amplitude: rng.r#gen::<f32>() * 0.3 + 0.1,
        }
    }

    /// Scroll parallax factor. Scales with radius, so larger stars shift more.
    pub fn parallax(&self) -> f32 {
        self.radius * PARALLAX_PER_RADIUS
    }

    /// Vertical offset subtracted from every drawn coordinate of this star.
    pub fn scroll_shift(&self, scroll_y: f32) -> f32 {
        scroll_y * self.parallax()
    }

    /// Scroll-adjusted vertical position used for drawing.
    pub fn effective_y(&self, scroll_y: f32) -> f32 {
        self.pos.y - self.scroll_shift(scroll_y)
    }

    pub fn has_glow(&self) -> bool {
        self.radius > GLOW_RADIUS
    }
}

/// Inputs shared by every star during one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// Time since the previous update.
    pub delta_ms: f32,
    /// Global simulation clock driving the shared drift oscillation.
    pub clock_ms: f32,
    /// Pointer position, present only while the pointer is active.
    pub pointer: Option<Point>,
    pub viewport: Viewport,
}

/// Number of regular stars for a viewport, before the bright supplement.
pub fn regular_star_count(viewport: Viewport) -> usize {
    let density = (f64::from(viewport.max_dimension()) * DENSITY).min(MAX_REGULAR_STARS as f64);
    // A fractional density still yields one more star
    density.max(0.0).ceil() as usize
}

/// Total number of stars generated for a viewport.
pub fn star_count(viewport: Viewport) -> usize {
    regular_star_count(viewport) + BRIGHT_STARS
}

/// Generate a fresh batch of stars covering the viewport.
pub fn generate_stars<R: Rng + ?Sized>(viewport: Viewport, rng: &mut R) -> Vec<Star> {
    let regular = regular_star_count(viewport);
    let mut stars = Vec::with_capacity(regular + BRIGHT_STARS);

    for _ in 0..regular {
        let pos = random_position(viewport, rng);
        let radius = rng.r#gen::<f32>() * 1.8 + 0.5;
        let speed = rng.r#gen::<f32>() * 0.5 + 0.1;
        // Blue to purple
        let color = Hsl::new(
            rng.r#gen::<f32>() * 60.0 + 220.0,
            rng.r#gen::<f32>() * 0.5 + 0.5,
            rng.r#gen::<f32>() * 0.3 + 0.7,
        );
        let trail_length = if rng.gen_bool(0.3) {
            rng.gen_range(5..20)
        } else {
            0
        };
        stars.push(Star::new(rng, pos, radius, color, speed, trail_length));
    }

    for _ in 0..BRIGHT_STARS {
        let pos = random_position(viewport, rng);
        let radius = rng.r#gen::<f32>() * 1.5 + 1.8;
        let speed = rng.r#gen::<f32>() * 0.3 + 0.05;
        let color = Hsl::new(rng.r#gen::<f32>() * 60.0 + 220.0, 0.8, 0.85);
        stars.push(Star::new(rng, pos, radius, color, speed, 0));
    }

    stars
}

fn random_position<R: Rng + ?Sized>(viewport: Viewport, rng: &mut R) -> Point {
    Point::new(
        rng.r#gen::<f32>() * viewport.width.max(0.0),
        rng.r#gen::<f32>() * viewport.height.max(0.0),
    )
}

/// Twinkle opacity at a given accumulated time.
pub fn twinkle_opacity(time_ms: f32, speed: f32, amplitude: f32) -> f32 {
    (0.5 + (time_ms * speed).sin() * amplitude).clamp(MIN_OPACITY, MAX_OPACITY)
}

/// Advance one star by one frame.
pub fn update_star(star: &mut Star, ctx: &StepContext) {
    star.time_ms += ctx.delta_ms;
    star.opacity = twinkle_opacity(star.time_ms, star.twinkle_speed, star.twinkle_amplitude);

    match ctx
        .pointer
        .map(|pointer| (pointer, star.pos.distance(pointer)))
        .filter(|&(_, distance)| distance < POINTER_RADIUS)
    {
        Some((pointer, distance)) => {
            // No direction to push in when the pointer sits exactly on the star
            if distance > f32::EPSILON {
                let force = (1.0 - distance / POINTER_RADIUS) * POINTER_FORCE;
                star.pos.x -= (pointer.x - star.pos.x) / distance * force;
                star.pos.y -= (pointer.y - star.pos.y) / distance * force;
            }
        }
        None => {
            star.pos.x += (star.origin.x - star.pos.x) * RETURN_RATE;
            star.pos.y += (star.origin.y - star.pos.y) * RETURN_RATE;
        }
    }

    let oscillation = (ctx.clock_ms * 0.001).sin() * 0.5;
    let step = star.speed * (1.0 + oscillation) * ctx.delta_ms * 0.01;
    star.pos.x += star.angle.cos() * step;
    star.pos.y += star.angle.sin() * step;

    star.pos.x = wrap(star.pos.x, ctx.viewport.width);
    star.pos.y = wrap(star.pos.y, ctx.viewport.height);

    if star.trail_length > 0 {
        star.trail.push_back(star.pos);
        while star.trail.len() > star.trail_length {
            star.trail.pop_front();
        }
    }
}

/// Move a coordinate that left `-WRAP_MARGIN..=extent + WRAP_MARGIN` to the opposite bound.
pub fn wrap(value: f32, extent: f32) -> f32 {
    if value < -WRAP_MARGIN {
        extent + WRAP_MARGIN
    } else if value > extent + WRAP_MARGIN {
        -WRAP_MARGIN
    } else {
        value
    }
}
