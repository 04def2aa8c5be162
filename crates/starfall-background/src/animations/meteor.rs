//! Meteors: spawning and per-frame movement.

use std::collections::VecDeque;
use std::f32::consts::PI;

use rand::Rng;
use starfall_core::{Point, Viewport};

/// Distance past the left, right or bottom edge at which a meteor dies.
pub const METEOR_MARGIN: f32 = 100.0;
/// Meteor speeds are expressed per frame at this rate.
pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// One point of a meteor trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub pos: Point,
    pub opacity: f32,
}

/// A meteor streaking diagonally down the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Meteor {
    pub pos: Point,
    /// Direction of travel, below the horizontal.
    pub angle: f32,
    /// Pixels per reference frame.
    pub speed: f32,
    pub size: f32,
    /// Maximum number of trail points.
    pub length: usize,
    /// Trail, newest first.
    pub trail: VecDeque<TrailPoint>,
    pub active: bool,
}

/// Spawn a meteor above the viewport.
///
/// The start x may lie past the right edge; such meteors die on their first
/// update.
pub fn spawn_meteor<R: Rng + ?Sized>(viewport: Viewport, rng: &mut R) -> Meteor {
    let length = rng.gen_range(50..250);
    Meteor {
        pos: Point::new(rng.r#gen::<f32>() * viewport.width.max(0.0) * 1.5, -100.0),
        angle: PI / 4.0 + rng.r#gen::<f32>() * PI / 8.0,
        speed: rng.r#gen::<f32>() * 15.0 + 5.0,
        size: rng.r#gen::<f32>() * 3.0 + 1.0,
        length,
        trail: VecDeque::with_capacity(length),
        active: true,
    }
}

/// Advance an active meteor and refresh its trail.
pub fn update_meteor(meteor: &mut Meteor, delta_ms: f32, viewport: Viewport) {
    if !meteor.active {
        return;
    }

    let frames = delta_ms / REFERENCE_FRAME_MS;
    meteor.pos.x += meteor.angle.cos() * meteor.speed * frames;
    meteor.pos.y += meteor.angle.sin() * meteor.speed * frames;

    meteor.trail.push_front(TrailPoint {
        pos: meteor.pos,
        opacity: 1.0,
    });
    meteor.trail.truncate(meteor.length);

    let len = meteor.trail.len() as f32;
    for (i, point) in meteor.trail.iter_mut().enumerate() {
        point.opacity = 1.0 - i as f32 / len;
    }

    if meteor.pos.x < -METEOR_MARGIN
        || meteor.pos.x > viewport.width + METEOR_MARGIN
        || meteor.pos.y > viewport.height + METEOR_MARGIN
    {
        meteor.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

    fn meteor_at(x: f32, length: usize) -> Meteor {
        Meteor {
            pos: Point::new(x, -100.0),
            angle: PI / 4.0,
            speed: 10.0,
            size: 2.0,
            length,
            trail: VecDeque::new(),
            active: true,
        }
    }

    #[test]
    fn test_spawn_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let meteor = spawn_meteor(VIEWPORT, &mut rng);
            assert!(meteor.active);
            assert!(meteor.pos.x >= 0.0 && meteor.pos.x <= 1200.0);
            assert_eq!(meteor.pos.y, -100.0);
            assert!(meteor.angle >= PI / 4.0 && meteor.angle <= PI / 4.0 + PI / 8.0);
            assert!(meteor.speed >= 5.0 && meteor.speed <= 20.0);
            assert!(meteor.size >= 1.0 && meteor.size <= 4.0);
            assert!((50..250).contains(&meteor.length));
        }
    }

    #[test]
    fn test_moves_down_and_right() {
        let mut meteor = meteor_at(100.0, 10);
        update_meteor(&mut meteor, REFERENCE_FRAME_MS, VIEWPORT);
        let step = 10.0 * (PI / 4.0).cos();
        assert!((meteor.pos.x - (100.0 + step)).abs() < 1e-3);
        assert!((meteor.pos.y - (-100.0 + step)).abs() < 1e-3);
    }

    #[test]
    fn test_trail_bounded_and_fading() {
        let mut meteor = meteor_at(0.0, 8);
        for _ in 0..20 {
            update_meteor(&mut meteor, REFERENCE_FRAME_MS, VIEWPORT);
            assert!(meteor.trail.len() <= 8);
        }
        assert_eq!(meteor.trail.len(), 8);
        assert_eq!(meteor.trail[0].pos, meteor.pos);
        assert_eq!(meteor.trail[0].opacity, 1.0);
        for pair in meteor.trail.iter().collect::<Vec<_>>().windows(2) {
            assert!(pair[0].opacity > pair[1].opacity);
        }
    }

    #[test]
    fn test_deactivates_past_bounds() {
        let mut meteor = meteor_at(850.0, 10);
        meteor.pos.y = 300.0;
        update_meteor(&mut meteor, REFERENCE_FRAME_MS, VIEWPORT);
        assert!(meteor.active);
        for _ in 0..10 {
            update_meteor(&mut meteor, REFERENCE_FRAME_MS, VIEWPORT);
        }
        assert!(!meteor.active);

        let frozen = meteor.clone();
        update_meteor(&mut meteor, REFERENCE_FRAME_MS, VIEWPORT);
        assert_eq!(meteor, frozen);
    }

    #[test]
    fn test_off_right_spawn_dies_immediately() {
        let mut meteor = meteor_at(1150.0, 10);
        update_meteor(&mut meteor, REFERENCE_FRAME_MS, VIEWPORT);
        assert!(!meteor.active);
    }
}
