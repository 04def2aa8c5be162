//! The starfield simulation: every star and meteor plus the inputs that move them.
//!
//! [`Starfield::step`] is the whole per-frame update and can be driven with a
//! fixed delta, independent of any frame scheduler. Drawing lives in
//! [`crate::draw`].

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use starfall_core::{AnimationSpeed, Point, Viewport};

use crate::animations::meteor::{self, Meteor};
use crate::animations::star::{self, StepContext, Star};

/// How long the pointer counts as active after its last movement.
pub const POINTER_DEBOUNCE_MS: f32 = 150.0;

/// Meteor spawning parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MeteorSettings {
    pub enabled: bool,
    /// Maximum meteors alive at once.
    pub max_active: usize,
    /// Lower bound of the spawn interval.
    pub min_interval: Duration,
    /// Upper bound of the spawn interval.
    pub max_interval: Duration,
}

impl Default for MeteorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_active: 5,
            min_interval: Duration::from_millis(2000),
            max_interval: Duration::from_millis(7000),
        }
    }
}

/// Last pointer position and the real time elapsed since it moved.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PointerState {
    position: Point,
    /// `None` until the pointer first moves. Not scaled by animation speed.
    idle_ms: Option<f32>,
}

/// Simulation state for one mounted background.
#[derive(Debug)]
pub struct Starfield {
    viewport: Viewport,
    stars: Vec<Star>,
    meteors: Vec<Meteor>,
    pointer: PointerState,
    scroll_y: f32,
    /// Simulation clock in milliseconds.
    clock_ms: f32,
    meteor_settings: MeteorSettings,
    rng: StdRng,
}

impl Starfield {
    /// Create a field and generate its first batch of stars.
    pub fn new(viewport: Viewport, seed: u64, meteor_settings: MeteorSettings) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let stars = star::generate_stars(viewport, &mut rng);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            stars = stars.len(),
            "generated starfield"
        );

        Self {
            viewport,
            stars,
            meteors: Vec::new(),
            pointer: PointerState::default(),
            scroll_y: 0.0,
            clock_ms: 0.0,
            meteor_settings,
            rng,
        }
    }

    /// Adopt new dimensions and replace every star.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.regenerate();
    }

    /// Throw away the current stars and generate a new batch.
    pub fn regenerate(&mut self) {
        self.stars = star::generate_stars(self.viewport, &mut self.rng);
        tracing::debug!(stars = self.stars.len(), "regenerated stars");
    }

    /// Record pointer movement. `position` is in field coordinates (scroll included).
    pub fn pointer_moved(&mut self, position: Point) {
        self.pointer = PointerState {
            position,
            idle_ms: Some(0.0),
        };
    }

    pub fn pointer_active(&self) -> bool {
        self.pointer
            .idle_ms
            .is_some_and(|idle| idle < POINTER_DEBOUNCE_MS)
    }

    pub fn set_scroll(&mut self, scroll_y: f32) {
        self.scroll_y = scroll_y;
    }

    /// Advance every star and meteor by `delta_ms`.
    pub fn step(&mut self, delta_ms: f32) {
        self.step_at_speed(delta_ms, AnimationSpeed::Medium);
    }

    /// Advance by `elapsed_ms` of real time, with the simulation clock scaled
    /// by `speed`. The pointer debounce always runs in real time.
    pub fn step_at_speed(&mut self, elapsed_ms: f32, speed: AnimationSpeed) {
        if let Some(idle) = self.pointer.idle_ms.as_mut() {
            *idle += elapsed_ms;
        }

        let delta_ms = elapsed_ms * speed.time_scale();
        self.clock_ms += delta_ms;

        let ctx = StepContext {
            delta_ms,
            clock_ms: self.clock_ms,
            pointer: self.pointer_active().then_some(self.pointer.position),
            viewport: self.viewport,
        };
        for star in &mut self.stars {
            star::update_star(star, &ctx);
        }
        for meteor in &mut self.meteors {
            meteor::update_meteor(meteor, delta_ms, self.viewport);
        }
    }

    /// Prune dead meteors, maybe spawn one, and return the delay until the next tick.
    pub fn spawn_tick(&mut self) -> Duration {
        self.meteors.retain(|meteor| meteor.active);

        if self.meteor_settings.enabled && self.meteors.len() < self.meteor_settings.max_active {
            let meteor = meteor::spawn_meteor(self.viewport, &mut self.rng);
            tracing::debug!(x = meteor.pos.x, speed = meteor.speed, "spawned meteor");
            self.meteors.push(meteor);
        }

        let min = self.meteor_settings.min_interval;
        let max = self.meteor_settings.max_interval.max(min);
        self.rng.gen_range(min..=max)
    }

    pub fn set_meteors_enabled(&mut self, enabled: bool) {
        self.meteor_settings.enabled = enabled;
    }

    pub fn meteors_enabled(&self) -> bool {
        self.meteor_settings.enabled
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn meteors(&self) -> &[Meteor] {
        &self.meteors
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn clock_ms(&self) -> f32 {
        self.clock_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::meteor::METEOR_MARGIN;
    use crate::animations::star::{WRAP_MARGIN, star_count};
    use proptest::prelude::*;

    const VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

    fn field(seed: u64) -> Starfield {
        Starfield::new(VIEWPORT, seed, MeteorSettings::default())
    }

    #[test]
    fn test_new_field_has_density_count() {
        let field = field(1);
        assert_eq!(field.stars().len(), star_count(VIEWPORT));
        assert!(field.meteors().is_empty());
    }

    #[test]
    fn test_resize_to_same_size_keeps_count() {
        let mut field = field(2);
        field.resize(Viewport::new(640.0, 480.0));
        let first = field.stars().to_vec();
        field.resize(Viewport::new(640.0, 480.0));
        assert_eq!(field.stars().len(), first.len());
        assert_eq!(field.stars().len(), star_count(Viewport::new(640.0, 480.0)));
        assert_ne!(field.stars(), first.as_slice());
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = field(99);
        let b = field(99);
        assert_eq!(a.stars(), b.stars());
    }

    #[test]
    fn test_pointer_debounce() {
        let mut field = field(3);
        assert!(!field.pointer_active());
        field.pointer_moved(Point::new(10.0, 10.0));
        assert!(field.pointer_active());
        field.step(100.0);
        assert!(field.pointer_active());
        field.step(60.0);
        assert!(!field.pointer_active());
    }

    #[test]
    fn test_pointer_debounce_ignores_speed() {
        let mut slow = field(3);
        slow.pointer_moved(Point::new(10.0, 10.0));
        for _ in 0..10 {
            slow.step_at_speed(20.0, AnimationSpeed::Slow);
        }
        assert_eq!(slow.clock_ms(), 100.0);
        assert!(!slow.pointer_active());

        let mut fast = field(3);
        fast.pointer_moved(Point::new(10.0, 10.0));
        fast.step_at_speed(100.0, AnimationSpeed::Fast);
        assert_eq!(fast.clock_ms(), 200.0);
        assert!(fast.pointer_active());
    }

    #[test]
    fn test_spawn_tick_respects_cap() {
        let mut field = field(4);
        for _ in 0..20 {
            let delay = field.spawn_tick();
            assert!(delay >= Duration::from_millis(2000));
            assert!(delay <= Duration::from_millis(7000));
            assert!(field.meteors().len() <= 5);
        }
        assert_eq!(field.meteors().len(), 5);
    }

    #[test]
    fn test_dead_meteors_are_pruned() {
        let mut field = field(5);
        field.spawn_tick();
        assert_eq!(field.meteors().len(), 1);
        // Long enough for any meteor to leave the viewport
        for _ in 0..400 {
            field.step(16.0);
        }
        assert!(field.meteors().iter().all(|m| !m.active));
        field.set_meteors_enabled(false);
        field.spawn_tick();
        assert!(field.meteors().is_empty());
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_across_steps(
            seed in any::<u64>(),
            width in 1.0f32..3000.0,
            height in 1.0f32..3000.0,
            steps in 1usize..120,
            delta in 0.0f32..100.0,
        ) {
            let viewport = Viewport::new(width, height);
            let mut field = Starfield::new(viewport, seed, MeteorSettings::default());
            prop_assert_eq!(field.stars().len(), star_count(viewport));

            for i in 0..steps {
                if i % 10 == 0 {
                    field.spawn_tick();
                }
                if i % 7 == 0 {
                    field.pointer_moved(Point::new(width / 2.0, height / 2.0));
                }
                field.step(delta);

                prop_assert!(field.meteors().iter().filter(|m| m.active).count() <= 5);
                for star in field.stars() {
                    prop_assert!(star.pos.x >= -WRAP_MARGIN && star.pos.x <= width + WRAP_MARGIN);
                    prop_assert!(star.pos.y >= -WRAP_MARGIN && star.pos.y <= height + WRAP_MARGIN);
                    prop_assert!(star.trail.len() <= star.trail_length);
                    prop_assert!(star.opacity >= 0.2 && star.opacity <= 1.0);
                }
                for meteor in field.meteors() {
                    prop_assert!(meteor.trail.len() <= meteor.length);
                    if meteor.active {
                        prop_assert!(meteor.pos.x >= -METEOR_MARGIN);
                        prop_assert!(meteor.pos.x <= width + METEOR_MARGIN);
                        prop_assert!(meteor.pos.y <= height + METEOR_MARGIN);
                    }
                }
            }
        }
    }
}
