//! Pointer-driven tilt for the content layered over the backdrop.

use starfall_core::Point;

/// Largest rotation on either axis, in degrees.
pub const MAX_TILT_DEG: f32 = 2.0;
/// Duration of the ease-out toward a new target.
pub const TILT_TRANSITION_MS: f32 = 200.0;

/// A small 3D rotation of the content wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tilt {
    pub rotate_x_deg: f32,
    pub rotate_y_deg: f32,
}

impl Tilt {
    /// Rotation for a pointer offset normalized to `-1.0..=1.0` from the viewport centre.
    pub fn from_normalized(offset: Point) -> Self {
        Self {
            rotate_x_deg: -offset.y * MAX_TILT_DEG,
            rotate_y_deg: offset.x * MAX_TILT_DEG,
        }
    }

    /// Project the rotation onto a cell offset, at most `max_cols`/`max_rows` cells.
    pub fn cell_offset(self, max_cols: u16, max_rows: u16) -> (i16, i16) {
        let dx = self.rotate_y_deg / MAX_TILT_DEG * f32::from(max_cols);
        let dy = -self.rotate_x_deg / MAX_TILT_DEG * f32::from(max_rows);
        (dx.round() as i16, dy.round() as i16)
    }
}

/// Eases the current tilt toward the latest target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltTracker {
    current: Tilt,
    target: Tilt,
}

impl TiltTracker {
    pub fn set_target(&mut self, target: Tilt) {
        self.target = target;
    }

    /// Advance the transition by `delta_ms`.
    pub fn step(&mut self, delta_ms: f32) {
        // Exponential ease-out, ~98% of the way after one transition duration
        let k = 1.0 - (-delta_ms * 4.0 / TILT_TRANSITION_MS).exp();
        self.current.rotate_x_deg += (self.target.rotate_x_deg - self.current.rotate_x_deg) * k;
        self.current.rotate_y_deg += (self.target.rotate_y_deg - self.current.rotate_y_deg) * k;
    }

    pub fn current(&self) -> Tilt {
        self.current
    }

    pub fn target(&self) -> Tilt {
        self.target
    }
}
