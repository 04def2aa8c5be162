//! Points and viewport extents in virtual pixels.

/// A position in virtual pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Size of the drawing surface in virtual pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The larger of the two dimensions.
    pub fn max_dimension(self) -> f32 {
        self.width.max(self.height)
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether either dimension is zero (or negative).
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Pointer offset from the centre, normalized to `-1.0..=1.0` on each axis.
    pub fn normalized(self, point: Point) -> Point {
        if self.is_empty() {
            return Point::default();
        }
        let center = self.center();
        Point::new(
            ((point.x - center.x) / center.x).clamp(-1.0, 1.0),
            ((point.y - center.y) / center.y).clamp(-1.0, 1.0),
        )
    }
}
