//! Core types shared by the starfall crates.
//!
//! Geometry in virtual pixels, HSL colour templates for stars, and the
//! user-facing settings enums that the config file and key bindings cycle
//! through.

mod color;
mod geometry;
mod speed;
mod theme;

pub use color::Hsl;
pub use geometry::{Point, Viewport};
pub use speed::AnimationSpeed;
pub use theme::ColorTheme;
