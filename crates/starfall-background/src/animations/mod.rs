//! Entities owned by the animation loop.

pub mod meteor;
pub mod star;
