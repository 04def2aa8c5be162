//! Animated starfield backdrop.
//!
//! The simulation ([`Starfield`]) is plain data stepped by free functions and
//! can be driven without any terminal. [`AnimatedBackground`] mounts that
//! simulation on a [`Host`], owns its frame loop, meteor timer and listeners,
//! and draws it onto a half-block [`Raster`].

mod animations;
mod color;
pub mod draw;
mod field;
mod host;
mod state;
mod surface;
mod tilt;

pub use animations::meteor::{Meteor, TrailPoint, spawn_meteor, update_meteor};
pub use animations::star::{
    Star, StepContext, generate_stars, regular_star_count, star_count, update_star,
};
pub use color::{BACKDROP_BOTTOM, BACKDROP_TOP, Rgb, hsl_to_rgb};
pub use field::{MeteorSettings, POINTER_DEBOUNCE_MS, Starfield};
pub use host::{FrameRequest, Host, HostEvent, Listener, ListenerId, TimerId};
pub use state::{AnimatedBackground, BackgroundSettings, MAX_FRAME_DELTA_MS, render_static};
pub use surface::{Blend, GradientStop, RadialGradient, Raster, Surface, SurfaceError};
pub use tilt::{Tilt, TiltTracker};
