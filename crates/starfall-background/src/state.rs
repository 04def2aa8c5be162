//! Mounted background: lifecycle against a [`Host`] and rendering to a frame.

use ratatui::{
    Frame,
    layout::{Rect, Size},
    style::Style,
    widgets::{Block, Paragraph},
};
use starfall_core::{AnimationSpeed, Point};

use crate::color::BACKDROP_TOP;
use crate::draw;
use crate::field::{MeteorSettings, Starfield};
use crate::host::{FrameRequest, Host, HostEvent, Listener, ListenerId, TimerId};
use crate::surface::{Raster, SurfaceError};
use crate::tilt::{Tilt, TiltTracker};

/// Longest frame delta fed to the simulation, so a stalled terminal does not
/// fling every star at once.
pub const MAX_FRAME_DELTA_MS: u64 = 100;

/// Settings fixed at mount time.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSettings {
    /// Seed for star placement and meteor timing.
    pub seed: u64,
    pub speed: AnimationSpeed,
    /// Virtual pixels per terminal column.
    pub pixels_per_cell: f32,
    /// Whether the terminal can show 24-bit colour.
    pub truecolor: bool,
    /// Track the pointer for the content tilt.
    pub tilt: bool,
    pub meteors: MeteorSettings,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            speed: AnimationSpeed::default(),
            pixels_per_cell: 8.0,
            truecolor: true,
            tilt: true,
            meteors: MeteorSettings::default(),
        }
    }
}

/// An animated starfield mounted on a host.
///
/// Created by [`AnimatedBackground::mount`] and torn down by
/// [`AnimatedBackground::unmount`], which cancels the pending frame and meteor
/// timer and removes every listener.
#[derive(Debug)]
#[must_use = "a mounted background must be unmounted to release its host resources"]
pub struct AnimatedBackground {
    settings: BackgroundSettings,
    field: Starfield,
    /// Drawing surface; `None` means the static fallback is shown.
    raster: Option<Raster>,
    tilt: TiltTracker,
    area: Size,
    frame: Option<FrameRequest>,
    meteor_timer: Option<TimerId>,
    resize_listener: Option<ListenerId>,
    /// Pointer and scroll listeners, registered only while animating.
    input_listeners: Vec<ListenerId>,
    last_frame_ms: Option<u64>,
}

impl AnimatedBackground {
    /// Measure the host, generate stars, paint the backdrop and start animating.
    pub fn mount<H: Host + ?Sized>(host: &mut H, settings: BackgroundSettings) -> Self {
        let area = host.area();
        let viewport = Raster::viewport_for(area.width, area.height, settings.pixels_per_cell);
        let field = Starfield::new(viewport, settings.seed, settings.meteors.clone());

        let mut background = Self {
            settings,
            field,
            raster: None,
            tilt: TiltTracker::default(),
            area,
            frame: None,
            meteor_timer: None,
            resize_listener: None,
            input_listeners: Vec::new(),
            last_frame_ms: None,
        };

        background.resize_listener = Some(host.listen(Listener::Resize));
        match background.acquire_surface() {
            Ok(()) => background.start(host),
            Err(err) => {
                tracing::warn!(%err, "animated backdrop unavailable, showing static background")
            }
        }

        tracing::info!(
            cols = area.width,
            rows = area.height,
            stars = background.field.stars().len(),
            animated = background.is_animated(),
            "mounted background"
        );
        background
    }

    /// Cancel the frame loop and meteor timer and remove all listeners.
    pub fn unmount<H: Host + ?Sized>(mut self, host: &mut H) {
        self.stop(host);
        if let Some(id) = self.resize_listener.take() {
            host.unlisten(id);
        }
        tracing::info!("unmounted background");
    }

    fn acquire_surface(&mut self) -> Result<(), SurfaceError> {
        if !self.settings.truecolor {
            return Err(SurfaceError::NoTruecolor);
        }
        let mut raster = Raster::new(
            self.area.width,
            self.area.height,
            self.settings.pixels_per_cell,
        )?;
        draw::draw_backdrop(&mut raster);
        self.raster = Some(raster);
        Ok(())
    }

    fn start<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.input_listeners.push(host.listen(Listener::PointerMove));
        self.input_listeners.push(host.listen(Listener::Scroll));
        self.last_frame_ms = None;
        self.frame = Some(host.request_frame());
        // The first spawn tick runs right away, later ones on the timer
        let delay = self.field.spawn_tick();
        self.meteor_timer = Some(host.set_timer(delay));
    }

    fn stop<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }
        if let Some(timer) = self.meteor_timer.take() {
            host.clear_timer(timer);
        }
        for id in self.input_listeners.drain(..) {
            host.unlisten(id);
        }
    }

    /// Whether the animated surface is live (as opposed to the static fallback).
    pub fn is_animated(&self) -> bool {
        self.raster.is_some()
    }

    /// React to a host event this background listens for.
    pub fn handle_event<H: Host + ?Sized>(&mut self, host: &mut H, event: HostEvent) {
        match event {
            HostEvent::Resized(area) => self.resize(host, area),
            HostEvent::PointerMoved { column, row } => {
                let scale = self.settings.pixels_per_cell;
                let client = Point::new(
                    (f32::from(column) + 0.5) * scale,
                    (f32::from(row) + 0.5) * 2.0 * scale,
                );
                self.field
                    .pointer_moved(Point::new(client.x, client.y + self.field.scroll_y()));
                if self.settings.tilt {
                    let offset = self.field.viewport().normalized(client);
                    self.tilt.set_target(Tilt::from_normalized(offset));
                }
            }
            HostEvent::Scrolled(rows) => {
                let scroll_y = f32::from(rows) * 2.0 * self.settings.pixels_per_cell;
                self.field.set_scroll(scroll_y);
            }
        }
    }

    fn resize<H: Host + ?Sized>(&mut self, host: &mut H, area: Size) {
        self.area = area;
        self.field.resize(Raster::viewport_for(
            area.width,
            area.height,
            self.settings.pixels_per_cell,
        ));

        let was_animated = self.is_animated();
        match self.acquire_surface() {
            Ok(()) if !was_animated => self.start(host),
            Ok(()) => {}
            Err(err) => {
                self.raster = None;
                if was_animated {
                    tracing::warn!(%err, "lost drawing surface, showing static background");
                    self.stop(host);
                }
            }
        }

        tracing::debug!(
            cols = area.width,
            rows = area.height,
            stars = self.field.stars().len(),
            "resized background"
        );
    }

    /// Frame callback: step the simulation, redraw and request the next frame.
    pub fn on_frame<H: Host + ?Sized>(&mut self, host: &mut H, request: FrameRequest) {
        if self.frame != Some(request) {
            tracing::trace!(?request, "ignoring stale frame");
            return;
        }

        let now = host.now_ms();
        let delta_ms = self
            .last_frame_ms
            .map_or(0, |last| now.saturating_sub(last))
            .min(MAX_FRAME_DELTA_MS) as f32;
        self.last_frame_ms = Some(now);

        self.field.step_at_speed(delta_ms, self.settings.speed);
        self.tilt.step(delta_ms);
        if let Some(raster) = self.raster.as_mut() {
            draw::render_frame(raster, &self.field);
        }

        self.frame = Some(host.request_frame());
    }

    /// Timer callback: run a meteor spawn tick and re-arm the timer.
    pub fn on_timer<H: Host + ?Sized>(&mut self, host: &mut H, timer: TimerId) {
        if self.meteor_timer != Some(timer) {
            tracing::trace!(?timer, "ignoring stale timer");
            return;
        }
        let delay = self.field.spawn_tick();
        self.meteor_timer = Some(host.set_timer(delay));
    }

    pub fn speed(&self) -> AnimationSpeed {
        self.settings.speed
    }

    pub fn set_speed(&mut self, speed: AnimationSpeed) {
        self.settings.speed = speed;
    }

    pub fn meteors_enabled(&self) -> bool {
        self.field.meteors_enabled()
    }

    pub fn set_meteors_enabled(&mut self, enabled: bool) {
        self.settings.meteors.enabled = enabled;
        self.field.set_meteors_enabled(enabled);
    }

    /// Replace the current stars with a new random batch.
    pub fn regenerate(&mut self) {
        self.field.regenerate();
    }

    /// Current (eased) tilt for the content layer.
    pub fn tilt(&self) -> Tilt {
        self.tilt.current()
    }

    pub fn field(&self) -> &Starfield {
        &self.field
    }

    /// Render the backdrop into `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match &self.raster {
            Some(raster) => frame.render_widget(Paragraph::new(raster.to_lines()), area),
            None => render_static(frame, area),
        }
    }
}

/// Plain backdrop used when no background is mounted or animation is unavailable.
pub fn render_static(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Block::new().style(Style::new().bg(BACKDROP_TOP.to_color())),
        area,
    );
}
