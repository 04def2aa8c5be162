use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::Stylize,
    text::Line,
};
use starfall_background::{
    AnimatedBackground, BackgroundSettings, HostEvent, Listener, MeteorSettings, render_static,
};
use starfall_config::Config;
use starfall_core::{AnimationSpeed, ColorTheme};

mod cli;
mod content;
mod host;
mod logging;

use cli::Cli;
use content::Page;
use host::{TerminalHost, Wakeup};

/// Poll timeout when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);
/// Lines scrolled per mouse wheel notch.
const WHEEL_LINES: i32 = 3;
/// Largest tilt shift of the content panel, in columns and rows.
const TILT_CELLS: (u16, u16) = (2, 1);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let _log_guard = logging::init(&config.log_level)?;
    let page = Page::load(config.content.as_deref())?;

    let terminal = ratatui::init();
    let result = App::new(config, page).run(terminal);
    ratatui::restore();
    // Mouse capture is not part of ratatui's restore
    let _ = execute!(io::stdout(), DisableMouseCapture);
    if let Err(err) = &result {
        tracing::error!(%err, "exited with error");
    }
    result
}

/// Whether the terminal advertises 24-bit colour.
fn truecolor_supported() -> bool {
    std::env::var("COLORTERM")
        .map(|value| matches!(value.as_str(), "truecolor" | "24bit"))
        .unwrap_or(false)
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    /// Current text color theme.
    color_theme: ColorTheme,
    /// Current animation speed.
    speed: AnimationSpeed,
    meteors: bool,
    host: Option<TerminalHost>,
    /// Mounted backdrop, `None` while toggled off.
    background: Option<AnimatedBackground>,
    page: Page,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config, page: Page) -> Self {
        Self {
            running: false,
            color_theme: config.color_theme,
            speed: config.speed,
            meteors: config.meteors,
            config,
            host: None,
            background: None,
            page,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let size = terminal.size()?;
        let mut host = TerminalHost::new(size, self.config.frame_rate);
        self.background = Some(self.mount_background(&mut host));
        self.host = Some(host);

        self.running = true;
        let result = self.event_loop(&mut terminal);

        if let Some(host) = self.host.as_mut() {
            if let Some(background) = self.background.take() {
                background.unmount(host);
            }
            host.sync_mouse_capture()?;
            tracing::debug!(
                frames = host.pending_frames(),
                timers = host.pending_timers(),
                listeners = host.listener_count(),
                "host state after unmount"
            );
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        while self.running {
            if let Some(host) = self.host.as_mut() {
                host.sync_mouse_capture()?;
            }
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
            self.dispatch_due();
        }
        Ok(())
    }

    fn background_settings(&self) -> BackgroundSettings {
        BackgroundSettings {
            seed: self.config.seed.unwrap_or_else(rand::random),
            speed: self.speed,
            pixels_per_cell: self.config.pixels_per_cell,
            truecolor: self.config.force_truecolor || truecolor_supported(),
            tilt: self.config.tilt,
            meteors: MeteorSettings {
                enabled: self.meteors,
                max_active: self.config.max_meteors,
                min_interval: Duration::from_millis(self.config.meteor_min_interval_ms),
                max_interval: Duration::from_millis(self.config.meteor_max_interval_ms),
            },
        }
    }

    fn mount_background(&self, host: &mut TerminalHost) -> AnimatedBackground {
        let mut background = AnimatedBackground::mount(host, self.background_settings());
        background.handle_event(host, HostEvent::Scrolled(self.page.offset()));
        background
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        match &self.background {
            Some(background) => background.render(frame, area),
            None => render_static(frame, area),
        }

        let chunks = Layout::vertical([
            Constraint::Fill(1),   // Page
            Constraint::Length(1), // Help text
        ])
        .split(area);

        let shift = self
            .background
            .as_ref()
            .map(|background| background.tilt().cell_offset(TILT_CELLS.0, TILT_CELLS.1))
            .unwrap_or_default();
        let color = self.color_theme.color();
        self.page.render(frame, chunks[0], color, shift);

        let meteors = if self.meteors {
            " meteors on  "
        } else {
            " meteors off  "
        };
        let help = Line::from(vec![
            "q".bold().fg(color),
            " quit  ".dark_gray(),
            "c".bold().fg(color),
            " color  ".dark_gray(),
            "s".bold().fg(color),
            format!(" speed ({})  ", self.speed.label()).dark_gray(),
            "m".bold().fg(color),
            meteors.dark_gray(),
            "r".bold().fg(color),
            " new sky  ".dark_gray(),
            "b".bold().fg(color),
            " backdrop".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, chunks[1]);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Blocks until the next frame or timer is due.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        let timeout = self
            .host
            .as_ref()
            .map_or(IDLE_POLL, |host| host.poll_timeout(Instant::now(), IDLE_POLL));
        if event::poll(timeout)? {
            self.on_event(event::read()?);
            // Drain whatever else is already queued
            while event::poll(Duration::ZERO)? {
                self.on_event(event::read()?);
            }
        }
        Ok(())
    }

    fn on_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => self.scroll_by(WHEEL_LINES),
                MouseEventKind::ScrollUp => self.scroll_by(-WHEEL_LINES),
                _ => self.forward(&event),
            },
            Event::Resize(_, _) => self.forward(&event),
            _ => {}
        }
    }

    /// Pass a terminal event on to the background if it listens for it.
    fn forward(&mut self, event: &Event) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        let Some(host_event) = host.translate(event) else {
            return;
        };
        if let Some(background) = self.background.as_mut() {
            background.handle_event(host, host_event);
        }
    }

    /// Deliver due frames and timers to the background.
    fn dispatch_due(&mut self) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        for wakeup in host.take_due(Instant::now()) {
            let Some(background) = self.background.as_mut() else {
                break;
            };
            match wakeup {
                Wakeup::Frame(request) => background.on_frame(host, request),
                Wakeup::Timer(timer) => background.on_timer(host, timer),
            }
        }
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('c')) => self.cycle_color_theme(),
            (_, KeyCode::Char('s')) => self.cycle_speed(),
            (_, KeyCode::Char('m')) => self.toggle_meteors(),
            (_, KeyCode::Char('r')) => self.regenerate(),
            (_, KeyCode::Char('b')) => self.toggle_background(),
            (_, KeyCode::Down | KeyCode::Char('j')) => self.scroll_by(1),
            (_, KeyCode::Up | KeyCode::Char('k')) => self.scroll_by(-1),
            (_, KeyCode::PageDown) => self.scroll_by(self.page.page_size()),
            (_, KeyCode::PageUp) => self.scroll_by(-self.page.page_size()),
            (_, KeyCode::Home) => {
                if self.page.scroll_to_top() {
                    self.notify_scroll();
                }
            }
            (_, KeyCode::End) => {
                if self.page.scroll_to_bottom() {
                    self.notify_scroll();
                }
            }
            _ => {}
        }
    }

    fn scroll_by(&mut self, lines: i32) {
        if self.page.scroll_by(lines) {
            self.notify_scroll();
        }
    }

    /// Tell the background where the page is scrolled to.
    fn notify_scroll(&mut self) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        if !host.is_listening(Listener::Scroll) {
            return;
        }
        if let Some(background) = self.background.as_mut() {
            background.handle_event(host, HostEvent::Scrolled(self.page.offset()));
        }
    }

    /// Cycle through available color themes.
    fn cycle_color_theme(&mut self) {
        self.color_theme = self.color_theme.next();
    }

    /// Cycle through animation speeds.
    fn cycle_speed(&mut self) {
        self.speed = self.speed.next();
        if let Some(background) = self.background.as_mut() {
            background.set_speed(self.speed);
        }
        tracing::debug!(speed = self.speed.label(), "speed changed");
    }

    fn toggle_meteors(&mut self) {
        self.meteors = !self.meteors;
        if let Some(background) = self.background.as_mut() {
            background.set_meteors_enabled(self.meteors);
        }
    }

    fn regenerate(&mut self) {
        if let Some(background) = self.background.as_mut() {
            background.regenerate();
        }
    }

    /// Unmount the backdrop, or mount a fresh one.
    fn toggle_background(&mut self) {
        let Some(mut host) = self.host.take() else {
            return;
        };
        match self.background.take() {
            Some(background) => background.unmount(&mut host),
            None => self.background = Some(self.mount_background(&mut host)),
        }
        self.host = Some(host);
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
