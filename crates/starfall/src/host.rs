//! Terminal implementation of the background [`Host`].
//!
//! Frame requests and timers are kept as deadlines; the app loop polls
//! crossterm until the earliest one and then delivers whatever is due.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, MouseEventKind},
    execute,
};
use ratatui::layout::Size;
use starfall_background::{FrameRequest, Host, HostEvent, Listener, ListenerId, TimerId};

/// A frame or timer whose deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    Frame(FrameRequest),
    Timer(TimerId),
}

/// Host backed by the terminal event loop.
#[derive(Debug)]
pub struct TerminalHost {
    started: Instant,
    area: Size,
    frame_interval: Duration,
    /// When the last frame was delivered, for pacing.
    last_frame: Option<Instant>,
    next_id: u64,
    frames: HashMap<FrameRequest, Instant>,
    timers: HashMap<TimerId, Instant>,
    listeners: HashMap<ListenerId, Listener>,
    /// Whether mouse capture is currently enabled on the terminal.
    mouse_captured: bool,
}

impl TerminalHost {
    /// Create a host for an area of `area` cells running at `frame_rate` fps.
    pub fn new(area: Size, frame_rate: u32) -> Self {
        Self {
            started: Instant::now(),
            area,
            frame_interval: Duration::from_secs(1) / frame_rate.max(1),
            last_frame: None,
            next_id: 0,
            frames: HashMap::new(),
            timers: HashMap::new(),
            listeners: HashMap::new(),
            mouse_captured: false,
        }
    }

    fn id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Whether some listener is subscribed to `listener` events.
    pub fn is_listening(&self, listener: Listener) -> bool {
        self.listeners.values().any(|l| *l == listener)
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Earliest frame or timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.frames.values().chain(self.timers.values()).min().copied()
    }

    /// How long the event loop may block before something is due.
    pub fn poll_timeout(&self, now: Instant, idle: Duration) -> Duration {
        self.next_deadline()
            .map_or(idle, |deadline| deadline.saturating_duration_since(now))
    }

    /// Remove and return everything due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Wakeup> {
        let mut due: Vec<(Instant, Wakeup)> = self
            .frames
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(request, deadline)| (*deadline, Wakeup::Frame(*request)))
            .chain(
                self.timers
                    .iter()
                    .filter(|(_, deadline)| **deadline <= now)
                    .map(|(timer, deadline)| (*deadline, Wakeup::Timer(*timer))),
            )
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);

        for (_, wakeup) in &due {
            match wakeup {
                Wakeup::Frame(request) => {
                    self.frames.remove(request);
                    self.last_frame = Some(now);
                }
                Wakeup::Timer(timer) => {
                    self.timers.remove(timer);
                }
            }
        }
        due.into_iter().map(|(_, wakeup)| wakeup).collect()
    }

    /// Translate a terminal event into a host event, if anyone listens for it.
    ///
    /// Resizes also update the host's own area.
    pub fn translate(&mut self, event: &Event) -> Option<HostEvent> {
        let host_event = match event {
            Event::Resize(width, height) => {
                self.area = Size::new(*width, *height);
                HostEvent::Resized(self.area)
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => HostEvent::PointerMoved {
                    column: mouse.column,
                    row: mouse.row,
                },
                _ => return None,
            },
            _ => return None,
        };
        self.is_listening(host_event.listener()).then_some(host_event)
    }

    /// Mouse capture is needed while anything listens for pointer or scroll input.
    fn wants_mouse_capture(&self) -> bool {
        self.is_listening(Listener::PointerMove) || self.is_listening(Listener::Scroll)
    }

    /// Capture state the terminal should switch to, if it differs from the current one.
    pub fn mouse_capture_change(&self) -> Option<bool> {
        let wanted = self.wants_mouse_capture();
        (wanted != self.mouse_captured).then_some(wanted)
    }

    /// Enable or disable terminal mouse capture to match the listeners.
    pub fn sync_mouse_capture(&mut self) -> io::Result<()> {
        if let Some(capture) = self.mouse_capture_change() {
            if capture {
                execute!(io::stdout(), EnableMouseCapture)?;
            } else {
                execute!(io::stdout(), DisableMouseCapture)?;
            }
            tracing::debug!(capture, "mouse capture changed");
            self.mouse_captured = capture;
        }
        Ok(())
    }
}

impl Host for TerminalHost {
    fn area(&self) -> Size {
        self.area
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.id());
        let now = Instant::now();
        let deadline = self
            .last_frame
            .map_or(now, |last| (last + self.frame_interval).max(now));
        self.frames.insert(request, deadline);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.frames.remove(&request);
    }

    fn set_timer(&mut self, delay: Duration) -> TimerId {
        let timer = TimerId(self.id());
        self.timers.insert(timer, Instant::now() + delay);
        timer
    }

    fn clear_timer(&mut self, timer: TimerId) {
        self.timers.remove(&timer);
    }

    fn listen(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.id());
        self.listeners.insert(id, listener);
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }
}
