//! The environment a mounted background runs in.
//!
//! A host hands out frame requests, timers and event subscriptions, and later
//! delivers them back to the background through
//! [`AnimatedBackground`](crate::AnimatedBackground) callbacks. Everything
//! runs on one thread; a callback always runs to completion.

use std::time::Duration;

use ratatui::layout::Size;

/// Handle for a pending animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(pub u64);

/// Handle for a pending one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Kinds of host events a background can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    Resize,
    PointerMove,
    Scroll,
}

/// Host events, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The drawing area changed size.
    Resized(Size),
    /// The pointer moved to a cell.
    PointerMoved { column: u16, row: u16 },
    /// The content above the backdrop is scrolled by this many rows.
    Scrolled(u16),
}

impl HostEvent {
    /// The listener kind that receives this event.
    pub fn listener(&self) -> Listener {
        match self {
            HostEvent::Resized(_) => Listener::Resize,
            HostEvent::PointerMoved { .. } => Listener::PointerMove,
            HostEvent::Scrolled(_) => Listener::Scroll,
        }
    }
}

/// Scheduling and subscription services provided to a background.
pub trait Host {
    /// Current drawing area in cells.
    fn area(&self) -> Size;

    /// Milliseconds since the host started.
    fn now_ms(&self) -> u64;

    /// Ask for a frame callback at the next display refresh.
    fn request_frame(&mut self) -> FrameRequest;

    fn cancel_frame(&mut self, request: FrameRequest);

    /// Ask for a timer callback after `delay`.
    fn set_timer(&mut self, delay: Duration) -> TimerId;

    fn clear_timer(&mut self, timer: TimerId);

    fn listen(&mut self, listener: Listener) -> ListenerId;

    fn unlisten(&mut self, id: ListenerId);
}
