//! Save-rate limiting.

use std::time::Duration;

use tokio::time::Instant;

/// What to do with a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    /// The window has elapsed; write now.
    Now,
    /// Arm (or re-arm) the deferred save with this delay.
    Defer(Duration),
    /// A write is in flight. The request is replayed when it completes.
    AfterWrite,
}

/// At most one disk write per window, measured from the last completed write.
///
/// The last-save instant starts at construction, so requests inside the
/// first window defer.
#[derive(Debug, Clone)]
pub struct SaveThrottle {
    window: Duration,
    last_save: Instant,
    in_flight: bool,
    pending: bool,
}

impl SaveThrottle {
    pub const fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            last_save: now,
            in_flight: false,
            pending: false,
        }
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    pub const fn is_writing(&self) -> bool {
        self.in_flight
    }

    pub fn request(&mut self, now: Instant) -> SaveDecision {
        if self.in_flight {
            self.pending = true;
            SaveDecision::AfterWrite
        } else if now.saturating_duration_since(self.last_save) >= self.window {
            SaveDecision::Now
        } else {
            SaveDecision::Defer(self.window)
        }
    }

    pub fn write_started(&mut self) {
        self.in_flight = true;
    }

    /// Records a finished write (successful or not) and restarts the window.
    ///
    /// Returns `true` if a request arrived while it was in flight.
    pub fn write_finished(&mut self, now: Instant) -> bool {
        self.in_flight = false;
        self.last_save = now;
        std::mem::take(&mut self.pending)
    }
}
