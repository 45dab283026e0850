//! The [`DeferredTask`] slot.

use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{sleep, Instant, Sleep};

#[derive(Debug)]
struct Armed<T> {
    sleep: Pin<Box<Sleep>>,
    event: T,
}

/// A cancellable, replaceable delayed event.
///
/// Constructing an unarmed task does not touch the runtime; [`arm`](Self::arm)
/// must be called from within a tokio runtime.
#[derive(Debug)]
pub struct DeferredTask<T> {
    armed: Option<Armed<T>>,
}

impl<T> Default for DeferredTask<T> {
    fn default() -> Self {
        Self { armed: None }
    }
}

impl<T> DeferredTask<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { armed: None }
    }

    /// Schedules `event` to become due after `delay`, replacing any pending
    /// event.
    pub fn arm(&mut self, delay: Duration, event: T) {
        self.armed = Some(Armed {
            sleep: Box::pin(sleep(delay)),
            event,
        });
    }

    /// Drops the pending event, if any. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    /// Takes the pending event now, without waiting for its deadline.
    pub fn fire(&mut self) -> Option<T> {
        self.armed.take().map(|armed| armed.event)
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// The instant the pending event becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.armed.as_ref().map(|armed| armed.sleep.deadline())
    }

    /// Time left until the pending event is due (zero once overdue).
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Waits until the pending event is due and takes it.
    ///
    /// Pends forever while unarmed, which makes it safe to use as a
    /// `select!` branch. Cancel-safe: if the future is dropped before
    /// completion the event stays armed.
    pub async fn expired(&mut self) -> T {
        if let Some(armed) = self.armed.as_mut() {
            armed.sleep.as_mut().await;
        }
        match self.armed.take() {
            Some(armed) => armed.event,
            None => future::pending().await,
        }
    }
}
