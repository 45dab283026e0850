//! Single-topic fan-out of outbound text frames.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use uuid::Uuid;

/// Identity of one connected session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which sessions a frame is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    All,
    AllExcept(SessionId),
    Only(SessionId),
}

/// One outbound frame on the broadcast topic.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub audience: Audience,
    pub text: Arc<str>,
}

impl Outbound {
    pub fn new(audience: Audience, text: impl Into<Arc<str>>) -> Self {
        Self {
            audience,
            text: text.into(),
        }
    }

    /// Whether `session` should receive this frame.
    pub fn is_for(&self, session: SessionId) -> bool {
        match self.audience {
            Audience::All => true,
            Audience::AllExcept(sender) => sender != session,
            Audience::Only(target) => target == session,
        }
    }
}

/// The broadcast topic every open session subscribes to.
///
/// Order is preserved per recipient. A receiver that falls more than the
/// channel capacity behind gets `RecvError::Lagged` and must resync.
#[derive(Debug, Clone)]
pub struct Hub {
    sender: broadcast::Sender<Outbound>,
}

impl Hub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a frame. Returns the number of receivers it reached.
    pub fn publish(&self, audience: Audience, text: impl Into<Arc<str>>) -> usize {
        // no subscribers is not an error
        self.sender
            .send(Outbound::new(audience, text))
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
