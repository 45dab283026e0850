//! Per-connection state machine.

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::canvas::{CanvasHandle, Joined};
use crate::error::ServerError;
use crate::hub::SessionId;

/// A frame received from the client side of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Close,
}

/// `Connecting -> Open -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open { id: SessionId },
    Closed,
}

/// One client connection as seen by the canvas.
#[derive(Debug)]
pub struct Session {
    canvas: CanvasHandle,
    state: SessionState,
}

impl Session {
    pub const fn new(canvas: CanvasHandle) -> Self {
        Self {
            canvas,
            state: SessionState::Connecting,
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn id(&self) -> Option<SessionId> {
        match self.state {
            SessionState::Open { id } => Some(id),
            _ => None,
        }
    }

    /// Subscribes to the broadcast topic and takes the initial snapshot.
    pub async fn on_open(&mut self) -> Result<Joined, ServerError> {
        let joined = self.canvas.join().await?;
        self.state = SessionState::Open {
            id: joined.session,
        };
        Ok(joined)
    }

    /// Forwards a text frame to the canvas. Ignored unless open.
    pub async fn on_message(&mut self, text: String) -> Result<(), ServerError> {
        match self.state {
            SessionState::Open { id } => self.canvas.message(id, text).await,
            _ => Ok(()),
        }
    }

    /// Unsubscribes. Safe to call more than once.
    pub async fn on_close(&mut self) {
        if let SessionState::Open { id } = self.state {
            self.canvas.leave(id).await;
        }
        self.state = SessionState::Closed;
    }
}

/// Runs one connection to completion.
///
/// Sends the `init` snapshot, then forwards inbound frames to the canvas and
/// outbound broadcasts to the transport until either side closes. A session
/// that lags behind the broadcast channel is sent a fresh snapshot.
pub async fn drive<I, O>(canvas: CanvasHandle, mut incoming: I, mut outgoing: O) -> Result<(), ServerError>
where
    I: Stream<Item = Inbound> + Unpin,
    O: Sink<String> + Unpin,
{
    let mut session = Session::new(canvas.clone());
    let Joined {
        session: id,
        mut receiver,
        init,
    } = session.on_open().await?;

    if outgoing.send(init.to_string()).await.is_err() {
        session.on_close().await;
        return Ok(());
    }

    let result = loop {
        tokio::select! {
            inbound = incoming.next() => match inbound {
                Some(Inbound::Text(text)) => {
                    if let Err(err) = session.on_message(text).await {
                        break Err(err);
                    }
                }
                Some(Inbound::Close) | None => break Ok(()),
            },
            outbound = receiver.recv() => match outbound {
                Ok(frame) => {
                    if frame.is_for(id) && outgoing.send(frame.text.to_string()).await.is_err() {
                        debug!(session = %id, "transport closed while sending");
                        break Ok(());
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session = %id, skipped, "session lagged, resending snapshot");
                    match canvas.resync().await {
                        Ok(resynced) => {
                            receiver = resynced.receiver;
                            if outgoing.send(resynced.init.to_string()).await.is_err() {
                                break Ok(());
                            }
                        }
                        Err(err) => break Err(err),
                    }
                }
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    session.on_close().await;
    info!(session = %id, "connection finished");
    result
}
