//! Reconnecting client loop over an abstract transport.

use std::time::Duration;

use async_trait::async_trait;
use protocol::{decode_action, encode_action, Action, BrushSize, HistoryItem, PaletteColor, User};
use raster::{Frame, Point};
use timer::DeferredTask;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::reconnect::{CloseOutcome, ConnectionState, ReconnectMachine, ReconnectPolicy};
use crate::replica::{Applied, Replica};

/// One open connection carrying JSON text frames.
#[async_trait]
pub trait Transport: Send {
    /// Sends one text frame.
    async fn send(&mut self, text: String) -> Result<(), ClientError>;

    /// The next text frame, or `None` once the connection is closed.
    ///
    /// Must be cancel-safe: it is polled from a `select!` loop.
    async fn recv(&mut self) -> Option<String>;
}

/// Opens connections to the server.
#[async_trait]
pub trait Connector: Send {
    type Transport: Transport;

    async fn connect(&mut self) -> Result<Self::Transport, ClientError>;
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backoff and grace settings
    pub reconnect: ReconnectPolicy,
    /// Delay between opening and sending `get-history`
    pub history_request_delay: Duration,
    /// Point and id limits for frames received from the server. The frame
    /// size bound comes from [`ClientConfig::inbound_limits`].
    pub protocol_limits: protocol::Limits,
    /// Limits for decoding `init` snapshots
    pub snapshot_limits: bitmap::Limits,
    /// Most snapshots one `history-update` may carry
    pub max_history_items: usize,
    /// Event channel capacity
    pub event_buffer_size: usize,
}

/// JSON around one base64 image in `init` or a history entry.
const ENVELOPE_BYTES: usize = 256;

impl ClientConfig {
    /// Limits for server frames.
    ///
    /// `init` and `history-update` carry base64 PNGs, so the frame size
    /// follows `snapshot_limits` rather than the client-to-server bound.
    pub fn inbound_limits(&self) -> protocol::Limits {
        let image = self
            .snapshot_limits
            .max_encoded_bytes
            .div_ceil(3)
            .saturating_mul(4)
            .saturating_add(ENVELOPE_BYTES);
        let frame = image.saturating_mul(self.max_history_items.max(1));
        protocol::Limits {
            max_message_bytes: frame.max(self.protocol_limits.max_message_bytes),
            ..self.protocol_limits.clone()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            history_request_delay: Duration::from_millis(100),
            protocol_limits: protocol::Limits::default(),
            snapshot_limits: bitmap::Limits::default(),
            max_history_items: 20,
            event_buffer_size: 64,
        }
    }
}

/// Input from the application.
#[derive(Debug, Clone)]
pub enum ClientCommand {
    BeginStroke {
        at: Point,
        color: PaletteColor,
        size: BrushSize,
    },
    ExtendStroke(Point),
    FinishStroke,
    Fill {
        x: i32,
        y: i32,
        color: PaletteColor,
    },
    Clear,
    /// Sends an action without touching the local canvas (`wave`, history
    /// requests).
    Send(Action),
    Shutdown,
}

/// Output to the application.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Connected,
    /// The connection has been down for longer than the grace period.
    Disconnected,
    /// Reconnect attempts are exhausted. The driver stops after this.
    GaveUp,
    /// The local canvas changed.
    Canvas(Frame),
    History(Vec<HistoryItem>),
    Presence(Vec<User>),
    Wave,
}

/// Runs a [`Replica`] against a server, reconnecting with backoff.
pub struct ClientDriver<C: Connector> {
    connector: C,
    config: ClientConfig,
    inbound_limits: protocol::Limits,
    machine: ReconnectMachine,
    replica: Replica,
    transport: Option<C::Transport>,
    events: mpsc::Sender<ClientEvent>,
    retry: DeferredTask<()>,
    grace: DeferredTask<()>,
    history_request: DeferredTask<()>,
    reported_down: bool,
}

impl<C: Connector> ClientDriver<C> {
    /// Creates a driver and the receiver for its events.
    pub fn new(connector: C, config: ClientConfig) -> (Self, mpsc::Receiver<ClientEvent>) {
        let (events, rx) = mpsc::channel(config.event_buffer_size.max(1));
        let driver = Self {
            connector,
            machine: ReconnectMachine::new(config.reconnect.clone()),
            replica: Replica::new(config.snapshot_limits.clone()),
            inbound_limits: config.inbound_limits(),
            config,
            transport: None,
            events,
            retry: DeferredTask::new(),
            grace: DeferredTask::new(),
            history_request: DeferredTask::new(),
            reported_down: false,
        };
        (driver, rx)
    }

    pub const fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    pub const fn replica(&self) -> &Replica {
        &self.replica
    }

    /// Runs until `Shutdown`, the command channel closing, or giving up.
    ///
    /// Returns the final replica on shutdown and [`ClientError::GaveUp`]
    /// once reconnect attempts are exhausted.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<ClientCommand>,
    ) -> Result<Replica, ClientError> {
        self.machine.begin();
        loop {
            match self.machine.state() {
                ConnectionState::Connecting => {
                    self.connect().await;
                    continue;
                }
                ConnectionState::GaveUp => {
                    return Err(ClientError::GaveUp {
                        attempts: self.machine.attempts(),
                    });
                }
                ConnectionState::Disconnected | ConnectionState::Connected => {}
            }

            tokio::select! {
                command = commands.recv() => match command {
                    Some(ClientCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                text = next_frame(self.transport.as_mut()) => match text {
                    Some(text) => self.handle_frame(&text).await,
                    None => {
                        info!("connection closed");
                        self.on_close().await;
                    }
                },
                () = self.retry.expired() => {
                    self.machine.on_retry_due();
                }
                () = self.grace.expired() => self.report_down().await,
                () = self.history_request.expired() => self.send(&Action::GetHistory).await,
            }
        }

        self.retry.cancel();
        self.grace.cancel();
        self.history_request.cancel();
        info!("client stopped");
        Ok(self.replica)
    }

    async fn connect(&mut self) {
        if !self.reported_down && !self.grace.is_armed() {
            self.grace.arm(self.config.reconnect.grace, ());
        }
        debug!(attempt = self.machine.attempts(), "connecting");

        let mut connecting = self.connector.connect();
        let result = loop {
            tokio::select! {
                result = &mut connecting => break result,
                () = self.grace.expired() => {
                    self.reported_down = true;
                    let _ = self.events.send(ClientEvent::Disconnected).await;
                }
            }
        };
        drop(connecting);

        match result {
            Ok(transport) => {
                self.machine.on_open();
                self.retry.cancel();
                self.grace.cancel();
                self.reported_down = false;
                self.transport = Some(transport);
                self.history_request
                    .arm(self.config.history_request_delay, ());
                info!("connected");
                self.emit(ClientEvent::Connected).await;
            }
            Err(err) => {
                warn!(attempt = self.machine.attempts(), error = %err, "connect failed");
                self.on_close().await;
            }
        }
    }

    async fn on_close(&mut self) {
        self.transport = None;
        self.history_request.cancel();
        match self.machine.on_close() {
            CloseOutcome::RetryAfter(delay) => {
                info!(?delay, attempt = self.machine.attempts(), "reconnecting");
                self.retry.arm(delay, ());
                if !self.reported_down && !self.grace.is_armed() {
                    self.grace.arm(self.config.reconnect.grace, ());
                }
            }
            CloseOutcome::GaveUp => {
                warn!(attempts = self.machine.attempts(), "giving up on reconnecting");
                self.retry.cancel();
                self.grace.cancel();
                self.emit(ClientEvent::GaveUp).await;
            }
            CloseOutcome::Ignored => {}
        }
    }

    async fn report_down(&mut self) {
        self.reported_down = true;
        self.emit(ClientEvent::Disconnected).await;
    }

    async fn handle_command(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::BeginStroke { at, color, size } => {
                self.replica.begin_stroke(at, color, size);
            }
            ClientCommand::ExtendStroke(to) => {
                self.replica.extend_stroke(to);
                self.emit_canvas().await;
            }
            ClientCommand::FinishStroke => {
                if let Some(action) = self.replica.finish_stroke() {
                    self.emit_canvas().await;
                    self.send(&action).await;
                }
            }
            ClientCommand::Fill { x, y, color } => {
                let action = self.replica.fill(x, y, color);
                self.emit_canvas().await;
                self.send(&action).await;
            }
            ClientCommand::Clear => {
                let action = self.replica.clear();
                self.emit_canvas().await;
                self.send(&action).await;
            }
            ClientCommand::Send(action) => self.send(&action).await,
            ClientCommand::Shutdown => {}
        }
    }

    async fn handle_frame(&mut self, text: &str) {
        let action = match decode_action(text, &self.inbound_limits) {
            Ok(action) => action,
            Err(err) => {
                debug!(error = %err, "dropping server frame");
                return;
            }
        };
        match self.replica.apply_remote(&action) {
            Ok(Applied::Snapshot | Applied::Mutated { changed: true }) => self.emit_canvas().await,
            Ok(Applied::Mutated { changed: false } | Applied::Ignored) => {}
            Ok(Applied::History) => {
                let history = self.replica.history().to_vec();
                self.emit(ClientEvent::History(history)).await;
            }
            Ok(Applied::Presence) => {
                let users = self.replica.users().to_vec();
                self.emit(ClientEvent::Presence(users)).await;
            }
            Ok(Applied::Wave) => self.emit(ClientEvent::Wave).await,
            Err(err) => debug!(kind = action.kind(), error = %err, "dropping server action"),
        }
    }

    /// Fire-and-forget. Nothing is queued while disconnected.
    async fn send(&mut self, action: &Action) {
        let Some(transport) = self.transport.as_mut() else {
            debug!(kind = action.kind(), "not connected, dropping");
            return;
        };
        let text = match encode_action(action) {
            Ok(text) => text,
            Err(err) => {
                warn!(kind = action.kind(), error = %err, "failed to encode action");
                return;
            }
        };
        if let Err(err) = transport.send(text).await {
            debug!(kind = action.kind(), error = %err, "send failed");
        }
    }

    async fn emit_canvas(&mut self) {
        self.emit(ClientEvent::Canvas(self.replica.frame())).await;
    }

    async fn emit(&mut self, event: ClientEvent) {
        // a dropped receiver only means nobody is listening
        let _ = self.events.send(event).await;
    }
}

async fn next_frame<T: Transport>(transport: Option<&mut T>) -> Option<String> {
    match transport {
        Some(transport) => transport.recv().await,
        None => std::future::pending().await,
    }
}
