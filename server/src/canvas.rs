//! The canvas actor.
//!
//! One task owns the [`RasterBuffer`] and processes every action in arrival
//! order. Sessions, HTTP handlers and the clear schedule talk to it through a
//! cloneable [`CanvasHandle`].
//!
//! Lifecycle: load (or blank) on spawn, mutate on each valid action,
//! snapshot on join, resync and the periodic rebroadcast, and a final flush
//! of any deferred save on shutdown.

use std::future;
use std::sync::Arc;

use chrono::Utc;
use protocol::{encode_action, Action, Request};
use raster::{Frame, RasterBuffer, Rgba};
use timer::DeferredTask;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::history::HistoryStore;
use crate::hub::{Audience, Hub, Outbound, SessionId};
use crate::store::FileStore;
use crate::throttle::{SaveDecision, SaveThrottle};

/// A newly opened session.
#[derive(Debug)]
pub struct Joined {
    pub session: SessionId,
    /// Subscribed before `init` was taken, so it carries exactly the frames
    /// that follow the snapshot.
    pub receiver: broadcast::Receiver<Outbound>,
    /// The `init` frame to send first.
    pub init: Arc<str>,
}

/// A fresh subscription for a session that fell behind.
#[derive(Debug)]
pub struct Resynced {
    /// Replaces the lagged receiver. Subscribed in the same step as `init`.
    pub receiver: broadcast::Receiver<Outbound>,
    pub init: Arc<str>,
}

#[derive(Debug)]
enum Command {
    Join {
        reply: oneshot::Sender<Result<Joined, ServerError>>,
    },
    Leave {
        session: SessionId,
    },
    Message {
        session: SessionId,
        text: String,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<Frame>,
    },
    Resync {
        reply: oneshot::Sender<Result<Resynced, ServerError>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle to the canvas actor.
#[derive(Debug, Clone)]
pub struct CanvasHandle {
    commands: mpsc::Sender<Command>,
}

impl CanvasHandle {
    /// Registers a session and returns its subscription and `init` frame.
    pub async fn join(&self) -> Result<Joined, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Join { reply }).await?;
        rx.await.map_err(|_| ServerError::CanvasClosed)?
    }

    /// Unregisters a session. A stopped actor is ignored.
    pub async fn leave(&self, session: SessionId) {
        let _ = self.send(Command::Leave { session }).await;
    }

    /// Queues one client text frame for validation and apply.
    pub async fn message(&self, session: SessionId, text: String) -> Result<(), ServerError> {
        self.send(Command::Message { session, text }).await
    }

    /// Clears to white, schedules a save and broadcasts `clear` to everyone.
    pub async fn clear(&self) -> Result<(), ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Clear { reply }).await?;
        rx.await.map_err(|_| ServerError::CanvasClosed)
    }

    /// An immutable copy of the current raster.
    pub async fn snapshot(&self) -> Result<Frame, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| ServerError::CanvasClosed)
    }

    /// A new subscription and `init` frame for a session that fell behind.
    ///
    /// The old receiver must be dropped: its backlog predates the snapshot.
    pub async fn resync(&self) -> Result<Resynced, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Resync { reply }).await?;
        rx.await.map_err(|_| ServerError::CanvasClosed)?
    }

    /// Flushes any deferred save and stops the actor.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown { reply }).await?;
        rx.await.map_err(|_| ServerError::CanvasClosed)
    }

    async fn send(&self, command: Command) -> Result<(), ServerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ServerError::CanvasClosed)
    }
}

/// Starts the actor on the current runtime.
pub fn spawn(
    config: &ServerConfig,
    buffer: RasterBuffer,
    store: FileStore,
) -> (CanvasHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.mailbox_capacity.max(1));
    let actor = CanvasActor::new(config, buffer, store, rx);
    let task = tokio::spawn(actor.run());
    (CanvasHandle { commands: tx }, task)
}

struct CanvasActor {
    buffer: RasterBuffer,
    store: FileStore,
    hub: Hub,
    sessions: Vec<SessionId>,
    history: HistoryStore,
    throttle: SaveThrottle,
    save_timer: DeferredTask<()>,
    writing: Option<JoinHandle<()>>,
    snapshots: Option<Interval>,
    protocol_limits: protocol::Limits,
    bitmap_limits: bitmap::Limits,
    commands: mpsc::Receiver<Command>,
}

impl CanvasActor {
    fn new(
        config: &ServerConfig,
        buffer: RasterBuffer,
        store: FileStore,
        commands: mpsc::Receiver<Command>,
    ) -> Self {
        let snapshots = config.snapshot_interval.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self {
            buffer,
            store,
            hub: Hub::new(config.broadcast_capacity),
            sessions: Vec::new(),
            history: HistoryStore::new(config.history_capacity),
            throttle: SaveThrottle::new(config.save_throttle, Instant::now()),
            save_timer: DeferredTask::new(),
            writing: None,
            snapshots,
            protocol_limits: config.protocol_limits.clone(),
            bitmap_limits: config.bitmap_limits.clone(),
            commands,
        }
    }

    async fn run(mut self) {
        info!(path = %self.store.path().display(), "canvas actor started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown { reply }) => {
                        self.flush().await;
                        let _ = reply.send(());
                        break;
                    }
                    Some(command) => self.handle(command).await,
                    None => {
                        self.flush().await;
                        break;
                    }
                },
                () = self.save_timer.expired() => self.request_save().await,
                result = write_finished(self.writing.as_mut()) => self.write_done(result).await,
                _ = next_tick(self.snapshots.as_mut()) => self.broadcast_snapshot(),
            }
        }
        info!("canvas actor stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Join { reply } => {
                let joined = self.join();
                let _ = reply.send(joined);
                self.broadcast_presence();
            }
            Command::Leave { session } => {
                let before = self.sessions.len();
                self.sessions.retain(|id| *id != session);
                if self.sessions.len() != before {
                    info!(%session, sessions = self.sessions.len(), "session closed");
                    self.broadcast_presence();
                }
            }
            Command::Message { session, text } => self.handle_message(session, text).await,
            Command::Clear { reply } => {
                self.buffer.clear(Rgba::WHITE);
                self.request_save().await;
                self.publish(Audience::All, &Action::Clear);
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.buffer.snapshot());
            }
            Command::Resync { reply } => {
                let receiver = self.hub.subscribe();
                let resynced = self
                    .init_frame(None)
                    .map(|init| Resynced { receiver, init });
                let _ = reply.send(resynced);
            }
            // handled in run
            Command::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn join(&mut self) -> Result<Joined, ServerError> {
        let receiver = self.hub.subscribe();
        let init = self.init_frame(None)?;
        let session = SessionId::new();
        self.sessions.push(session);
        info!(%session, sessions = self.sessions.len(), "session opened");
        Ok(Joined {
            session,
            receiver,
            init,
        })
    }

    async fn handle_message(&mut self, session: SessionId, text: String) {
        let request = match protocol::parse_request(&text, &self.protocol_limits) {
            Ok(request) => request,
            Err(err) => {
                debug!(%session, error = %err, "dropping action");
                return;
            }
        };

        match request {
            Request::Mutate(mutation) => {
                if !mutation.apply(&mut self.buffer) {
                    debug!(%session, "action left the canvas unchanged");
                    return;
                }
                self.request_save().await;
                self.hub.publish(Audience::AllExcept(session), text);
            }
            Request::Relay => {
                self.hub.publish(Audience::AllExcept(session), text);
            }
            request if !self.history.is_enabled() => {
                debug!(%session, ?request, "history disabled, dropping");
            }
            Request::GetHistory => self.publish_history(Audience::Only(session)),
            Request::SaveToHistory { id } => {
                let image = match bitmap::encode_snapshot_base64(&self.buffer.snapshot()) {
                    Ok(image) => image,
                    Err(err) => {
                        warn!(error = %err, "failed to encode history snapshot");
                        return;
                    }
                };
                let stored = self
                    .history
                    .save(id.as_deref(), image, Utc::now().timestamp_millis());
                debug!(%session, id = ?stored, "history saved");
                self.publish_history(Audience::All);
            }
            Request::DeleteHistory { id } => {
                if self.history.delete(&id) {
                    self.publish_history(Audience::All);
                } else {
                    debug!(%session, %id, "unknown history id");
                }
            }
            Request::Restore { id } => self.restore(session, &id).await,
        }
    }

    async fn restore(&mut self, session: SessionId, id: &str) {
        let Some(item) = self.history.get(id) else {
            debug!(%session, %id, "unknown history id");
            return;
        };
        let image = item.image.clone();
        let restored = match bitmap::decode_snapshot_base64(&image, &self.bitmap_limits) {
            Ok(restored) => restored,
            Err(err) => {
                warn!(%id, error = %err, "stored history image is unreadable");
                return;
            }
        };
        if !self.buffer.overwrite(&restored) {
            warn!(
                %id,
                width = restored.width(),
                height = restored.height(),
                "stored history image has the wrong dimensions"
            );
            return;
        }
        info!(%session, %id, "canvas restored from history");
        self.request_save().await;
        self.publish(Audience::All, &Action::init(image, Some(id.to_owned())));
    }

    fn init_frame(&self, history_id: Option<String>) -> Result<Arc<str>, ServerError> {
        let image = bitmap::encode_snapshot_base64(&self.buffer.snapshot())?;
        Ok(encode_action(&Action::init(image, history_id))?.into())
    }

    fn broadcast_snapshot(&self) {
        if self.sessions.is_empty() {
            return;
        }
        match self.init_frame(None) {
            Ok(init) => {
                self.hub.publish(Audience::All, init);
            }
            Err(err) => warn!(error = %err, "failed to encode periodic snapshot"),
        }
    }

    fn broadcast_presence(&self) {
        let ids = self.sessions.iter().map(ToString::to_string);
        self.publish(Audience::All, &Action::presence(ids));
    }

    fn publish_history(&self, audience: Audience) {
        let history = self.history.items();
        self.publish(audience, &Action::HistoryUpdate { history });
    }

    fn publish(&self, audience: Audience, action: &Action) {
        match encode_action(action) {
            Ok(text) => {
                self.hub.publish(audience, text);
            }
            Err(err) => warn!(kind = action.kind(), error = %err, "failed to encode message"),
        }
    }

    async fn request_save(&mut self) {
        self.save_timer.cancel();
        match self.throttle.request(Instant::now()) {
            SaveDecision::Now => self.start_save(),
            SaveDecision::Defer(delay) => self.save_timer.arm(delay, ()),
            SaveDecision::AfterWrite => debug!("save queued behind the write in flight"),
        }
    }

    fn start_save(&mut self) {
        self.throttle.write_started();
        let store = self.store.clone();
        let frame = self.buffer.snapshot();
        self.writing = Some(tokio::spawn(async move {
            match store.save(frame).await {
                Ok(bytes) => debug!(bytes, "canvas saved"),
                Err(err) => error!(error = %err, "failed to save canvas"),
            }
        }));
    }

    /// Restarts the throttle window and replays a request that arrived
    /// during the write.
    async fn write_done(&mut self, result: Result<(), JoinError>) {
        self.writing = None;
        if let Err(err) = result {
            error!(error = %err, "save task failed");
        }
        if self.throttle.write_finished(Instant::now()) {
            self.request_save().await;
        }
    }

    async fn finish_write(&mut self) -> bool {
        let Some(write) = self.writing.take() else {
            return false;
        };
        if let Err(err) = write.await {
            error!(error = %err, "save task failed");
        }
        self.throttle.write_finished(Instant::now())
    }

    async fn flush(&mut self) {
        let deferred = self.save_timer.fire().is_some();
        let queued = self.finish_write().await;
        if deferred || queued {
            self.start_save();
            self.finish_write().await;
        }
        info!("canvas flushed");
    }
}

async fn write_finished(writing: Option<&mut JoinHandle<()>>) -> Result<(), JoinError> {
    match writing {
        Some(write) => write.await,
        None => future::pending().await,
    }
}

async fn next_tick(interval: Option<&mut Interval>) -> Instant {
    match interval {
        Some(interval) => interval.tick().await,
        None => future::pending().await,
    }
}
