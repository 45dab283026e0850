//! Authoritative WebSocket server for the scrawl shared canvas.
//!
//! A single canvas actor owns the raster. Every session's actions are
//! validated and applied there in arrival order, then relayed verbatim to the
//! other sessions. The raster is persisted to one bitmap file with at most one
//! write per throttle window.
//!
//! # Design Principles
//!
//! - **One writer** - Only the canvas actor touches the raster; everyone else
//!   holds a [`CanvasHandle`].
//! - **Join is atomic** - Subscribe and snapshot happen in one actor step, so
//!   a new session never misses or double-applies an action.
//! - **Nothing fatal after bind** - Bad messages are dropped and persistence
//!   failures are logged.
//!
//! # Example
//!
//! ```no_run
//! use server::{run, ServerConfig};
//!
//! # async fn example() -> Result<(), server::ServerError> {
//! run(ServerConfig::default(), async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await
//! # }
//! ```

pub mod canvas;
mod config;
mod error;
mod history;
pub mod http;
mod hub;
pub mod schedule;
pub mod session;
mod store;
mod throttle;

use std::future::Future;

use raster::RasterBuffer;
use tracing::{info, warn};

pub use canvas::{CanvasHandle, Joined, Resynced};
pub use config::{Args, ServerConfig};
pub use error::{PersistError, ServerError};
pub use history::HistoryStore;
pub use hub::{Audience, Hub, Outbound, SessionId};
pub use schedule::{ClearSchedule, CronSchedule};
pub use session::{Inbound, Session, SessionState};
pub use store::FileStore;
pub use throttle::{SaveDecision, SaveThrottle};

/// Loads the persisted canvas, falling back to a blank one.
pub fn load_canvas(store: &FileStore, limits: &bitmap::Limits) -> RasterBuffer {
    match store.load(limits) {
        Ok(Some(buffer)) => {
            info!(path = %store.path().display(), "loaded persisted canvas");
            buffer
        }
        Ok(None) => {
            info!(path = %store.path().display(), "no persisted canvas, starting blank");
            RasterBuffer::canvas()
        }
        Err(err) => {
            warn!(path = %store.path().display(), error = %err, "failed to load canvas, starting blank");
            RasterBuffer::canvas()
        }
    }
}

/// Runs the server until `shutdown` resolves, then flushes any pending save.
pub async fn run<F>(config: ServerConfig, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let schedule = config
        .clear_cron
        .as_deref()
        .map(CronSchedule::parse)
        .transpose()?;

    let store = FileStore::new(&config.save_path);
    let buffer = load_canvas(&store, &config.bitmap_limits);
    let (canvas, actor) = canvas::spawn(&config, buffer, store);

    let clear_task = schedule.map(|schedule| {
        info!(cron = schedule.expr(), "scheduled clear enabled");
        tokio::spawn(schedule::run_clear_schedule(schedule, canvas.clone()))
    });

    let listener = tokio::net::TcpListener::bind(config.listen_address)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen_address,
            source,
        })?;
    info!(addr = %config.listen_address, "listening");

    let app = http::router(http::AppState {
        canvas: canvas.clone(),
        max_message_bytes: config.protocol_limits.max_message_bytes,
    });
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("shutting down");
    if let Some(task) = clear_task {
        task.abort();
    }
    canvas.shutdown().await?;
    let _ = actor.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = ServerConfig::default();
        let _ = HistoryStore::new(1);
        let _ = SessionId::new();
        let _ = Audience::All;
    }

    #[test]
    fn load_canvas_falls_back_to_blank() {
        let path = std::env::temp_dir().join(format!("scrawl-lib-{}.bmp", std::process::id()));
        std::fs::write(&path, b"garbage").unwrap();
        let buffer = load_canvas(&FileStore::new(&path), &bitmap::Limits::default());
        assert_eq!(buffer, RasterBuffer::canvas());
        let _ = std::fs::remove_file(path);
    }
}
