//! HTTP routes and the WebSocket upgrade.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::{future, SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::canvas::CanvasHandle;
use crate::session::{self, Inbound};

/// Body of every unknown path.
pub const BANNER: &str = "Scrawl WebSocket Server";

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub canvas: CanvasHandle,
    pub max_message_bytes: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/drawing.bmp", get(download_bitmap))
        .route("/health", get(health))
        .fallback(banner)
        .with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.max_message_size(state.max_message_bytes)
        .on_upgrade(move |socket| serve_socket(socket, state.canvas))
}

async fn serve_socket(socket: WebSocket, canvas: CanvasHandle) {
    let (sink, stream) = socket.split();
    let incoming = Box::pin(stream.filter_map(|message| {
        future::ready(match message {
            Ok(Message::Text(text)) => Some(Inbound::Text(text)),
            Ok(Message::Close(_)) => Some(Inbound::Close),
            Err(err) => {
                debug!(error = %err, "websocket receive failed");
                Some(Inbound::Close)
            }
            // binary frames are not part of the protocol
            Ok(_) => None,
        })
    }));
    let outgoing =
        sink.with(|text: String| future::ready(Ok::<_, axum::Error>(Message::Text(text))));

    if let Err(err) = session::drive(canvas, incoming, outgoing).await {
        warn!(error = %err, "session ended with error");
    }
}

async fn download_bitmap(State(state): State<AppState>) -> Response {
    let frame = match state.canvas.snapshot().await {
        Ok(frame) => frame,
        Err(err) => return (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response(),
    };
    let bytes = bitmap::encode_bitmap(&frame);
    (
        [
            (header::CONTENT_TYPE, "image/bmp"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=drawing.bmp",
            ),
        ],
        bytes,
    )
        .into_response()
}

async fn health() -> &'static str {
    "OK"
}

async fn banner() -> &'static str {
    BANNER
}
