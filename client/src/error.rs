//! Client error types.

use bitmap::BitmapError;
use protocol::{ProtocolError, Rejection};
use thiserror::Error;

/// Client errors.
///
/// Only [`ClientError::GaveUp`] ever ends a driver run. The rest describe a
/// single failed connect, frame or snapshot and are logged.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("disconnected from server")]
    Disconnected,

    #[error("gave up after {attempts} reconnect attempts")]
    GaveUp { attempts: u32 },

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("remote action rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("snapshot decode failed: {0}")]
    Snapshot(#[from] BitmapError),

    #[error("channel closed")]
    ChannelClosed,
}
