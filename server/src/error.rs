//! Server error types.

use std::net::SocketAddr;

use bitmap::BitmapError;
use protocol::ProtocolError;
use thiserror::Error;

/// Errors that stop the server or fail a request to the canvas actor.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid clear schedule {expr:?}: {reason}")]
    InvalidSchedule { expr: String, reason: String },

    #[error("canvas actor is no longer running")]
    CanvasClosed,

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] BitmapError),

    #[error("message encoding failed: {0}")]
    Encode(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while loading or saving the persisted canvas.
///
/// None of these are fatal: a failed load falls back to a blank canvas and a
/// failed save is retried on the next change.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt bitmap: {0}")]
    Decode(#[from] BitmapError),

    #[error("persisted canvas is {width}x{height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("background write failed: {0}")]
    Join(String),
}

impl PersistError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_display() {
        let err = ServerError::InvalidSchedule {
            expr: "every day".to_owned(),
            reason: "bad field".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("every day"));
        assert!(msg.contains("bad field"));
        assert_eq!(
            ServerError::CanvasClosed.to_string(),
            "canvas actor is no longer running"
        );
    }

    #[test]
    fn persist_error_mentions_path() {
        let err = PersistError::io(
            std::path::Path::new("drawings/current.bmp"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("drawings/current.bmp"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn bitmap_errors_convert() {
        let err: PersistError = BitmapError::TooShort {
            actual: 0,
            required: 70,
        }
        .into();
        assert!(matches!(err, PersistError::Decode(_)));
    }

    #[test]
    fn errors_are_std_errors() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ServerError>();
        assert_error::<PersistError>();
    }
}
