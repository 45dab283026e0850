//! Error types for message decoding and validation.

use std::fmt;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while turning a text frame into a validated request.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The frame exceeds a decoding limit.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// The frame is not a well-formed action.
    Malformed(String),

    /// The action parsed but failed validation.
    Rejected(Rejection),
}

/// Specific protocol limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    MessageBytes,
    Points,
    IdLength,
}

/// Why a well-formed action was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Color is not one of the fixed palette strings.
    OffPaletteColor { color: String },

    /// Brush size is not one of the fixed sizes.
    UnsupportedBrushSize { size: f64 },

    /// A `draw` without points.
    EmptyStroke,

    /// A point coordinate is NaN or infinite.
    NonFinitePoint,

    /// A point lies too far outside the canvas.
    PointOutOfReach,

    /// Only the server may send this kind of message.
    ServerOnly { kind: &'static str },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::Malformed(msg) => write!(f, "malformed action: {msg}"),
            Self::Rejected(rejection) => write!(f, "action rejected: {rejection}"),
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MessageBytes => "message bytes",
            Self::Points => "point count",
            Self::IdLength => "id length",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OffPaletteColor { color } => write!(f, "color {color:?} is not in the palette"),
            Self::UnsupportedBrushSize { size } => write!(f, "brush size {size} is not allowed"),
            Self::EmptyStroke => write!(f, "draw has no points"),
            Self::NonFinitePoint => write!(f, "draw has a non-finite point"),
            Self::PointOutOfReach => write!(f, "draw has a point too far outside the canvas"),
            Self::ServerOnly { kind } => write!(f, "{kind} is a server-only message"),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl std::error::Error for Rejection {}

impl From<Rejection> for ProtocolError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_limits_exceeded() {
        let err = ProtocolError::LimitsExceeded {
            kind: LimitKind::Points,
            limit: 64,
            actual: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("point count"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn display_rejection() {
        let err = ProtocolError::from(Rejection::OffPaletteColor {
            color: "#00ff00".to_owned(),
        });
        let msg = err.to_string();
        assert!(msg.contains("rejected"));
        assert!(msg.contains("#00ff00"));
    }

    #[test]
    fn display_server_only() {
        let msg = Rejection::ServerOnly { kind: "init" }.to_string();
        assert!(msg.contains("init"));
    }

    #[test]
    fn json_errors_are_malformed() {
        let err: ProtocolError = serde_json::from_str::<u8>("{").unwrap_err().into();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<ProtocolError>();
        assert_error::<Rejection>();
    }
}
