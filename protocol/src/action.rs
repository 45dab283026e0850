//! The wire-level action sum type.

use raster::Point;
use serde::{Deserialize, Serialize};

use crate::error::{LimitKind, ProtocolError, ProtocolResult};
use crate::limits::Limits;

/// One JSON text frame, tagged by its `type` field.
///
/// Fields are kept as they appear on the wire. Use
/// [`Action::validate`](crate::Action::validate) to get typed, checked values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    /// Full canvas snapshot (server to client).
    Init {
        /// Base64 PNG.
        image: String,
        #[serde(
            rename = "historyId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        history_id: Option<String>,
    },
    Draw {
        points: Vec<Point>,
        color: String,
        #[serde(rename = "brushSize")]
        brush_size: f64,
    },
    Fill {
        x: i32,
        y: i32,
        color: String,
    },
    Clear,
    GetHistory,
    /// Full history listing (server to client).
    HistoryUpdate {
        history: Vec<HistoryItem>,
    },
    Restore {
        id: String,
    },
    DeleteHistory {
        id: String,
    },
    SaveToHistory {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    /// Connected session list (server to client).
    PresenceUpdate {
        users: Vec<User>,
    },
    Wave,
}

/// A stored canvas revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Base64 PNG.
    pub image: String,
}

/// A connected participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

impl Action {
    /// The wire tag of this action.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Draw { .. } => "draw",
            Self::Fill { .. } => "fill",
            Self::Clear => "clear",
            Self::GetHistory => "get-history",
            Self::HistoryUpdate { .. } => "history-update",
            Self::Restore { .. } => "restore",
            Self::DeleteHistory { .. } => "delete-history",
            Self::SaveToHistory { .. } => "save-to-history",
            Self::PresenceUpdate { .. } => "presence-update",
            Self::Wave => "wave",
        }
    }

    /// Builds an `init` message.
    #[must_use]
    pub const fn init(image: String, history_id: Option<String>) -> Self {
        Self::Init { image, history_id }
    }

    /// Builds a `presence-update` message from session ids.
    #[must_use]
    pub fn presence<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::PresenceUpdate {
            users: ids.into_iter().map(|id| User { id: id.into() }).collect(),
        }
    }
}

/// Parses one text frame after checking its size.
pub fn decode_action(text: &str, limits: &Limits) -> ProtocolResult<Action> {
    if text.len() > limits.max_message_bytes {
        return Err(ProtocolError::LimitsExceeded {
            kind: LimitKind::MessageBytes,
            limit: limits.max_message_bytes,
            actual: text.len(),
        });
    }
    Ok(serde_json::from_str(text)?)
}

/// Serializes an action to a JSON text frame.
pub fn encode_action(action: &Action) -> ProtocolResult<String> {
    Ok(serde_json::to_string(action)?)
}
