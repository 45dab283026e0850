//! The client-side copy of the canvas.

use protocol::{Action, BrushSize, HistoryItem, Mutation, PaletteColor, User};
use raster::{draw_path, stamp, stroke, BrushStamp, Frame, Point, RasterBuffer};

use crate::error::ClientError;

/// What applying a remote frame did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The raster was replaced by a snapshot.
    Snapshot,
    /// A remote draw, fill or clear was applied.
    Mutated { changed: bool },
    History,
    Presence,
    Wave,
    /// A message the server never sends to clients.
    Ignored,
}

#[derive(Debug, Clone)]
struct LocalStroke {
    points: Vec<Point>,
    color: PaletteColor,
    size: BrushSize,
    brush: BrushStamp,
}

/// Local raster plus the server-driven side state.
///
/// Remote actions go through [`Mutation::apply`], the same path the server
/// uses. Local actions are applied immediately and returned as the
/// [`Action`] to send. An `init` replaces everything and re-applies the
/// stroke still being drawn.
#[derive(Debug, Clone)]
pub struct Replica {
    buffer: RasterBuffer,
    snapshot_limits: bitmap::Limits,
    stroke: Option<LocalStroke>,
    history_id: Option<String>,
    history: Vec<HistoryItem>,
    users: Vec<User>,
}

impl Default for Replica {
    fn default() -> Self {
        Self::new(bitmap::Limits::default())
    }
}

impl Replica {
    pub fn new(snapshot_limits: bitmap::Limits) -> Self {
        Self {
            buffer: RasterBuffer::canvas(),
            snapshot_limits,
            stroke: None,
            history_id: None,
            history: Vec::new(),
            users: Vec::new(),
        }
    }

    pub const fn buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    pub fn frame(&self) -> Frame {
        self.buffer.snapshot()
    }

    /// Id of the history entry the canvas was last restored from.
    pub fn history_id(&self) -> Option<&str> {
        self.history_id.as_deref()
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub const fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// Applies one frame received from the server.
    pub fn apply_remote(&mut self, action: &Action) -> Result<Applied, ClientError> {
        match action {
            Action::Init { image, history_id } => {
                self.buffer = bitmap::decode_snapshot_base64(image, &self.snapshot_limits)?;
                if let Some(id) = history_id {
                    self.history_id = Some(id.clone());
                }
                if let Some(local) = &self.stroke {
                    draw_path(
                        &mut self.buffer,
                        &local.points,
                        local.size.pixels(),
                        local.color.rgba(),
                    );
                }
                Ok(Applied::Snapshot)
            }
            Action::Draw { .. } | Action::Fill { .. } | Action::Clear => {
                let changed = action
                    .to_mutation()?
                    .is_some_and(|mutation| mutation.apply(&mut self.buffer));
                Ok(Applied::Mutated { changed })
            }
            Action::HistoryUpdate { history } => {
                self.history.clone_from(history);
                Ok(Applied::History)
            }
            Action::PresenceUpdate { users } => {
                self.users.clone_from(users);
                Ok(Applied::Presence)
            }
            Action::Wave => Ok(Applied::Wave),
            Action::GetHistory
            | Action::Restore { .. }
            | Action::DeleteHistory { .. }
            | Action::SaveToHistory { .. } => Ok(Applied::Ignored),
        }
    }

    /// Starts a stroke. Nothing is drawn until it moves or ends.
    pub fn begin_stroke(&mut self, at: Point, color: PaletteColor, size: BrushSize) {
        self.stroke = Some(LocalStroke {
            points: vec![at],
            color,
            size,
            brush: BrushStamp::new(size.pixels()),
        });
    }

    /// Extends the stroke and draws the new segment.
    pub fn extend_stroke(&mut self, to: Point) {
        let Some(local) = self.stroke.as_mut() else {
            return;
        };
        if let Some(&from) = local.points.last() {
            stroke(&mut self.buffer, from, to, &local.brush, local.color.rgba());
        }
        local.points.push(to);
    }

    /// Ends the stroke and returns the `draw` to send.
    ///
    /// A stroke that never moved is stamped once here.
    pub fn finish_stroke(&mut self) -> Option<Action> {
        let local = self.stroke.take()?;
        if let [only] = local.points.as_slice() {
            stamp(&mut self.buffer, *only, &local.brush, local.color.rgba());
        }
        Some(Action::Draw {
            points: local.points,
            color: local.color.as_str().to_owned(),
            brush_size: f64::from(local.size.pixels()),
        })
    }

    /// Drops the stroke in progress without sending it.
    pub fn cancel_stroke(&mut self) {
        self.stroke = None;
    }

    /// Fills locally and returns the `fill` to send.
    pub fn fill(&mut self, x: i32, y: i32, color: PaletteColor) -> Action {
        Mutation::Fill { x, y, color }.apply(&mut self.buffer);
        Action::Fill {
            x,
            y,
            color: color.as_str().to_owned(),
        }
    }

    /// Clears locally and returns the `clear` to send.
    pub fn clear(&mut self) -> Action {
        Mutation::Clear.apply(&mut self.buffer);
        Action::Clear
    }
}
