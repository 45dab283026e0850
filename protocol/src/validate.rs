//! Validation of wire actions into typed requests, and the apply rules for
//! canvas mutations.

use raster::{
    draw_path, flood_fill, FillOutcome, Point, RasterBuffer, Rgba, CANVAS_HEIGHT, CANVAS_WIDTH,
};

use crate::action::Action;
use crate::error::{LimitKind, ProtocolError, ProtocolResult, Rejection};
use crate::limits::Limits;

/// The fixed drawing palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteColor {
    Black,
    White,
    Red,
}

impl PaletteColor {
    pub const ALL: [Self; 3] = [Self::Black, Self::White, Self::Red];

    /// Exact, case-sensitive match against the wire strings.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == text)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Black => "#000000",
            Self::White => "#ffffff",
            Self::Red => "#ff0000",
        }
    }

    #[must_use]
    pub const fn rgba(self) -> Rgba {
        match self {
            Self::Black => Rgba::BLACK,
            Self::White => Rgba::WHITE,
            Self::Red => Rgba::RED,
        }
    }
}

/// The fixed brush sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrushSize {
    Small,
    Medium,
    Large,
}

impl BrushSize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Matches a wire number exactly (`5` and `5.0` both match).
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_wire(size: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|brush| f64::from(brush.pixels()) == size)
    }

    #[must_use]
    pub const fn pixels(self) -> u32 {
        match self {
            Self::Small => 2,
            Self::Medium => 5,
            Self::Large => 10,
        }
    }
}

/// A validated action that changes the raster.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Draw {
        points: Vec<Point>,
        color: PaletteColor,
        size: BrushSize,
    },
    Fill {
        x: i32,
        y: i32,
        color: PaletteColor,
    },
    Clear,
}

impl Mutation {
    /// Applies the mutation. Returns `true` if the raster may have changed.
    ///
    /// Only a fill can report `false`: when the seed is out of range or the
    /// region already has the fill color.
    pub fn apply(&self, buffer: &mut RasterBuffer) -> bool {
        match self {
            Self::Draw {
                points,
                color,
                size,
            } => {
                draw_path(buffer, points, size.pixels(), color.rgba());
                true
            }
            Self::Fill { x, y, color } => {
                flood_fill(buffer, *x, *y, color.rgba()) != FillOutcome::Unchanged
            }
            Self::Clear => {
                buffer.clear(Rgba::WHITE);
                true
            }
        }
    }
}

/// What the server should do with a validated client action.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Apply to the canvas, persist, and relay to the other sessions.
    Mutate(Mutation),
    /// Relay to the other sessions without touching the canvas.
    Relay,
    GetHistory,
    SaveToHistory { id: Option<String> },
    DeleteHistory { id: String },
    Restore { id: String },
}

impl Action {
    /// Validates a client-sent action.
    ///
    /// Each variant has its own rule. Server-only messages (`init`,
    /// `history-update`, `presence-update`) are rejected.
    pub fn validate(self, limits: &Limits) -> Result<Request, Rejection> {
        match self {
            Self::Draw {
                points,
                color,
                brush_size,
            } => Ok(Request::Mutate(validate_draw(points, &color, brush_size)?)),
            Self::Fill { x, y, color } => Ok(Request::Mutate(Mutation::Fill {
                x,
                y,
                color: palette(&color)?,
            })),
            Self::Clear => Ok(Request::Mutate(Mutation::Clear)),
            Self::Wave => Ok(Request::Relay),
            Self::GetHistory => Ok(Request::GetHistory),
            Self::SaveToHistory { id } => Ok(Request::SaveToHistory {
                id: id.filter(|id| !id.is_empty() && id.len() <= limits.max_id_len),
            }),
            Self::DeleteHistory { id } => Ok(Request::DeleteHistory { id }),
            Self::Restore { id } => Ok(Request::Restore { id }),
            Self::Init { .. } | Self::HistoryUpdate { .. } | Self::PresenceUpdate { .. } => {
                Err(Rejection::ServerOnly { kind: self.kind() })
            }
        }
    }

    /// Validates an action as a mutation only, for replicas that apply
    /// remote actions. Non-mutating actions yield `Ok(None)`.
    pub fn to_mutation(&self) -> Result<Option<Mutation>, Rejection> {
        match self {
            Self::Draw {
                points,
                color,
                brush_size,
            } => validate_draw(points.clone(), color, *brush_size).map(Some),
            Self::Fill { x, y, color } => Ok(Some(Mutation::Fill {
                x: *x,
                y: *y,
                color: palette(color)?,
            })),
            Self::Clear => Ok(Some(Mutation::Clear)),
            _ => Ok(None),
        }
    }
}

fn palette(color: &str) -> Result<PaletteColor, Rejection> {
    PaletteColor::parse(color).ok_or_else(|| Rejection::OffPaletteColor {
        color: color.to_owned(),
    })
}

fn validate_draw(points: Vec<Point>, color: &str, brush_size: f64) -> Result<Mutation, Rejection> {
    let color = palette(color)?;
    let size =
        BrushSize::from_wire(brush_size).ok_or(Rejection::UnsupportedBrushSize { size: brush_size })?;
    if points.is_empty() {
        return Err(Rejection::EmptyStroke);
    }
    if !points.iter().all(|point| point.is_finite()) {
        return Err(Rejection::NonFinitePoint);
    }
    if !points.iter().all(|point| within_reach(*point)) {
        return Err(Rejection::PointOutOfReach);
    }
    Ok(Mutation::Draw {
        points,
        color,
        size,
    })
}

/// Points may overshoot the canvas by one canvas extent on every side.
fn within_reach(point: Point) -> bool {
    let reach_x = f64::from(CANVAS_WIDTH) * 2.0;
    let reach_y = f64::from(CANVAS_HEIGHT) * 2.0;
    point.x.abs() <= reach_x && point.y.abs() <= reach_y
}

/// Decodes, bounds-checks and validates one client frame.
pub fn parse_request(text: &str, limits: &Limits) -> ProtocolResult<Request> {
    let action = crate::action::decode_action(text, limits)?;
    if let Action::Draw { points, .. } = &action {
        if points.len() > limits.max_points {
            return Err(ProtocolError::LimitsExceeded {
                kind: LimitKind::Points,
                limit: limits.max_points,
                actual: points.len(),
            });
        }
    }
    if let Action::Restore { id } | Action::DeleteHistory { id } = &action {
        if id.len() > limits.max_id_len {
            return Err(ProtocolError::LimitsExceeded {
                kind: LimitKind::IdLength,
                limit: limits.max_id_len,
                actual: id.len(),
            });
        }
    }
    Ok(action.validate(limits)?)
}
