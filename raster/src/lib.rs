//! Authoritative raster primitives for scrawl.
//!
//! This crate owns the pixel model shared by the server and every client:
//! [`RasterBuffer`] (the mutable grid), [`Frame`] (an immutable point-in-time
//! copy), the bounded breadth-first [`flood_fill`], and the disk
//! [`brush`] stamp used to rasterize strokes.
//!
//! # Design Principles
//!
//! - **Deterministic** - Same buffer, same inputs, same pixels. Server and
//!   clients replay identical actions and must land on identical rasters.
//! - **Permissive bounds** - Out-of-range reads return `None`, out-of-range
//!   writes are dropped. Nothing here panics on coordinates.
//! - **No I/O** - Encoding lives in `bitmap`, networking in `server`.
//!
//! # Example
//!
//! ```
//! use raster::{flood_fill, FillOutcome, RasterBuffer, Rgba};
//!
//! let mut buffer = RasterBuffer::blank(16, 8);
//! let outcome = flood_fill(&mut buffer, 3, 3, Rgba::RED);
//!
//! assert_eq!(outcome, FillOutcome::Filled { pixels: 16 * 8 });
//! assert_eq!(buffer.get_pixel(15, 7), Some(Rgba::RED));
//! ```

pub mod brush;
mod buffer;
mod color;
mod error;
mod fill;

pub use brush::{draw_path, stamp, stroke, BrushStamp, Point};
pub use buffer::{Frame, RasterBuffer, CANVAS_HEIGHT, CANVAS_WIDTH};
pub use color::Rgba;
pub use error::{RasterError, RasterResult};
pub use fill::{flood_fill, FillOutcome, FILL_QUEUE_LIMIT};
