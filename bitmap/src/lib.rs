//! Canvas image codecs for scrawl.
//!
//! Two encodings live here:
//!
//! - **Persistence** - a top-down 2-bit indexed BMP with a fixed four-entry
//!   palette (white, black, red, unused). Compact and lossy: every pixel is
//!   quantized to the nearest palette color.
//! - **Transport** - a lossless RGBA PNG, base64-encoded for the `init`
//!   message sent to clients.
//!
//! # Design Principles
//!
//! - **Stable** - Decoding a persisted file and encoding it again yields the
//!   same bytes.
//! - **Bounded decoding** - Dimensions and input sizes are validated against
//!   [`Limits`] before pixel storage is allocated.
//! - **Explicit errors** - Malformed input returns a [`BitmapError`], never a
//!   panic.
//!
//! # Example
//!
//! ```
//! use bitmap::{decode_bitmap, encode_bitmap, Limits};
//! use raster::{RasterBuffer, Rgba};
//!
//! let mut buffer = RasterBuffer::blank(8, 4);
//! buffer.set_pixel(2, 1, Rgba::RED);
//!
//! let bytes = encode_bitmap(&buffer.snapshot());
//! let decoded = decode_bitmap(&bytes, &Limits::default()).unwrap();
//!
//! assert_eq!(decoded, buffer);
//! ```

mod error;
mod header;
mod limits;
mod packing;
mod palette;
mod persist;
mod transport;

pub use error::{BitmapError, BitmapResult, LimitKind};
pub use header::{
    row_stride, BmpHeader, BITS_PER_PIXEL, COLORS_USED, FILE_HEADER_LEN, INFO_HEADER_LEN,
    PALETTE_LEN, PIXEL_DATA_OFFSET,
};
pub use limits::Limits;
pub use packing::{IndexReader, IndexWriter};
pub use palette::{PaletteIndex, PALETTE_BGRA};
pub use persist::{decode_bitmap, encode_bitmap};
pub use transport::{decode_png, decode_snapshot_base64, encode_png, encode_snapshot_base64};
