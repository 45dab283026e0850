//! The scrawl action protocol.
//!
//! Every WebSocket text frame is one JSON object tagged by `type`. This crate
//! parses frames into [`Action`]s, validates them into [`Request`]s, and
//! defines how a [`Mutation`] is applied to a [`raster::RasterBuffer`]. The
//! server and every client share this apply path, which is what keeps their
//! rasters identical.
//!
//! # Design Principles
//!
//! - **Closed sum type** - One enum variant per message tag, one validation
//!   rule per variant.
//! - **Bounded decoding** - Frame size, stroke length and id length are
//!   checked against [`Limits`].
//! - **Relay verbatim** - Validation never rewrites a message; the server
//!   forwards the original text.
//!
//! # Example
//!
//! ```
//! use protocol::{parse_request, Limits, Request};
//! use raster::{RasterBuffer, Rgba};
//!
//! let text = r##"{"type":"fill","x":400,"y":240,"color":"#ff0000"}"##;
//! let Request::Mutate(mutation) = parse_request(text, &Limits::default()).unwrap() else {
//!     panic!("fill is a mutation");
//! };
//!
//! let mut canvas = RasterBuffer::canvas();
//! assert!(mutation.apply(&mut canvas));
//! assert_eq!(canvas.get_pixel(0, 0), Some(Rgba::RED));
//! ```

mod action;
mod error;
mod limits;
mod validate;

pub use action::{decode_action, encode_action, Action, HistoryItem, User};
pub use error::{LimitKind, ProtocolError, ProtocolResult, Rejection};
pub use limits::Limits;
pub use validate::{parse_request, BrushSize, Mutation, PaletteColor, Request};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = Limits::default();
        let _ = PaletteColor::ALL;
        let _ = BrushSize::ALL;
        let _ = Action::Clear;
        let _: ProtocolResult<()> = Ok(());
    }

    #[test]
    fn palette_strings_cover_wire_values() {
        let strings: Vec<_> = PaletteColor::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(strings, ["#000000", "#ffffff", "#ff0000"]);
        let sizes: Vec<_> = BrushSize::ALL.iter().map(|b| b.pixels()).collect();
        assert_eq!(sizes, [2, 5, 10]);
    }
}
