//! The fixed four-entry persistence palette and color quantization.

use raster::Rgba;

/// A 2-bit palette index as stored in the persistence format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PaletteIndex {
    White = 0,
    Black = 1,
    Red = 2,
    /// Reserved slot. Never produced by the encoder; decodes as transparent.
    Unused = 3,
}

impl PaletteIndex {
    /// All indices in file order.
    pub const ALL: [Self; 4] = [Self::White, Self::Black, Self::Red, Self::Unused];

    /// Maps the low two bits of `bits` to an index.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::White,
            1 => Self::Black,
            2 => Self::Red,
            _ => Self::Unused,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// The RGBA value this index decodes to.
    #[must_use]
    pub const fn rgba(self) -> Rgba {
        match self {
            Self::White => Rgba::WHITE,
            Self::Black => Rgba::BLACK,
            Self::Red => Rgba::RED,
            Self::Unused => Rgba::TRANSPARENT,
        }
    }

    /// Picks the palette entry closest to `color` by RGB L1 distance.
    ///
    /// Ties resolve toward white, then red, then black. Alpha is ignored.
    #[must_use]
    pub const fn nearest(color: Rgba) -> Self {
        let white = color.manhattan_rgb(Rgba::WHITE);
        let red = color.manhattan_rgb(Rgba::RED);
        let black = color.manhattan_rgb(Rgba::BLACK);

        if white <= red && white <= black {
            Self::White
        } else if red <= black {
            Self::Red
        } else {
            Self::Black
        }
    }
}

/// Palette entries as written to disk: little-endian `B, G, R, A` per entry.
pub const PALETTE_BGRA: [[u8; 4]; 4] = [
    [0xff, 0xff, 0xff, 0xff],
    [0x00, 0x00, 0x00, 0xff],
    [0x00, 0x00, 0xff, 0xff],
    [0x00, 0x00, 0x00, 0x00],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colors_quantize_to_themselves() {
        for index in [PaletteIndex::White, PaletteIndex::Black, PaletteIndex::Red] {
            assert_eq!(PaletteIndex::nearest(index.rgba()), index);
        }
    }

    #[test]
    fn white_wins_ties_with_red() {
        // g + b == 255 puts the color exactly between white and red
        let salmon = Rgba::opaque(255, 100, 155);
        assert_eq!(salmon.manhattan_rgb(Rgba::WHITE), 255);
        assert_eq!(salmon.manhattan_rgb(Rgba::RED), 255);
        assert_eq!(PaletteIndex::nearest(salmon), PaletteIndex::White);
    }

    #[test]
    fn mid_grey_goes_white() {
        let grey = Rgba::opaque(127, 128, 128);
        assert_eq!(grey.manhattan_rgb(Rgba::WHITE), 382);
        assert_eq!(grey.manhattan_rgb(Rgba::BLACK), 383);
        assert_eq!(PaletteIndex::nearest(grey), PaletteIndex::White);
    }

    #[test]
    fn dark_red_goes_red() {
        let dark_red = Rgba::opaque(128, 0, 0);
        assert_eq!(dark_red.manhattan_rgb(Rgba::RED), 127);
        assert_eq!(dark_red.manhattan_rgb(Rgba::BLACK), 128);
        assert_eq!(PaletteIndex::nearest(dark_red), PaletteIndex::Red);
    }

    #[test]
    fn dark_colors_go_black() {
        assert_eq!(
            PaletteIndex::nearest(Rgba::opaque(20, 30, 40)),
            PaletteIndex::Black
        );
        assert_eq!(
            PaletteIndex::nearest(Rgba::TRANSPARENT),
            PaletteIndex::Black
        );
    }

    #[test]
    fn bits_roundtrip() {
        for index in PaletteIndex::ALL {
            assert_eq!(PaletteIndex::from_bits(index.bits()), index);
        }
        assert_eq!(PaletteIndex::from_bits(0b1110), PaletteIndex::Red);
    }

    #[test]
    fn disk_palette_matches_rgba() {
        for index in PaletteIndex::ALL {
            let [b, g, r, a] = PALETTE_BGRA[index.bits() as usize];
            assert_eq!(Rgba::new(r, g, b, a), index.rgba());
        }
    }
}
