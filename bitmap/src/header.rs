//! BMP header layout for the 2-bit indexed persistence format.

use crate::error::{BitmapError, BitmapResult};

/// `BITMAPFILEHEADER` size in bytes.
pub const FILE_HEADER_LEN: usize = 14;

/// `BITMAPINFOHEADER` size in bytes.
pub const INFO_HEADER_LEN: usize = 40;

/// Palette size in bytes (4 entries × 4 bytes).
pub const PALETTE_LEN: usize = 16;

/// Offset of the first pixel byte (14 + 40 + 16).
pub const PIXEL_DATA_OFFSET: usize = FILE_HEADER_LEN + INFO_HEADER_LEN + PALETTE_LEN;

/// Bits per pixel of the persistence format.
pub const BITS_PER_PIXEL: u16 = 2;

/// Number of palette entries declared in the header.
pub const COLORS_USED: u32 = 4;

const SIGNATURE: [u8; 2] = *b"BM";

/// Bytes per row: four pixels per byte, rounded up, no further padding.
#[must_use]
pub const fn row_stride(width: u32) -> usize {
    (width as usize).div_ceil(4)
}

/// Parsed header fields.
///
/// `height` keeps its sign: negative means rows are stored top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    pub file_size: u32,
    pub pixel_offset: u32,
    pub info_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    pub colors_used: u32,
}

impl BmpHeader {
    /// Builds the header written for a top-down `width × height` image.
    #[must_use]
    pub const fn top_down(width: u32, height: u32) -> Self {
        let image_size = (row_stride(width) * height as usize) as u32;
        Self {
            file_size: PIXEL_DATA_OFFSET as u32 + image_size,
            pixel_offset: PIXEL_DATA_OFFSET as u32,
            info_size: INFO_HEADER_LEN as u32,
            width: width as i32,
            height: -(height as i32),
            planes: 1,
            bits_per_pixel: BITS_PER_PIXEL,
            compression: 0,
            image_size,
            colors_used: COLORS_USED,
        }
    }

    /// Returns `true` when rows are stored top row first.
    #[must_use]
    pub const fn is_top_down(&self) -> bool {
        self.height < 0
    }

    /// Absolute pixel height.
    #[must_use]
    pub const fn abs_height(&self) -> u32 {
        self.height.unsigned_abs()
    }

    /// Appends the file header and info header (54 bytes).
    pub fn write_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&SIGNATURE);
        out.extend_from_slice(&self.file_size.to_le_bytes());
        out.extend_from_slice(&[0; 4]); // reserved
        out.extend_from_slice(&self.pixel_offset.to_le_bytes());

        out.extend_from_slice(&self.info_size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.planes.to_le_bytes());
        out.extend_from_slice(&self.bits_per_pixel.to_le_bytes());
        out.extend_from_slice(&self.compression.to_le_bytes());
        out.extend_from_slice(&self.image_size.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // x pixels per meter
        out.extend_from_slice(&0u32.to_le_bytes()); // y pixels per meter
        out.extend_from_slice(&self.colors_used.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // important colors
    }

    /// Parses and validates the fixed headers.
    ///
    /// Checks the signature, the info header size, the bit depth and the
    /// compression. Dimension limits are the caller's concern.
    pub fn parse(bytes: &[u8]) -> BitmapResult<Self> {
        if bytes.len() < PIXEL_DATA_OFFSET {
            return Err(BitmapError::TooShort {
                actual: bytes.len(),
                required: PIXEL_DATA_OFFSET,
            });
        }
        let found = [bytes[0], bytes[1]];
        if found != SIGNATURE {
            return Err(BitmapError::InvalidSignature { found });
        }

        let header = Self {
            file_size: read_u32(bytes, 2),
            pixel_offset: read_u32(bytes, 10),
            info_size: read_u32(bytes, 14),
            width: read_u32(bytes, 18) as i32,
            height: read_u32(bytes, 22) as i32,
            planes: read_u16(bytes, 26),
            bits_per_pixel: read_u16(bytes, 28),
            compression: read_u32(bytes, 30),
            image_size: read_u32(bytes, 34),
            colors_used: read_u32(bytes, 46),
        };

        if header.info_size as usize != INFO_HEADER_LEN {
            return Err(BitmapError::UnsupportedHeaderSize {
                found: header.info_size,
            });
        }
        if header.bits_per_pixel != BITS_PER_PIXEL {
            return Err(BitmapError::UnsupportedBitDepth {
                found: header.bits_per_pixel,
            });
        }
        if header.compression != 0 {
            return Err(BitmapError::UnsupportedCompression {
                found: header.compression,
            });
        }
        if header.width <= 0 || header.height == 0 || header.height == i32::MIN {
            return Err(BitmapError::InvalidDimensions {
                width: header.width,
                height: header.height,
            });
        }
        Ok(header)
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(header: &BmpHeader) -> Vec<u8> {
        let mut out = Vec::new();
        header.write_into(&mut out);
        out.resize(PIXEL_DATA_OFFSET, 0);
        out
    }

    #[test]
    fn offsets_are_fixed() {
        assert_eq!(PIXEL_DATA_OFFSET, 70);
        let mut out = Vec::new();
        BmpHeader::top_down(800, 480).write_into(&mut out);
        assert_eq!(out.len(), FILE_HEADER_LEN + INFO_HEADER_LEN);
    }

    #[test]
    fn stride_rounds_up() {
        assert_eq!(row_stride(800), 200);
        assert_eq!(row_stride(1), 1);
        assert_eq!(row_stride(5), 2);
        assert_eq!(row_stride(8), 2);
    }

    #[test]
    fn canvas_header_fields() {
        let header = BmpHeader::top_down(800, 480);
        assert_eq!(header.image_size, 200 * 480);
        assert_eq!(header.file_size, 70 + 200 * 480);
        assert_eq!(header.height, -480);
        assert!(header.is_top_down());
        assert_eq!(header.abs_height(), 480);

        let bytes = encoded(&header);
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(read_u32(&bytes, 2), 70 + 96_000);
        assert_eq!(read_u32(&bytes, 10), 70);
        assert_eq!(read_u32(&bytes, 22) as i32, -480);
        assert_eq!(read_u16(&bytes, 28), 2);
        assert_eq!(read_u32(&bytes, 46), 4);
    }

    #[test]
    fn parse_roundtrip() {
        let header = BmpHeader::top_down(13, 7);
        assert_eq!(BmpHeader::parse(&encoded(&header)).unwrap(), header);
    }

    #[test]
    fn parse_rejects_short_input() {
        assert!(matches!(
            BmpHeader::parse(b"BM"),
            Err(BitmapError::TooShort {
                actual: 2,
                required: 70
            })
        ));
    }

    #[test]
    fn parse_rejects_bad_signature() {
        let mut bytes = encoded(&BmpHeader::top_down(4, 4));
        bytes[0] = b'X';
        assert!(matches!(
            BmpHeader::parse(&bytes),
            Err(BitmapError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn parse_rejects_other_depths_and_compression() {
        let mut header = BmpHeader::top_down(4, 4);
        header.bits_per_pixel = 8;
        assert_eq!(
            BmpHeader::parse(&encoded(&header)),
            Err(BitmapError::UnsupportedBitDepth { found: 8 })
        );

        let mut header = BmpHeader::top_down(4, 4);
        header.compression = 1;
        assert_eq!(
            BmpHeader::parse(&encoded(&header)),
            Err(BitmapError::UnsupportedCompression { found: 1 })
        );

        let mut header = BmpHeader::top_down(4, 4);
        header.info_size = 124;
        assert_eq!(
            BmpHeader::parse(&encoded(&header)),
            Err(BitmapError::UnsupportedHeaderSize { found: 124 })
        );
    }

    #[test]
    fn parse_rejects_degenerate_dimensions() {
        for (width, height) in [(0, -4), (-4, -4), (4, 0), (4, i32::MIN)] {
            let mut header = BmpHeader::top_down(4, 4);
            header.width = width;
            header.height = height;
            assert_eq!(
                BmpHeader::parse(&encoded(&header)),
                Err(BitmapError::InvalidDimensions { width, height })
            );
        }
    }

    #[test]
    fn positive_height_is_bottom_up() {
        let mut header = BmpHeader::top_down(4, 4);
        header.height = 4;
        let parsed = BmpHeader::parse(&encoded(&header)).unwrap();
        assert!(!parsed.is_top_down());
        assert_eq!(parsed.abs_height(), 4);
    }
}
