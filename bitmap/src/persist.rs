//! The 2-bit indexed BMP persistence format.

use raster::{Frame, RasterBuffer};

use crate::error::{BitmapError, BitmapResult, LimitKind};
use crate::header::{row_stride, BmpHeader, PIXEL_DATA_OFFSET};
use crate::limits::Limits;
use crate::packing::{IndexReader, IndexWriter};
use crate::palette::{PaletteIndex, PALETTE_BGRA};

/// Encodes a frame as a top-down 2-bit indexed BMP.
///
/// Every pixel is quantized to the nearest palette entry, so the encoding is
/// lossy for anything outside white, black and red.
#[must_use]
pub fn encode_bitmap(frame: &Frame) -> Vec<u8> {
    let width = frame.width();
    let height = frame.height();
    let header = BmpHeader::top_down(width, height);
    let stride = row_stride(width);

    let mut out = Vec::with_capacity(header.file_size as usize);
    header.write_into(&mut out);
    for entry in PALETTE_BGRA {
        out.extend_from_slice(&entry);
    }

    let mut writer = IndexWriter::with_capacity(stride * height as usize);
    let mut pixels = frame.pixels();
    for _ in 0..height {
        for pixel in pixels.by_ref().take(width as usize) {
            writer.write(PaletteIndex::nearest(pixel));
        }
        writer.end_row();
    }
    writer.finish_into(&mut out);
    out
}

/// Decodes a persisted bitmap back into an RGBA buffer.
///
/// Pixel data is read from byte 70 regardless of the header's offset field.
/// Indices are mapped through the fixed palette; the palette stored in the
/// file is not consulted.
pub fn decode_bitmap(bytes: &[u8], limits: &Limits) -> BitmapResult<RasterBuffer> {
    if bytes.len() > limits.max_encoded_bytes {
        return Err(BitmapError::LimitsExceeded {
            kind: LimitKind::EncodedBytes,
            limit: limits.max_encoded_bytes,
            actual: bytes.len(),
        });
    }

    let header = BmpHeader::parse(bytes)?;
    let width = header.width as u32;
    let height = header.abs_height();
    if width > limits.max_width {
        return Err(BitmapError::LimitsExceeded {
            kind: LimitKind::Width,
            limit: limits.max_width as usize,
            actual: width as usize,
        });
    }
    if height > limits.max_height {
        return Err(BitmapError::LimitsExceeded {
            kind: LimitKind::Height,
            limit: limits.max_height as usize,
            actual: height as usize,
        });
    }

    let stride = row_stride(width);
    let needed = stride * height as usize;
    let pixel_data = &bytes[PIXEL_DATA_OFFSET..];
    if pixel_data.len() < needed {
        return Err(BitmapError::PixelDataTruncated {
            needed,
            available: pixel_data.len(),
        });
    }

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height as usize {
        let stored_row = if header.is_top_down() {
            y
        } else {
            height as usize - 1 - y
        };
        let row = &pixel_data[stored_row * stride..(stored_row + 1) * stride];
        for index in IndexReader::new(row).take(width as usize) {
            rgba.extend_from_slice(&index.rgba().to_array());
        }
    }

    Ok(RasterBuffer::from_rgba(width, height, rgba)?)
}
