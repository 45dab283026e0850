//! Lossless PNG transport encoding for network snapshots.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::png::{PngDecoder, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder};
use raster::{Frame, RasterBuffer};

use crate::error::{BitmapError, BitmapResult, LimitKind};
use crate::limits::Limits;

/// Encodes a frame as an RGBA8 PNG.
pub fn encode_png(frame: &Frame) -> BitmapResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        frame.as_rgba(),
        frame.width(),
        frame.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(out)
}

/// Decodes a PNG into an RGBA buffer, checking dimensions before decoding
/// pixel data.
pub fn decode_png(bytes: &[u8], limits: &Limits) -> BitmapResult<RasterBuffer> {
    check_encoded_len(bytes.len(), limits)?;

    let decoder = PngDecoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions();
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

    let rgba = DynamicImage::from_decoder(decoder)?.into_rgba8();
    Ok(RasterBuffer::from_rgba(width, height, rgba.into_raw())?)
}

/// Encodes a frame as standard, padded base64 of its PNG bytes.
///
/// This is the `image` field of an `init` message.
pub fn encode_snapshot_base64(frame: &Frame) -> BitmapResult<String> {
    Ok(STANDARD.encode(encode_png(frame)?))
}

/// Inverse of [`encode_snapshot_base64`].
pub fn decode_snapshot_base64(text: &str, limits: &Limits) -> BitmapResult<RasterBuffer> {
    // 4 base64 chars carry 3 bytes
    check_encoded_len(text.len() / 4 * 3, limits)?;
    let bytes = STANDARD.decode(text)?;
    decode_png(&bytes, limits)
}

fn check_encoded_len(len: usize, limits: &Limits) -> BitmapResult<()> {
    if len > limits.max_encoded_bytes {
        return Err(BitmapError::LimitsExceeded {
            kind: LimitKind::EncodedBytes,
            limit: limits.max_encoded_bytes,
            actual: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster::Rgba;

    #[test]
    fn png_preserves_full_color() {
        let mut buffer = RasterBuffer::blank(6, 4);
        buffer.set_pixel(1, 1, Rgba::opaque(12, 34, 56));
        buffer.set_pixel(5, 3, Rgba::new(200, 100, 50, 7));
        let png = encode_png(&buffer.snapshot()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = decode_png(&png, &Limits::default()).unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn base64_is_standard_padded() {
        let text = encode_snapshot_base64(&RasterBuffer::blank(3, 3).snapshot()).unwrap();
        assert!(text.starts_with("iVBORw0KGgo"));
        assert_eq!(text.len() % 4, 0);
        assert!(!text.contains('-') && !text.contains('_'));
    }

    #[test]
    fn base64_roundtrip() {
        let mut buffer = RasterBuffer::blank(10, 10);
        buffer.fill_rect(2, 2, 6, 6, Rgba::RED);
        let text = encode_snapshot_base64(&buffer.snapshot()).unwrap();
        let decoded = decode_snapshot_base64(&text, &Limits::default()).unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn malformed_base64_is_rejected() {
        let err = decode_snapshot_base64("not base64!", &Limits::default()).unwrap_err();
        assert!(matches!(err, BitmapError::Base64(_)));
    }

    #[test]
    fn non_png_payload_is_rejected() {
        let err = decode_png(b"definitely not a png", &Limits::default()).unwrap_err();
        assert!(matches!(err, BitmapError::Png(_)));
    }

    #[test]
    fn png_dimensions_are_limited() {
        let png = encode_png(&RasterBuffer::blank(100, 2).snapshot()).unwrap();
        let err = decode_png(&png, &Limits::for_testing()).unwrap_err();
        assert_eq!(
            err,
            BitmapError::LimitsExceeded {
                kind: LimitKind::Width,
                limit: 64,
                actual: 100
            }
        );
    }
}
