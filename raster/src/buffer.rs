//! The mutable raster and its immutable snapshot.

use std::sync::Arc;

use crate::color::Rgba;
use crate::error::{RasterError, RasterResult};

/// Fixed canvas width shared by server and clients.
pub const CANVAS_WIDTH: u32 = 800;

/// Fixed canvas height shared by server and clients.
pub const CANVAS_HEIGHT: u32 = 480;

const BYTES_PER_PIXEL: usize = 4;

/// A fully initialized `width × height` grid of RGBA pixels.
///
/// Rows are stored top to bottom, pixels left to right, 4 bytes each.
/// Every constructor fills every pixel, so there is no undefined state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Creates a buffer filled with `color`.
    ///
    /// Zero-sized dimensions are clamped to 1 so the buffer is never empty.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let pixel = color.to_array();
        let data = pixel.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Creates a blank white buffer.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::WHITE)
    }

    /// Creates the blank white `CANVAS_WIDTH × CANVAS_HEIGHT` canvas.
    #[must_use]
    pub fn canvas() -> Self {
        Self::blank(CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    /// Builds a buffer from raw top-down RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyDimensions { width, height });
        }
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(RasterError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` if `(x, y)` lies inside the buffer.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Reads a pixel, or `None` when out of range.
    #[must_use]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let offset = self.offset(x, y)?;
        let mut pixel = [0u8; BYTES_PER_PIXEL];
        pixel.copy_from_slice(&self.data[offset..offset + BYTES_PER_PIXEL]);
        Some(Rgba::from_array(pixel))
    }

    /// Writes a pixel. Out-of-range writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(offset) = self.offset(x, y) {
            self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&color.to_array());
        }
    }

    /// Paints the half-open rectangle `[x0, x1) × [y0, y1)`, clipped to the
    /// buffer. Corners may be given in either order.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        let left = left.clamp(0, self.width as i32) as usize;
        let right = right.clamp(0, self.width as i32) as usize;
        let top = top.clamp(0, self.height as i32) as usize;
        let bottom = bottom.clamp(0, self.height as i32) as usize;
        if left >= right || top >= bottom {
            return;
        }

        let pixel = color.to_array();
        let row_bytes = self.width as usize * BYTES_PER_PIXEL;
        for row in top..bottom {
            let start = row * row_bytes + left * BYTES_PER_PIXEL;
            let end = row * row_bytes + right * BYTES_PER_PIXEL;
            for chunk in self.data[start..end].chunks_exact_mut(BYTES_PER_PIXEL) {
                chunk.copy_from_slice(&pixel);
            }
        }
    }

    /// Paints every pixel with `color`.
    pub fn clear(&mut self, color: Rgba) {
        self.fill_rect(0, 0, self.width as i32, self.height as i32, color);
    }

    /// Replaces the whole content with another buffer of the same size.
    ///
    /// Returns `false` (and leaves `self` untouched) if the dimensions differ.
    pub fn overwrite(&mut self, other: &Self) -> bool {
        if other.width != self.width || other.height != self.height {
            return false;
        }
        self.data.copy_from_slice(&other.data);
        true
    }

    /// Returns an immutable full-frame copy for encoding.
    #[must_use]
    pub fn snapshot(&self) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            data: Arc::from(self.data.as_slice()),
        }
    }

    /// Raw top-down RGBA bytes.
    #[must_use]
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
    }
}

/// An immutable point-in-time copy of a [`RasterBuffer`].
///
/// Cloning is cheap (the pixel bytes are shared), so frames can be handed to
/// encoders and background writers without blocking the owner of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
}

impl Frame {
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut pixel = [0u8; BYTES_PER_PIXEL];
        pixel.copy_from_slice(&self.data[offset..offset + BYTES_PER_PIXEL]);
        Some(Rgba::from_array(pixel))
    }

    /// Iterates pixels row by row, top to bottom.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|chunk| Rgba::new(chunk[0], chunk[1], chunk[2], chunk[3]))
    }

    /// Raw top-down RGBA bytes.
    #[must_use]
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    /// Copies the frame back into a mutable buffer.
    #[must_use]
    pub fn to_buffer(&self) -> RasterBuffer {
        RasterBuffer {
            width: self.width,
            height: self.height,
            data: self.data.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_white_everywhere() {
        let buffer = RasterBuffer::blank(5, 3);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(buffer.get_pixel(x, y), Some(Rgba::WHITE));
            }
        }
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        let buffer = RasterBuffer::blank(0, 0);
        assert_eq!((buffer.width(), buffer.height()), (1, 1));
    }

    #[test]
    fn out_of_range_access_is_silent() {
        let mut buffer = RasterBuffer::blank(4, 4);
        let before = buffer.clone();
        buffer.set_pixel(-1, 0, Rgba::RED);
        buffer.set_pixel(4, 0, Rgba::RED);
        buffer.set_pixel(0, 4, Rgba::RED);
        buffer.set_pixel(i32::MIN, i32::MAX, Rgba::RED);
        assert_eq!(buffer, before);
        assert_eq!(buffer.get_pixel(-1, 0), None);
        assert_eq!(buffer.get_pixel(0, 4), None);
    }

    #[test]
    fn set_then_get() {
        let mut buffer = RasterBuffer::blank(4, 4);
        buffer.set_pixel(2, 3, Rgba::RED);
        assert_eq!(buffer.get_pixel(2, 3), Some(Rgba::RED));
        assert_eq!(buffer.get_pixel(3, 2), Some(Rgba::WHITE));
    }

    #[test]
    fn fill_rect_is_half_open() {
        let mut buffer = RasterBuffer::blank(6, 6);
        buffer.fill_rect(1, 1, 3, 4, Rgba::BLACK);
        let black: usize = buffer.snapshot().pixels().filter(|p| *p == Rgba::BLACK).count();
        assert_eq!(black, 2 * 3);
        assert_eq!(buffer.get_pixel(1, 1), Some(Rgba::BLACK));
        assert_eq!(buffer.get_pixel(2, 3), Some(Rgba::BLACK));
        assert_eq!(buffer.get_pixel(3, 3), Some(Rgba::WHITE));
        assert_eq!(buffer.get_pixel(2, 4), Some(Rgba::WHITE));
    }

    #[test]
    fn fill_rect_clips_and_accepts_swapped_corners() {
        let mut buffer = RasterBuffer::blank(4, 4);
        buffer.fill_rect(10, 10, -5, 2, Rgba::RED);
        for y in 0..4 {
            for x in 0..4 {
                let expected = if y >= 2 { Rgba::RED } else { Rgba::WHITE };
                assert_eq!(buffer.get_pixel(x, y), Some(expected), "at {x},{y}");
            }
        }
    }

    #[test]
    fn fill_rect_outside_is_noop() {
        let mut buffer = RasterBuffer::blank(4, 4);
        let before = buffer.clone();
        buffer.fill_rect(5, 5, 9, 9, Rgba::RED);
        buffer.fill_rect(1, 1, 1, 3, Rgba::RED);
        assert_eq!(buffer, before);
    }

    #[test]
    fn clear_paints_everything() {
        let mut buffer = RasterBuffer::blank(7, 5);
        buffer.set_pixel(3, 3, Rgba::BLACK);
        buffer.clear(Rgba::RED);
        assert!(buffer.snapshot().pixels().all(|p| p == Rgba::RED));
    }

    #[test]
    fn from_rgba_validates_length() {
        let err = RasterBuffer::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            RasterError::LengthMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert!(RasterBuffer::from_rgba(0, 2, Vec::new()).is_err());
        assert!(RasterBuffer::from_rgba(2, 2, vec![7; 16]).is_ok());
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let mut buffer = RasterBuffer::blank(3, 3);
        let frame = buffer.snapshot();
        buffer.set_pixel(1, 1, Rgba::RED);
        assert_eq!(frame.get_pixel(1, 1), Some(Rgba::WHITE));
        assert_eq!(frame.to_buffer().get_pixel(1, 1), Some(Rgba::WHITE));
    }

    #[test]
    fn overwrite_requires_matching_dimensions() {
        let mut buffer = RasterBuffer::blank(3, 3);
        let red = RasterBuffer::filled(3, 3, Rgba::RED);
        assert!(buffer.overwrite(&red));
        assert_eq!(buffer, red);
        assert!(!buffer.overwrite(&RasterBuffer::blank(2, 3)));
        assert_eq!(buffer, red);
    }
}
