//! Inspection and conversion tools for scrawl canvas bitmaps.
//!
//! - Print the header and palette usage of a persisted bitmap
//! - Render a persisted bitmap to PNG
//! - Quantize any PNG to the persisted palette format
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see what is on disk.

use bitmap::{BitmapResult, BmpHeader, Limits, PaletteIndex};
use serde::Serialize;

/// Header fields and palette usage of one bitmap file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub file_size: usize,
    pub width: u32,
    pub height: u32,
    pub top_down: bool,
    pub bits_per_pixel: u16,
    pub pixel_offset: u32,
    pub colors_used: u32,
    pub histogram: PaletteHistogram,
}

/// Pixel count per palette entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaletteHistogram {
    pub white: usize,
    pub black: usize,
    pub red: usize,
    pub unused: usize,
}

impl PaletteHistogram {
    fn record(&mut self, index: PaletteIndex) {
        match index {
            PaletteIndex::White => self.white += 1,
            PaletteIndex::Black => self.black += 1,
            PaletteIndex::Red => self.red += 1,
            PaletteIndex::Unused => self.unused += 1,
        }
    }

    pub const fn total(&self) -> usize {
        self.white + self.black + self.red + self.unused
    }
}

/// Parses and fully decodes a bitmap, counting palette usage.
pub fn inspect_bitmap(bytes: &[u8], limits: &Limits) -> BitmapResult<InspectReport> {
    let header = BmpHeader::parse(bytes)?;
    let buffer = bitmap::decode_bitmap(bytes, limits)?;

    let mut histogram = PaletteHistogram::default();
    for y in 0..buffer.height() as i32 {
        for x in 0..buffer.width() as i32 {
            let index = buffer
                .get_pixel(x, y)
                .and_then(|px| PaletteIndex::ALL.into_iter().find(|i| i.rgba() == px))
                .unwrap_or(PaletteIndex::Unused);
            histogram.record(index);
        }
    }

    Ok(InspectReport {
        file_size: bytes.len(),
        width: buffer.width(),
        height: buffer.height(),
        top_down: header.is_top_down(),
        bits_per_pixel: header.bits_per_pixel,
        pixel_offset: header.pixel_offset,
        colors_used: header.colors_used,
        histogram,
    })
}

pub fn format_report_pretty(report: &InspectReport) -> String {
    let h = &report.histogram;
    let total = h.total().max(1) as f64;
    let pct = |n: usize| n as f64 * 100.0 / total;
    let orientation = if report.top_down { "top-down" } else { "bottom-up" };
    format!(
        "size: {} bytes\n\
         dimensions: {}x{} ({orientation})\n\
         bits per pixel: {}\n\
         pixel offset: {}\n\
         colors used: {}\n\
         white: {} ({:.1}%)\n\
         black: {} ({:.1}%)\n\
         red: {} ({:.1}%)\n\
         unused: {} ({:.1}%)",
        report.file_size,
        report.width,
        report.height,
        report.bits_per_pixel,
        report.pixel_offset,
        report.colors_used,
        h.white,
        pct(h.white),
        h.black,
        pct(h.black),
        h.red,
        pct(h.red),
        h.unused,
        pct(h.unused),
    )
}

/// Converts a persisted bitmap into a PNG.
pub fn render_png(bmp: &[u8], limits: &Limits) -> BitmapResult<Vec<u8>> {
    let buffer = bitmap::decode_bitmap(bmp, limits)?;
    bitmap::encode_png(&buffer.snapshot())
}

/// Converts a PNG into the persisted bitmap format, snapping every pixel to
/// the nearest palette color.
pub fn quantize_png(png: &[u8], limits: &Limits) -> BitmapResult<Vec<u8>> {
    let buffer = bitmap::decode_png(png, limits)?;
    Ok(bitmap::encode_bitmap(&buffer.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster::{RasterBuffer, Rgba};

    fn sample() -> Vec<u8> {
        let mut buffer = RasterBuffer::blank(8, 4);
        buffer.fill_rect(0, 0, 4, 2, Rgba::RED);
        buffer.set_pixel(7, 3, Rgba::BLACK);
        bitmap::encode_bitmap(&buffer.snapshot())
    }

    #[test]
    fn inspect_counts_palette_entries() {
        let report = inspect_bitmap(&sample(), &Limits::default()).unwrap();
        assert_eq!((report.width, report.height), (8, 4));
        assert!(report.top_down);
        assert_eq!(report.bits_per_pixel, 2);
        assert_eq!(report.pixel_offset, 70);
        assert_eq!(
            report.histogram,
            PaletteHistogram {
                white: 23,
                black: 1,
                red: 8,
                unused: 0,
            }
        );
    }

    #[test]
    fn report_serializes_to_json() {
        let report = inspect_bitmap(&sample(), &Limits::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["histogram"]["red"], 8);
        assert_eq!(json["top_down"], true);
    }

    #[test]
    fn pretty_report_mentions_dimensions() {
        let report = inspect_bitmap(&sample(), &Limits::default()).unwrap();
        let text = format_report_pretty(&report);
        assert!(text.contains("8x4 (top-down)"));
        assert!(text.contains("red: 8 (25.0%)"));
    }

    #[test]
    fn render_then_quantize_restores_bitmap() {
        let bmp = sample();
        let png = render_png(&bmp, &Limits::default()).unwrap();
        assert_eq!(quantize_png(&png, &Limits::default()).unwrap(), bmp);
    }

    #[test]
    fn quantize_snaps_off_palette_colors() {
        let mut buffer = RasterBuffer::blank(4, 1);
        buffer.set_pixel(0, 0, Rgba::opaque(200, 20, 20));
        buffer.set_pixel(1, 0, Rgba::opaque(10, 10, 10));
        let png = bitmap::encode_png(&buffer.snapshot()).unwrap();
        let bmp = quantize_png(&png, &Limits::default()).unwrap();
        let report = inspect_bitmap(&bmp, &Limits::default()).unwrap();
        assert_eq!(report.histogram.red, 1);
        assert_eq!(report.histogram.black, 1);
        assert_eq!(report.histogram.white, 2);
    }
}
