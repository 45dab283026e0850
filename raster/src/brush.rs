//! Disk-stamp brush used to rasterize strokes.
//!
//! A stroke is a sequence of stamps placed one pixel apart along each
//! segment of a polyline. All positions go through [`round_half_up`] so the
//! server and every client land on the same pixels.

use crate::buffer::RasterBuffer;
use crate::color::Rgba;

/// A point in canvas coordinates. Fractional values are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A precomputed `size × size` disk mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrushStamp {
    size: u32,
    mask: Vec<bool>,
}

impl BrushStamp {
    /// Builds the disk mask for a brush of `size` pixels (minimum 1).
    #[must_use]
    pub fn new(size: u32) -> Self {
        let size = size.max(1);
        let radius = f64::from(size) / 2.0;
        let mut mask = Vec::with_capacity((size * size) as usize);
        for j in 0..size {
            for i in 0..size {
                let dx = f64::from(i) + 0.5 - radius;
                let dy = f64::from(j) + 0.5 - radius;
                mask.push(dx * dx + dy * dy <= radius * radius);
            }
        }
        Self { size, mask }
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Offset from a point to the stamp's top-left corner.
    #[must_use]
    pub const fn half_size(&self) -> u32 {
        (self.size - self.size % 2) / 2
    }

    /// Returns `true` if cell `(i, j)` of the mask is painted.
    #[must_use]
    pub fn covers(&self, i: u32, j: u32) -> bool {
        i < self.size && j < self.size && self.mask[(j * self.size + i) as usize]
    }

    /// Number of painted cells.
    #[must_use]
    pub fn area(&self) -> usize {
        self.mask.iter().filter(|cell| **cell).count()
    }
}

/// Rounds half up (`floor(v + 0.5)`), saturating into `i32`.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn place(buffer: &mut RasterBuffer, left: f64, top: f64, brush: &BrushStamp, color: Rgba) {
    let x0 = round_half_up(left);
    let y0 = round_half_up(top);
    for j in 0..brush.size {
        for i in 0..brush.size {
            if brush.covers(i, j) {
                buffer.set_pixel(
                    x0.saturating_add(i as i32),
                    y0.saturating_add(j as i32),
                    color,
                );
            }
        }
    }
}

/// Stamps the brush once, centered (by `half_size`) on `point`.
pub fn stamp(buffer: &mut RasterBuffer, point: Point, brush: &BrushStamp, color: Rgba) {
    let half = f64::from(brush.half_size());
    place(buffer, point.x - half, point.y - half, brush, color);
}

/// Stamps along the segment `from → to`, one stamp per unit of distance.
///
/// Coincident endpoints produce a single stamp. Otherwise stamps are placed
/// at `from + i·(to − from)/distance` for `i = 0, 1, …` while `i < distance`,
/// so `to` itself is left for the next segment. Only the indices whose stamp
/// can touch the buffer are visited.
pub fn stroke(buffer: &mut RasterBuffer, from: Point, to: Point, brush: &BrushStamp, color: Rgba) {
    if from == to {
        stamp(buffer, from, brush, color);
        return;
    }
    let distance = from.distance(to);
    if !distance.is_finite() {
        return;
    }
    let step_x = (to.x - from.x) / distance;
    let step_y = (to.y - from.y) / distance;
    let half = f64::from(brush.half_size());
    let left = from.x - half;
    let top = from.y - half;

    let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (
        visible_span(left, step_x, buffer.width(), brush.size),
        visible_span(top, step_y, buffer.height(), brush.size),
    ) else {
        return;
    };
    let first = x_lo.max(y_lo).max(0.0).ceil();
    let last = x_hi.min(y_hi);
    if first > last || first >= distance {
        return;
    }

    let count = (last - first).min(distance - first).floor() as u64 + 1;
    for n in 0..count {
        let i = first + n as f64;
        if i >= distance {
            break;
        }
        place(
            buffer,
            step_x.mul_add(i, from.x) - half,
            step_y.mul_add(i, from.y) - half,
            brush,
            color,
        );
    }
}

/// Range of `i` for which a stamp corner at `origin + step·i` can overlap
/// `0..extent` on one axis. `None` when no index can.
#[allow(clippy::float_cmp)]
fn visible_span(origin: f64, step: f64, extent: u32, size: u32) -> Option<(f64, f64)> {
    let lo = -f64::from(size) - 1.0;
    let hi = f64::from(extent) + 1.0;
    if step == 0.0 {
        return (lo..=hi)
            .contains(&origin)
            .then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let a = (lo - origin) / step;
    let b = (hi - origin) / step;
    Some((a.min(b), a.max(b)))
}

/// Rasterizes a polyline with a brush of `size` pixels.
///
/// Empty input draws nothing, one point draws a single stamp, and longer
/// inputs stroke every consecutive pair.
pub fn draw_path(buffer: &mut RasterBuffer, points: &[Point], size: u32, color: Rgba) {
    let brush = BrushStamp::new(size);
    match points {
        [] => {}
        [only] => stamp(buffer, *only, &brush, color),
        _ => {
            for pair in points.windows(2) {
                stroke(buffer, pair[0], pair[1], &brush, color);
            }
        }
    }
}
