//! Bounded breadth-first flood fill.

use std::collections::VecDeque;

use crate::buffer::RasterBuffer;
use crate::color::Rgba;

/// Pending-queue length above which a fill stops early.
///
/// Large regions are therefore only partially filled. Because the traversal
/// order is fixed, the partial result is still identical on every replica.
pub const FILL_QUEUE_LIMIT: usize = 10_000;

/// What a call to [`flood_fill`] did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// Seed was out of range or already had the fill color; nothing changed.
    Unchanged,
    /// The whole connected region was repainted.
    Filled { pixels: usize },
    /// The queue limit was hit; only `pixels` were repainted.
    Truncated { pixels: usize },
}

impl FillOutcome {
    /// Returns `true` if at least one pixel was written.
    #[must_use]
    pub const fn changed(self) -> bool {
        match self {
            Self::Unchanged => false,
            Self::Filled { pixels } | Self::Truncated { pixels } => pixels > 0,
        }
    }

    #[must_use]
    pub const fn pixels(self) -> usize {
        match self {
            Self::Unchanged => 0,
            Self::Filled { pixels } | Self::Truncated { pixels } => pixels,
        }
    }
}

/// Repaints the 4-connected region of pixels whose RGB equals the seed's.
///
/// Traversal is FIFO with neighbors enqueued left, right, up, down. Pixels
/// are marked visited when dequeued. Repainted pixels get the fill RGB with
/// alpha 255. After each expansion, if more than [`FILL_QUEUE_LIMIT`] entries
/// are pending, the fill stops and reports [`FillOutcome::Truncated`].
pub fn flood_fill(buffer: &mut RasterBuffer, x: i32, y: i32, color: Rgba) -> FillOutcome {
    let Some(target) = buffer.get_pixel(x, y) else {
        return FillOutcome::Unchanged;
    };
    if target.same_rgb(color) {
        return FillOutcome::Unchanged;
    }

    let paint = Rgba::opaque(color.r, color.g, color.b);
    let width = buffer.width() as usize;
    let mut visited = vec![false; width * buffer.height() as usize];
    let mut queue = VecDeque::new();
    queue.push_back((x, y));
    let mut pixels = 0usize;

    while let Some((cx, cy)) = queue.pop_front() {
        let index = cy as usize * width + cx as usize;
        if visited[index] {
            continue;
        }
        visited[index] = true;

        match buffer.get_pixel(cx, cy) {
            Some(current) if current.same_rgb(target) => {}
            _ => continue,
        }
        buffer.set_pixel(cx, cy, paint);
        pixels += 1;

        for (nx, ny) in [(cx - 1, cy), (cx + 1, cy), (cx, cy - 1), (cx, cy + 1)] {
            if buffer.contains(nx, ny) {
                queue.push_back((nx, ny));
            }
        }

        if queue.len() > FILL_QUEUE_LIMIT {
            return FillOutcome::Truncated { pixels };
        }
    }

    FillOutcome::Filled { pixels }
}
