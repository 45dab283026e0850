//! Packing of 2-bit palette indices, four per byte, first pixel in the
//! most significant bits.

use crate::palette::PaletteIndex;

const INDICES_PER_BYTE: u8 = 4;

/// Accumulates palette indices into packed bytes.
///
/// Rows are closed with [`end_row`](Self::end_row), which pads the partially
/// filled byte with zero bits so every row starts on a byte boundary.
#[derive(Debug, Default)]
pub struct IndexWriter {
    bytes: Vec<u8>,
    /// Byte being assembled (not yet pushed).
    current: u8,
    /// Number of indices in `current` (0-3).
    count: u8,
}

impl IndexWriter {
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            current: 0,
            count: 0,
        }
    }

    pub fn write(&mut self, index: PaletteIndex) {
        self.current = (self.current << 2) | index.bits();
        self.count += 1;
        if self.count == INDICES_PER_BYTE {
            self.bytes.push(self.current);
            self.current = 0;
            self.count = 0;
        }
    }

    /// Flushes a partial byte, padding the low bits with zeros.
    pub fn end_row(&mut self) {
        if self.count > 0 {
            self.current <<= 2 * (INDICES_PER_BYTE - self.count);
            self.bytes.push(self.current);
            self.current = 0;
            self.count = 0;
        }
    }

    /// Number of complete bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.count == 0
    }

    /// Closes the current row and appends the packed bytes to `out`.
    pub fn finish_into(mut self, out: &mut Vec<u8>) {
        self.end_row();
        out.append(&mut self.bytes);
    }
}

/// Reads palette indices back out of one packed row.
#[derive(Debug)]
pub struct IndexReader<'a> {
    row: &'a [u8],
    position: usize,
}

impl<'a> IndexReader<'a> {
    #[must_use]
    pub const fn new(row: &'a [u8]) -> Self {
        Self { row, position: 0 }
    }

    /// Index of pixel `x` in the row, or `None` past the end of the data.
    #[must_use]
    pub fn get(&self, x: usize) -> Option<PaletteIndex> {
        let byte = *self.row.get(x / 4)?;
        let shift = (3 - (x % 4)) * 2;
        Some(PaletteIndex::from_bits(byte >> shift))
    }
}

impl Iterator for IndexReader<'_> {
    type Item = PaletteIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.get(self.position)?;
        self.position += 1;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(indices: &[PaletteIndex]) -> Vec<u8> {
        let mut writer = IndexWriter::default();
        for index in indices {
            writer.write(*index);
        }
        let mut out = Vec::new();
        writer.finish_into(&mut out);
        out
    }

    #[test]
    fn first_pixel_is_most_significant() {
        use PaletteIndex::{Black, Red, Unused, White};
        assert_eq!(pack(&[Black, White, White, White]), vec![0b0100_0000]);
        assert_eq!(pack(&[White, White, White, Red]), vec![0b0000_0010]);
        assert_eq!(pack(&[Unused, Red, Black, White]), vec![0b1110_0100]);
    }

    #[test]
    fn partial_byte_is_zero_padded() {
        use PaletteIndex::{Black, Red};
        assert_eq!(pack(&[Red]), vec![0b1000_0000]);
        assert_eq!(pack(&[Black, Black, Black, Black, Red]), vec![0x55, 0x80]);
    }

    #[test]
    fn end_row_is_idempotent_on_boundary() {
        let mut writer = IndexWriter::default();
        for _ in 0..4 {
            writer.write(PaletteIndex::Black);
        }
        writer.end_row();
        writer.end_row();
        assert_eq!(writer.len(), 1);
        assert!(!writer.is_empty());
    }

    #[test]
    fn reader_matches_bit_positions() {
        let reader = IndexReader::new(&[0b1110_0100, 0b0100_0000]);
        assert_eq!(reader.get(0), Some(PaletteIndex::Unused));
        assert_eq!(reader.get(1), Some(PaletteIndex::Red));
        assert_eq!(reader.get(2), Some(PaletteIndex::Black));
        assert_eq!(reader.get(3), Some(PaletteIndex::White));
        assert_eq!(reader.get(4), Some(PaletteIndex::Black));
        assert_eq!(reader.get(8), None);
    }

    #[test]
    fn reader_iterates_whole_bytes() {
        let indices: Vec<_> = IndexReader::new(&[0x1B]).collect();
        assert_eq!(
            indices,
            vec![
                PaletteIndex::White,
                PaletteIndex::Black,
                PaletteIndex::Red,
                PaletteIndex::Unused
            ]
        );
    }
}
