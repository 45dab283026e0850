//! Configurable limits for bounded decoding.

/// Limits enforced while decoding persisted bitmaps and transport images.
///
/// Dimensions are checked before any pixel storage is allocated, so a hostile
/// header cannot request an oversized buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: u32,

    /// Maximum image height in pixels.
    pub max_height: u32,

    /// Maximum encoded input size in bytes (file or decoded base64 payload).
    pub max_encoded_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_width: 4096,
            max_height: 4096,
            // a 4096x4096 2bpp file is 4 MiB; PNG of noise can be larger
            max_encoded_bytes: 32 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_width: 64,
            max_height: 64,
            max_encoded_bytes: 64 * 1024,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_width: u32::MAX,
            max_height: u32::MAX,
            max_encoded_bytes: usize::MAX,
        }
    }
}
