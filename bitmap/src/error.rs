//! Error types for bitmap and transport encoding.

use std::fmt;

use raster::RasterError;

/// Result type for bitmap operations.
pub type BitmapResult<T> = Result<T, BitmapError>;

/// Errors produced while encoding or decoding canvas images.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BitmapError {
    /// Input is too small to contain the fixed headers.
    TooShort { actual: usize, required: usize },

    /// File does not start with `BM`.
    InvalidSignature { found: [u8; 2] },

    /// Info header is not the 40-byte `BITMAPINFOHEADER`.
    UnsupportedHeaderSize { found: u32 },

    /// Only 2 bits per pixel is supported.
    UnsupportedBitDepth { found: u16 },

    /// Only uncompressed pixel data is supported.
    UnsupportedCompression { found: u32 },

    /// Width or height is zero or negative where it must be positive.
    InvalidDimensions { width: i32, height: i32 },

    /// A decoding limit was exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Pixel data ends before `stride × height` bytes.
    PixelDataTruncated { needed: usize, available: usize },

    /// PNG encoding or decoding failed.
    Png(String),

    /// The base64 payload is malformed.
    Base64(String),

    /// Decoded pixels could not form a raster.
    Raster(RasterError),
}

/// Specific decoding limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Width,
    Height,
    EncodedBytes,
}

impl fmt::Display for BitmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { actual, required } => {
                write!(f, "bitmap too short: {actual} bytes, need at least {required}")
            }
            Self::InvalidSignature { found } => {
                write!(f, "invalid bitmap signature: 0x{:02X}{:02X}", found[0], found[1])
            }
            Self::UnsupportedHeaderSize { found } => {
                write!(f, "unsupported info header size: {found}")
            }
            Self::UnsupportedBitDepth { found } => {
                write!(f, "unsupported bit depth: {found} bits per pixel")
            }
            Self::UnsupportedCompression { found } => {
                write!(f, "unsupported compression: {found}")
            }
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {width}x{height}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::PixelDataTruncated { needed, available } => {
                write!(
                    f,
                    "pixel data truncated: need {needed} bytes, have {available}"
                )
            }
            Self::Png(msg) => write!(f, "png error: {msg}"),
            Self::Base64(msg) => write!(f, "base64 error: {msg}"),
            Self::Raster(err) => write!(f, "raster error: {err}"),
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::EncodedBytes => "encoded bytes",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for BitmapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Raster(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RasterError> for BitmapError {
    fn from(err: RasterError) -> Self {
        Self::Raster(err)
    }
}

impl From<image::ImageError> for BitmapError {
    fn from(err: image::ImageError) -> Self {
        Self::Png(err.to_string())
    }
}

impl From<base64::DecodeError> for BitmapError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err.to_string())
    }
}
