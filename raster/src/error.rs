//! Error types for raster construction.

use std::fmt;

/// Result type for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors that can occur while building a raster from external data.
///
/// Pixel access itself never fails; these only guard constructors that take
/// caller-provided dimensions or byte buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Width or height is zero.
    EmptyDimensions { width: u32, height: u32 },

    /// Byte buffer length does not match `width * height * 4`.
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDimensions { width, height } => {
                write!(f, "raster dimensions must be non-zero, got {width}x{height}")
            }
            Self::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "rgba buffer length mismatch: expected {expected} bytes, got {actual}"
                )
            }
        }
    }
}

impl std::error::Error for RasterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_empty_dimensions() {
        let err = RasterError::EmptyDimensions {
            width: 0,
            height: 480,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x480"), "should mention the dimensions");
    }

    #[test]
    fn error_display_length_mismatch() {
        let err = RasterError::LengthMismatch {
            expected: 16,
            actual: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<RasterError>();
    }
}
