//! Configurable limits for bounded decoding.

/// Limits enforced while decoding client messages.
///
/// A message exceeding any limit is rejected before it reaches the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of one text frame in bytes.
    pub max_message_bytes: usize,

    /// Maximum number of points in one `draw` stroke.
    pub max_points: usize,

    /// Maximum length of a history id.
    pub max_id_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_message_bytes: 256 * 1024,
            max_points: 16 * 1024,
            max_id_len: 64,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_message_bytes: 4096,
            max_points: 64,
            max_id_len: 16,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_message_bytes: usize::MAX,
            max_points: usize::MAX,
            max_id_len: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_values() {
        let limits = Limits::default();
        assert_eq!(limits.max_message_bytes, 256 * 1024);
        assert_eq!(limits.max_points, 16_384);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = Limits::for_testing();
        let default_limits = Limits::default();

        assert!(test_limits.max_message_bytes < default_limits.max_message_bytes);
        assert!(test_limits.max_points < default_limits.max_points);
        assert!(test_limits.max_id_len < default_limits.max_id_len);
    }

    #[test]
    fn unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_message_bytes, usize::MAX);
        assert_eq!(limits.max_points, usize::MAX);
    }

    #[test]
    fn limits_debug() {
        let debug = format!("{:?}", Limits::default());
        assert!(debug.contains("max_points"));
    }
}
