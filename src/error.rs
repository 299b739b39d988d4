//! Error type for matcher construction and aggregate finalization.
//!
//! Per-event evaluation never fails: out-of-order readings are dropped and
//! counted, and an open candidate at end of input is simply evaluated. The
//! only fatal errors are configuration errors, raised before a matcher
//! exists.

use thiserror::Error;

/// Errors raised while building a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The tolerance was zero or negative.
    #[error("tolerance must be positive, got {tolerance_us}us")]
    InvalidTolerance {
        /// The rejected tolerance in microseconds.
        tolerance_us: i64,
    },

    /// `min_streak_length` was below one.
    #[error("min_streak_length must be at least 1, got {0}")]
    InvalidMinStreakLength(usize),

    /// The threshold was `NaN`, so no reading could ever qualify.
    #[error("threshold must be a number, got NaN")]
    InvalidThreshold,

    /// The variant name was not recognized.
    #[error("unknown matcher variant `{0}` (expected strict, time_tolerant or refined)")]
    UnknownVariant(String),

    /// The dedup policy name was not recognized.
    #[error("unknown dedup policy `{0}` (expected emit_all or emit_longest)")]
    UnknownDedupPolicy(String),

    /// An aggregate state saw readings but never received its parameters.
    #[error("matcher parameters were never supplied")]
    MissingParameters,
}

impl Error {
    /// Returns true for errors caused by an invalid configuration.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidTolerance { .. }
                | Self::InvalidMinStreakLength(_)
                | Self::InvalidThreshold
                | Self::UnknownVariant(_)
                | Self::UnknownDedupPolicy(_)
        )
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::InvalidTolerance { tolerance_us: 0 }.to_string(),
            "tolerance must be positive, got 0us"
        );
        assert_eq!(
            Error::InvalidMinStreakLength(0).to_string(),
            "min_streak_length must be at least 1, got 0"
        );
        assert!(Error::UnknownVariant("lazy".into())
            .to_string()
            .contains("`lazy`"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(Error::InvalidThreshold.is_configuration());
        assert!(Error::UnknownDedupPolicy("x".into()).is_configuration());
        assert!(!Error::MissingParameters.is_configuration());
    }
}
