// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Matcher configuration.
//!
//! A [`MatcherConfig`] carries the five recognized options:
//!
//! | Option | Meaning | Default |
//! |--------|---------|---------|
//! | `threshold` | A reading is hot when `value >= threshold` | required |
//! | `tolerance_us` | Max gap inside one streak, and the heat limit | required |
//! | `min_streak_length` | Qualifying readings required before acceptance | `2` |
//! | `variant` | `strict`, `time_tolerant` or `refined` | `refined` |
//! | `dedup_policy` | `emit_all` or `emit_longest` | `emit_all` |
//!
//! The config deserializes with `serde`, so it can be embedded in whatever
//! configuration file the hosting service already reads:
//!
//! ```
//! use hotstreak::config::{MatcherConfig, Variant};
//!
//! let config: MatcherConfig = serde_json::from_str(
//!     r#"{ "threshold": 98.0, "tolerance_us": 2000000, "variant": "time_tolerant" }"#,
//! ).unwrap();
//! assert_eq!(config.variant, Variant::TimeTolerant);
//! assert_eq!(config.min_streak_length, 2);
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::timestamp::duration_to_micros;
use crate::error::{Error, Result};

/// Default number of qualifying readings a streak needs before acceptance.
pub const DEFAULT_MIN_STREAK_LENGTH: usize = 2;

/// Matcher strategy.
///
/// The three variants are successive versions of the same hot-streak
/// detector. Only [`Variant::Refined`] is correct; the other two are kept
/// because their failure modes are the point of comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Strict contiguity: any cool reading ends the candidate.
    Strict,
    /// Cool readings inside the tolerance window are absorbed; re-arms after
    /// every heat alarm.
    TimeTolerant,
    /// Time-tolerant with a minimum-length guard and one decision per streak.
    #[default]
    Refined,
}

impl Variant {
    /// Parses a variant name. Accepts `-` or `_` separators, any case.
    ///
    /// Returns `None` for unrecognized names.
    #[must_use]
    pub fn parse_variant_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "strict" | "v1" => Some(Self::Strict),
            "time_tolerant" | "tolerant" | "v2" => Some(Self::TimeTolerant),
            "refined" | "v3" => Some(Self::Refined),
            _ => None,
        }
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::TimeTolerant => "time_tolerant",
            Self::Refined => "refined",
        }
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_variant_str(s).ok_or_else(|| Error::UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How overlapping accepted matches are resolved into output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Emit every accepted match, overlaps included.
    #[default]
    EmitAll,
    /// Among matches that share readings, keep only the longest.
    EmitLongest,
}

impl DedupPolicy {
    /// Parses a policy name. Accepts `-` or `_` separators, any case.
    #[must_use]
    pub fn parse_policy_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "emit_all" | "all" => Some(Self::EmitAll),
            "emit_longest" | "longest" => Some(Self::EmitLongest),
            _ => None,
        }
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmitAll => "emit_all",
            Self::EmitLongest => "emit_longest",
        }
    }
}

impl FromStr for DedupPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_policy_str(s).ok_or_else(|| Error::UnknownDedupPolicy(s.to_string()))
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_min_streak_length() -> usize {
    DEFAULT_MIN_STREAK_LENGTH
}

/// Configuration for one matcher instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct MatcherConfig {
    /// Readings with `value >= threshold` qualify as hot.
    pub threshold: f64,
    /// Tolerance in microseconds. Must be positive.
    pub tolerance_us: i64,
    /// Qualifying readings required before a streak may be accepted.
    #[serde(default = "default_min_streak_length")]
    pub min_streak_length: usize,
    /// Matcher strategy.
    #[serde(default)]
    pub variant: Variant,
    /// Overlap resolution policy.
    #[serde(default)]
    pub dedup_policy: DedupPolicy,
}

impl MatcherConfig {
    /// Creates a config with default variant, policy and minimum length.
    #[must_use]
    pub const fn new(threshold: f64, tolerance_us: i64) -> Self {
        Self {
            threshold,
            tolerance_us,
            min_streak_length: DEFAULT_MIN_STREAK_LENGTH,
            variant: Variant::Refined,
            dedup_policy: DedupPolicy::EmitAll,
        }
    }

    /// Creates a config from a `Duration` tolerance.
    ///
    /// Durations too large for `i64` microseconds saturate to `i64::MAX`.
    #[must_use]
    pub fn from_duration(threshold: f64, tolerance: Duration) -> Self {
        Self::new(threshold, duration_to_micros(tolerance).unwrap_or(i64::MAX))
    }

    /// Returns the config with `variant` set.
    #[must_use]
    pub const fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Returns the config with `dedup_policy` set.
    #[must_use]
    pub const fn with_dedup_policy(mut self, dedup_policy: DedupPolicy) -> Self {
        self.dedup_policy = dedup_policy;
        self
    }

    /// Returns the config with `min_streak_length` set.
    #[must_use]
    pub const fn with_min_streak_length(mut self, min_streak_length: usize) -> Self {
        self.min_streak_length = min_streak_length;
        self
    }

    /// Checks the config.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTolerance`] if `tolerance_us <= 0`
    /// - [`Error::InvalidMinStreakLength`] if `min_streak_length < 1`
    /// - [`Error::InvalidThreshold`] if `threshold` is `NaN`
    pub fn validate(&self) -> Result<()> {
        if self.tolerance_us <= 0 {
            return Err(Error::InvalidTolerance {
                tolerance_us: self.tolerance_us,
            });
        }
        if self.min_streak_length < 1 {
            return Err(Error::InvalidMinStreakLength(self.min_streak_length));
        }
        if self.threshold.is_nan() {
            return Err(Error::InvalidThreshold);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatcherConfig::new(98.0, 1_000_000);
        assert_eq!(config.min_streak_length, 2);
        assert_eq!(config.variant, Variant::Refined);
        assert_eq!(config.dedup_policy, DedupPolicy::EmitAll);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_duration() {
        let config = MatcherConfig::from_duration(98.0, Duration::from_secs(2));
        assert_eq!(config.tolerance_us, 2_000_000);
        let huge = MatcherConfig::from_duration(98.0, Duration::MAX);
        assert_eq!(huge.tolerance_us, i64::MAX);
    }

    #[test]
    fn test_validate_rejects_non_positive_tolerance() {
        assert_eq!(
            MatcherConfig::new(98.0, 0).validate(),
            Err(Error::InvalidTolerance { tolerance_us: 0 })
        );
        assert_eq!(
            MatcherConfig::new(98.0, -5).validate(),
            Err(Error::InvalidTolerance { tolerance_us: -5 })
        );
    }

    #[test]
    fn test_validate_rejects_zero_min_streak_length() {
        let config = MatcherConfig::new(98.0, 1).with_min_streak_length(0);
        assert_eq!(config.validate(), Err(Error::InvalidMinStreakLength(0)));
        assert!(config.with_min_streak_length(1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan_threshold() {
        assert_eq!(
            MatcherConfig::new(f64::NAN, 1).validate(),
            Err(Error::InvalidThreshold)
        );
        // Infinite thresholds are odd but well-defined.
        assert!(MatcherConfig::new(f64::INFINITY, 1).validate().is_ok());
    }

    #[test]
    fn test_parse_variant() {
        assert_eq!("strict".parse::<Variant>(), Ok(Variant::Strict));
        assert_eq!("Time-Tolerant".parse::<Variant>(), Ok(Variant::TimeTolerant));
        assert_eq!(" refined ".parse::<Variant>(), Ok(Variant::Refined));
        assert_eq!("v2".parse::<Variant>(), Ok(Variant::TimeTolerant));
        assert_eq!(
            "greedy".parse::<Variant>(),
            Err(Error::UnknownVariant("greedy".into()))
        );
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("emit_all".parse::<DedupPolicy>(), Ok(DedupPolicy::EmitAll));
        assert_eq!(
            "EMIT-LONGEST".parse::<DedupPolicy>(),
            Ok(DedupPolicy::EmitLongest)
        );
        assert!("emit_some".parse::<DedupPolicy>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for v in [Variant::Strict, Variant::TimeTolerant, Variant::Refined] {
            assert_eq!(v.to_string().parse::<Variant>(), Ok(v));
        }
        for p in [DedupPolicy::EmitAll, DedupPolicy::EmitLongest] {
            assert_eq!(p.to_string().parse::<DedupPolicy>(), Ok(p));
        }
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: MatcherConfig =
            serde_json::from_str(r#"{ "threshold": 98.0, "tolerance_us": 1000000 }"#).unwrap();
        assert_eq!(config, MatcherConfig::new(98.0, 1_000_000));
    }

    #[test]
    fn test_deserialize_all_fields() {
        let config: MatcherConfig = serde_json::from_str(
            r#"{
                "threshold": 50.5,
                "tolerance_us": 250000,
                "min_streak_length": 4,
                "variant": "strict",
                "dedup_policy": "emit_longest"
            }"#,
        )
        .unwrap();
        assert_eq!(config.variant, Variant::Strict);
        assert_eq!(config.dedup_policy, DedupPolicy::EmitLongest);
        assert_eq!(config.min_streak_length, 4);
    }

    #[test]
    fn test_deserialize_rejects_unknown_variant() {
        let parsed: std::result::Result<MatcherConfig, _> = serde_json::from_str(
            r#"{ "threshold": 1.0, "tolerance_us": 1, "variant": "lazy" }"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_serialize_uses_snake_case() {
        let config = MatcherConfig::new(1.0, 1).with_variant(Variant::TimeTolerant);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""variant":"time_tolerant""#));
        assert!(json.contains(r#""dedup_policy":"emit_all""#));
    }
}
