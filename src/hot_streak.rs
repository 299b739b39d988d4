// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! `hot_streak_count` — Aggregate function counting hot streaks per group.
//!
//! Collects `(timestamp, value)` readings for a group, then runs the
//! configured matcher over them in timestamp order and returns the number of
//! streaks emitted.
//!
//! # SQL Usage
//!
//! ```sql
//! SELECT sensor_id,
//!   hot_streak_count('refined', 98.0, INTERVAL '2 seconds', reading_time, temperature)
//!     AS streaks
//! FROM readings
//! GROUP BY sensor_id
//! ```
//!
//! The variant name accepts the same spellings as
//! [`Variant::parse_variant_str`]. An unknown variant or an invalid
//! threshold/tolerance makes the result `NULL`.

use crate::common::event::{sort_events, Event};
use crate::config::{MatcherConfig, Variant};
use crate::driver::MatchStream;
use crate::error::{Error, Result};

/// State for the `hot_streak_count` aggregate function.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct HotStreakState {
    /// Collected readings. Sorted and renumbered in finalize.
    pub readings: Vec<Event>,
    /// Variant name (parsed in finalize).
    pub variant_str: Option<String>,
    /// Hot threshold.
    pub threshold: Option<f64>,
    /// Tolerance in microseconds.
    pub tolerance_us: Option<i64>,
}

impl HotStreakState {
    /// Creates a new empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            readings: Vec::new(),
            variant_str: None,
            threshold: None,
            tolerance_us: None,
        }
    }

    /// Returns true once the matcher parameters have been supplied.
    #[must_use]
    pub const fn has_parameters(&self) -> bool {
        self.variant_str.is_some() && self.threshold.is_some() && self.tolerance_us.is_some()
    }

    /// Sets the matcher parameters (called once during the first update).
    pub fn set_parameters(&mut self, variant: &str, threshold: f64, tolerance_us: i64) {
        if !self.has_parameters() {
            self.variant_str = Some(variant.to_string());
            self.threshold = Some(threshold);
            self.tolerance_us = Some(tolerance_us);
        }
    }

    /// Adds a reading to the state.
    pub fn update(&mut self, timestamp_us: i64, value: f64) {
        let id = self.readings.len() as u64;
        self.readings.push(Event::new(id, timestamp_us, value));
    }

    /// Combines two states by concatenating their readings, returning a new state.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        let mut readings = Vec::with_capacity(self.readings.len() + other.readings.len());
        readings.extend_from_slice(&self.readings);
        readings.extend_from_slice(&other.readings);
        let params = if self.has_parameters() { self } else { other };
        Self {
            readings,
            variant_str: params.variant_str.clone(),
            threshold: params.threshold,
            tolerance_us: params.tolerance_us,
        }
    }

    /// Combines another state into `self` in-place by appending its readings.
    ///
    /// `DuckDB`'s segment tree combines into fresh targets, so parameters are
    /// taken from `other` when `self` has none.
    pub fn combine_in_place(&mut self, other: &Self) {
        self.readings.extend_from_slice(&other.readings);
        if !self.has_parameters() && other.has_parameters() {
            self.variant_str.clone_from(&other.variant_str);
            self.threshold = other.threshold;
            self.tolerance_us = other.tolerance_us;
        }
    }

    /// Builds the matcher configuration from the stored parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameters`] if parameters were never set, or a
    /// configuration error if they are invalid.
    pub fn config(&self) -> Result<MatcherConfig> {
        let (Some(variant_str), Some(threshold), Some(tolerance_us)) =
            (self.variant_str.as_deref(), self.threshold, self.tolerance_us)
        else {
            return Err(Error::MissingParameters);
        };
        let variant: Variant = variant_str.parse()?;
        let config = MatcherConfig::new(threshold, tolerance_us).with_variant(variant);
        config.validate()?;
        Ok(config)
    }

    /// Counts the hot streaks in the collected readings.
    ///
    /// Readings are sorted by timestamp (ties keep arrival order) and given
    /// sequential ids before matching. An empty group counts zero streaks.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are missing or invalid.
    pub fn finalize(&mut self) -> Result<i64> {
        if self.readings.is_empty() {
            return Ok(0);
        }
        let config = self.config()?;

        // Ids from update are only unique per state; combined states repeat them.
        sort_events(&mut self.readings);
        for (i, event) in self.readings.iter_mut().enumerate() {
            event.id = i as u64;
        }

        let count = MatchStream::from_validated(self.readings.iter().copied(), config).count();
        Ok(count as i64)
    }
}
