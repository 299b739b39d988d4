//! Unbounded sensor-reading sources.
//!
//! Both generators are infinite iterators; callers bound them with
//! [`Iterator::take`]. Production feeds and test feeds therefore go through
//! the same lazy path, only the bound differs.
//!
//! Readings are spaced `1 / READINGS_PER_SECOND` apart starting at t = 0,
//! with sequential ids starting at 0.

use crate::common::event::Event;
use crate::common::timestamp::MICROS_PER_SECOND;

/// Hot threshold used by the generators.
pub const HOT: f64 = 98.0;

/// Readings emitted per second of event time.
pub const READINGS_PER_SECOND: i64 = 10;

/// Spacing between consecutive readings in microseconds.
pub const READING_INTERVAL_US: i64 = MICROS_PER_SECOND / READINGS_PER_SECOND;

const fn reading_at(id: u64, value: f64) -> Event {
    Event::new(id, id as i64 * READING_INTERVAL_US, value)
}

/// Readings whose value increases by one per reading.
#[derive(Debug, Clone)]
pub struct RisingReadings {
    next_id: u64,
    value: f64,
}

impl RisingReadings {
    /// Starts at `initial`.
    #[must_use]
    pub const fn new(initial: f64) -> Self {
        Self {
            next_id: 0,
            value: initial,
        }
    }
}

impl Iterator for RisingReadings {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        let event = reading_at(self.next_id, self.value);
        self.next_id += 1;
        self.value += 1.0;
        Some(event)
    }
}

/// Readings that run hot for `seconds_of_heat`, then cool down for twice as
/// long, repeating.
///
/// During the heat phase the value oscillates around the threshold: two
/// hot readings (`HOT + 1`) then one cool dip (`HOT - 1`). The cool-down
/// phase is all `HOT - 1`.
#[derive(Debug, Clone)]
pub struct OscillatingReadings {
    next_id: u64,
    heat_len: u64,
}

impl OscillatingReadings {
    /// Creates a source with heat phases of `seconds_of_heat` seconds.
    ///
    /// `seconds_of_heat == 0` produces only cool readings.
    #[must_use]
    pub const fn new(seconds_of_heat: u64) -> Self {
        Self {
            next_id: 0,
            heat_len: seconds_of_heat.saturating_mul(READINGS_PER_SECOND as u64),
        }
    }

    fn is_hot(&self, id: u64) -> bool {
        let cycle = self.heat_len.saturating_mul(3);
        id.checked_rem(cycle)
            .is_some_and(|pos| pos < self.heat_len && pos % 3 != 2)
    }
}

impl Iterator for OscillatingReadings {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        let value = if self.is_hot(self.next_id) {
            HOT + 1.0
        } else {
            HOT - 1.0
        };
        let event = reading_at(self.next_id, value);
        self.next_id += 1;
        Some(event)
    }
}
