//! Timestamp and tolerance conversions.
//!
//! Everything inside the matcher is expressed in `i64` microseconds since
//! Unix epoch, which is also how the host engine stores `TIMESTAMP` values.
//! Tolerances arrive either as `std::time::Duration` (Rust callers) or as an
//! engine `INTERVAL` (SQL callers) and are normalized here.

use std::time::Duration;

/// Microseconds per millisecond.
pub const MICROS_PER_MILLI: i64 = 1_000;

/// Microseconds per second.
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Microseconds per day (`24 * 60 * 60 * 1_000_000`).
pub const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Converts a `Duration` into whole microseconds.
///
/// Returns `None` if the duration does not fit in an `i64`.
#[must_use]
pub fn duration_to_micros(duration: Duration) -> Option<i64> {
    i64::try_from(duration.as_micros()).ok()
}

/// Converts an engine `INTERVAL` (`months`, `days`, `micros`) into microseconds.
///
/// Month-based intervals have no fixed length (28-31 days) and are rejected
/// with `None`, as is any combination that overflows `i64`.
#[must_use]
#[inline]
pub fn interval_to_micros(months: i32, days: i32, micros: i64) -> Option<i64> {
    if months != 0 {
        return None;
    }
    i64::from(days)
        .checked_mul(MICROS_PER_DAY)?
        .checked_add(micros)
}
