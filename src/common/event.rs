// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Sensor events shared by the window, the matchers and the aggregate state.
//!
//! An [`Event`] is an immutable `(id, timestamp, value)` record produced
//! upstream and consumed read-only by the matcher. Events are ordered by
//! timestamp; two events with the same timestamp keep their arrival order
//! (every sort in this crate is stable). Equality is by `id` alone, so the
//! same reading observed through two different paths compares equal even
//! though `f64` values are not `Eq`.
//!
//! Memory layout: `Event` is 24 bytes (u64 + i64 + f64) with `Copy`
//! semantics, so candidates and matches hold events by value without
//! reference counting.

/// A single timestamped sensor reading.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// Identity of the reading. Unique within one partition.
    pub id: u64,
    /// Timestamp in microseconds since Unix epoch.
    pub timestamp_us: i64,
    /// Measured value (e.g. a temperature).
    pub value: f64,
}

impl Event {
    /// Creates a new event.
    #[must_use]
    pub const fn new(id: u64, timestamp_us: i64, value: f64) -> Self {
        Self {
            id,
            timestamp_us,
            value,
        }
    }

    /// Returns true if this event meets the "hot" threshold (`value >= threshold`).
    ///
    /// `NaN` values never qualify.
    #[must_use]
    #[inline]
    pub fn qualifies(&self, threshold: f64) -> bool {
        self.value >= threshold
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl std::hash::Hash for Event {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Sorts events by timestamp (ascending), preserving arrival order for ties.
///
/// Performs an O(n) presorted check first: readings delivered by an ordered
/// source (or by `ORDER BY` in the host engine) skip the sort entirely.
/// A stable sort is required here because tie order is arrival order,
/// which is part of the event contract.
pub fn sort_events(events: &mut [Event]) {
    if is_time_ordered(events) {
        return;
    }
    events.sort_by_key(|e| e.timestamp_us);
}

/// Returns true if `events` are in non-decreasing timestamp order.
#[must_use]
pub fn is_time_ordered(events: &[Event]) -> bool {
    events
        .windows(2)
        .all(|w| w[0].timestamp_us <= w[1].timestamp_us)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let e = Event::new(7, 1_000_000, 98.5);
        assert_eq!(e.id, 7);
        assert_eq!(e.timestamp_us, 1_000_000);
        assert!((e.value - 98.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = Event::new(1, 100, 10.0);
        let b = Event::new(1, 999, -3.0);
        let c = Event::new(2, 100, 10.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_qualifies_boundary() {
        // Threshold is inclusive: value == threshold is hot.
        assert!(Event::new(0, 0, 98.0).qualifies(98.0));
        assert!(!Event::new(0, 0, 97.999).qualifies(98.0));
        assert!(Event::new(0, 0, 120.0).qualifies(98.0));
    }

    #[test]
    fn test_nan_never_qualifies() {
        assert!(!Event::new(0, 0, f64::NAN).qualifies(98.0));
        assert!(!Event::new(0, 0, f64::NAN).qualifies(f64::NEG_INFINITY));
    }

    #[test]
    fn test_sort_events() {
        let mut events = vec![
            Event::new(0, 300, 1.0),
            Event::new(1, 100, 1.0),
            Event::new(2, 200, 1.0),
        ];
        sort_events(&mut events);
        let ts: Vec<i64> = events.iter().map(|e| e.timestamp_us).collect();
        assert_eq!(ts, vec![100, 200, 300]);
    }

    #[test]
    fn test_sort_ties_keep_arrival_order() {
        let mut events = vec![
            Event::new(0, 200, 1.0),
            Event::new(1, 100, 1.0),
            Event::new(2, 100, 2.0),
            Event::new(3, 100, 3.0),
        ];
        sort_events(&mut events);
        let ids: Vec<u64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_sort_empty_and_single() {
        let mut empty: Vec<Event> = vec![];
        sort_events(&mut empty);
        assert!(empty.is_empty());

        let mut single = vec![Event::new(0, 42, 1.0)];
        sort_events(&mut single);
        assert_eq!(single[0].timestamp_us, 42);
    }

    #[test]
    fn test_is_time_ordered_uses_le_not_lt() {
        // Equal timestamps are ordered.
        assert!(is_time_ordered(&[
            Event::new(0, 100, 0.0),
            Event::new(1, 100, 0.0),
        ]));
        assert!(!is_time_ordered(&[
            Event::new(0, 101, 0.0),
            Event::new(1, 100, 0.0),
        ]));
    }

    #[test]
    fn test_sort_negative_and_extreme_timestamps() {
        let mut events = vec![
            Event::new(0, i64::MAX, 0.0),
            Event::new(1, -200, 0.0),
            Event::new(2, i64::MIN, 0.0),
            Event::new(3, 0, 0.0),
        ];
        sort_events(&mut events);
        let ts: Vec<i64> = events.iter().map(|e| e.timestamp_us).collect();
        assert_eq!(ts, vec![i64::MIN, -200, 0, i64::MAX]);
    }

    #[test]
    fn test_event_is_copy() {
        let e = Event::new(3, 42, 1.5);
        let e2 = e;
        assert_eq!(e.timestamp_us, e2.timestamp_us);
        assert_eq!(e.id, e2.id);
    }

    #[test]
    fn test_event_size() {
        assert_eq!(std::mem::size_of::<Event>(), 24);
    }
}
