// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Candidate state, finalized matches and the acceptance predicates.
//!
//! A [`MatchState`] is the in-flight candidate: it is opened by a qualifying
//! reading, extended by every later reading the variant admits into the
//! streak, and finally either converted into a [`Match`] or discarded.
//!
//! # Acceptance predicates
//!
//! - **Rising**: every qualifying value is strictly greater than the previous
//!   qualifying value.
//! - **Oscillating**: the streak lasted at least `tolerance`, measured from
//!   the first to the last qualifying reading. Gaps between qualifying
//!   readings are already bounded by the tolerance when the candidate is
//!   built, so they are not re-checked here.
//!
//! Rising takes precedence when both hold. Each variant supplies an
//! [`AcceptanceRule`] that sets the minimum qualifying count and whether the
//! oscillating duration is enforced.

use crate::common::event::Event;

/// Shape of an accepted streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Qualifying values strictly increase.
    Rising,
    /// Hot readings persisted for at least the tolerance, dips allowed.
    Oscillating,
}

/// A finalized streak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Readings of the streak in timestamp order, from the first to the last
    /// qualifying reading. Absorbed cool readings in between are included.
    pub events: Vec<Event>,
    /// Which predicate accepted the streak.
    pub kind: MatchKind,
}

impl Match {
    /// Returns the number of readings in the match.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the match holds no readings (never true for matches
    /// produced by a matcher).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the first reading.
    #[must_use]
    pub fn start_us(&self) -> Option<i64> {
        self.events.first().map(|e| e.timestamp_us)
    }

    /// Timestamp of the last reading.
    #[must_use]
    pub fn end_us(&self) -> Option<i64> {
        self.events.last().map(|e| e.timestamp_us)
    }

    /// Time from the first to the last reading, in microseconds.
    #[must_use]
    pub fn duration_us(&self) -> i64 {
        match (self.start_us(), self.end_us()) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }

    /// Returns true if both matches contain a reading with the same id.
    ///
    /// Both event lists are time-ordered, so disjoint time ranges are
    /// rejected before any per-event comparison.
    #[must_use]
    pub fn shares_event_with(&self, other: &Self) -> bool {
        let (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) =
            (self.start_us(), self.end_us(), other.start_us(), other.end_us())
        else {
            return false;
        };
        if a_end < b_start || b_end < a_start {
            return false;
        }
        self.events.iter().any(|e| other.events.contains(e))
    }
}

/// In-flight candidate streak.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct MatchState {
    /// First qualifying reading of the candidate.
    pub start: Event,
    /// Most recent qualifying reading.
    pub last_qualifying: Event,
    /// Timestamp of the most recent reading admitted to the candidate.
    pub last_event_time: i64,
    /// Every reading admitted to the candidate, in timestamp order. Never empty.
    pub events: Vec<Event>,
    /// Number of qualifying readings in `events`.
    pub qualifying: usize,
    /// Length of `events` up to and including the last qualifying reading.
    pub qualifying_end: usize,
    /// Whether `start` was carried over from a previously accepted match.
    pub carried: bool,
}

impl MatchState {
    /// Opens a candidate at a qualifying reading.
    #[must_use]
    pub fn open(event: Event) -> Self {
        Self {
            start: event,
            last_qualifying: event,
            last_event_time: event.timestamp_us,
            events: vec![event],
            qualifying: 1,
            qualifying_end: 1,
            carried: false,
        }
    }

    /// Opens a candidate at the last reading of a match that was just
    /// accepted. The carried reading alone never makes a new match.
    #[must_use]
    pub fn carry_over(event: Event) -> Self {
        Self {
            carried: true,
            ..Self::open(event)
        }
    }

    /// Qualifying readings that were not carried over.
    #[must_use]
    pub fn fresh_qualifying(&self) -> usize {
        self.qualifying - usize::from(self.carried)
    }

    /// Appends a reading to the candidate.
    pub fn extend(&mut self, event: Event, qualifying: bool) {
        self.events.push(event);
        self.last_event_time = event.timestamp_us;
        if qualifying {
            self.last_qualifying = event;
            self.qualifying += 1;
            self.qualifying_end = self.events.len();
        }
    }

    /// Time from the first to the most recent qualifying reading.
    #[must_use]
    pub fn duration_us(&self) -> i64 {
        self.last_qualifying
            .timestamp_us
            .saturating_sub(self.start.timestamp_us)
    }

    /// Converts the candidate into a match.
    ///
    /// Trailing cool readings absorbed after the last qualifying reading are
    /// not part of the streak and are dropped.
    #[must_use]
    pub fn into_match(mut self, kind: MatchKind) -> Match {
        self.events.truncate(self.qualifying_end);
        Match {
            events: self.events,
            kind,
        }
    }
}

/// Per-variant acceptance guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceRule {
    /// Minimum number of qualifying readings.
    pub min_qualifying: usize,
    /// Whether the oscillating predicate requires `duration >= tolerance`.
    pub require_duration: bool,
}

/// Returns true if the qualifying values in `events` strictly increase.
///
/// Vacuously true for zero or one qualifying reading.
#[must_use]
pub fn is_rising(events: &[Event], threshold: f64) -> bool {
    let mut prev: Option<f64> = None;
    for e in events.iter().filter(|e| e.qualifies(threshold)) {
        if let Some(p) = prev {
            if e.value <= p {
                return false;
            }
        }
        prev = Some(e.value);
    }
    true
}

/// Evaluates a candidate against the acceptance predicates.
///
/// Returns the kind of match, or `None` if the candidate is rejected.
#[must_use]
pub fn accept(
    state: &MatchState,
    threshold: f64,
    tolerance_us: i64,
    rule: AcceptanceRule,
) -> Option<MatchKind> {
    if state.qualifying < rule.min_qualifying {
        return None;
    }
    if is_rising(&state.events, threshold) {
        return Some(MatchKind::Rising);
    }
    if !rule.require_duration || state.duration_us() >= tolerance_us {
        return Some(MatchKind::Oscillating);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f64 = 98.0;

    fn hot(id: u64, ts: i64, value: f64) -> Event {
        Event::new(id, ts, value)
    }

    fn state_of(events: &[Event]) -> MatchState {
        let mut state = MatchState::open(events[0]);
        for e in &events[1..] {
            state.extend(*e, e.qualifies(T));
        }
        state
    }

    const STRICT_RULE: AcceptanceRule = AcceptanceRule {
        min_qualifying: 2,
        require_duration: false,
    };
    const REFINED_RULE: AcceptanceRule = AcceptanceRule {
        min_qualifying: 2,
        require_duration: true,
    };

    #[test]
    fn test_open_state() {
        let e = hot(1, 100, 99.0);
        let state = MatchState::open(e);
        assert_eq!(state.start, e);
        assert_eq!(state.last_qualifying, e);
        assert_eq!(state.last_event_time, 100);
        assert_eq!(state.qualifying, 1);
        assert_eq!(state.duration_us(), 0);
    }

    #[test]
    fn test_extend_with_cool_reading_keeps_last_qualifying() {
        let mut state = MatchState::open(hot(0, 0, 99.0));
        state.extend(hot(1, 50, 90.0), false);
        assert_eq!(state.last_qualifying.id, 0);
        assert_eq!(state.last_event_time, 50);
        assert_eq!(state.qualifying, 1);
        assert_eq!(state.events.len(), 2);
    }

    #[test]
    fn test_into_match_trims_trailing_cool_readings() {
        let state = state_of(&[
            hot(0, 0, 99.0),
            hot(1, 10, 90.0),
            hot(2, 20, 100.0),
            hot(3, 30, 90.0),
            hot(4, 40, 90.0),
        ]);
        let m = state.into_match(MatchKind::Rising);
        let ids: Vec<u64> = m.events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(m.duration_us(), 20);
    }

    #[test]
    fn test_into_match_trims_by_position_with_repeated_ids() {
        let mut state = MatchState::open(hot(7, 0, 99.0));
        state.extend(hot(7, 10, 100.0), true);
        state.extend(hot(7, 20, 90.0), false);
        let m = state.into_match(MatchKind::Rising);
        assert_eq!(m.len(), 2);
        assert_eq!(m.end_us(), Some(10));
    }

    #[test]
    fn test_carry_over_has_no_fresh_readings() {
        let mut state = MatchState::carry_over(hot(3, 30, 99.0));
        assert!(state.carried);
        assert_eq!(state.qualifying, 1);
        assert_eq!(state.fresh_qualifying(), 0);
        state.extend(hot(4, 40, 100.0), true);
        assert_eq!(state.fresh_qualifying(), 1);
        assert_eq!(MatchState::open(hot(0, 0, 99.0)).fresh_qualifying(), 1);
    }

    #[test]
    fn test_is_rising_ignores_cool_readings() {
        let events = [
            hot(0, 0, 99.0),
            hot(1, 1, 50.0),
            hot(2, 2, 100.0),
            hot(3, 3, 10.0),
            hot(4, 4, 101.0),
        ];
        assert!(is_rising(&events, T));
    }

    #[test]
    fn test_is_rising_requires_strict_increase() {
        assert!(!is_rising(&[hot(0, 0, 99.0), hot(1, 1, 99.0)], T));
        assert!(!is_rising(&[hot(0, 0, 100.0), hot(1, 1, 99.0)], T));
        assert!(is_rising(&[hot(0, 0, 99.0)], T));
        assert!(is_rising(&[], T));
    }

    #[test]
    fn test_accept_rising() {
        let state = state_of(&[hot(0, 0, 98.0), hot(1, 10, 99.0)]);
        assert_eq!(accept(&state, T, 1_000, REFINED_RULE), Some(MatchKind::Rising));
    }

    #[test]
    fn test_accept_respects_min_qualifying() {
        let state = state_of(&[hot(0, 0, 98.0)]);
        assert_eq!(accept(&state, T, 1_000, REFINED_RULE), None);
        let lenient = AcceptanceRule {
            min_qualifying: 1,
            require_duration: true,
        };
        assert_eq!(accept(&state, T, 1_000, lenient), Some(MatchKind::Rising));
    }

    #[test]
    fn test_accept_oscillating_needs_duration() {
        let short = state_of(&[hot(0, 0, 99.0), hot(1, 10, 90.0), hot(2, 20, 99.0)]);
        assert_eq!(accept(&short, T, 1_000, REFINED_RULE), None);

        let long = state_of(&[hot(0, 0, 99.0), hot(1, 500, 90.0), hot(2, 1_000, 99.0)]);
        assert_eq!(
            accept(&long, T, 1_000, REFINED_RULE),
            Some(MatchKind::Oscillating)
        );
    }

    #[test]
    fn test_accept_without_duration_guard() {
        // The strict rule accepts a flat streak regardless of how short it is.
        let short = state_of(&[hot(0, 0, 99.0), hot(1, 10, 99.0)]);
        assert_eq!(
            accept(&short, T, 1_000_000, STRICT_RULE),
            Some(MatchKind::Oscillating)
        );
    }

    #[test]
    fn test_accept_duration_boundary() {
        // duration == tolerance is accepted; one microsecond less is not.
        let exact = state_of(&[hot(0, 0, 99.0), hot(1, 1_000, 99.0)]);
        assert!(accept(&exact, T, 1_000, REFINED_RULE).is_some());
        let under = state_of(&[hot(0, 0, 99.0), hot(1, 999, 99.0)]);
        assert!(accept(&under, T, 1_000, REFINED_RULE).is_none());
    }

    #[test]
    fn test_shares_event_with() {
        let a = Match {
            events: vec![hot(0, 0, 99.0), hot(1, 10, 99.0)],
            kind: MatchKind::Rising,
        };
        let b = Match {
            events: vec![hot(1, 10, 99.0), hot(2, 20, 99.0)],
            kind: MatchKind::Rising,
        };
        let c = Match {
            events: vec![hot(3, 30, 99.0)],
            kind: MatchKind::Rising,
        };
        assert!(a.shares_event_with(&b));
        assert!(b.shares_event_with(&a));
        assert!(!a.shares_event_with(&c));
        assert!(!b.shares_event_with(&c));
    }

    #[test]
    fn test_shares_event_overlapping_range_without_common_reading() {
        let a = Match {
            events: vec![hot(0, 0, 99.0), hot(2, 20, 99.0)],
            kind: MatchKind::Oscillating,
        };
        let b = Match {
            events: vec![hot(1, 10, 99.0)],
            kind: MatchKind::Oscillating,
        };
        assert!(!a.shares_event_with(&b));
    }

    #[test]
    fn test_empty_match_accessors() {
        let m = Match {
            events: vec![],
            kind: MatchKind::Rising,
        };
        assert!(m.is_empty());
        assert_eq!(m.start_us(), None);
        assert_eq!(m.duration_us(), 0);
        assert!(!m.shares_event_with(&m.clone()));
    }
}
