//! `MatchWindow` — bounded sliding buffer of recent events.
//!
//! The window holds every admitted event whose timestamp lies within
//! `tolerance` of the newest admitted event. The time-tolerant matchers use
//! it to detect quiescence: once the last qualifying reading of a candidate
//! has been evicted, the gap since that reading exceeds the tolerance and the
//! streak is over.
//!
//! Events are kept in timestamp order in a `VecDeque`, so eviction pops from
//! the front. Under steady in-order arrival each event is pushed once and
//! popped once (amortized O(1) per admit); a burst that evicts everything is
//! O(window size).

use std::collections::VecDeque;

use crate::common::event::Event;

/// Sliding event-time window with a fixed tolerance horizon.
#[derive(Debug, Clone)]
pub struct MatchWindow {
    events: VecDeque<Event>,
    tolerance_us: i64,
}

impl MatchWindow {
    /// Creates an empty window with the given horizon in microseconds.
    #[must_use]
    pub const fn new(tolerance_us: i64) -> Self {
        Self {
            events: VecDeque::new(),
            tolerance_us,
        }
    }

    /// Inserts `event` in timestamp order and evicts expired events.
    ///
    /// Ties are inserted after existing events with the same timestamp,
    /// preserving arrival order. After the call, every buffered event has
    /// `timestamp_us >= newest - tolerance`.
    pub fn admit(&mut self, event: Event) {
        let pos = self
            .events
            .partition_point(|e| e.timestamp_us <= event.timestamp_us);
        self.events.insert(pos, event);
        self.evict();
    }

    fn evict(&mut self) {
        let Some(horizon) = self.horizon_us() else {
            return;
        };
        while self
            .events
            .front()
            .is_some_and(|e| e.timestamp_us < horizon)
        {
            self.events.pop_front();
        }
    }

    /// Oldest timestamp still inside the window, or `None` while empty.
    #[must_use]
    pub fn horizon_us(&self) -> Option<i64> {
        self.events
            .back()
            .map(|e| e.timestamp_us.saturating_sub(self.tolerance_us))
    }

    /// Returns true if a reading at `timestamp_us` has fallen out of the window.
    ///
    /// Decided on time alone, so it holds whether or not ids are unique.
    #[must_use]
    pub fn has_expired(&self, timestamp_us: i64) -> bool {
        self.horizon_us()
            .is_some_and(|horizon| timestamp_us < horizon)
    }

    /// Returns the buffered events in timestamp order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.iter().copied().collect()
    }

    /// Returns true if an event with the same id is still buffered.
    ///
    /// Scans from the newest end, where recently admitted events live.
    #[must_use]
    pub fn contains(&self, event: &Event) -> bool {
        self.events.iter().rev().any(|e| e == event)
    }

    /// Returns the newest buffered event.
    #[must_use]
    pub fn newest(&self) -> Option<&Event> {
        self.events.back()
    }

    /// Returns the number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the tolerance horizon in microseconds.
    #[must_use]
    pub const fn tolerance_us(&self) -> i64 {
        self.tolerance_us
    }
}
