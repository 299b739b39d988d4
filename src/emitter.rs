//! `MatchEmitter` — resolves overlapping accepted matches into output.
//!
//! Overlaps only arise from the strict variant, which seeds each new
//! candidate with the last reading of the previous match. Two policies:
//!
//! - [`DedupPolicy::EmitAll`]: every accepted match is emitted as-is,
//!   overlaps included.
//! - [`DedupPolicy::EmitLongest`]: consecutive matches that share a reading
//!   form a group; only the group's longest match is emitted (earliest wins
//!   ties).
//!
//! The emitter is streaming: under `EmitLongest` a group stays pending until
//! a non-overlapping match arrives or [`MatchEmitter::flush`] is called at
//! end of input.

use crate::config::DedupPolicy;
use crate::pattern::state::Match;

/// Streaming dedup stage between a matcher and its sink.
#[derive(Debug, Clone)]
pub struct MatchEmitter {
    policy: DedupPolicy,
    /// Longest match of the pending group.
    best: Option<Match>,
    /// Most recent match of the pending group, used for the overlap test.
    tail: Option<Match>,
}

impl MatchEmitter {
    /// Creates an emitter with the given policy.
    #[must_use]
    pub const fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            best: None,
            tail: None,
        }
    }

    /// Offers an accepted match. Returns a match ready for output, if any.
    pub fn offer(&mut self, m: Match) -> Option<Match> {
        match self.policy {
            DedupPolicy::EmitAll => Some(m),
            DedupPolicy::EmitLongest => self.offer_longest(m),
        }
    }

    fn offer_longest(&mut self, m: Match) -> Option<Match> {
        let overlaps = self
            .tail
            .as_ref()
            .is_some_and(|tail| tail.shares_event_with(&m));

        if overlaps {
            if self.best.as_ref().is_none_or(|best| m.len() > best.len()) {
                self.best = Some(m.clone());
            }
            self.tail = Some(m);
            return None;
        }

        let ready = self.best.take();
        self.best = Some(m.clone());
        self.tail = Some(m);
        ready
    }

    /// Releases the pending group at end of input.
    pub fn flush(&mut self) -> Option<Match> {
        self.tail = None;
        self.best.take()
    }

    /// The configured policy.
    #[must_use]
    pub const fn policy(&self) -> DedupPolicy {
        self.policy
    }
}
