// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! `PatternMatcher` — per-partition state machine over time-ordered readings.
//!
//! Every variant shares the same skeleton:
//!
//! ```text
//! Idle --hot reading--> Candidate --termination--> Accept | Reject --> Idle
//! ```
//!
//! and differs only in its step function, which decides how a reading moves
//! the candidate and when the candidate terminates:
//!
//! | Variant | Cool reading | Terminates on | Acceptance guard |
//! |---------|--------------|---------------|------------------|
//! | Strict | discards candidate | `min_streak_length` hot readings | count only |
//! | Time-tolerant | absorbed while within tolerance | heat alarm, quiescence, end of input | none on count |
//! | Refined | absorbed while within tolerance | quiescence, end of input | count and duration |
//!
//! # Out-of-order input
//!
//! A reading older than the last admitted one is dropped, counted in
//! [`PatternMatcher::dropped_events`] and reported as
//! [`MatchDecision::Dropped`]. It never reaches the window or the candidate.

use tracing::{debug, trace};

use crate::common::event::Event;
use crate::config::{MatcherConfig, Variant};
use crate::error::Result;
use crate::pattern::state::{accept, AcceptanceRule, Match, MatchState};
use crate::window::MatchWindow;

/// Outcome of feeding one reading (or end of input) to a matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchDecision {
    /// No streak concluded.
    Continue,
    /// A streak concluded and was accepted.
    Accept(Match),
    /// A streak concluded and was rejected (or discarded by strict contiguity).
    Reject,
    /// The reading was out of order and ignored.
    Dropped,
}

impl MatchDecision {
    /// Returns the accepted match, if any.
    #[must_use]
    pub fn into_match(self) -> Option<Match> {
        match self {
            Self::Accept(m) => Some(m),
            _ => None,
        }
    }

    /// Returns true for [`MatchDecision::Accept`].
    #[must_use]
    pub const fn is_accept(&self) -> bool {
        matches!(self, Self::Accept(_))
    }
}

/// Stateful matcher for one key partition.
///
/// Not resettable: to re-run a sequence, build a fresh matcher.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    config: MatcherConfig,
    window: MatchWindow,
    state: Option<MatchState>,
    last_admitted_us: Option<i64>,
    dropped: u64,
}

impl PatternMatcher {
    /// Creates a matcher after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config.validate()` fails.
    pub fn new(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Creates a matcher from a config the caller has already validated.
    pub(crate) const fn from_validated(config: MatcherConfig) -> Self {
        let window = MatchWindow::new(config.tolerance_us);
        Self {
            config,
            window,
            state: None,
            last_admitted_us: None,
            dropped: 0,
        }
    }

    /// Feeds one reading. Call once per reading, in timestamp order.
    pub fn evaluate(&mut self, event: Event) -> MatchDecision {
        if self
            .last_admitted_us
            .is_some_and(|last| event.timestamp_us < last)
        {
            self.dropped += 1;
            debug!(
                id = event.id,
                timestamp_us = event.timestamp_us,
                last_admitted_us = self.last_admitted_us,
                "dropping out-of-order event"
            );
            return MatchDecision::Dropped;
        }
        self.last_admitted_us = Some(event.timestamp_us);
        self.window.admit(event);

        let decision = match self.config.variant {
            Variant::Strict => strict_step(&mut self.state, event, &self.config),
            Variant::TimeTolerant => {
                tolerant_step(&mut self.state, &self.window, event, &self.config, true)
            }
            Variant::Refined => {
                tolerant_step(&mut self.state, &self.window, event, &self.config, false)
            }
        };
        self.trace_decision(&decision);
        decision
    }

    /// Signals end of input.
    ///
    /// An open candidate is evaluated exactly as if the tolerance had expired.
    pub fn finish(&mut self) -> MatchDecision {
        let decision = match self.state.take() {
            Some(candidate) if candidate.fresh_qualifying() > 0 => {
                conclude(candidate, &self.config)
            }
            _ => MatchDecision::Continue,
        };
        self.trace_decision(&decision);
        decision
    }

    fn trace_decision(&self, decision: &MatchDecision) {
        match decision {
            MatchDecision::Accept(m) => debug!(
                variant = %self.config.variant,
                kind = ?m.kind,
                events = m.len(),
                start_us = m.start_us(),
                end_us = m.end_us(),
                "streak accepted"
            ),
            MatchDecision::Reject => trace!(variant = %self.config.variant, "streak rejected"),
            MatchDecision::Continue | MatchDecision::Dropped => {}
        }
    }

    /// Number of out-of-order readings dropped so far.
    #[must_use]
    pub const fn dropped_events(&self) -> u64 {
        self.dropped
    }

    /// The open candidate, if any.
    #[must_use]
    pub const fn state(&self) -> Option<&MatchState> {
        self.state.as_ref()
    }

    /// The matcher's sliding window.
    #[must_use]
    pub const fn window(&self) -> &MatchWindow {
        &self.window
    }

    /// The matcher's configuration.
    #[must_use]
    pub const fn config(&self) -> &MatcherConfig {
        &self.config
    }
}

/// Acceptance guard for each variant.
const fn acceptance_rule(config: &MatcherConfig) -> AcceptanceRule {
    match config.variant {
        Variant::Strict => AcceptanceRule {
            min_qualifying: config.min_streak_length,
            require_duration: false,
        },
        // No count guard: a lone hot reading passes the (vacuous) rising check.
        Variant::TimeTolerant => AcceptanceRule {
            min_qualifying: 1,
            require_duration: true,
        },
        Variant::Refined => AcceptanceRule {
            min_qualifying: config.min_streak_length,
            require_duration: true,
        },
    }
}

fn conclude(candidate: MatchState, config: &MatcherConfig) -> MatchDecision {
    match accept(
        &candidate,
        config.threshold,
        config.tolerance_us,
        acceptance_rule(config),
    ) {
        Some(kind) => MatchDecision::Accept(candidate.into_match(kind)),
        None => MatchDecision::Reject,
    }
}

/// Strict contiguity.
///
/// Known-flawed and kept that way on purpose:
///
/// - a single cool reading discards the candidate, so a streak with brief
///   dips is never recognized (false negative);
/// - acceptance only counts hot readings and ignores how long the heat
///   lasted, so heat shorter than the tolerance is reported (false positive);
/// - the next candidate is seeded with the last reading of the accepted one,
///   so a long run yields a chain of overlapping matches. The seeded
///   candidate needs at least one new hot reading before it can match.
fn strict_step(
    state: &mut Option<MatchState>,
    event: Event,
    config: &MatcherConfig,
) -> MatchDecision {
    if !event.qualifies(config.threshold) {
        return match state.take() {
            Some(candidate) if candidate.fresh_qualifying() > 0 => MatchDecision::Reject,
            _ => MatchDecision::Continue,
        };
    }

    match state {
        Some(candidate) => candidate.extend(event, true),
        None => *state = Some(MatchState::open(event)),
    }

    if state.as_ref().is_none_or(|c| {
        c.qualifying < config.min_streak_length || c.fresh_qualifying() == 0
    }) {
        return MatchDecision::Continue;
    }
    let Some(candidate) = state.take() else {
        return MatchDecision::Continue;
    };
    let decision = conclude(candidate, config);
    // Overlap flaw: the accepted match's last reading starts the next candidate.
    *state = Some(MatchState::carry_over(event));
    decision
}

/// Time-tolerant absorption shared by the time-tolerant and refined variants.
///
/// With `rearm`, a candidate that has stayed hot for the full tolerance is
/// concluded immediately (the heat alarm) and the matcher returns to idle, so
/// a long streak is reported once per tolerance period and its tail is
/// judged on its own. Without `rearm`, the candidate stays open until
/// quiescence or end of input.
fn tolerant_step(
    state: &mut Option<MatchState>,
    window: &MatchWindow,
    event: Event,
    config: &MatcherConfig,
    rearm: bool,
) -> MatchDecision {
    let mut decision = MatchDecision::Continue;

    // Quiescence: the last hot reading has left the window.
    if state
        .as_ref()
        .is_some_and(|c| window.has_expired(c.last_qualifying.timestamp_us))
    {
        if let Some(expired) = state.take() {
            decision = conclude(expired, config);
        }
    }

    if !event.qualifies(config.threshold) {
        if let Some(candidate) = state.as_mut() {
            candidate.extend(event, false);
        }
        return decision;
    }

    match state {
        Some(candidate) => candidate.extend(event, true),
        None => *state = Some(MatchState::open(event)),
    }

    if rearm
        && state
            .as_ref()
            .is_some_and(|c| c.duration_us() >= config.tolerance_us)
    {
        if let Some(candidate) = state.take() {
            return conclude(candidate, config);
        }
    }
    decision
}
