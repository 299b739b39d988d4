// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Driver — feeds a reading source through a matcher and emitter.
//!
//! [`MatchStream`] adapts any `Iterator<Item = Event>` into an
//! `Iterator<Item = Match>`. It is lazy: a reading is pulled only when the
//! consumer asks for the next match. Bounded sources end with the matcher's
//! `finish` and the emitter's `flush`; unbounded sources simply never end.
//!
//! ```
//! use hotstreak::config::{MatcherConfig, Variant};
//! use hotstreak::driver::MatchStream;
//! use hotstreak::readings::{RisingReadings, HOT};
//!
//! let config = MatcherConfig::new(HOT, 1_000_000).with_variant(Variant::Refined);
//! let readings = RisingReadings::new(HOT - 1.0).take(30);
//! let streaks: Vec<_> = MatchStream::new(readings, config).unwrap().collect();
//! assert_eq!(streaks.len(), 1);
//! ```
//!
//! A stream is not restartable. Re-running a sequence means building a new
//! stream, which builds a new matcher.

use std::collections::VecDeque;

use crate::common::event::Event;
use crate::config::MatcherConfig;
use crate::emitter::MatchEmitter;
use crate::error::Result;
use crate::pattern::matcher::{MatchDecision, PatternMatcher};
use crate::pattern::state::Match;

/// Downstream consumer of emitted matches.
pub trait MatchSink {
    /// Receives one match.
    fn emit(&mut self, m: Match);
}

impl MatchSink for Vec<Match> {
    fn emit(&mut self, m: Match) {
        self.push(m);
    }
}

/// Counters collected while driving a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Readings pulled from the source.
    pub processed: u64,
    /// Out-of-order readings dropped by the matcher.
    pub dropped: u64,
    /// Streaks accepted by the matcher.
    pub accepted: u64,
    /// Streaks rejected or discarded by the matcher.
    pub rejected: u64,
    /// Matches released by the emitter.
    pub emitted: u64,
}

/// Lazy stream of matches over a reading source.
#[derive(Debug)]
pub struct MatchStream<I> {
    source: I,
    matcher: PatternMatcher,
    emitter: MatchEmitter,
    ready: VecDeque<Match>,
    exhausted: bool,
    stats: DriverStats,
}

impl<I: Iterator<Item = Event>> MatchStream<I> {
    /// Creates a stream over `source` with a fresh matcher.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new<S>(source: S, config: MatcherConfig) -> Result<Self>
    where
        S: IntoIterator<IntoIter = I>,
    {
        config.validate()?;
        Ok(Self::from_validated(source.into_iter(), config))
    }

    pub(crate) fn from_validated(source: I, config: MatcherConfig) -> Self {
        let emitter = MatchEmitter::new(config.dedup_policy);
        Self {
            source,
            matcher: PatternMatcher::from_validated(config),
            emitter,
            ready: VecDeque::new(),
            exhausted: false,
            stats: DriverStats::default(),
        }
    }

    /// Drains the stream into `sink` and returns the final counters.
    pub fn drive_into<K: MatchSink>(mut self, sink: &mut K) -> DriverStats {
        while let Some(m) = self.next() {
            sink.emit(m);
        }
        self.stats
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> DriverStats {
        self.stats
    }

    /// The underlying matcher.
    #[must_use]
    pub const fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    fn record(&mut self, decision: MatchDecision) {
        match decision {
            MatchDecision::Accept(m) => {
                self.stats.accepted += 1;
                self.ready.extend(self.emitter.offer(m));
            }
            MatchDecision::Reject => self.stats.rejected += 1,
            MatchDecision::Dropped => self.stats.dropped += 1,
            MatchDecision::Continue => {}
        }
    }
}

impl<I: Iterator<Item = Event>> Iterator for MatchStream<I> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        loop {
            if let Some(m) = self.ready.pop_front() {
                self.stats.emitted += 1;
                return Some(m);
            }
            if self.exhausted {
                return None;
            }
            if let Some(event) = self.source.next() {
                self.stats.processed += 1;
                let decision = self.matcher.evaluate(event);
                self.record(decision);
            } else {
                self.exhausted = true;
                let decision = self.matcher.finish();
                self.record(decision);
                self.ready.extend(self.emitter.flush());
            }
        }
    }
}

/// Runs a bounded source to completion and collects every emitted match.
///
/// # Errors
///
/// Returns a configuration error if `config` is invalid.
pub fn collect_matches<S>(source: S, config: MatcherConfig) -> Result<Vec<Match>>
where
    S: IntoIterator<Item = Event>,
{
    Ok(MatchStream::new(source, config)?.collect())
}
