//! Per-key matching.
//!
//! Matcher state is stateful over one partition, so keyed input needs one
//! matcher per key. [`PartitionedMatcher`] routes an interleaved keyed feed
//! to lazily created matchers. [`run_partitioned`] takes pre-split
//! partitions and runs them on the `rayon` pool, one matcher per partition
//! with no shared mutable state.

use std::collections::HashMap;
use std::hash::Hash;

use rayon::prelude::*;
use tracing::debug;

use crate::common::event::Event;
use crate::config::MatcherConfig;
use crate::driver::MatchStream;
use crate::emitter::MatchEmitter;
use crate::error::Result;
use crate::pattern::matcher::PatternMatcher;
use crate::pattern::state::Match;

#[derive(Debug, Clone)]
struct Lane {
    matcher: PatternMatcher,
    emitter: MatchEmitter,
}

impl Lane {
    fn new(config: &MatcherConfig) -> Self {
        Self {
            matcher: PatternMatcher::from_validated(config.clone()),
            emitter: MatchEmitter::new(config.dedup_policy),
        }
    }
}

/// Routes keyed readings to one matcher per key.
#[derive(Debug, Clone)]
pub struct PartitionedMatcher<K> {
    config: MatcherConfig,
    lanes: HashMap<K, Lane>,
}

impl<K: Eq + Hash + Clone> PartitionedMatcher<K> {
    /// Creates an empty router.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            lanes: HashMap::new(),
        })
    }

    /// Feeds one reading to the matcher for `key`, creating it on first use.
    ///
    /// Returns a match released by that key's emitter, if any.
    pub fn evaluate(&mut self, key: &K, event: Event) -> Option<Match> {
        let config = &self.config;
        let lane = self
            .lanes
            .entry(key.clone())
            .or_insert_with(|| Lane::new(config));
        let m = lane.matcher.evaluate(event).into_match()?;
        lane.emitter.offer(m)
    }

    /// Ends input on every key and returns what each key still had pending.
    ///
    /// Keys with nothing pending are omitted.
    pub fn finish(&mut self) -> HashMap<K, Vec<Match>> {
        let mut out = HashMap::new();
        for (key, mut lane) in self.lanes.drain() {
            let mut pending = Vec::new();
            if let Some(m) = lane.matcher.finish().into_match() {
                pending.extend(lane.emitter.offer(m));
            }
            pending.extend(lane.emitter.flush());
            if !pending.is_empty() {
                out.insert(key, pending);
            }
        }
        out
    }

    /// Number of keys seen so far.
    #[must_use]
    pub fn partitions(&self) -> usize {
        self.lanes.len()
    }

    /// Out-of-order readings dropped for `key`.
    #[must_use]
    pub fn dropped_events(&self, key: &K) -> u64 {
        self.lanes
            .get(key)
            .map_or(0, |lane| lane.matcher.dropped_events())
    }
}

/// Runs every partition to completion in parallel.
///
/// Each partition's readings must already be in timestamp order; late
/// readings are dropped per partition, exactly as in the sequential driver.
/// Every input key appears in the result, possibly with no matches.
///
/// # Errors
///
/// Returns a configuration error if `config` is invalid.
pub fn run_partitioned<K>(
    partitions: HashMap<K, Vec<Event>>,
    config: &MatcherConfig,
) -> Result<HashMap<K, Vec<Match>>>
where
    K: Eq + Hash + Send,
{
    config.validate()?;
    debug!(
        partitions = partitions.len(),
        variant = %config.variant,
        "running partitions"
    );
    Ok(partitions
        .into_par_iter()
        .map(|(key, events)| {
            let matches: Vec<Match> =
                MatchStream::from_validated(events.into_iter(), config.clone()).collect();
            (key, matches)
        })
        .collect())
}
