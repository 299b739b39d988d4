// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Hot-streak pattern matching over time-ordered sensor readings.
//!
//! A *streak* is a run of hot readings (`value >= threshold`). Three
//! matcher variants decide differently how cool readings inside a run are
//! treated and when a run counts as a match:
//!
//! ```text
//! strict         hot hot hot | cool            -> run ends at the first cool reading
//! time_tolerant  hot hot cool hot ... (gap <= tolerance)
//!                                              -> cool dips absorbed, alarm after `tolerance`
//! refined        as time_tolerant              -> one decision per streak, length guard
//! ```
//!
//! Accepted streaks are classified as [`state::MatchKind::Rising`] (hot
//! values strictly increase) or [`state::MatchKind::Oscillating`] (heat lasted
//! at least the tolerance).

pub mod matcher;
pub mod state;
