// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Event model and time conversions shared by every matcher component.

pub mod event;
pub mod timestamp;
