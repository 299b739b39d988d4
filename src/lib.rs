//! # `hotstreak` — Streaming hot-streak detection
//!
//! Detects *hot streaks* in time-ordered sensor readings: runs of readings at
//! or above a threshold that either rise steadily or persist for at least a
//! tolerance period. Three matcher variants are provided, from the naive
//! strict-contiguity matcher to the refined one:
//!
//! | Variant | Cool dips | Reports |
//! |---------|-----------|---------|
//! | `strict` | end the streak | every `min_streak_length` hot readings, overlapping |
//! | `time_tolerant` | absorbed within tolerance | once per tolerance period |
//! | `refined` | absorbed within tolerance | once per streak |
//!
//! ## Library
//!
//! ```
//! use hotstreak::config::{MatcherConfig, Variant};
//! use hotstreak::driver::collect_matches;
//! use hotstreak::readings::{OscillatingReadings, HOT};
//!
//! let config = MatcherConfig::new(HOT, 2_000_000).with_variant(Variant::Refined);
//! let streaks = collect_matches(OscillatingReadings::new(3).take(90), config).unwrap();
//! assert_eq!(streaks.len(), 1);
//! ```
//!
//! ## `DuckDB` extension
//!
//! | Function | Type | Description |
//! |----------|------|-------------|
//! | `hot_streak_count(variant, threshold, tolerance, ts, value)` | Aggregate | Number of hot streaks in the group |
//!
//! ```sql
//! LOAD hotstreak;
//! SELECT sensor_id,
//!   hot_streak_count('refined', 98.0, INTERVAL '2 seconds', ts, temperature)
//! FROM readings
//! GROUP BY sensor_id;
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events (`debug` for dropped readings and
//! accepted streaks, `trace` for rejections) and installs no subscriber.

pub mod common;
pub mod config;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod hot_streak;
pub mod partition;
pub mod pattern;
pub mod readings;
pub mod window;

mod ffi;

pub use config::{DedupPolicy, MatcherConfig, Variant};
pub use error::{Error, Result};

/// Extension entry point called by `DuckDB` when the extension is loaded.
///
/// Obtains a raw `duckdb_connection` through the C API (`duckdb_connect`),
/// registers every function, and disconnects.
///
/// # Safety
///
/// Called by `DuckDB`'s extension loading mechanism via FFI.
/// `info` and `access` must be valid pointers provided by `DuckDB`.
#[no_mangle]
pub unsafe extern "C" fn hotstreak_init_c_api(
    info: libduckdb_sys::duckdb_extension_info,
    access: *const libduckdb_sys::duckdb_extension_access,
) -> bool {
    match hotstreak_init_internal(info, access) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "hotstreak extension failed to load");
            if let Some(set_error) = (*access).set_error {
                match std::ffi::CString::new(e.to_string()) {
                    Ok(err) => set_error(info, err.as_ptr()),
                    Err(_) => set_error(
                        info,
                        c"Extension init failed and could not allocate error string".as_ptr(),
                    ),
                }
            }
            false
        }
    }
}

unsafe fn hotstreak_init_internal(
    info: libduckdb_sys::duckdb_extension_info,
    access: *const libduckdb_sys::duckdb_extension_access,
) -> Result<bool, Box<dyn std::error::Error>> {
    // "v1.2.0" matches the default minimum version used by duckdb-loadable-macros.
    let have_api = libduckdb_sys::duckdb_rs_extension_api_init(info, access, "v1.2.0")
        .map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;

    if !have_api {
        // DuckDB is older than the API version this extension needs.
        return Ok(false);
    }

    let get_database = (*access)
        .get_database
        .ok_or("DuckDB did not provide get_database")?;
    let db: libduckdb_sys::duckdb_database = *get_database(info);

    let mut raw_con: libduckdb_sys::duckdb_connection = std::ptr::null_mut();
    let rc = libduckdb_sys::duckdb_connect(db, &mut raw_con);
    if rc != libduckdb_sys::DuckDBSuccess {
        return Err("Failed to open DuckDB connection for extension registration".into());
    }

    ffi::register_all_raw(raw_con);

    libduckdb_sys::duckdb_disconnect(&mut raw_con);

    Ok(true)
}
