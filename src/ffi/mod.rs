//! FFI bindings for registering the hot-streak aggregate with `DuckDB`.
//!
//! `DuckDB` does not yet provide a high-level Rust API for aggregate functions.
//! The raw `libduckdb-sys` bindings register the aggregate with its five
//! callbacks (`state_size`, `init`, `update`, `combine`, `finalize`) plus a
//! destructor. The callbacks are thin `unsafe extern "C"` shims over
//! [`crate::hot_streak::HotStreakState`].

pub mod hot_streak;

/// Registers every function using a raw `duckdb_connection` handle.
///
/// Called from the C entry point in `lib.rs`, which obtains the connection
/// via `duckdb_connect`.
///
/// # Safety
///
/// The caller must ensure `raw_con` is a valid `duckdb_connection` handle.
pub fn register_all_raw(raw_con: libduckdb_sys::duckdb_connection) {
    // Safety: The raw connection handle is valid, obtained via duckdb_connect
    // in hotstreak_init_internal and disconnected after registration.
    unsafe {
        hot_streak::register_hot_streak_count(raw_con);
    }
}
