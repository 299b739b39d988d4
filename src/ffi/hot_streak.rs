//! FFI registration for the `hot_streak_count` aggregate function.

use crate::common::timestamp::interval_to_micros;
use crate::hot_streak::HotStreakState;
use libduckdb_sys::*;
use tracing::{debug, warn};

/// Registers the `hot_streak_count` function with `DuckDB`.
///
/// Signature: `hot_streak_count(VARCHAR, DOUBLE, INTERVAL, TIMESTAMP, DOUBLE) -> BIGINT`
///
/// # Safety
///
/// Requires a valid `duckdb_connection` handle.
pub unsafe fn register_hot_streak_count(con: duckdb_connection) {
    unsafe {
        let func = duckdb_create_aggregate_function();
        duckdb_aggregate_function_set_name(func, c"hot_streak_count".as_ptr());

        // Parameters: variant, threshold, tolerance, timestamp, value
        for type_id in [
            DUCKDB_TYPE_DUCKDB_TYPE_VARCHAR,
            DUCKDB_TYPE_DUCKDB_TYPE_DOUBLE,
            DUCKDB_TYPE_DUCKDB_TYPE_INTERVAL,
            DUCKDB_TYPE_DUCKDB_TYPE_TIMESTAMP,
            DUCKDB_TYPE_DUCKDB_TYPE_DOUBLE,
        ] {
            let param_type = duckdb_create_logical_type(type_id);
            duckdb_aggregate_function_add_parameter(func, param_type);
            duckdb_destroy_logical_type(&mut { param_type });
        }

        // Return type: BIGINT (streak count)
        let ret_type = duckdb_create_logical_type(DUCKDB_TYPE_DUCKDB_TYPE_BIGINT);
        duckdb_aggregate_function_set_return_type(func, ret_type);
        duckdb_destroy_logical_type(&mut { ret_type });

        duckdb_aggregate_function_set_functions(
            func,
            Some(state_size),
            Some(state_init),
            Some(state_update),
            Some(state_combine),
            Some(state_finalize),
        );

        duckdb_aggregate_function_set_destructor(func, Some(state_destroy));

        let result = duckdb_register_aggregate_function(con, func);
        if result != DuckDBSuccess {
            warn!("failed to register hot_streak_count function");
        }

        duckdb_destroy_aggregate_function(&mut { func });
    }
}

/// State stored in `DuckDB`'s aggregate state buffer.
/// Points to a heap-allocated [`HotStreakState`].
#[repr(C)]
struct FfiState {
    inner: *mut HotStreakState,
}

// SAFETY: `validity` is either null (all rows valid) or a DuckDB validity
// bitmap covering `row`.
unsafe fn row_is_valid(validity: *mut u64, row: usize) -> bool {
    unsafe { validity.is_null() || duckdb_validity_row_is_valid(validity, row as idx_t) }
}

// SAFETY: `data` is the data pointer of a VARCHAR vector with at least
// `row + 1` entries. The string bytes live as long as the data chunk.
unsafe fn read_varchar<'a>(data: *mut std::ffi::c_void, row: usize) -> Option<&'a str> {
    unsafe {
        if data.is_null() {
            return None;
        }
        let str_struct = data
            .cast::<u8>()
            .add(row * std::mem::size_of::<duckdb_string_t>())
            as *mut duckdb_string_t;
        let str_ptr = duckdb_string_t_data(str_struct);
        if str_ptr.is_null() {
            return None;
        }
        let len = duckdb_string_t_length(*str_struct);
        let bytes = std::slice::from_raw_parts(str_ptr as *const u8, len as usize);
        std::str::from_utf8(bytes).ok()
    }
}

// SAFETY: Pure computation returning byte size of FfiState.
unsafe extern "C" fn state_size(_info: duckdb_function_info) -> idx_t {
    std::mem::size_of::<FfiState>() as idx_t
}

// SAFETY: `state` is a DuckDB-allocated buffer of at least `state_size()` bytes.
// The inner HotStreakState is freed in `state_destroy`.
unsafe extern "C" fn state_init(_info: duckdb_function_info, state: duckdb_aggregate_state) {
    unsafe {
        let ffi_state = &mut *(state as *mut FfiState);
        ffi_state.inner = Box::into_raw(Box::new(HotStreakState::new()));
    }
}

// SAFETY: `input` is a valid DuckDB data chunk with columns (VARCHAR, DOUBLE,
// INTERVAL, TIMESTAMP, DOUBLE) as registered. `states` points to `row_count`
// aggregate state pointers, each initialized by `state_init`.
unsafe extern "C" fn state_update(
    _info: duckdb_function_info,
    input: duckdb_data_chunk,
    states: *mut duckdb_aggregate_state,
) {
    unsafe {
        let row_count = duckdb_data_chunk_get_size(input) as usize;

        // Vector 0: VARCHAR (variant)
        let variant_vec = duckdb_data_chunk_get_vector(input, 0);
        let variant_data = duckdb_vector_get_data(variant_vec);
        let variant_validity = duckdb_vector_get_validity(variant_vec);

        // Vector 1: DOUBLE (threshold)
        let threshold_vec = duckdb_data_chunk_get_vector(input, 1);
        let threshold_data = duckdb_vector_get_data(threshold_vec) as *const f64;
        let threshold_validity = duckdb_vector_get_validity(threshold_vec);

        // Vector 2: INTERVAL (months: i32, days: i32, micros: i64)
        let interval_vec = duckdb_data_chunk_get_vector(input, 2);
        let interval_data = duckdb_vector_get_data(interval_vec) as *const u8;
        let interval_validity = duckdb_vector_get_validity(interval_vec);

        // Vector 3: TIMESTAMP (i64 microseconds)
        let ts_vec = duckdb_data_chunk_get_vector(input, 3);
        let ts_data = duckdb_vector_get_data(ts_vec) as *const i64;
        let ts_validity = duckdb_vector_get_validity(ts_vec);

        // Vector 4: DOUBLE (reading value)
        let value_vec = duckdb_data_chunk_get_vector(input, 4);
        let value_data = duckdb_vector_get_data(value_vec) as *const f64;
        let value_validity = duckdb_vector_get_validity(value_vec);

        for i in 0..row_count {
            let state_ptr = *states.add(i);
            let ffi_state = &mut *(state_ptr as *mut FfiState);
            let state = &mut *ffi_state.inner;

            // Parameters are constant per group; take them from the first
            // row where all three are non-NULL.
            if !state.has_parameters()
                && row_is_valid(variant_validity, i)
                && row_is_valid(threshold_validity, i)
                && row_is_valid(interval_validity, i)
            {
                let interval_ptr = interval_data.add(i * 16);
                let months = *(interval_ptr as *const i32);
                let days = *(interval_ptr.add(4) as *const i32);
                let micros = *(interval_ptr.add(8) as *const i64);

                match (
                    read_varchar(variant_data, i),
                    interval_to_micros(months, days, micros),
                ) {
                    (Some(variant), Some(tolerance_us)) => {
                        state.set_parameters(variant, *threshold_data.add(i), tolerance_us);
                    }
                    _ => debug!(row = i, "unreadable hot_streak_count parameters"),
                }
            }

            // Skip NULL readings
            if !row_is_valid(ts_validity, i) || !row_is_valid(value_validity, i) {
                continue;
            }

            state.update(*ts_data.add(i), *value_data.add(i));
        }
    }
}

// SAFETY: `source` and `target` point to `count` aggregate state pointers.
// Null checks guard against uninitialized states.
unsafe extern "C" fn state_combine(
    _info: duckdb_function_info,
    source: *mut duckdb_aggregate_state,
    target: *mut duckdb_aggregate_state,
    count: idx_t,
) {
    unsafe {
        for i in 0..count as usize {
            let src_ptr = *source.add(i);
            let tgt_ptr = *target.add(i);
            let src_ffi = &*(src_ptr as *const FfiState);
            let tgt_ffi = &mut *(tgt_ptr as *mut FfiState);

            if src_ffi.inner.is_null() || tgt_ffi.inner.is_null() {
                continue;
            }

            (*tgt_ffi.inner).combine_in_place(&*src_ffi.inner);
        }
    }
}

// SAFETY: `source` points to `count` aggregate state pointers. `result` is a
// valid DuckDB BIGINT vector with room for `offset + count` elements. Invalid
// parameters produce NULL output via the validity bitmap.
unsafe extern "C" fn state_finalize(
    _info: duckdb_function_info,
    source: *mut duckdb_aggregate_state,
    result: duckdb_vector,
    count: idx_t,
    offset: idx_t,
) {
    unsafe {
        let data = duckdb_vector_get_data(result) as *mut i64;
        duckdb_vector_ensure_validity_writable(result);
        let validity = duckdb_vector_get_validity(result);

        for i in 0..count as usize {
            let state_ptr = *source.add(i);
            let ffi_state = &mut *(state_ptr as *mut FfiState);
            let idx = offset as usize + i;

            if ffi_state.inner.is_null() {
                duckdb_validity_set_row_invalid(validity, idx as idx_t);
                continue;
            }
            match (*ffi_state.inner).finalize() {
                Ok(n) => *data.add(idx) = n,
                Err(e) => {
                    debug!(error = %e, "hot_streak_count returns NULL");
                    duckdb_validity_set_row_invalid(validity, idx as idx_t);
                }
            }
        }
    }
}

// SAFETY: `state` points to `count` aggregate state pointers. Each inner pointer
// was allocated by `Box::into_raw` in `state_init`. We reclaim the Box to free
// heap memory, then null the pointer to prevent double-free.
unsafe extern "C" fn state_destroy(state: *mut duckdb_aggregate_state, count: idx_t) {
    unsafe {
        for i in 0..count as usize {
            let state_ptr = *state.add(i);
            let ffi_state = &mut *(state_ptr as *mut FfiState);
            if !ffi_state.inner.is_null() {
                drop(Box::from_raw(ffi_state.inner));
                ffi_state.inner = std::ptr::null_mut();
            }
        }
    }
}
