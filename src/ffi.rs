//! FFI bindings for Synheart Vitality
//!
//! This module provides C-compatible functions for calling Vitality from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `vitality_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{snapshot_to_vitality_json, VitalityProcessor};
use crate::VITALITY_VERSION;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a vitality state from snapshot JSON and return it as JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `vitality_free_string`.
/// - Returns NULL on error; call `vitality_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitality_from_snapshot_json(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match snapshot_to_vitality_json(json_str) {
        Ok(state) => string_to_cstr(&state),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a VitalityProcessor
pub struct VitalityProcessorHandle {
    processor: VitalityProcessor,
}

/// Create a new latest-snapshot-wins processor.
///
/// # Safety
/// - Returns a pointer to a newly allocated VitalityProcessor.
/// - Must be freed with `vitality_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn vitality_processor_new() -> *mut VitalityProcessorHandle {
    clear_last_error();

    let handle = Box::new(VitalityProcessorHandle {
        processor: VitalityProcessor::new(),
    });
    Box::into_raw(handle)
}

/// Free a VitalityProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `vitality_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn vitality_processor_free(processor: *mut VitalityProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Process snapshot JSON with a stateful processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `vitality_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated payload string that must be freed with `vitality_free_string`.
/// - Returns NULL on error, or when a newer snapshot superseded this one
///   (`vitality_last_error` is NULL in that case).
#[no_mangle]
pub unsafe extern "C" fn vitality_processor_process(
    processor: *const VitalityProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.process_json(&json_str) {
        Ok(Some(payload)) => string_to_cstr(&payload),
        Ok(None) => ptr::null_mut(),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the latest published payload from a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `vitality_processor_new`.
/// - Returns a newly allocated string that must be freed with `vitality_free_string`.
/// - Returns NULL if nothing has been published yet or on error.
#[no_mangle]
pub unsafe extern "C" fn vitality_processor_latest(
    processor: *const VitalityProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match handle.processor.latest_json() {
        Ok(Some(payload)) => string_to_cstr(&payload),
        Ok(None) => ptr::null_mut(),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Vitality functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Vitality function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn vitality_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Vitality function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn vitality_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Vitality library version.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `vitality_free_string`.
#[no_mangle]
pub unsafe extern "C" fn vitality_version() -> *mut c_char {
    string_to_cstr(VITALITY_VERSION)
}
