//! FFI bindings for LexiLearn Core
//!
//! This module provides C-compatible functions for calling the engine from the
//! host app. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `lexi_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::geometry::ReferencePath;
use crate::pipeline::{assessment_to_record, trace_to_record, LexiProcessor};
use crate::progress::DEFAULT_HISTORY_WINDOW;
use crate::tracer::TraceSession;
use crate::types::{DifficultyTier, Point};

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

fn json_to_cstr<T: serde::Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score a recorded tracing attempt and return the score envelope JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `lexi_free_string`.
/// - Returns NULL on error; call `lexi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lexi_trace_to_record(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match trace_to_record(json_str) {
        Ok(record) => string_to_cstr(&record),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Score a full set of assessment trials and return the summary envelope JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `lexi_free_string`.
/// - Returns NULL on error; call `lexi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lexi_assessment_to_record(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match assessment_to_record(json_str) {
        Ok(record) => string_to_cstr(&record),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Live Tracer API
// ============================================================================

/// Opaque handle to a live trace session
pub struct TracerHandle {
    session: TraceSession,
}

/// Create a live trace session for one path.
///
/// `tier` is a tier name ("mild", "moderate", "severe", "profound").
///
/// # Safety
/// - `path_data` and `tier` must be valid null-terminated C strings.
/// - Must be freed with `lexi_tracer_free`.
/// - Returns NULL on error; call `lexi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lexi_tracer_new(
    path_data: *const c_char,
    tier: *const c_char,
    canvas_size: f64,
) -> *mut TracerHandle {
    clear_last_error();

    let data = match cstr_to_string(path_data) {
        Some(s) => s,
        None => {
            set_last_error("Invalid path_data string pointer");
            return ptr::null_mut();
        }
    };

    let tier = match cstr_to_string(tier).map(|s| s.parse::<DifficultyTier>()) {
        Some(Ok(tier)) => tier,
        Some(Err(e)) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
        None => {
            set_last_error("Invalid tier string pointer");
            return ptr::null_mut();
        }
    };

    if !(canvas_size.is_finite() && canvas_size > 0.0) {
        set_last_error("canvas_size must be positive");
        return ptr::null_mut();
    }

    let config = EngineConfig::default();
    let path = match ReferencePath::parse(&data, config.tracing.path_extent) {
        Ok(path) => path,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let session = TraceSession::for_path(&path, tier, canvas_size, &config.tracing);
    Box::into_raw(Box::new(TracerHandle { session }))
}

/// Free a live trace session.
///
/// # Safety
/// - `tracer` must be a valid pointer returned by `lexi_tracer_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lexi_tracer_free(tracer: *mut TracerHandle) {
    if !tracer.is_null() {
        drop(Box::from_raw(tracer));
    }
}

/// Signal the start of a gesture (pointer down).
///
/// # Safety
/// - `tracer` must be a valid pointer returned by `lexi_tracer_new`.
/// - Returns 0 on success, -1 on a null handle.
#[no_mangle]
pub unsafe extern "C" fn lexi_tracer_begin(tracer: *mut TracerHandle) -> i32 {
    clear_last_error();

    if tracer.is_null() {
        set_last_error("Null tracer pointer");
        return -1;
    }

    (*tracer).session.begin_gesture();
    0
}

/// Feed one movement sample in canvas coordinates; returns the sample
/// feedback JSON.
///
/// # Safety
/// - `tracer` must be a valid pointer returned by `lexi_tracer_new`.
/// - Returns a newly allocated string that must be freed with `lexi_free_string`.
/// - Returns NULL on error; call `lexi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lexi_tracer_sample(
    tracer: *mut TracerHandle,
    x: f64,
    y: f64,
) -> *mut c_char {
    clear_last_error();

    if tracer.is_null() {
        set_last_error("Null tracer pointer");
        return ptr::null_mut();
    }

    let handle = &mut *tracer;
    let feedback = handle.session.sample(Point::new(x, y));
    json_to_cstr(&feedback)
}

/// Signal the end of a gesture (pointer up); returns the outcome JSON.
///
/// # Safety
/// - `tracer` must be a valid pointer returned by `lexi_tracer_new`.
/// - Returns a newly allocated string that must be freed with `lexi_free_string`.
/// - Returns NULL on error; call `lexi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lexi_tracer_end(tracer: *mut TracerHandle) -> *mut c_char {
    clear_last_error();

    if tracer.is_null() {
        set_last_error("Null tracer pointer");
        return ptr::null_mut();
    }

    let handle = &mut *tracer;
    let outcome = handle.session.end_gesture();
    json_to_cstr(&outcome)
}

/// Clear the attempt ("Clear" / "Retry").
///
/// # Safety
/// - `tracer` must be a valid pointer returned by `lexi_tracer_new`.
/// - Returns 0 on success, -1 on a null handle.
#[no_mangle]
pub unsafe extern "C" fn lexi_tracer_reset(tracer: *mut TracerHandle) -> i32 {
    clear_last_error();

    if tracer.is_null() {
        set_last_error("Null tracer pointer");
        return -1;
    }

    (*tracer).session.reset();
    0
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a LexiProcessor
pub struct LexiProcessorHandle {
    processor: LexiProcessor,
}

/// Create a new LexiProcessor keeping `history_window` progress records.
///
/// # Safety
/// - Returns a pointer to a newly allocated LexiProcessor.
/// - Must be freed with `lexi_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn lexi_processor_new(history_window: i32) -> *mut LexiProcessorHandle {
    clear_last_error();

    let window = if history_window <= 0 {
        DEFAULT_HISTORY_WINDOW
    } else {
        history_window as usize
    };

    let processor = LexiProcessor::with_history_window(window);
    Box::into_raw(Box::new(LexiProcessorHandle { processor }))
}

/// Free a LexiProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `lexi_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lexi_processor_free(processor: *mut LexiProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Score a tracing attempt with a stateful processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `lexi_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `lexi_free_string`.
/// - Returns NULL on error; call `lexi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lexi_processor_process_trace(
    processor: *mut LexiProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.process_trace(&json_str) {
        Ok(record) => string_to_cstr(&record),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Save the processor's progress history to JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `lexi_processor_new`.
/// - Returns a newly allocated string that must be freed with `lexi_free_string`.
/// - Returns NULL on error; call `lexi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lexi_processor_save_progress(
    processor: *mut LexiProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match handle.processor.save_progress() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load the processor's progress history from JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `lexi_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `lexi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lexi_processor_load_progress(
    processor: *mut LexiProcessorHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return -1;
        }
    };

    match handle.processor.load_progress(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by LexiLearn functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a LexiLearn function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lexi_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next LexiLearn call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn lexi_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn lexi_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
