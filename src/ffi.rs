//! FFI bindings for Synheart Pulse
//!
//! This module provides C-compatible functions for calling Pulse from other languages.
//! String results are JSON reports in null-terminated C strings allocated by Rust;
//! the caller must free them using `pulse_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;
use std::slice;

use crate::config::PipelineConfig;
use crate::encoder::Provenance;
use crate::pipeline::PulseProcessor;
use crate::types::Signal;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Source label used for sample buffers handed over FFI
const FFI_SOURCE: &str = "ffi";

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

/// Helper to copy a caller-owned sample buffer into a signal
unsafe fn samples_to_signal(samples: *const f64, len: usize, sample_rate_hz: f64) -> Option<Signal> {
    if len == 0 {
        return Some(Signal::new(Vec::new(), sample_rate_hz));
    }
    if samples.is_null() {
        return None;
    }
    Some(Signal::new(
        slice::from_raw_parts(samples, len).to_vec(),
        sample_rate_hz,
    ))
}

fn analyze_to_cstr(processor: &PulseProcessor, signal: &Signal, source: &str) -> *mut c_char {
    match processor.analyze_to_json(signal, source) {
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

/// Analyze normalized samples and return a JSON report.
///
/// # Safety
/// - `samples` must point to `len` readable `f64` values (may be NULL when `len` is 0).
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_analyze_samples(
    samples: *const f64,
    len: usize,
    sample_rate_hz: f64,
) -> *mut c_char {
    clear_last_error();

    let signal = match samples_to_signal(samples, len, sample_rate_hz) {
        Some(s) => s,
        None => {
            set_last_error("Null samples pointer");
            return ptr::null_mut();
        }
    };

    analyze_to_cstr(&PulseProcessor::new(), &signal, FFI_SOURCE)
}

/// Decode a mono 16-bit WAV file and return a JSON report.
///
/// # Safety
/// - `path` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_analyze_wav(path: *const c_char) -> *mut c_char {
    clear_last_error();

    let path_str = match cstr_to_string(path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid path string pointer");
            return ptr::null_mut();
        }
    };

    let processor = PulseProcessor::new();
    match processor.analyze_wav(Path::new(&path_str)) {
        Ok((signal, output)) => {
            let provenance = Provenance::for_signal(&path_str, &signal, output.padded_len);
            match processor.encoder().encode_to_json(&output, &provenance) {
                Ok(json) => string_to_cstr(&json),
                Err(e) => {
                    set_last_error(&e.to_string());
                    ptr::null_mut()
                }
            }
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Configured Processor API
// ============================================================================

/// Opaque handle to a PulseProcessor
pub struct PulseProcessorHandle {
    processor: PulseProcessor,
}

/// Create a new PulseProcessor.
///
/// # Safety
/// - `config_json` must be NULL (defaults) or a valid null-terminated C string.
/// - Returns a pointer that must be freed with `pulse_processor_free`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_new(config_json: *const c_char) -> *mut PulseProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        PipelineConfig::default()
    } else {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match PipelineConfig::from_json(&json) {
            Ok(c) => c,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match PulseProcessor::with_config(config) {
        Ok(processor) => Box::into_raw(Box::new(PulseProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a PulseProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `pulse_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_free(processor: *mut PulseProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Analyze normalized samples with a configured processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `pulse_processor_new`.
/// - `samples` must point to `len` readable `f64` values (may be NULL when `len` is 0).
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_analyze_samples(
    processor: *const PulseProcessorHandle,
    samples: *const f64,
    len: usize,
    sample_rate_hz: f64,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let signal = match samples_to_signal(samples, len, sample_rate_hz) {
        Some(s) => s,
        None => {
            set_last_error("Null samples pointer");
            return ptr::null_mut();
        }
    };

    analyze_to_cstr(&handle.processor, &signal, FFI_SOURCE)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Pulse functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Pulse function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Pulse function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn pulse_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Pulse library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn pulse_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
