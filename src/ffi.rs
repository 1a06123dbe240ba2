//! The C-callable surface: opaque `JsonRepairOptions`/`JsonRepairStream`
//! handles, NUL-terminated `char*` strings, and an out-parameter error
//! record — the shape pinned by the project's own C example programs.
//!
//! Every entry point is wrapped in [`std::panic::catch_unwind`]: a panic
//! unwinding across an `extern "C"` boundary is undefined behaviour, so any
//! internal bug here must degrade to a `null`/`InternalError` return instead.

use std::ffi::{c_char, CStr, CString};
use std::os::raw::c_int;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use crate::error::{ErrorKind, RepairError};
use crate::options::Options;
use crate::stream::StreamState;

/// Mirrors the C struct `{ int code; size_t position; char* message; }`.
/// `message` is allocated with the standard C allocator (via `CString`),
/// not `jsonrepair_free` — see the ownership note on `jsonrepair_free` below.
#[repr(C)]
pub struct JsonRepairError {
    pub code: c_int,
    pub position: usize,
    pub message: *mut c_char,
}

impl Default for JsonRepairError {
    fn default() -> Self {
        Self {
            code: ErrorKind::Ok.code(),
            position: 0,
            message: ptr::null_mut(),
        }
    }
}

fn write_error(out: *mut JsonRepairError, err: RepairError) {
    if out.is_null() {
        return;
    }
    let message = CString::new(err.message).unwrap_or_else(|_| {
        CString::new("repair error message contained an interior NUL").unwrap()
    });
    unsafe {
        (*out).code = err.kind.code();
        (*out).position = err.position;
        (*out).message = message.into_raw();
    }
}

fn str_from_raw<'a>(input: *const c_char) -> Option<&'a str> {
    if input.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(input) }.to_str().ok()
}

fn owned_to_raw(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Run `f`, catching a panic rather than letting it unwind across the
/// `extern "C"` boundary. On panic, `error_out` (if non-null) is populated
/// with [`ErrorKind::InternalError`] before returning `NULL`.
fn catch<F: FnOnce() -> *mut c_char>(error_out: *mut JsonRepairError, f: F) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        write_error(error_out, RepairError::internal(0, "internal panic during repair"));
        ptr::null_mut()
    })
}

/// Repair `input` with default options. Returns `NULL` on unrecoverable
/// failure with no diagnostic.
///
/// # Safety
/// `input` must be a valid NUL-terminated string, or `NULL`.
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_repair(input: *const c_char) -> *mut c_char {
    catch(ptr::null_mut(), || match str_from_raw(input) {
        Some(text) => crate::repair(text).map(owned_to_raw).unwrap_or(ptr::null_mut()),
        None => ptr::null_mut(),
    })
}

/// Repair `input` with `options`, or default options when `options` is `NULL`.
///
/// # Safety
/// `input` must be a valid NUL-terminated string, or `NULL`. `options`, if
/// non-null, must have come from [`jsonrepair_options_new`] and not yet been
/// freed.
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_repair_with_options(
    input: *const c_char,
    options: *const Options,
) -> *mut c_char {
    catch(ptr::null_mut(), || match str_from_raw(input) {
        Some(text) => {
            let options = unsafe { options.as_ref() };
            crate::repair_with_options(text, options).map(owned_to_raw).unwrap_or(ptr::null_mut())
        }
        None => ptr::null_mut(),
    })
}

/// Repair `input`, populating `*error_out` on failure instead of discarding
/// the reason.
///
/// # Safety
/// Same as [`jsonrepair_repair_with_options`]; `error_out` may be `NULL` (in
/// which case the error is silently discarded, matching `repair_with_options`).
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_repair_ex(
    input: *const c_char,
    options: *const Options,
    error_out: *mut JsonRepairError,
) -> *mut c_char {
    catch(error_out, || {
        let text = match str_from_raw(input) {
            Some(text) => text,
            None => {
                write_error(error_out, RepairError::invalid_input());
                return ptr::null_mut();
            }
        };
        let options = unsafe { options.as_ref() };
        match crate::repair_ex(text, options) {
            Ok(repaired) => owned_to_raw(repaired),
            Err(err) => {
                write_error(error_out, err);
                ptr::null_mut()
            }
        }
    })
}

#[no_mangle]
pub extern "C" fn jsonrepair_options_new() -> *mut Options {
    Box::into_raw(Box::new(Options::new()))
}

/// # Safety
/// `options` must have come from [`jsonrepair_options_new`] and not already
/// have been freed.
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_options_free(options: *mut Options) {
    if !options.is_null() {
        drop(unsafe { Box::from_raw(options) });
    }
}

macro_rules! option_setter {
    ($name:ident, $field:ident) => {
        /// # Safety
        /// `options` must be a live pointer from [`jsonrepair_options_new`].
        #[no_mangle]
        pub unsafe extern "C" fn $name(options: *mut Options, value: bool) {
            if let Some(options) = unsafe { options.as_mut() } {
                options.$field = value;
            }
        }
    };
}

option_setter!(jsonrepair_options_set_ensure_ascii, ensure_ascii);
option_setter!(jsonrepair_options_set_allow_python_keywords, allow_python_keywords);
option_setter!(jsonrepair_options_set_tolerate_hash_comments, tolerate_hash_comments);
option_setter!(jsonrepair_options_set_fenced_code_blocks, fenced_code_blocks);
option_setter!(jsonrepair_options_set_repair_undefined, repair_undefined);
option_setter!(jsonrepair_options_set_normalize_js_nonfinite, normalize_js_nonfinite);
option_setter!(jsonrepair_options_set_number_tolerance_leading_dot, number_tolerance_leading_dot);
option_setter!(jsonrepair_options_set_number_tolerance_trailing_dot, number_tolerance_trailing_dot);
option_setter!(jsonrepair_options_set_python_style_separators, python_style_separators);
option_setter!(jsonrepair_options_set_aggressive_truncation_fix, aggressive_truncation_fix);
option_setter!(jsonrepair_options_set_stream_ndjson_aggregate, stream_ndjson_aggregate);

/// # Safety
/// `options`, if non-null, must be a live pointer from [`jsonrepair_options_new`].
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_stream_new(options: *const Options) -> *mut StreamState {
    let options = unsafe { options.as_ref() }.copied().unwrap_or_default();
    Box::into_raw(Box::new(StreamState::new(options)))
}

/// # Safety
/// `stream` must have come from [`jsonrepair_stream_new`] and not already
/// have been freed.
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_stream_free(stream: *mut StreamState) {
    if !stream.is_null() {
        drop(unsafe { Box::from_raw(stream) });
    }
}

/// # Safety
/// `stream` must be a live pointer from [`jsonrepair_stream_new`]; `chunk`
/// must be a valid NUL-terminated string, or `NULL` (treated as empty).
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_stream_push(
    stream: *mut StreamState,
    chunk: *const c_char,
) -> *mut c_char {
    jsonrepair_stream_push_ex(stream, chunk, ptr::null_mut())
}

/// # Safety
/// Same as [`jsonrepair_stream_push`]; `error_out` may be `NULL`.
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_stream_push_ex(
    stream: *mut StreamState,
    chunk: *const c_char,
    error_out: *mut JsonRepairError,
) -> *mut c_char {
    catch(error_out, || {
        let stream = match unsafe { stream.as_mut() } {
            Some(stream) => stream,
            None => {
                write_error(error_out, RepairError::invalid_input());
                return ptr::null_mut();
            }
        };
        let bytes = if chunk.is_null() {
            &[][..]
        } else {
            unsafe { CStr::from_ptr(chunk) }.to_bytes()
        };
        match stream.push(bytes) {
            Ok(Some(out)) => owned_to_raw(out),
            Ok(None) => ptr::null_mut(),
            Err(err) => {
                write_error(error_out, err);
                ptr::null_mut()
            }
        }
    })
}

/// # Safety
/// `stream` must be a live pointer from [`jsonrepair_stream_new`].
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_stream_flush(stream: *mut StreamState) -> *mut c_char {
    jsonrepair_stream_flush_ex(stream, ptr::null_mut())
}

/// # Safety
/// Same as [`jsonrepair_stream_flush`]; `error_out` may be `NULL`.
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_stream_flush_ex(
    stream: *mut StreamState,
    error_out: *mut JsonRepairError,
) -> *mut c_char {
    catch(error_out, || {
        let stream = match unsafe { stream.as_mut() } {
            Some(stream) => stream,
            None => {
                write_error(error_out, RepairError::invalid_input());
                return ptr::null_mut();
            }
        };
        match stream.flush() {
            Ok(out) => owned_to_raw(out),
            Err(err) => {
                write_error(error_out, err);
                ptr::null_mut()
            }
        }
    })
}

#[no_mangle]
pub extern "C" fn jsonrepair_version() -> *const c_char {
    static VERSION_C: once_cell::sync::OnceCell<CString> = once_cell::sync::OnceCell::new();
    VERSION_C.get_or_init(|| CString::new(crate::VERSION).unwrap()).as_ptr()
}

/// Release a string the engine returned (a repair, a streamed fragment, or a
/// version string is exempt since it is `'static` and not owned by the
/// caller). Error messages are released with the standard allocator instead
/// — do not pass `JsonRepairError::message` here.
///
/// # Safety
/// `s` must have been returned by one of this module's repair/stream
/// functions, must not already have been freed, and must not be passed to
/// any other deallocator.
#[no_mangle]
pub unsafe extern "C" fn jsonrepair_free(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cstring(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn repairs_through_the_c_surface() {
        let input = cstring("{a:1, b:'hello'}");
        let out = unsafe { jsonrepair_repair(input.as_ptr()) };
        assert!(!out.is_null());
        let text = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
        assert_eq!(text, r#"{"a":1,"b":"hello"}"#);
        unsafe { jsonrepair_free(out) };
    }

    #[test]
    fn options_roundtrip_through_opaque_handle() {
        let opts = jsonrepair_options_new();
        unsafe { jsonrepair_options_set_ensure_ascii(opts, true) };
        let input = cstring("{name:'中文'}");
        let out = unsafe { jsonrepair_repair_with_options(input.as_ptr(), opts) };
        let text = unsafe { CStr::from_ptr(out) }.to_str().unwrap();
        assert!(text.is_ascii());
        unsafe {
            jsonrepair_free(out);
            jsonrepair_options_free(opts);
        }
    }

    #[test]
    fn repair_ex_populates_error_record() {
        let input = cstring("@@@");
        let mut error = JsonRepairError::default();
        let out = unsafe { jsonrepair_repair_ex(input.as_ptr(), ptr::null(), &mut error) };
        assert!(out.is_null());
        assert_eq!(error.code, ErrorKind::UnexpectedToken.code());
        assert!(!error.message.is_null());
        unsafe { drop(CString::from_raw(error.message)) };
    }

    #[test]
    fn stream_push_and_flush_through_the_c_surface() {
        let stream = unsafe { jsonrepair_stream_new(ptr::null()) };
        let c1 = cstring("{a:");
        let c2 = cstring("1}");
        let out1 = unsafe { jsonrepair_stream_push(stream, c1.as_ptr()) };
        assert!(out1.is_null());
        let out2 = unsafe { jsonrepair_stream_push(stream, c2.as_ptr()) };
        assert!(!out2.is_null());
        let text = unsafe { CStr::from_ptr(out2) }.to_str().unwrap().to_string();
        assert_eq!(text, r#"{"a":1}"#);
        unsafe {
            jsonrepair_free(out2);
            jsonrepair_stream_free(stream);
        }
    }

    #[test]
    fn version_is_a_stable_static_string() {
        let v = jsonrepair_version();
        assert!(!v.is_null());
        let text = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(text, crate::VERSION);
    }

    #[test]
    fn null_input_yields_invalid_input_error() {
        let mut error = JsonRepairError::default();
        let out = unsafe { jsonrepair_repair_ex(ptr::null(), ptr::null(), &mut error) };
        assert!(out.is_null());
        assert_eq!(error.code, ErrorKind::InvalidInput.code());
        unsafe { drop(CString::from_raw(error.message)) };
    }
}
