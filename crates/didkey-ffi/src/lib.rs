//! didkey C FFI bindings.
//!
//! The whole core is reachable through one entry point that takes a JSON
//! request and returns a JSON response (see `didkey::boundary` for the
//! request shapes).
//!
//! # Memory contract
//!
//! - Request strings are owned by the caller and only borrowed for the
//!   duration of the call.
//! - Every response returned by [`didkey_invoke`] is heap-allocated via
//!   [`CString`] and **must** be released exactly once with
//!   [`didkey_release`]. Nothing is reclaimed automatically.
//! - The string returned by [`didkey_version`] is static and must **not**
//!   be released.
//!
//! Failures never surface as null: a null or non-UTF-8 request yields an
//! `InvalidRequest` error response like any other malformed request.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use didkey::boundary::handle_json;

const NULL_REQUEST: &str =
    r#"{"status":"error","code":"InvalidRequest","message":"request pointer was null"}"#;
const INVALID_UTF8: &str =
    r#"{"status":"error","code":"InvalidRequest","message":"request was not valid UTF-8"}"#;
const INTERIOR_NUL: &str =
    r#"{"status":"error","code":"InvalidRequest","message":"response contained a NUL byte"}"#;

/// Convert a `*const c_char` to a `&str`, or the error response to return.
///
/// # Safety
///
/// `ptr` must either be null (handled gracefully) or point to a valid,
/// null-terminated C string that remains valid for the duration of `'a`.
unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Result<&'a str, &'static str> {
    if ptr.is_null() {
        return Err(NULL_REQUEST);
    }
    CStr::from_ptr(ptr).to_str().map_err(|_| INVALID_UTF8)
}

/// Hand a response string to the caller.
fn into_raw(response: String) -> *mut c_char {
    match CString::new(response) {
        Ok(cs) => cs.into_raw(),
        // The fallback literal has no interior NUL.
        Err(_) => CString::new(INTERIOR_NUL)
            .map(CString::into_raw)
            .unwrap_or(std::ptr::null_mut()),
    }
}

/// Return the library version string as a null-terminated C string.
///
/// The returned pointer points to a `'static` string embedded in the
/// binary. The caller **must not** release it.
#[no_mangle]
pub extern "C" fn didkey_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

/// Execute one JSON request and return its JSON response.
///
/// # Returns
///
/// An owned response string, never null in practice. Release it with
/// [`didkey_release`].
///
/// # Safety
///
/// `request` must be null or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn didkey_invoke(request: *const c_char) -> *mut c_char {
    let response = match cstr_to_str(request) {
        Ok(request) => handle_json(request),
        Err(error) => {
            log::debug!("rejected FFI request before parsing");
            error.to_string()
        }
    };
    into_raw(response)
}

/// Release a response returned by [`didkey_invoke`].
///
/// Passing null is a no-op.
///
/// # Safety
///
/// `response` must be null or a pointer returned by [`didkey_invoke`] that
/// has not been released yet.
#[no_mangle]
pub unsafe extern "C" fn didkey_release(response: *mut c_char) {
    if !response.is_null() {
        drop(CString::from_raw(response));
    }
}
