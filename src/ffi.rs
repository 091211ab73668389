//! FFI interface for C/C++ hosts
//!
//! Results are passed back as JSON strings owned by Rust.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::config::load_rule_sets;
use crate::metadata::extract_metadata_from_html;

/// Result struct returned to the host.
/// Both pointers are owned by Rust and must be freed via free_metadata_result
#[repr(C)]
pub struct MetadataResultFFI {
    /// JSON object of extracted fields (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Extract page metadata from HTML.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `url` - Absolute URL of the document (null-terminated)
/// * `rules_json` - JSON rule table (null-terminated), or null for the built-in table
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `url` and `rules_json` must be null or valid null-terminated C strings
/// - Caller must free the result via `free_metadata_result`
#[no_mangle]
pub unsafe extern "C" fn extract_metadata_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    url: *const c_char,
    rules_json: *const c_char,
) -> MetadataResultFFI {
    let html = match read_html(html_ptr, html_len) {
        Ok(html) => html,
        Err(msg) => return make_error_result(msg),
    };

    // A missing URL only disables URL-based defaults
    let url = match read_c_str(url) {
        Ok(url) => url.unwrap_or_default(),
        Err(_) => return make_error_result("Invalid UTF-8 in URL"),
    };

    let table = match read_c_str(rules_json) {
        Ok(None) => None,
        Ok(Some(json)) => match load_rule_sets(json) {
            Ok(table) => Some(table),
            Err(e) => return make_error_result(&format!("Invalid rule table: {}", e)),
        },
        Err(_) => return make_error_result("Invalid UTF-8 in rule table JSON"),
    };

    let record = match extract_metadata_from_html(html, url, table.as_ref()) {
        Ok(record) => record,
        Err(e) => return make_error_result(&format!("Extraction failed: {}", e)),
    };

    match serde_json::to_string(&record) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => MetadataResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

/// Free a MetadataResultFFI returned by extract_metadata_ffi
///
/// # Safety
/// - `result` must have been returned by `extract_metadata_ffi`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_metadata_result(result: MetadataResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

unsafe fn read_html<'a>(html_ptr: *const c_char, html_len: usize) -> Result<&'a str, &'static str> {
    if html_ptr.is_null() || html_len == 0 {
        return Ok("");
    }
    let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
    std::str::from_utf8(slice).map_err(|_| "Invalid UTF-8 in HTML content")
}

unsafe fn read_c_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>, std::str::Utf8Error> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr).to_str().map(Some)
}

fn make_error_result(msg: &str) -> MetadataResultFFI {
    let error_ptr = CString::new(msg)
        .or_else(|_| CString::new("Unknown error"))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut());
    MetadataResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr,
    }
}
