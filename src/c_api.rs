// C entry points for hosts that only need the pure conversion, e.g. a
// browser extension's native helper. Strings cross the boundary as
// NUL-terminated UTF-8 and are owned by Rust until freed.
use crate::core::converter::convert;
use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

/// Converts Arabic-Indic digits in `text`. Returns NULL for a NULL or
/// non-UTF-8 argument. Free the result with `numeral_free_string`.
///
/// # Safety
/// `text` must be NULL or point to a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn numeral_convert(text: *const c_char) -> *mut c_char {
    if text.is_null() {
        return ptr::null_mut();
    }
    let c_str = CStr::from_ptr(text);
    let Ok(input) = c_str.to_str() else {
        tracing::warn!("numeral_convert received non-UTF-8 input");
        return ptr::null_mut();
    };

    // Release builds abort on panic, so this only catches in unwinding
    // (debug and test) builds.
    let result = catch_unwind(AssertUnwindSafe(|| convert(input).into_owned()));
    match result {
        // The output came from a C string, so it has no interior NUL.
        Ok(converted) => CString::new(converted)
            .map(CString::into_raw)
            .unwrap_or(ptr::null_mut()),
        Err(_) => {
            tracing::error!("panic in numeral_convert");
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `s` must be NULL or a pointer returned by `numeral_convert`.
#[no_mangle]
pub unsafe extern "C" fn numeral_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}
