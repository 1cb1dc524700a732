//! C-ABI wrapper around `sandia-core`.
//!
//! # Overview
//! Exposes the request engine through `extern "C"` functions named after the
//! C library it replaces (`sandia_create`, `sandia_get_request`, ...), so
//! existing C callers can link against it without source changes beyond
//! freeing responses.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The engine lives behind an opaque `FfiSandia` pointer. `sandia_close`
//!   releases the socket and headers and may be called any number of times;
//!   `sandia_free` releases the handle itself.
//! - Responses are heap-allocated `FfiResponse` values that the caller must
//!   release with `sandia_free_response`.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use sandia_core::{Engine, EngineConfig, Header, HttpVersion, Method};

use types::*;

/// Borrow a C string as UTF-8. `Err` carries the code to report.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Result<&'a str, FfiErrorCode> {
    if ptr.is_null() {
        return Err(FfiErrorCode::NullArg);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiErrorCode::String)
}

// ---------------------------------------------------------------------------
// Engine lifecycle
// ---------------------------------------------------------------------------

/// Create an engine for `host:port`, resolving the host immediately.
///
/// A resolution failure still returns a handle; check `sandia_is_valid`.
/// Returns null only if `host` is null or not UTF-8, or on internal panic.
/// The caller must free the returned pointer with `sandia_free`.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_create(host: *const c_char, port: u16) -> *mut FfiSandia {
    catch_unwind(|| {
        let Ok(host) = (unsafe { str_arg(host) }) else {
            return std::ptr::null_mut();
        };
        Box::into_raw(Box::new(FfiSandia {
            inner: Engine::new(host, port),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create an engine configured from a JSON document.
///
/// `config_json` may be null for defaults. Returns null if `host` is invalid,
/// the document does not parse, or on internal panic.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_create_with_config(
    host: *const c_char,
    port: u16,
    config_json: *const c_char,
) -> *mut FfiSandia {
    catch_unwind(|| {
        let Ok(host) = (unsafe { str_arg(host) }) else {
            return std::ptr::null_mut();
        };
        let config = if config_json.is_null() {
            EngineConfig::default()
        } else {
            let parsed = unsafe { str_arg(config_json) }
                .ok()
                .and_then(|raw| EngineConfig::from_json(raw).ok());
            match parsed {
                Some(config) => config,
                None => return std::ptr::null_mut(),
            }
        };
        Box::into_raw(Box::new(FfiSandia {
            inner: Engine::with_config(host, port, config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Release the socket, headers and endpoint. The handle stays valid and any
/// further request reports `SocketNotReady`. Safe to call repeatedly and
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_close(s: *mut FfiSandia) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            unsafe { &mut *s }.inner.close();
        });
    }
}

/// Free a handle created by `sandia_create*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_free(s: *mut FfiSandia) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(s) });
        });
    }
}

/// Whether setup succeeded and the engine has not been closed.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_is_valid(s: *const FfiSandia) -> bool {
    if s.is_null() {
        return false;
    }
    catch_unwind(|| unsafe { &*s }.inner.is_valid()).unwrap_or(false)
}

/// Most recent error recorded by the engine, or `Success` if none.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_last_error(s: *const FfiSandia) -> FfiErrorCode {
    if s.is_null() {
        return FfiErrorCode::NullArg;
    }
    catch_unwind(|| {
        unsafe { &*s }
            .inner
            .last_error()
            .map_or(FfiErrorCode::Success, FfiErrorCode::from)
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Socket error state of the most recent connection.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_is_connected(s: *const FfiSandia) -> bool {
    if s.is_null() {
        return false;
    }
    catch_unwind(|| unsafe { &*s }.inner.is_connected()).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn sandia_set_version(s: *mut FfiSandia, version: FfiHttpVersion) -> FfiErrorCode {
    if s.is_null() {
        return FfiErrorCode::NullArg;
    }
    catch_unwind(|| {
        unsafe { &mut *s }.inner.set_version(version.into());
        FfiErrorCode::Success
    })
    .unwrap_or(FfiErrorCode::Panic)
}

#[unsafe(no_mangle)]
pub extern "C" fn sandia_get_version(s: *const FfiSandia) -> FfiHttpVersion {
    if s.is_null() {
        return FfiHttpVersion::Unknown;
    }
    catch_unwind(|| FfiHttpVersion::from(unsafe { &*s }.inner.version()))
        .unwrap_or(FfiHttpVersion::Unknown)
}

/// Set the per-read chunk size used while receiving. Zero is rejected.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_set_receive_buffer_size(s: *mut FfiSandia, size: usize) -> FfiErrorCode {
    if s.is_null() {
        return FfiErrorCode::NullArg;
    }
    catch_unwind(|| {
        FfiErrorCode::from_result(unsafe { &mut *s }.inner.set_receive_chunk_size(size))
    })
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Append one header. Key and value are copied.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_add_header(
    s: *mut FfiSandia,
    key: *const c_char,
    value: *const c_char,
) -> FfiErrorCode {
    if s.is_null() {
        return FfiErrorCode::NullArg;
    }
    catch_unwind(|| {
        let (key, value) = match unsafe { (str_arg(key), str_arg(value)) } {
            (Ok(key), Ok(value)) => (key, value),
            (Err(code), _) | (_, Err(code)) => return code,
        };
        FfiErrorCode::from_result(unsafe { &mut *s }.inner.add_header(key, value))
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Append `count` headers. The batch is rejected whole if it would exceed the
/// header limit or if any entry is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_add_headers(
    s: *mut FfiSandia,
    headers: *const FfiHeader,
    count: u32,
) -> FfiErrorCode {
    if s.is_null() {
        return FfiErrorCode::NullArg;
    }
    if count == 0 {
        return FfiErrorCode::Success;
    }
    if headers.is_null() {
        return FfiErrorCode::NullArg;
    }
    catch_unwind(|| {
        let raw = unsafe { std::slice::from_raw_parts(headers, count as usize) };
        let mut batch = Vec::with_capacity(raw.len());
        for h in raw {
            match unsafe { (str_arg(h.key), str_arg(h.value)) } {
                (Ok(key), Ok(value)) => batch.push(Header::new(key, value)),
                (Err(code), _) | (_, Err(code)) => return code,
            }
        }
        FfiErrorCode::from_result(unsafe { &mut *s }.inner.add_headers(&batch))
    })
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Build, send and receive one request.
///
/// `content` may be null when `content_length` is zero. Non-empty content is
/// sent for either mode; only POST adds `Content-Length`. Never returns null;
/// failures are reported in `FfiResponse::error`. Free the result with
/// `sandia_free_response`.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_forge_request(
    s: *mut FfiSandia,
    mode: FfiRequestMode,
    uri: *const c_char,
    content: *const u8,
    content_length: usize,
) -> *mut FfiResponse {
    catch_unwind(|| {
        if s.is_null() {
            return FfiResponse::error(FfiErrorCode::NullArg);
        }
        let uri = match unsafe { str_arg(uri) } {
            Ok(uri) => uri,
            Err(code) => return FfiResponse::error(code),
        };
        let body: &[u8] = if content_length == 0 {
            &[]
        } else if content.is_null() {
            return FfiResponse::error(FfiErrorCode::NullArg);
        } else {
            unsafe { std::slice::from_raw_parts(content, content_length) }
        };

        let method = Method::from(mode);
        let body = (method == Method::Post || !body.is_empty()).then_some(body);
        let response = unsafe { &mut *s }.inner.request(method, uri, body);
        FfiResponse::from_core(response)
    })
    .unwrap_or_else(|_| FfiResponse::error(FfiErrorCode::Panic))
}

#[unsafe(no_mangle)]
pub extern "C" fn sandia_get_request(s: *mut FfiSandia, uri: *const c_char) -> *mut FfiResponse {
    sandia_forge_request(s, FfiRequestMode::Get, uri, std::ptr::null(), 0)
}

#[unsafe(no_mangle)]
pub extern "C" fn sandia_post_request(
    s: *mut FfiSandia,
    uri: *const c_char,
    content: *const u8,
    content_size: usize,
) -> *mut FfiResponse {
    sandia_forge_request(s, FfiRequestMode::Post, uri, content, content_size)
}

/// Free a response returned by any request function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_free_response(response: *mut FfiResponse) {
    if response.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let response = unsafe { Box::from_raw(response) };
        if !response.body.is_null() && response.body_length > 0 {
            let body = std::ptr::slice_from_raw_parts_mut(response.body, response.body_length);
            drop(unsafe { Box::from_raw(body) });
        }
    });
}

// ---------------------------------------------------------------------------
// Version helpers
// ---------------------------------------------------------------------------

/// Static wire string for `version`. The pointer must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_version_to_string(version: FfiHttpVersion) -> *const c_char {
    version.as_cstr().as_ptr()
}

/// Parse a version string. Null or unrecognized input yields `Unknown`.
#[unsafe(no_mangle)]
pub extern "C" fn sandia_string_to_version(version: *const c_char) -> FfiHttpVersion {
    catch_unwind(|| match unsafe { str_arg(version) } {
        Ok(text) => HttpVersion::from(text).into(),
        Err(_) => FfiHttpVersion::Unknown,
    })
    .unwrap_or(FfiHttpVersion::Unknown)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
