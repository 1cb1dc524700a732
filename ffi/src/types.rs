//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with a C-compatible representation:
//! explicit enum discriminants, raw byte pointers instead of `Vec<u8>`, and
//! borrowed `*const c_char` pairs for headers supplied by the caller.
//! Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CStr;
use std::os::raw::c_char;

use sandia_core::{Engine, Error, HttpVersion, Method, Response};

/// Opaque handle to an `Engine`. C callers receive a pointer to this and
/// pass it back into every FFI function.
pub struct FfiSandia {
    pub(crate) inner: Engine,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Error codes. `Success` is zero so C callers can test with `!= 0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Success = 0,
    SocketCreation = 1,
    HostName = 2,
    HeaderLimit = 3,
    String = 4,
    SocketNotReady = 5,
    Connection = 6,
    Send = 7,
    Receive = 8,
    Allocation = 9,
    InvalidConfig = 10,
    NullArg = 11,
    Panic = 12,
}

impl From<Error> for FfiErrorCode {
    fn from(err: Error) -> Self {
        match err {
            Error::SocketCreationFailed => FfiErrorCode::SocketCreation,
            Error::HostResolutionFailed => FfiErrorCode::HostName,
            Error::HeaderLimit => FfiErrorCode::HeaderLimit,
            Error::EmptyInput => FfiErrorCode::String,
            Error::SocketNotReady => FfiErrorCode::SocketNotReady,
            Error::ConnectionFailed => FfiErrorCode::Connection,
            Error::SendFailed => FfiErrorCode::Send,
            Error::ReceiveFailed => FfiErrorCode::Receive,
            Error::AllocationFailed => FfiErrorCode::Allocation,
            Error::InvalidConfig => FfiErrorCode::InvalidConfig,
        }
    }
}

impl FfiErrorCode {
    pub(crate) fn from_result(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => FfiErrorCode::Success,
            Err(err) => err.into(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpVersion {
    Http09 = 0,
    Http10 = 1,
    Http11 = 2,
    Http20 = 3,
    Unknown = 4,
}

impl From<HttpVersion> for FfiHttpVersion {
    fn from(v: HttpVersion) -> Self {
        match v {
            HttpVersion::V0_9 => FfiHttpVersion::Http09,
            HttpVersion::V1_0 => FfiHttpVersion::Http10,
            HttpVersion::V1_1 => FfiHttpVersion::Http11,
            HttpVersion::V2_0 => FfiHttpVersion::Http20,
            HttpVersion::Unknown => FfiHttpVersion::Unknown,
        }
    }
}

impl From<FfiHttpVersion> for HttpVersion {
    fn from(v: FfiHttpVersion) -> Self {
        match v {
            FfiHttpVersion::Http09 => HttpVersion::V0_9,
            FfiHttpVersion::Http10 => HttpVersion::V1_0,
            FfiHttpVersion::Http11 => HttpVersion::V1_1,
            FfiHttpVersion::Http20 => HttpVersion::V2_0,
            FfiHttpVersion::Unknown => HttpVersion::Unknown,
        }
    }
}

impl FfiHttpVersion {
    /// Static, NUL-terminated wire form. `Unknown` maps to `HTTP/1.1`.
    pub(crate) fn as_cstr(self) -> &'static CStr {
        match self {
            FfiHttpVersion::Http09 => c"HTTP/0.9",
            FfiHttpVersion::Http10 => c"HTTP/1.0",
            FfiHttpVersion::Http20 => c"HTTP/2.0",
            FfiHttpVersion::Http11 | FfiHttpVersion::Unknown => c"HTTP/1.1",
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiRequestMode {
    Get = 0,
    Post = 1,
}

impl From<FfiRequestMode> for Method {
    fn from(mode: FfiRequestMode) -> Self {
        match mode {
            FfiRequestMode::Get => Method::Get,
            FfiRequestMode::Post => Method::Post,
        }
    }
}

// ---------------------------------------------------------------------------
// Headers (caller-provided, borrowed)
// ---------------------------------------------------------------------------

/// A header as two borrowed C strings. The FFI layer copies them and never
/// frees or retains the pointers.
#[repr(C)]
pub struct FfiHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Raw response bytes plus an error code.
///
/// `body` is null when `body_length` is zero. The caller owns the returned
/// pointer and must release it with `sandia_free_response`.
#[repr(C)]
pub struct FfiResponse {
    pub body: *mut u8,
    pub body_length: usize,
    pub error: FfiErrorCode,
}

impl FfiResponse {
    /// Convert a core `Response` into a heap-allocated `FfiResponse`.
    pub(crate) fn from_core(response: Response) -> *mut Self {
        let error = response.error.map_or(FfiErrorCode::Success, FfiErrorCode::from);
        let body_length = response.body.len();
        let body = if body_length == 0 {
            std::ptr::null_mut()
        } else {
            Box::into_raw(response.body.into_boxed_slice()) as *mut u8
        };
        Box::into_raw(Box::new(FfiResponse {
            body,
            body_length,
            error,
        }))
    }

    pub(crate) fn error(error: FfiErrorCode) -> *mut Self {
        Box::into_raw(Box::new(FfiResponse {
            body: std::ptr::null_mut(),
            body_length: 0,
            error,
        }))
    }
}
