//! Plain-data HTTP types shared by the request builder and the engine.
//!
//! # Design
//! `HttpVersion` is a pure value with a total conversion from text: anything
//! unrecognized becomes `Unknown`, which serializes back as `HTTP/1.1`.
//! `Response` carries the raw bytes received after connect with no parsing
//! of status line or headers; splitting them is left to the caller.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// Request method supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// HTTP version written on the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum HttpVersion {
    V0_9,
    V1_0,
    #[default]
    V1_1,
    V2_0,
    Unknown,
}

impl HttpVersion {
    /// Wire form of the version. `Unknown` falls back to `HTTP/1.1`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::V0_9 => "HTTP/0.9",
            HttpVersion::V1_0 => "HTTP/1.0",
            HttpVersion::V2_0 => "HTTP/2.0",
            HttpVersion::V1_1 | HttpVersion::Unknown => "HTTP/1.1",
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HttpVersion {
    fn from(s: &str) -> Self {
        match s {
            "HTTP/0.9" => HttpVersion::V0_9,
            "HTTP/1.0" => HttpVersion::V1_0,
            "HTTP/1.1" => HttpVersion::V1_1,
            "HTTP/2.0" => HttpVersion::V2_0,
            _ => HttpVersion::Unknown,
        }
    }
}

impl From<String> for HttpVersion {
    fn from(s: String) -> Self {
        HttpVersion::from(s.as_str())
    }
}

impl FromStr for HttpVersion {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(HttpVersion::from(s))
    }
}

/// Outcome of one request: every byte read after connect, or the failure kind.
///
/// `body` is empty whenever `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub body: Vec<u8>,
    pub error: Option<Error>,
}

impl Response {
    pub fn ok(body: Vec<u8>) -> Self {
        Self { body, error: None }
    }

    pub fn failed(error: Error) -> Self {
        Self {
            body: Vec::new(),
            error: Some(error),
        }
    }

    pub fn body_length(&self) -> usize {
        self.body.len()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<u8>, Error> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.body),
        }
    }
}
