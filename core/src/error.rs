//! Error kinds for the request engine.
//!
//! # Design
//! Every failure collapses into one `Copy` kind. The underlying
//! `std::io::Error` is logged where it happens; only the kind travels back
//! through `Response` and across the C boundary, so callers can compare and
//! store it freely.

use std::fmt;

/// Errors reported by the engine and its building blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The engine could not set up a socket for the configured endpoint.
    SocketCreationFailed,

    /// The host name did not resolve to any IPv4 address.
    HostResolutionFailed,

    /// The header table already holds `MAX_HEADER_COUNT` entries.
    HeaderLimit,

    /// An empty string or byte slice was passed where content is required.
    EmptyInput,

    /// A request was issued on an engine whose setup failed or that was closed.
    SocketNotReady,

    /// The TCP connect to the resolved endpoint failed.
    ConnectionFailed,

    /// Writing the request to the socket failed.
    SendFailed,

    /// Reading the response from the socket failed.
    ReceiveFailed,

    /// Growing a request or response buffer failed.
    AllocationFailed,

    /// A configuration document could not be parsed or holds invalid values.
    InvalidConfig,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::SocketCreationFailed => "failed to create socket",
            Error::HostResolutionFailed => "failed to resolve host name",
            Error::HeaderLimit => "header limit reached",
            Error::EmptyInput => "empty input",
            Error::SocketNotReady => "socket not ready",
            Error::ConnectionFailed => "failed to connect",
            Error::SendFailed => "failed to send request",
            Error::ReceiveFailed => "failed to receive response",
            Error::AllocationFailed => "buffer allocation failed",
            Error::InvalidConfig => "invalid configuration",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}
