//! Minimal blocking HTTP/1.x request engine.
//!
//! # Overview
//! Given a host and port, `Engine` resolves the host once, then for every
//! request opens a fresh TCP connection, writes the request line, headers and
//! body, and reads raw bytes until the peer closes the socket. The response
//! is returned unparsed; splitting status line, headers and body is the
//! caller's job.
//!
//! # Design
//! - `build_request` is pure, so the wire format is testable without I/O.
//! - Resolution and socket access sit behind the `Resolve` and `Connect`
//!   traits; `SystemResolver` and `TcpConnector` are the defaults.
//! - Failures are reported as a `Copy` `Error` kind inside `Response`;
//!   operating-system detail goes to the `log` facade.
//! - Everything is synchronous and single-threaded. There are no timeouts
//!   unless `EngineConfig` asks for them.

pub mod buffer;
pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod headers;
pub mod http;
pub mod request;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use buffer::{RequestBuffer, INITIAL_REQUEST_CAPACITY};
pub use config::EngineConfig;
pub use connection::{
    Connect, Connection, ConnectionState, TcpConnector, Timeouts, Transport,
    DEFAULT_RECEIVE_CHUNK_SIZE,
};
pub use engine::Engine;
pub use error::Error;
pub use headers::{Header, HeaderTable, MAX_HEADER_COUNT};
pub use http::{HttpVersion, Method, Response};
pub use request::build_request;
pub use resolver::{
    AddressPolicy, AddressResolver, Endpoint, Resolve, StaticResolver, SystemResolver,
};
