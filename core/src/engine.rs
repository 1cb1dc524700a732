//! Request engine: resolve once, then connect, build, send and receive per call.
//!
//! # Design
//! `Engine` owns its endpoint, header table and connection. Construction
//! never fails outright: a resolution failure is recorded in `last_error`
//! and `is_valid()` turns false, after which every request returns
//! `SocketNotReady` without touching the network. Each request performs a
//! fresh connect and rebuilds the request bytes from scratch; the engine
//! always sends `Connection: close` so the peer ends the response by
//! closing the socket.

use std::fmt;

use crate::config::EngineConfig;
use crate::connection::{Connect, Connection, TcpConnector, Timeouts};
use crate::error::Error;
use crate::headers::{Header, HeaderTable};
use crate::http::{HttpVersion, Method, Response};
use crate::request::build_request;
use crate::resolver::{AddressResolver, Endpoint, Resolve, SystemResolver};

pub struct Engine<R = SystemResolver, C = TcpConnector>
where
    C: Connect,
{
    host: String,
    port: u16,
    resolver: AddressResolver<R>,
    connector: C,
    endpoint: Option<Endpoint>,
    connection: Connection<C::Stream>,
    headers: HeaderTable,
    version: HttpVersion,
    timeouts: Timeouts,
    last_error: Option<Error>,
    is_valid: bool,
}

impl Engine {
    /// Creates an engine for `host:port` using the system resolver and plain TCP.
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_config(host, port, EngineConfig::default())
    }

    pub fn with_config(host: &str, port: u16, config: EngineConfig) -> Self {
        Self::with_parts(host, port, config, SystemResolver, TcpConnector)
    }
}

impl<R: Resolve, C: Connect> Engine<R, C> {
    pub fn with_parts(
        host: &str,
        port: u16,
        config: EngineConfig,
        resolver: R,
        connector: C,
    ) -> Self {
        let mut engine = Self {
            host: host.to_string(),
            port,
            resolver: AddressResolver::new(resolver, config.address_policy),
            connector,
            endpoint: None,
            connection: Connection::new(config.receive_chunk_size),
            headers: HeaderTable::new(),
            version: config.version,
            timeouts: config.timeouts(),
            last_error: None,
            is_valid: false,
        };

        match config.validate().and_then(|()| engine.setup()) {
            Ok(endpoint) => {
                engine.endpoint = Some(endpoint);
                engine.is_valid = true;
            }
            Err(err) => {
                log::warn!("engine for {host}:{port} is not usable: {err}");
                engine.last_error = Some(err);
            }
        }
        engine
    }

    fn setup(&self) -> Result<Endpoint, Error> {
        if self.port == 0 {
            return Err(Error::SocketCreationFailed);
        }
        self.resolver.endpoint(&self.host, self.port)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn set_version(&mut self, version: HttpVersion) {
        self.version = version;
    }

    pub fn receive_chunk_size(&self) -> usize {
        self.connection.chunk_size()
    }

    pub fn set_receive_chunk_size(&mut self, chunk_size: usize) -> Result<(), Error> {
        self.connection.set_chunk_size(chunk_size)
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn add_header(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.headers.add(key, value).inspect_err(|err| self.last_error = Some(*err))
    }

    pub fn add_headers(&mut self, headers: &[Header]) -> Result<(), Error> {
        self.headers.add_many(headers).inspect_err(|err| self.last_error = Some(*err))
    }

    pub fn get(&mut self, uri: &str) -> Response {
        self.request(Method::Get, uri, None)
    }

    pub fn post(&mut self, uri: &str, body: &[u8]) -> Response {
        self.request(Method::Post, uri, Some(body))
    }

    /// Runs one request and returns the raw bytes the peer sent before closing.
    pub fn request(&mut self, method: Method, uri: &str, body: Option<&[u8]>) -> Response {
        match self.execute(method, uri, body) {
            Ok(received) => Response::ok(received),
            Err(err) => {
                log::debug!("{} {uri} failed: {err}", method.as_str());
                self.last_error = Some(err);
                Response::failed(err)
            }
        }
    }

    fn execute(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<&[u8]>,
    ) -> Result<Vec<u8>, Error> {
        let addr = match (&self.endpoint, self.is_valid) {
            (Some(endpoint), true) => endpoint.socket_addr(),
            _ => return Err(Error::SocketNotReady),
        };

        self.connection.open(&self.connector, addr, &self.timeouts)?;
        let request = build_request(method, &self.host, uri, self.version, &self.headers, body)?;
        self.connection.send_all(request.as_bytes())?;
        self.connection.receive_all()
    }

    /// Socket error state of the most recent connection.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Releases the socket, headers and endpoint. Safe to call more than once;
    /// requests after close return `SocketNotReady`.
    pub fn close(&mut self) {
        self.connection.close();
        self.headers.clear();
        self.endpoint = None;
        self.is_valid = false;
    }
}

impl<R, C: Connect> fmt::Debug for Engine<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("endpoint", &self.endpoint)
            .field("headers", &self.headers.len())
            .field("version", &self.version)
            .field("last_error", &self.last_error)
            .field("is_valid", &self.is_valid)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use super::*;
    use crate::headers::MAX_HEADER_COUNT;
    use crate::resolver::StaticResolver;
    use crate::testing::{ScriptedConnector, ScriptedStream};

    const IP: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 10);

    fn resolver() -> StaticResolver {
        StaticResolver::new().with_host("example.test", &[Ipv4Addr::new(192, 0, 2, 9), IP])
    }

    fn engine(stream: ScriptedStream) -> Engine<StaticResolver, ScriptedConnector> {
        Engine::with_parts(
            "example.test",
            80,
            EngineConfig::default(),
            resolver(),
            ScriptedConnector::new(stream),
        )
    }

    fn sent_text(stream: &ScriptedStream) -> String {
        String::from_utf8(stream.written().borrow().clone()).unwrap()
    }

    #[test]
    fn get_returns_everything_received() {
        let mut engine = engine(ScriptedStream::new().reply(b"pong"));
        let response = engine.get("/x");
        assert_eq!(response, Response::ok(b"pong".to_vec()));
        assert_eq!(response.body_length(), 4);
    }

    #[test]
    fn construction_resolves_with_last_address_policy() {
        let engine = engine(ScriptedStream::new());
        assert!(engine.is_valid());
        assert_eq!(engine.last_error(), None);
        assert_eq!(engine.endpoint().unwrap().socket_addr(), SocketAddrV4::new(IP, 80));
    }

    #[test]
    fn unresolvable_host_never_connects() {
        let mut engine = Engine::with_parts(
            "missing.test",
            80,
            EngineConfig::default(),
            resolver(),
            ScriptedConnector::new(ScriptedStream::new()),
        );
        assert!(!engine.is_valid());
        assert_eq!(engine.last_error(), Some(Error::HostResolutionFailed));

        let response = engine.get("/");
        assert_eq!(response.error, Some(Error::SocketNotReady));
        assert_eq!(engine.connector().attempts(), 0);
    }

    #[test]
    fn port_zero_is_a_setup_failure() {
        let engine = Engine::with_parts(
            "example.test",
            0,
            EngineConfig::default(),
            resolver(),
            ScriptedConnector::refusing(),
        );
        assert!(!engine.is_valid());
        assert_eq!(engine.last_error(), Some(Error::SocketCreationFailed));
    }

    #[test]
    fn invalid_config_is_a_setup_failure() {
        let config = EngineConfig {
            receive_chunk_size: 0,
            ..EngineConfig::default()
        };
        let engine = Engine::with_parts(
            "example.test",
            80,
            config,
            resolver(),
            ScriptedConnector::refusing(),
        );
        assert!(!engine.is_valid());
        assert_eq!(engine.last_error(), Some(Error::InvalidConfig));
    }

    #[test]
    fn each_request_reconnects() {
        let mut engine = engine(ScriptedStream::new().reply(b"ok"));
        assert!(engine.get("/a").is_ok());
        assert!(engine.get("/b").is_ok());
        assert_eq!(engine.connector().attempts(), 2);
        assert_eq!(engine.connector().last_addr(), Some(SocketAddrV4::new(IP, 80)));
    }

    #[test]
    fn connect_failure_is_reported() {
        let mut engine = Engine::with_parts(
            "example.test",
            80,
            EngineConfig::default(),
            resolver(),
            ScriptedConnector::refusing(),
        );
        assert_eq!(engine.get("/").error, Some(Error::ConnectionFailed));
        assert_eq!(engine.last_error(), Some(Error::ConnectionFailed));
    }

    #[test]
    fn send_and_receive_failures_are_reported() {
        let mut failing_send = engine(ScriptedStream::new().fail_writes());
        assert_eq!(failing_send.get("/").error, Some(Error::SendFailed));

        let mut timed_out = engine(ScriptedStream::new().reply(b"HTTP/1.1").timeout());
        assert_eq!(timed_out.get("/").error, Some(Error::ReceiveFailed));
        assert_eq!(timed_out.last_error(), Some(Error::ReceiveFailed));
    }

    #[test]
    fn reply_before_reset_is_returned() {
        let mut engine = engine(ScriptedStream::new().reply(b"pong").reset());
        let response = engine.get("/");
        assert_eq!(response, Response::ok(b"pong".to_vec()));
        assert_eq!(engine.last_error(), None);
    }

    #[test]
    fn post_writes_length_headers_and_body() {
        let stream = ScriptedStream::new().reply(b"created");
        let sent = stream.clone();
        let mut engine = engine(stream);
        engine.add_header("X-Trace", "1").unwrap();

        let response = engine.post("/items", b"abc");
        assert_eq!(response.body, b"created");
        assert_eq!(
            sent_text(&sent),
            "POST /items HTTP/1.1\r\nHost: example.test\r\nConnection: close\r\n\
             Content-Length: 3\r\nX-Trace: 1\r\n\r\nabc"
        );
    }

    #[test]
    fn version_setting_changes_request_line() {
        let stream = ScriptedStream::new();
        let sent = stream.clone();
        let mut engine = engine(stream);
        engine.set_version(HttpVersion::V1_0);
        engine.get("");
        assert!(sent_text(&sent).starts_with("GET / HTTP/1.0\r\n"));
    }

    #[test]
    fn empty_response_is_success() {
        let mut engine = engine(ScriptedStream::new());
        let response = engine.get("/");
        assert_eq!(response, Response::ok(Vec::new()));
    }

    #[test]
    fn header_limit_is_surfaced_and_recorded() {
        let mut engine = engine(ScriptedStream::new());
        for i in 0..MAX_HEADER_COUNT {
            engine.add_header(&format!("X-{i}"), "v").unwrap();
        }
        assert_eq!(engine.add_header("X-Over", "v"), Err(Error::HeaderLimit));
        assert_eq!(engine.add_headers(&[Header::new("A", "b")]), Err(Error::HeaderLimit));
        assert_eq!(engine.header_count(), MAX_HEADER_COUNT);
        assert_eq!(engine.last_error(), Some(Error::HeaderLimit));
    }

    #[test]
    fn mandatory_headers_do_not_consume_table_slots() {
        let mut engine = engine(ScriptedStream::new());
        engine.post("/", b"x");
        engine.get("/");
        assert_eq!(engine.header_count(), 0);
    }

    #[test]
    fn close_is_idempotent_and_disables_requests() {
        let mut engine = engine(ScriptedStream::new().reply(b"ok"));
        engine.add_header("A", "b").unwrap();
        engine.close();
        engine.close();

        assert!(!engine.is_valid());
        assert!(!engine.is_connected());
        assert_eq!(engine.header_count(), 0);
        assert_eq!(engine.get("/").error, Some(Error::SocketNotReady));
        assert_eq!(engine.connector().attempts(), 0);
    }

    #[test]
    fn receive_chunk_size_is_adjustable() {
        let mut engine = engine(ScriptedStream::new().reply(b"abcdefgh"));
        engine.set_receive_chunk_size(3).unwrap();
        assert_eq!(engine.receive_chunk_size(), 3);
        assert_eq!(engine.set_receive_chunk_size(0), Err(Error::InvalidConfig));
        assert_eq!(engine.get("/").body, b"abcdefgh");
    }
}
