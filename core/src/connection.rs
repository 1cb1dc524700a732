//! One TCP connection with blocking send-all / receive-until-close loops.
//!
//! # Design
//! The socket is reached through two small traits: `Connect` opens a
//! stream and `Transport` is what the loops read and write. Production uses
//! `TcpConnector` and `std::net::TcpStream`; tests substitute scripted
//! streams.
//!
//! States: `Unconnected -> Connected -> Receiving -> PeerClosed`, with
//! `Closed` terminal. `open` may be called again from any non-closed state
//! and always performs a fresh connect. Receiving ends when the peer closes
//! its side, either cleanly or with a reset; both keep the bytes read so far.
//! There is no Content-Length based early exit, so a peer that keeps the
//! connection open blocks `receive_all` until the optional read timeout
//! fires, which is reported as `ReceiveFailed`.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, SocketAddrV4, TcpStream};
use std::time::Duration;

use crate::error::Error;

pub const DEFAULT_RECEIVE_CHUNK_SIZE: usize = 1024;

/// Byte stream the send and receive loops operate on.
pub trait Transport: Read + Write {
    /// Pending socket-level error, if any.
    fn take_error(&self) -> io::Result<Option<io::Error>> {
        Ok(None)
    }

    fn shutdown(&self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for TcpStream {
    fn take_error(&self) -> io::Result<Option<io::Error>> {
        TcpStream::take_error(self)
    }

    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Opens streams to resolved endpoints.
pub trait Connect {
    type Stream: Transport;

    fn connect(&self, addr: SocketAddrV4, timeouts: &Timeouts) -> io::Result<Self::Stream>;
}

/// Optional socket timeouts. All `None` means fully blocking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Option<Duration>,
    pub read: Option<Duration>,
    pub write: Option<Duration>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connect for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, addr: SocketAddrV4, timeouts: &Timeouts) -> io::Result<TcpStream> {
        let addr = SocketAddr::V4(addr);
        let stream = match timeouts.connect {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        stream.set_read_timeout(timeouts.read)?;
        stream.set_write_timeout(timeouts.write)?;
        Ok(stream)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected,
    Receiving,
    PeerClosed,
    Closed,
}

#[derive(Debug)]
pub struct Connection<S> {
    stream: Option<S>,
    state: ConnectionState,
    chunk_size: usize,
}

impl<S: Transport> Connection<S> {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            stream: None,
            state: ConnectionState::Unconnected,
            chunk_size,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) -> Result<(), Error> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig);
        }
        self.chunk_size = chunk_size;
        Ok(())
    }

    /// Connects to `addr`, replacing any stream left from a previous request.
    pub fn open<C>(
        &mut self,
        connector: &C,
        addr: SocketAddrV4,
        timeouts: &Timeouts,
    ) -> Result<(), Error>
    where
        C: Connect<Stream = S>,
    {
        if self.state == ConnectionState::Closed {
            return Err(Error::SocketNotReady);
        }
        self.stream = None;
        self.state = ConnectionState::Unconnected;

        log::debug!("connecting to {addr}");
        let stream = connector.connect(addr, timeouts).map_err(|err| {
            log::warn!("connect to {addr} failed: {err}");
            Error::ConnectionFailed
        })?;
        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Writes every byte of `bytes`, aborting on the first failed write.
    pub fn send_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let stream = match (self.state, self.stream.as_mut()) {
            (ConnectionState::Connected, Some(stream)) => stream,
            _ => return Err(Error::SocketNotReady),
        };

        let mut sent = 0;
        while sent < bytes.len() {
            match stream.write(&bytes[sent..]) {
                Ok(0) => {
                    log::warn!("socket accepted no bytes after {sent} of {}", bytes.len());
                    return Err(Error::SendFailed);
                }
                Ok(n) => sent += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    log::warn!("send failed after {sent} of {} bytes: {err}", bytes.len());
                    return Err(Error::SendFailed);
                }
            }
        }
        stream.flush().map_err(|err| {
            log::warn!("flush failed: {err}");
            Error::SendFailed
        })?;

        log::debug!("sent {sent} bytes");
        Ok(())
    }

    /// Reads until the peer closes the connection and returns every byte.
    pub fn receive_all(&mut self) -> Result<Vec<u8>, Error> {
        let stream = match (self.state, self.stream.as_mut()) {
            (ConnectionState::Connected, Some(stream)) => stream,
            _ => return Err(Error::SocketNotReady),
        };

        self.state = ConnectionState::Receiving;
        match read_to_close(stream, self.chunk_size) {
            Ok(received) => {
                log::debug!("received {} bytes before peer closed", received.len());
                self.state = ConnectionState::PeerClosed;
                Ok(received)
            }
            Err(err) => {
                self.stream = None;
                self.state = ConnectionState::Unconnected;
                Err(err)
            }
        }
    }

    /// True when a stream exists and the socket reports no pending error.
    pub fn is_connected(&self) -> bool {
        match &self.stream {
            Some(stream) => matches!(stream.take_error(), Ok(None)),
            None => false,
        }
    }

    /// Shuts down and releases the stream. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.shutdown() {
                log::trace!("shutdown on close: {err}");
            }
        }
        self.state = ConnectionState::Closed;
    }
}

fn read_to_close<S: Read>(stream: &mut S, chunk_size: usize) -> Result<Vec<u8>, Error> {
    let mut chunk = Vec::new();
    chunk.try_reserve_exact(chunk_size).map_err(|_| Error::AllocationFailed)?;
    chunk.resize(chunk_size, 0);

    let mut received = Vec::new();
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => return Ok(received),
            Ok(n) => {
                received.try_reserve(n).map_err(|err| {
                    log::warn!(
                        "response buffer growth past {} bytes failed: {err}",
                        received.len()
                    );
                    Error::AllocationFailed
                })?;
                received.extend_from_slice(&chunk[..n]);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if is_timeout(&err) => {
                log::warn!("receive timed out after {} bytes: {err}", received.len());
                return Err(Error::ReceiveFailed);
            }
            // A reset after the reply still delivered the reply.
            Err(err) => {
                log::debug!("read ended after {} bytes: {err}", received.len());
                return Ok(received);
            }
        }
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}
