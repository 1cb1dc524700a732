//! Scripted transports for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::rc::Rc;

use crate::connection::{Connect, Timeouts, Transport};

pub fn addr() -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080)
}

#[derive(Debug, Clone)]
enum ReadStep {
    Data(Vec<u8>),
    Interrupted,
    Reset,
    TimedOut,
}

/// Stream that replays a fixed read script and records every write.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStream {
    reads: VecDeque<ReadStep>,
    written: Rc<RefCell<Vec<u8>>>,
    write_limit: Option<usize>,
    fail_writes: bool,
    pending_error: bool,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, data: &[u8]) -> Self {
        self.reads.push_back(ReadStep::Data(data.to_vec()));
        self
    }

    pub fn interrupted(mut self) -> Self {
        self.reads.push_back(ReadStep::Interrupted);
        self
    }

    pub fn reset(mut self) -> Self {
        self.reads.push_back(ReadStep::Reset);
        self
    }

    pub fn timeout(mut self) -> Self {
        self.reads.push_back(ReadStep::TimedOut);
        self
    }

    pub fn write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    pub fn fail_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn pending_error(mut self) -> Self {
        self.pending_error = true;
        self
    }

    pub fn written(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.written)
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reads.pop_front() {
            None => Ok(0),
            Some(ReadStep::Interrupted) => Err(io::ErrorKind::Interrupted.into()),
            Some(ReadStep::Reset) => Err(io::ErrorKind::ConnectionReset.into()),
            Some(ReadStep::TimedOut) => Err(io::ErrorKind::WouldBlock.into()),
            Some(ReadStep::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.reads.push_front(ReadStep::Data(data.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        let n = self.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        self.written.borrow_mut().extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for ScriptedStream {
    fn take_error(&self) -> io::Result<Option<io::Error>> {
        if self.pending_error {
            return Ok(Some(io::ErrorKind::ConnectionReset.into()));
        }
        Ok(None)
    }
}

/// Hands out a fresh copy of its template stream on every connect.
#[derive(Debug, Default)]
pub struct ScriptedConnector {
    template: Option<ScriptedStream>,
    attempts: Cell<usize>,
    last_addr: Cell<Option<SocketAddrV4>>,
}

impl ScriptedConnector {
    pub fn new(template: ScriptedStream) -> Self {
        Self {
            template: Some(template),
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    pub fn last_addr(&self) -> Option<SocketAddrV4> {
        self.last_addr.get()
    }
}

impl Connect for ScriptedConnector {
    type Stream = ScriptedStream;

    fn connect(&self, addr: SocketAddrV4, _timeouts: &Timeouts) -> io::Result<ScriptedStream> {
        self.attempts.set(self.attempts.get() + 1);
        self.last_addr.set(Some(addr));
        self.template
            .clone()
            .ok_or_else(|| io::ErrorKind::ConnectionRefused.into())
    }
}
