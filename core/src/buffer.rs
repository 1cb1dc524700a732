//! Append-only byte buffer used to assemble a wire-format request.
//!
//! Growth is exact-fit: when an append does not fit, the buffer reserves
//! room for precisely the new length plus one byte. Requests are a request
//! line and a few headers, so the repeated reallocations stay cheap and the
//! footprint stays minimal.

use crate::error::Error;

pub const INITIAL_REQUEST_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct RequestBuffer {
    bytes: Vec<u8>,
}

impl RequestBuffer {
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(INITIAL_REQUEST_CAPACITY),
        }
    }

    /// Appends `data`, growing the buffer if needed.
    ///
    /// Empty input is a caller error and leaves the buffer untouched.
    pub fn append(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.bytes.len() + data.len() > self.bytes.capacity() {
            let target = self.bytes.len() + data.len() + 1;
            self.bytes.try_reserve_exact(data.len() + 1).map_err(|err| {
                log::warn!("request buffer growth to {target} bytes failed: {err}");
                Error::AllocationFailed
            })?;
        }
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    pub fn append_str(&mut self, s: &str) -> Result<(), Error> {
        self.append(s.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for RequestBuffer {
    fn default() -> Self {
        Self::new()
    }
}
