//! Ordered, capacity-bounded table of user headers.
//!
//! Insertion order is preserved and duplicate keys are kept; every entry is
//! emitted on the wire. The table never holds more than `MAX_HEADER_COUNT`
//! entries, and batch insertion is all-or-nothing: a batch that would cross
//! the limit is rejected before any entry is added.

use crate::error::Error;

pub const MAX_HEADER_COUNT: usize = 256;

/// A single header line, `key: value`. Both parts are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.key.is_empty() || self.value.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeaderTable {
    entries: Vec<Header>,
}

impl HeaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let header = Header::new(key, value);
        header.validate()?;
        if self.entries.len() >= MAX_HEADER_COUNT {
            return Err(Error::HeaderLimit);
        }
        self.entries.push(header);
        Ok(())
    }

    pub fn add_many(&mut self, headers: &[Header]) -> Result<(), Error> {
        if self.entries.len() + headers.len() > MAX_HEADER_COUNT {
            return Err(Error::HeaderLimit);
        }
        for header in headers {
            header.validate()?;
        }
        self.entries.extend_from_slice(headers);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a HeaderTable {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
