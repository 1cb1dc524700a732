//! Per-engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration. Timeouts are absent by default: the engine blocks on
//! connect and on receive until the operating system or the peer ends the
//! operation.

use std::time::Duration;

use serde::Deserialize;

use crate::connection::{Timeouts, DEFAULT_RECEIVE_CHUNK_SIZE};
use crate::error::Error;
use crate::http::HttpVersion;
use crate::resolver::AddressPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub version: HttpVersion,
    pub receive_chunk_size: usize,
    pub address_policy: AddressPolicy,
    pub connect_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    pub write_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: HttpVersion::V1_1,
            receive_chunk_size: DEFAULT_RECEIVE_CHUNK_SIZE,
            address_policy: AddressPolicy::Last,
            connect_timeout_ms: None,
            read_timeout_ms: None,
            write_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let config: EngineConfig = serde_json::from_str(raw).map_err(|err| {
            log::warn!("engine config rejected: {err}");
            Error::InvalidConfig
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Chunk size must be non-zero; a zero timeout would make std reject the socket option.
    pub fn validate(&self) -> Result<(), Error> {
        if self.receive_chunk_size == 0 {
            return Err(Error::InvalidConfig);
        }
        let timeouts = [self.connect_timeout_ms, self.read_timeout_ms, self.write_timeout_ms];
        if timeouts.contains(&Some(0)) {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: self.connect_timeout_ms.map(Duration::from_millis),
            read: self.read_timeout_ms.map(Duration::from_millis),
            write: self.write_timeout_ms.map(Duration::from_millis),
        }
    }
}
