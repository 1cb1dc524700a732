//! Host name resolution and endpoint construction.
//!
//! # Design
//! Resolution sits behind the `Resolve` trait so the engine can run against
//! a fixed table in tests. When a host yields several IPv4 addresses the
//! choice is an explicit `AddressPolicy`; the default keeps the **last**
//! candidate, which is what the C library this engine replaces ended up
//! connecting to.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs};

use serde::Deserialize;

use crate::error::Error;

/// Source of IPv4 addresses for a host name.
pub trait Resolve {
    /// Returns every IPv4 address for `host`, in resolver order.
    fn resolve(&self, host: &str) -> io::Result<Vec<Ipv4Addr>>;
}

/// Resolves through the operating system (`getaddrinfo` via std).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve(&self, host: &str) -> io::Result<Vec<Ipv4Addr>> {
        let addrs = (host, 0).to_socket_addrs()?;
        Ok(addrs
            .filter_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(*v4.ip()),
                SocketAddr::V6(_) => None,
            })
            .collect())
    }
}

/// Fixed host table, for tests and for hosts pinned by configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: Vec<(String, Vec<Ipv4Addr>)>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: &str, addrs: &[Ipv4Addr]) -> Self {
        self.entries.push((host.to_string(), addrs.to_vec()));
        self
    }
}

impl Resolve for StaticResolver {
    fn resolve(&self, host: &str) -> io::Result<Vec<Ipv4Addr>> {
        self.entries
            .iter()
            .find(|(name, _)| name == host)
            .map(|(_, addrs)| addrs.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("unknown host {host}")))
    }
}

/// Which address to use when a host resolves to more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressPolicy {
    First,
    #[default]
    Last,
}

impl AddressPolicy {
    pub fn pick(&self, addrs: &[Ipv4Addr]) -> Option<Ipv4Addr> {
        match self {
            AddressPolicy::First => addrs.first().copied(),
            AddressPolicy::Last => addrs.last().copied(),
        }
    }
}

/// Resolved, connectable destination. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    ip: Ipv4Addr,
    port: u16,
}

impl Endpoint {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip, self.port)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddressResolver<R = SystemResolver> {
    resolver: R,
    policy: AddressPolicy,
}

impl<R: Resolve> AddressResolver<R> {
    pub fn new(resolver: R, policy: AddressPolicy) -> Self {
        Self { resolver, policy }
    }

    pub fn resolve(&self, host: &str) -> Result<Ipv4Addr, Error> {
        let addrs = self.resolver.resolve(host).map_err(|err| {
            log::warn!("resolving {host} failed: {err}");
            Error::HostResolutionFailed
        })?;
        let ip = self.policy.pick(&addrs).ok_or_else(|| {
            log::warn!("{host} has no IPv4 address");
            Error::HostResolutionFailed
        })?;
        log::debug!(
            "resolved {host} to {ip} ({} candidates, {:?} policy)",
            addrs.len(),
            self.policy
        );
        Ok(ip)
    }

    pub fn endpoint(&self, host: &str, port: u16) -> Result<Endpoint, Error> {
        let ip = self.resolve(host)?;
        Ok(Endpoint {
            host: host.to_string(),
            ip,
            port,
        })
    }
}
