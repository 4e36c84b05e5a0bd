//! Self-Identity Resolver.
//!
//! Two independent probes of the machine's LAN-facing IPv4 address:
//!
//! 1. **Outbound route**: a UDP socket is connected (no datagram is sent)
//!    toward an external address and the OS-chosen local endpoint is read.
//! 2. **Hostname lookup**: the configured hostname is resolved and the first
//!    IPv4 result taken. Hosts files often map the hostname to 127.x, so a
//!    loopback result is reported as untrusted.

use crate::error::{DiscoveryError, DiscoveryResult};
use async_trait::async_trait;
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use trust_dns_resolver::TokioAsyncResolver;

/// Default destination for the outbound-route probe.
pub const DEFAULT_ROUTE_TARGET: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Result of resolving the local hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostnameLookup {
    pub hostname: String,
    /// First IPv4 result, `None` if resolution failed or returned no IPv4.
    pub address: Option<Ipv4Addr>,
}

/// The machine's own address as seen by both probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfIdentity {
    pub outbound: Ipv4Addr,
    pub hostname: String,
    pub lookup: Option<Ipv4Addr>,
    /// False when the lookup failed or landed in 127.0.0.0/8.
    pub lookup_trusted: bool,
}

impl SelfIdentity {
    pub fn new(outbound: Ipv4Addr, lookup: HostnameLookup) -> Self {
        let lookup_trusted = matches!(lookup.address, Some(ip) if !ip.is_loopback());
        Self {
            outbound,
            hostname: lookup.hostname,
            lookup: lookup.address,
            lookup_trusted,
        }
    }
}

/// Provider of the two identity probes.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    /// Local address the OS routes outbound traffic from.
    async fn outbound_address(&self) -> DiscoveryResult<Ipv4Addr>;

    /// Resolve the machine's own hostname. Failures are not fatal and are
    /// reported as a lookup without an address.
    async fn hostname_address(&self) -> HostnameLookup;
}

/// Identity probes against the live system.
#[derive(Debug, Clone)]
pub struct SystemIdentity {
    route_target: SocketAddr,
}

impl SystemIdentity {
    pub fn new(route_target: SocketAddr) -> Self {
        Self { route_target }
    }
}

impl Default for SystemIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_TARGET)
    }
}

#[async_trait]
impl IdentitySource for SystemIdentity {
    async fn outbound_address(&self) -> DiscoveryResult<Ipv4Addr> {
        let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
            .await
            .map_err(|e| DiscoveryError::RouteProbe(format!("bind failed: {}", e)))?;

        socket.connect(self.route_target).await.map_err(|e| {
            DiscoveryError::RouteProbe(format!("no route to {}: {}", self.route_target, e))
        })?;

        let local = socket
            .local_addr()
            .map_err(|e| DiscoveryError::RouteProbe(format!("local address unavailable: {}", e)))?;

        match local.ip() {
            IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
            other => Err(DiscoveryError::RouteProbe(format!(
                "OS chose unusable local address {}",
                other
            ))),
        }
    }

    async fn hostname_address(&self) -> HostnameLookup {
        let hostname = match hostname::get() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(e) => {
                tracing::warn!("cannot read hostname: {}", e);
                return HostnameLookup {
                    hostname: String::new(),
                    address: None,
                };
            }
        };

        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                tracing::warn!("cannot load resolver configuration: {}", e);
                return HostnameLookup {
                    hostname,
                    address: None,
                };
            }
        };

        let address = match resolver.lookup_ip(hostname.as_str()).await {
            Ok(response) => response.iter().find_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            }),
            Err(e) => {
                tracing::warn!(%hostname, "hostname lookup failed: {}", e);
                None
            }
        };

        HostnameLookup { hostname, address }
    }
}

/// Run both probes concurrently and combine them.
///
/// Only the outbound probe can fail the run.
pub async fn resolve_identity<S>(source: &S) -> DiscoveryResult<SelfIdentity>
where
    S: IdentitySource + ?Sized,
{
    let (outbound, lookup) = tokio::join!(source.outbound_address(), source.hostname_address());
    let identity = SelfIdentity::new(outbound?, lookup);

    tracing::info!("Outbound (UDP route): {}", identity.outbound);
    match identity.lookup {
        Some(ip) if identity.lookup_trusted => {
            tracing::info!("Lookup ({}): {}", identity.hostname, ip)
        }
        Some(ip) => tracing::warn!("Lookup ({}): {} (lookup failed)", identity.hostname, ip),
        None => tracing::warn!("Lookup ({}): no IPv4 address (lookup failed)", identity.hostname),
    }

    Ok(identity)
}
