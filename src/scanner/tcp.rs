//! TCP connect prober.
//!
//! Unprivileged fallback for hosts that do not answer ICMP or when no ICMP
//! socket can be opened. Connects to a handful of well-known ports; either
//! an accepted connection or a refusal (RST) proves the host is up.

use crate::error::{ProbeError, ProbeResult};
use crate::scanner::traits::{ProbeMethod, ProbeOutcome, Prober};
use async_trait::async_trait;
use futures::future::select_ok;
use std::io::{self, ErrorKind};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Ports tried when none are configured.
pub const DEFAULT_TCP_PORTS: &[u16] = &[22, 80, 443, 445];

/// TCP connect prober.
///
/// # Performance Characteristics
///
/// - **Reliability**: Medium - hosts with every probed port dropped look down
/// - **Speed**: Good - all ports are tried concurrently per host
/// - **Privileges**: None required
pub struct TcpProber {
    ports: Vec<u16>,
}

impl TcpProber {
    /// Create a prober trying `ports` on every host.
    pub fn new(ports: Vec<u16>) -> ProbeResult<Self> {
        if ports.is_empty() {
            return Err(ProbeError::Unavailable(
                "TCP prober needs at least one port".to_string(),
            ));
        }
        Ok(Self { ports })
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self {
            ports: DEFAULT_TCP_PORTS.to_vec(),
        }
    }
}

/// Attempt one connection; `Ok` means the host answered.
async fn attempt_connect(addr: SocketAddr, limit: Duration) -> ProbeResult<()> {
    match timeout(limit, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => classify_connect_error(e),
        Err(_) => Err(ProbeError::Timeout),
    }
}

/// A refusal proves the host is up; routing failures mean it is not.
fn classify_connect_error(e: io::Error) -> ProbeResult<()> {
    if e.kind() == ErrorKind::ConnectionRefused {
        return Ok(());
    }
    if is_unreachable(&e) {
        return Err(ProbeError::Unreachable(e.to_string()));
    }
    Err(ProbeError::Io(e))
}

#[cfg(unix)]
fn is_unreachable(e: &io::Error) -> bool {
    matches!(
        e.raw_os_error(),
        Some(libc::EHOSTUNREACH) | Some(libc::ENETUNREACH) | Some(libc::EHOSTDOWN)
    )
}

#[cfg(not(unix))]
fn is_unreachable(_e: &io::Error) -> bool {
    false
}

#[async_trait]
impl Prober for TcpProber {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Tcp
    }

    fn requires_privileges(&self) -> bool {
        false
    }

    async fn probe(&self, ip: Ipv4Addr, limit: Duration) -> ProbeResult<ProbeOutcome> {
        let start = Instant::now();
        let attempts = self
            .ports
            .iter()
            .map(|&port| SocketAddr::new(IpAddr::V4(ip), port))
            .map(|addr| Box::pin(attempt_connect(addr, limit)));

        match select_ok(attempts).await {
            Ok(_) => Ok(ProbeOutcome::responded(start.elapsed())),
            Err(ProbeError::Timeout) | Err(ProbeError::Unreachable(_)) => {
                Ok(ProbeOutcome::silent())
            }
            Err(e) => Err(e),
        }
    }
}
