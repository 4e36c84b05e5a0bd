//! ICMP echo prober.
//!
//! Sends a single echo request per address via `surge-ping`. Whether the
//! socket can be opened depends on privileges: root, `CAP_NET_RAW`, or a
//! kernel allowing unprivileged ICMP datagram sockets.

use crate::error::{ProbeError, ProbeResult};
use crate::scanner::traits::{ProbeMethod, ProbeOutcome, Prober};
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError};

/// Echo payload size, matching the classic `ping` default.
const PAYLOAD_SIZE: usize = 56;

/// ICMP echo prober.
pub struct IcmpProber {
    client: Client,
    payload: [u8; PAYLOAD_SIZE],
}

impl IcmpProber {
    /// Open the shared ICMP socket.
    pub fn new() -> ProbeResult<Self> {
        let client = Client::new(&Config::default()).map_err(|e| {
            ProbeError::Unavailable(format!("cannot open ICMP socket: {}", e))
        })?;

        Ok(Self {
            client,
            payload: [0u8; PAYLOAD_SIZE],
        })
    }
}

#[async_trait]
impl Prober for IcmpProber {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Icmp
    }

    fn requires_privileges(&self) -> bool {
        true
    }

    async fn probe(&self, ip: Ipv4Addr, timeout: Duration) -> ProbeResult<ProbeOutcome> {
        // A fresh identifier per probe keeps concurrent replies apart.
        let mut pinger = self
            .client
            .pinger(IpAddr::V4(ip), PingIdentifier(rand::random()))
            .await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &self.payload).await {
            Ok((_packet, rtt)) => Ok(ProbeOutcome::responded(rtt)),
            Err(SurgeError::Timeout { .. }) => Ok(ProbeOutcome::silent()),
            Err(e) => Err(ProbeError::Other(e.to_string())),
        }
    }
}
