//! Prober trait abstraction.
//!
//! Defines the reachability-probe contract the sweep engine calls into,
//! so ICMP, TCP and test probers can be used interchangeably.

use crate::error::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Outcome of probing one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Whether the host answered within the timeout.
    pub responded: bool,
    /// Round-trip time, when the host answered.
    pub rtt: Option<Duration>,
}

impl ProbeOutcome {
    /// A response received after `rtt`.
    pub fn responded(rtt: Duration) -> Self {
        Self {
            responded: true,
            rtt: Some(rtt),
        }
    }

    /// No response within the timeout.
    pub fn silent() -> Self {
        Self {
            responded: false,
            rtt: None,
        }
    }
}

/// Available probe methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// ICMP echo request (needs root or unprivileged ICMP sockets).
    #[value(alias = "ping")]
    #[serde(alias = "ping")]
    Icmp,
    /// TCP connect to well-known ports (no special privileges required).
    #[value(alias = "connect")]
    #[serde(alias = "connect")]
    Tcp,
}

impl Default for ProbeMethod {
    fn default() -> Self {
        Self::Icmp
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Icmp => write!(f, "ICMP Echo"),
            Self::Tcp => write!(f, "TCP Connect"),
        }
    }
}

/// Trait for reachability probers.
///
/// `probe` should honour `timeout` itself; the sweep engine also bounds
/// each call, so a prober that overruns is recorded as unreachable.
///
/// # Example
///
/// ```ignore
/// use lanscout::scanner::{Prober, ProbeOutcome};
///
/// async fn is_up<P: Prober>(prober: &P, ip: Ipv4Addr) -> bool {
///     matches!(prober.probe(ip, Duration::from_millis(50)).await, Ok(o) if o.responded)
/// }
/// ```
#[async_trait]
pub trait Prober: Send + Sync {
    /// The probe method this prober implements.
    fn method(&self) -> ProbeMethod;

    /// Check if this prober requires elevated privileges.
    fn requires_privileges(&self) -> bool;

    /// Probe a single address.
    async fn probe(&self, ip: Ipv4Addr, timeout: Duration) -> ProbeResult<ProbeOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_method_display() {
        assert_eq!(ProbeMethod::Icmp.to_string(), "ICMP Echo");
        assert_eq!(ProbeMethod::Tcp.to_string(), "TCP Connect");
    }

    #[test]
    fn test_probe_method_value_aliases() {
        use clap::ValueEnum;

        assert_eq!(ProbeMethod::from_str("icmp", false).unwrap(), ProbeMethod::Icmp);
        assert_eq!(ProbeMethod::from_str("ping", false).unwrap(), ProbeMethod::Icmp);
        assert_eq!(ProbeMethod::from_str("connect", false).unwrap(), ProbeMethod::Tcp);
        assert!(ProbeMethod::from_str("arp", false).is_err());
    }

    #[test]
    fn test_probe_method_serde_aliases() {
        let method: ProbeMethod = serde_json::from_str("\"ping\"").unwrap();
        assert_eq!(method, ProbeMethod::Icmp);
        let method: ProbeMethod = serde_json::from_str("\"connect\"").unwrap();
        assert_eq!(method, ProbeMethod::Tcp);
        assert_eq!(serde_json::to_string(&ProbeMethod::Tcp).unwrap(), "\"tcp\"");
    }

    #[test]
    fn test_probe_outcome() {
        let up = ProbeOutcome::responded(Duration::from_millis(3));
        assert!(up.responded);
        assert_eq!(up.rtt, Some(Duration::from_millis(3)));

        let down = ProbeOutcome::silent();
        assert!(!down.responded);
        assert_eq!(down.rtt, None);
    }
}
