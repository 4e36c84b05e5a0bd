//! Error types for lanscout.
//!
//! Uses `thiserror` for ergonomic error definitions. Discovery errors are
//! fatal to a run; probe errors never leave the sweep engine.

use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while establishing the local network identity.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("cannot enumerate network interfaces: {0}")]
    Enumeration(String),

    #[error("cannot read addresses of interface {interface}: {reason}")]
    AddressLookup { interface: String, reason: String },

    #[error("outbound route probe failed: {0}")]
    RouteProbe(String),

    #[error("outbound address {outbound} and hostname lookup {lookup} do not match")]
    IdentityMismatch { outbound: Ipv4Addr, lookup: Ipv4Addr },

    #[error("subnet check failed: {0}")]
    SubnetShape(#[from] ShapeViolation),
}

/// The specific subnet sanity check that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeViolation {
    #[error("no IPv4 address with a prefix found on any primary interface")]
    NoPrimaryAddress,

    #[error("primary interface network {interface} does not match outbound address {outbound}")]
    NetworkMismatch {
        interface: Ipv4Network,
        outbound: Ipv4Addr,
    },

    #[error("primary interface network is /{0}, expected /24")]
    PrefixLength(u8),

    #[error("network {network} is outside the allowed range {allowed}")]
    OutsidePrivateRange {
        network: Ipv4Network,
        allowed: Ipv4Network,
    },
}

/// Errors reported by a single reachability probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,

    #[error("host unreachable: {0}")]
    Unreachable(String),

    #[error("prober unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("probe failed: {0}")]
    Other(String),
}

/// Errors loading or locating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),
}

/// Top-level error for command execution.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_violation_names_failed_check() {
        let err = DiscoveryError::from(ShapeViolation::PrefixLength(16));
        assert_eq!(
            err.to_string(),
            "subnet check failed: primary interface network is /16, expected /24"
        );
    }

    #[test]
    fn test_identity_mismatch_message() {
        let err = DiscoveryError::IdentityMismatch {
            outbound: Ipv4Addr::new(192, 168, 1, 50),
            lookup: Ipv4Addr::new(192, 168, 2, 7),
        };
        assert!(err.to_string().contains("192.168.1.50"));
        assert!(err.to_string().contains("192.168.2.7"));
    }
}
