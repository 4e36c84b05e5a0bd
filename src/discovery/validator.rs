//! Subnet Validator.
//!
//! Reconciles the outbound route, hostname lookup and primary interface into
//! one /24. Every check is a hard precondition: a wrong subnet would sweep
//! the wrong network, so nothing here guesses.

use super::identity::SelfIdentity;
use super::interfaces::PrimaryCandidate;
use crate::error::{DiscoveryError, DiscoveryResult, ShapeViolation};
use crate::types::SubnetIdentity;
use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;

/// Private class C block the validated network must fall in by default.
pub fn default_allowed_range() -> Ipv4Network {
    Ipv4Network::new(Ipv4Addr::new(192, 168, 0, 0), 16).expect("192.168.0.0/16 is a valid network")
}

/// Validate the three identity sources and derive the subnet to sweep.
///
/// Checks run in order and the first failure is returned:
/// 1. a trusted hostname lookup must equal the outbound address (an
///    untrusted one is replaced by the outbound address);
/// 2. the primary candidate must exist and share the first three octets
///    with the outbound address;
/// 3. the candidate prefix must be /24;
/// 4. the network must lie within `allowed`.
pub fn validate(
    identity: &SelfIdentity,
    candidate: Option<&PrimaryCandidate>,
    allowed: Ipv4Network,
) -> DiscoveryResult<SubnetIdentity> {
    let outbound = identity.outbound;

    match identity.lookup {
        Some(lookup) if identity.lookup_trusted && lookup != outbound => {
            return Err(DiscoveryError::IdentityMismatch { outbound, lookup });
        }
        _ if !identity.lookup_trusted => {
            tracing::debug!("hostname lookup untrusted, comparing against outbound {}", outbound);
        }
        _ => {}
    }

    let candidate = candidate.ok_or(ShapeViolation::NoPrimaryAddress)?;
    let network = candidate.network;

    if network.ip().octets()[..3] != outbound.octets()[..3] {
        return Err(ShapeViolation::NetworkMismatch {
            interface: network,
            outbound,
        }
        .into());
    }

    if network.prefix() != SubnetIdentity::PREFIX {
        return Err(ShapeViolation::PrefixLength(network.prefix()).into());
    }

    let subnet = SubnetIdentity::from_address(outbound);
    if allowed.prefix() > SubnetIdentity::PREFIX || !allowed.contains(subnet.base()) {
        return Err(ShapeViolation::OutsidePrivateRange {
            network: subnet.network(),
            allowed,
        }
        .into());
    }

    tracing::info!(interface = %candidate.interface, subnet = %subnet, "Sanity checks succeeded");
    Ok(subnet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn identity(outbound: &str, lookup: Option<&str>) -> SelfIdentity {
        let lookup = lookup.map(ip);
        SelfIdentity {
            outbound: ip(outbound),
            hostname: "box".to_string(),
            lookup,
            lookup_trusted: matches!(lookup, Some(l) if !l.is_loopback()),
        }
    }

    fn candidate(net: &str) -> PrimaryCandidate {
        PrimaryCandidate {
            interface: "eth0".to_string(),
            network: net.parse().unwrap(),
            alternatives: Vec::new(),
        }
    }

    #[test]
    fn test_matching_sources_succeed() {
        let subnet = validate(
            &identity("192.168.1.50", Some("192.168.1.50")),
            Some(&candidate("192.168.1.50/24")),
            default_allowed_range(),
        )
        .unwrap();

        assert_eq!(subnet.base(), ip("192.168.1.0"));
        assert_eq!(subnet.to_string(), "192.168.1.0/24");
    }

    #[test]
    fn test_loopback_lookup_is_substituted() {
        let result = validate(
            &identity("192.168.1.50", Some("127.0.1.1")),
            Some(&candidate("192.168.1.50/24")),
            default_allowed_range(),
        );
        assert_eq!(result.unwrap().base(), ip("192.168.1.0"));
    }

    #[test]
    fn test_failed_lookup_is_substituted() {
        let result = validate(
            &identity("192.168.1.50", None),
            Some(&candidate("192.168.1.50/24")),
            default_allowed_range(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_trusted_lookup_mismatch_is_fatal() {
        let result = validate(
            &identity("192.168.1.50", Some("192.168.1.51")),
            Some(&candidate("192.168.1.50/24")),
            default_allowed_range(),
        );
        assert!(matches!(
            result,
            Err(DiscoveryError::IdentityMismatch { outbound, lookup })
                if outbound == ip("192.168.1.50") && lookup == ip("192.168.1.51")
        ));
    }

    #[test]
    fn test_missing_primary_is_fatal() {
        let result = validate(&identity("192.168.1.50", None), None, default_allowed_range());
        assert!(matches!(
            result,
            Err(DiscoveryError::SubnetShape(ShapeViolation::NoPrimaryAddress))
        ));
    }

    #[test]
    fn test_network_mismatch_is_fatal() {
        let result = validate(
            &identity("192.168.1.50", None),
            Some(&candidate("192.168.2.50/24")),
            default_allowed_range(),
        );
        assert!(matches!(
            result,
            Err(DiscoveryError::SubnetShape(ShapeViolation::NetworkMismatch { .. }))
        ));
    }

    #[test]
    fn test_wrong_prefix_is_fatal_even_when_addresses_agree() {
        let result = validate(
            &identity("192.168.1.50", Some("192.168.1.50")),
            Some(&candidate("192.168.1.50/16")),
            default_allowed_range(),
        );
        assert!(matches!(
            result,
            Err(DiscoveryError::SubnetShape(ShapeViolation::PrefixLength(16)))
        ));
    }

    #[test]
    fn test_non_class_c_range_is_fatal() {
        let result = validate(
            &identity("10.0.0.5", Some("10.0.0.5")),
            Some(&candidate("10.0.0.5/24")),
            default_allowed_range(),
        );
        assert!(matches!(
            result,
            Err(DiscoveryError::SubnetShape(ShapeViolation::OutsidePrivateRange { .. }))
        ));
    }

    #[test]
    fn test_custom_allowed_range() {
        let allowed: Ipv4Network = "10.0.0.0/8".parse().unwrap();
        let subnet = validate(
            &identity("10.0.0.5", None),
            Some(&candidate("10.0.0.5/24")),
            allowed,
        )
        .unwrap();
        assert_eq!(subnet.to_string(), "10.0.0.0/24");
    }
}
