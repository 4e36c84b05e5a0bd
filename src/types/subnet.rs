//! Validated /24 subnet identity.

use ipnetwork::Ipv4Network;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;

/// First host octet probed in a /24.
pub const FIRST_HOST: u8 = 1;
/// Last host octet probed in a /24.
pub const LAST_HOST: u8 = 254;

/// A /24 IPv4 network derived from the local host address.
///
/// Only the Subnet Validator constructs these for a run; the host octet of
/// `base` is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubnetIdentity {
    base: Ipv4Addr,
    local: Ipv4Addr,
}

impl SubnetIdentity {
    /// Prefix length of every subnet this crate works with.
    pub const PREFIX: u8 = 24;

    /// The /24 containing `local`.
    pub fn from_address(local: Ipv4Addr) -> Self {
        let [a, b, c, _] = local.octets();
        Self {
            base: Ipv4Addr::new(a, b, c, 0),
            local,
        }
    }

    /// Network base address (`a.b.c.0`).
    pub fn base(&self) -> Ipv4Addr {
        self.base
    }

    /// The local address this subnet was derived from.
    pub fn local(&self) -> Ipv4Addr {
        self.local
    }

    /// Host octet of the local address.
    pub fn local_octet(&self) -> u8 {
        self.local.octets()[3]
    }

    pub fn network(&self) -> Ipv4Network {
        Ipv4Network::new(self.base, Self::PREFIX).expect("/24 is always a valid prefix")
    }

    /// Address with the last octet replaced by `octet`.
    ///
    /// Returns `None` for the network (0) and broadcast (255) octets.
    pub fn host(&self, octet: u8) -> Option<Ipv4Addr> {
        if !(FIRST_HOST..=LAST_HOST).contains(&octet) {
            return None;
        }
        let [a, b, c, _] = self.base.octets();
        Some(Ipv4Addr::new(a, b, c, octet))
    }

    /// All probeable hosts as `(octet, address)` pairs, in ascending order.
    pub fn hosts(&self) -> impl Iterator<Item = (u8, Ipv4Addr)> + '_ {
        (FIRST_HOST..=LAST_HOST).filter_map(move |octet| self.host(octet).map(|ip| (octet, ip)))
    }
}

impl fmt::Display for SubnetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, Self::PREFIX)
    }
}

impl Serialize for SubnetIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SubnetIdentity", 3)?;
        state.serialize_field("network", &self.to_string())?;
        state.serialize_field("base", &self.base)?;
        state.serialize_field("local", &self.local)?;
        state.end()
    }
}
