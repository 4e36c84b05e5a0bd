//! Interface Inspector.
//!
//! Enumerates local interfaces, classifies them by name and extracts the
//! primary adapter's IPv4/prefix candidate.

use crate::error::{DiscoveryError, DiscoveryResult};
use ipnetwork::{IpNetwork, Ipv4Network};
use pnet::datalink;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;

/// Classification of an interface by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Loopback,
    Primary,
    Other,
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loopback => write!(f, "loopback"),
            Self::Primary => write!(f, "primary"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// An address assigned to an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterfaceAddress {
    pub ip: IpAddr,
    pub prefix: Option<u8>,
}

impl InterfaceAddress {
    pub fn new(ip: IpAddr, prefix: Option<u8>) -> Self {
        Self { ip, prefix }
    }

    /// The address as an IPv4 network, if it is IPv4 and carries a prefix.
    pub fn ipv4_network(&self) -> Option<Ipv4Network> {
        match (self.ip, self.prefix) {
            (IpAddr::V4(ip), Some(prefix)) => Ipv4Network::new(ip, prefix).ok(),
            _ => None,
        }
    }
}

impl From<IpNetwork> for InterfaceAddress {
    fn from(net: IpNetwork) -> Self {
        Self::new(net.ip(), Some(net.prefix()))
    }
}

impl fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{}/{}", self.ip, prefix),
            None => write!(f, "{}", self.ip),
        }
    }
}

/// A local network interface and its addresses, in OS-reported order.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkInterface {
    pub name: String,
    pub addresses: Vec<InterfaceAddress>,
    pub kind: InterfaceKind,
}

/// Name sets used to classify interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceNames {
    pub primary: Vec<String>,
    pub loopback: Vec<String>,
}

impl InterfaceNames {
    pub fn classify(&self, name: &str) -> InterfaceKind {
        if self.loopback.iter().any(|n| n == name) {
            InterfaceKind::Loopback
        } else if self.primary.iter().any(|n| n == name) {
            InterfaceKind::Primary
        } else {
            InterfaceKind::Other
        }
    }
}

impl Default for InterfaceNames {
    fn default() -> Self {
        Self {
            primary: vec!["en0".to_string(), "eth0".to_string()],
            loopback: vec!["lo0".to_string(), "lo".to_string()],
        }
    }
}

/// Policy for choosing among several primary-interface candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// First candidate in enumeration order.
    First,
    /// Last candidate in enumeration order.
    Last,
    /// Longest prefix; earliest wins among equals.
    MostSpecific,
}

impl Default for TieBreak {
    fn default() -> Self {
        Self::First
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Last => write!(f, "last"),
            Self::MostSpecific => write!(f, "most-specific"),
        }
    }
}

/// Source of interface information.
///
/// The system implementation reads the OS tables; tests supply fixed data.
pub trait InterfaceSource {
    /// Names of all interfaces, in OS order.
    fn list_interfaces(&self) -> DiscoveryResult<Vec<String>>;

    /// Addresses assigned to the named interface.
    fn addresses_of(&self, name: &str) -> DiscoveryResult<Vec<InterfaceAddress>>;
}

/// Interfaces as reported by the operating system.
///
/// The table is read once at construction so repeated queries agree.
pub struct SystemInterfaces {
    snapshot: Vec<datalink::NetworkInterface>,
}

impl SystemInterfaces {
    pub fn new() -> Self {
        Self {
            snapshot: datalink::interfaces(),
        }
    }
}

impl Default for SystemInterfaces {
    fn default() -> Self {
        Self::new()
    }
}

impl InterfaceSource for SystemInterfaces {
    fn list_interfaces(&self) -> DiscoveryResult<Vec<String>> {
        if self.snapshot.is_empty() {
            return Err(DiscoveryError::Enumeration(
                "operating system reported no interfaces".to_string(),
            ));
        }
        Ok(self.snapshot.iter().map(|iface| iface.name.clone()).collect())
    }

    fn addresses_of(&self, name: &str) -> DiscoveryResult<Vec<InterfaceAddress>> {
        self.snapshot
            .iter()
            .find(|iface| iface.name == name)
            .map(|iface| iface.ips.iter().copied().map(InterfaceAddress::from).collect())
            .ok_or_else(|| DiscoveryError::AddressLookup {
                interface: name.to_string(),
                reason: "interface disappeared during enumeration".to_string(),
            })
    }
}

/// Enumerate and classify every interface from `source`.
///
/// Emits a diagnostic line per loopback/primary interface and per address,
/// marking addresses suitable as the primary candidate.
pub fn inspect<S>(source: &S, names: &InterfaceNames) -> DiscoveryResult<Vec<NetworkInterface>>
where
    S: InterfaceSource + ?Sized,
{
    let mut interfaces = Vec::new();

    for (index, name) in source.list_interfaces()?.into_iter().enumerate() {
        let addresses = source.addresses_of(&name)?;
        let kind = names.classify(&name);

        if kind == InterfaceKind::Other {
            let count = addresses.len();
            tracing::debug!(index, interface = %name, addresses = count, "other interface");
        } else {
            let count = addresses.len();
            tracing::info!(index, interface = %name, %kind, addresses = count, "interface");
            for (slot, address) in addresses.iter().enumerate() {
                let suitable = kind == InterfaceKind::Primary && address.ipv4_network().is_some();
                tracing::info!(
                    "  adr[{}] {}{}",
                    slot,
                    address,
                    if suitable { " (suitable)" } else { "" }
                );
            }
        }

        interfaces.push(NetworkInterface {
            name,
            addresses,
            kind,
        });
    }

    Ok(interfaces)
}

/// The primary interface's chosen IPv4/prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryCandidate {
    pub interface: String,
    #[serde(serialize_with = "serialize_network")]
    pub network: Ipv4Network,
    /// Other plausible candidates that were passed over.
    #[serde(serialize_with = "serialize_networks")]
    pub alternatives: Vec<Ipv4Network>,
}

impl PrimaryCandidate {
    /// True when more than one candidate was found.
    pub fn is_ambiguous(&self) -> bool {
        !self.alternatives.is_empty()
    }
}

/// Pick the primary interface's IPv4/prefix address.
///
/// Multiple candidates are surfaced as a warning and resolved by `policy`.
/// Returns `None` when no primary interface carries an IPv4/prefix address.
pub fn primary_candidate(
    interfaces: &[NetworkInterface],
    policy: TieBreak,
) -> Option<PrimaryCandidate> {
    let candidates: Vec<(&str, Ipv4Network)> = interfaces
        .iter()
        .filter(|iface| iface.kind == InterfaceKind::Primary)
        .flat_map(|iface| {
            iface
                .addresses
                .iter()
                .filter_map(move |addr| addr.ipv4_network().map(|net| (iface.name.as_str(), net)))
        })
        .collect();

    let chosen = match policy {
        TieBreak::First => 0,
        TieBreak::Last => candidates.len().checked_sub(1)?,
        TieBreak::MostSpecific => candidates
            .iter()
            .enumerate()
            .max_by(|(ia, (_, a)), (ib, (_, b))| a.prefix().cmp(&b.prefix()).then(ib.cmp(ia)))
            .map(|(i, _)| i)?,
    };
    let (interface, network) = *candidates.get(chosen)?;

    let alternatives: Vec<Ipv4Network> = candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != chosen)
        .map(|(_, (_, net))| *net)
        .collect();

    if !alternatives.is_empty() {
        tracing::warn!(
            chosen = %network,
            others = ?alternatives.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
            %policy,
            "MULTIPLE CANDIDATES for primary interface address"
        );
    }

    Some(PrimaryCandidate {
        interface: interface.to_string(),
        network,
        alternatives,
    })
}

fn serialize_network<S: Serializer>(net: &Ipv4Network, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(net)
}

fn serialize_networks<S: Serializer>(nets: &[Ipv4Network], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(nets.iter().map(|n| n.to_string()))
}
