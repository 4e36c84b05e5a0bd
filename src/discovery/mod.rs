//! Host identity discovery.
//!
//! Establishes which /24 to sweep by cross-checking three sources:
//!
//! - [`interfaces`]: the primary adapter's configured address,
//! - [`identity`]: the outbound-route and hostname-lookup probes,
//! - [`validator`]: the sanity gate reconciling them.
//!
//! A [`DiscoveryContext`] is built once per run and carries every finding
//! forward to the sweep.

pub mod identity;
pub mod interfaces;
pub mod validator;

pub use identity::{resolve_identity, HostnameLookup, IdentitySource, SelfIdentity, SystemIdentity};
pub use interfaces::{
    inspect, primary_candidate, InterfaceAddress, InterfaceKind, InterfaceNames, InterfaceSource,
    NetworkInterface, PrimaryCandidate, SystemInterfaces, TieBreak,
};
pub use validator::{default_allowed_range, validate};

use crate::error::DiscoveryResult;
use crate::types::SubnetIdentity;
use ipnetwork::Ipv4Network;
use serde::Serialize;

/// Inputs that steer discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub names: InterfaceNames,
    pub tie_break: TieBreak,
    pub allowed_range: Ipv4Network,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            names: InterfaceNames::default(),
            tie_break: TieBreak::default(),
            allowed_range: default_allowed_range(),
        }
    }
}

/// Everything learned about the local host during one run.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryContext {
    pub interfaces: Vec<NetworkInterface>,
    pub primary: Option<PrimaryCandidate>,
    pub identity: SelfIdentity,
    pub subnet: SubnetIdentity,
}

impl DiscoveryContext {
    /// Run the inspector, resolver and validator in order.
    ///
    /// Any failure aborts discovery; no partial context is returned.
    pub async fn establish<I, R>(
        options: &DiscoveryOptions,
        interfaces: &I,
        resolver: &R,
    ) -> DiscoveryResult<Self>
    where
        I: InterfaceSource + ?Sized,
        R: IdentitySource + ?Sized,
    {
        let found = inspect(interfaces, &options.names)?;
        let primary = primary_candidate(&found, options.tie_break);
        match &primary {
            Some(candidate) => {
                tracing::info!("Primary interface {}: {}", candidate.interface, candidate.network)
            }
            None => tracing::warn!("No primary interface address found"),
        }

        let identity = resolve_identity(resolver).await?;
        let subnet = validate(&identity, primary.as_ref(), options.allowed_range)?;

        Ok(Self {
            interfaces: found,
            primary,
            identity,
            subnet,
        })
    }

    /// True when the primary address had to be picked among several.
    pub fn has_ambiguous_primary(&self) -> bool {
        self.primary.as_ref().is_some_and(PrimaryCandidate::is_ambiguous)
    }
}
