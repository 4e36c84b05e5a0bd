//! Core type definitions using newtype patterns for type safety.
//!
//! A `SubnetIdentity` can only describe a /24 and only hands out host
//! octets 1..=254, so the sweep cannot address the network or broadcast
//! address by construction.

mod reachability;
mod subnet;

pub use reachability::ReachabilityMap;
pub use subnet::{SubnetIdentity, FIRST_HOST, LAST_HOST};
