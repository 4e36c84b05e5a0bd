//! Per-subnet reachability bitmap.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

use super::subnet::{FIRST_HOST, LAST_HOST};

/// Which host octets of a /24 responded within the timeout.
///
/// Entry `i` is true when the host with last octet `i` responded. The
/// network (0) and broadcast (255) entries are never set.
#[derive(Clone, PartialEq, Eq)]
pub struct ReachabilityMap {
    slots: [bool; 256],
}

impl ReachabilityMap {
    pub fn new() -> Self {
        Self { slots: [false; 256] }
    }

    /// Record a result for `octet`. Reserved octets are ignored.
    pub fn set(&mut self, octet: u8, reachable: bool) {
        if (FIRST_HOST..=LAST_HOST).contains(&octet) {
            self.slots[octet as usize] = reachable;
        }
    }

    pub fn is_reachable(&self, octet: u8) -> bool {
        self.slots[octet as usize]
    }

    /// Number of responsive hosts.
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|&&up| up).count()
    }

    /// Responsive octets in ascending order.
    pub fn reachable_octets(&self) -> impl Iterator<Item = u8> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, up)| **up)
            .map(|(i, _)| i as u8)
    }
}

impl Default for ReachabilityMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReachabilityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.reachable_octets()).finish()
    }
}

// Serialized as the list of responsive octets rather than 256 booleans.
impl Serialize for ReachabilityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.count()))?;
        for octet in self.reachable_octets() {
            seq.serialize_element(&octet)?;
        }
        seq.end()
    }
}
