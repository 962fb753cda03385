//! Simulated end devices.
//!
//! A device carries a name, a physical (link-layer) address and, once a
//! network has adopted it, an immutable IP address plus the cache of peer
//! bindings learned through address resolution.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use rand::Rng;

/// Generate a random locally-administered physical address.
fn random_physical_address() -> String {
    let mut rng = rand::thread_rng();
    let tail: [u8; 5] = rng.gen();
    format!(
        "02:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        tail[0], tail[1], tail[2], tail[3], tail[4]
    )
}

/// A host attached to a single network segment.
#[derive(Debug, Clone)]
pub struct Device {
    name: String,
    ip: Option<Ipv4Addr>,
    physical_address: String,
    /// Peer IP -> physical address, built incrementally. Entries can go
    /// stale; only a fresh successful resolution overwrites them.
    resolved_peers: HashMap<Ipv4Addr, String>,
}

impl Device {
    /// Create a device with a randomly generated physical address.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_physical_address(name, random_physical_address())
    }

    /// Create a device with an explicit physical address.
    pub fn with_physical_address(
        name: impl Into<String>,
        physical_address: impl Into<String>,
    ) -> Self {
        Device {
            name: name.into(),
            ip: None,
            physical_address: physical_address.into(),
            resolved_peers: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The IP address assigned by the owning network, if joined.
    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.ip
    }

    pub fn physical_address(&self) -> &str {
        &self.physical_address
    }

    /// Look up a previously resolved peer binding.
    pub fn resolved(&self, peer: Ipv4Addr) -> Option<&str> {
        self.resolved_peers.get(&peer).map(String::as_str)
    }

    /// Number of cached peer bindings.
    pub fn resolved_count(&self) -> usize {
        self.resolved_peers.len()
    }

    /// Set by the owning network at join time, exactly once.
    pub(crate) fn set_ip(&mut self, ip: Ipv4Addr) {
        self.ip = Some(ip);
    }

    /// Record a successful resolution, overwriting any stale entry.
    pub(crate) fn cache_binding(&mut self, peer: Ipv4Addr, physical_address: String) {
        self.resolved_peers.insert(peer, physical_address);
    }
}
