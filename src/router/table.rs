//! Routing-table storage.
//!
//! This file defines the interface and route records owned by a router and
//! the ordered prefix-to-route mapping the forwarding engine scans.

use std::net::Ipv4Addr;

use crate::addr::Ipv4Prefix;

/// A named router interface with its bound address and subnet.
#[derive(Debug, Clone)]
pub struct Interface {
    /// Interface name, e.g. `eth0`.
    pub name: String,
    /// Address bound to the interface.
    pub ip: Ipv4Addr,
    /// Subnet mask as configured, in dotted form.
    pub mask: String,
    /// Canonical subnet derived from `ip` and `mask`.
    pub prefix: Ipv4Prefix,
}

/// A single static route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Destination network in canonical form.
    pub dest: Ipv4Prefix,
    /// Address of the next router toward the destination.
    pub next_hop: Ipv4Addr,
    /// Egress interface name.
    pub iface: String,
}

/// Ordered mapping from destination prefix to route.
///
/// Holds at most one entry per distinct prefix. Overwriting an existing
/// prefix replaces the entry in place, keeping its original position so the
/// forwarding tie-break stays stable across reconfiguration.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: Vec<RouteEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route, or overwrite the one already keyed by its prefix.
    pub fn insert(&mut self, entry: RouteEntry) {
        match self.routes.iter_mut().find(|r| r.dest == entry.dest) {
            Some(existing) => *existing = entry,
            None => self.routes.push(entry),
        }
    }

    /// Routes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(dest: [u8; 4], len: u8, hop: [u8; 4], iface: &str) -> RouteEntry {
        RouteEntry {
            dest: Ipv4Prefix::new(Ipv4Addr::from(dest), len).unwrap(),
            next_hop: Ipv4Addr::from(hop),
            iface: iface.to_string(),
        }
    }

    #[test]
    fn insert_overwrites_same_prefix_in_place() {
        let mut table = RoutingTable::new();
        table.insert(route([192, 168, 2, 0], 24, [192, 168, 1, 2], "eth0"));
        table.insert(route([10, 1, 0, 0], 16, [10, 0, 0, 2], "eth1"));
        table.insert(route([192, 168, 2, 0], 24, [192, 168, 1, 9], "eth2"));

        assert_eq!(table.len(), 2);
        let first = table.iter().next().unwrap();
        assert_eq!(first.next_hop, Ipv4Addr::new(192, 168, 1, 9));
        assert_eq!(first.iface, "eth2");
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut table = RoutingTable::new();
        table.insert(route([10, 1, 0, 0], 16, [10, 0, 0, 2], "eth1"));
        table.insert(route([192, 168, 2, 0], 24, [192, 168, 1, 2], "eth0"));
        let ifaces: Vec<&str> = table.iter().map(|r| r.iface.as_str()).collect();
        assert_eq!(ifaces, ["eth1", "eth0"]);
    }
}
