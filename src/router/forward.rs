//! Packet forwarding decisions.
//!
//! Implements the longest-prefix-match decision over a router's routing
//! table, plus local-delivery classification for received packets. Receiving
//! never triggers forwarding; a caller decides whether to invoke
//! [`Router::forward`] after a [`Delivery::NotLocal`] notice.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::addr::{self, Ipv4Prefix};
use crate::error::NetError;

use super::table::{Interface, RouteEntry, RoutingTable};

/// A network-layer packet.
///
/// A fixed record, extended only through explicit optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    /// Destination address, optionally carrying a `/len` suffix.
    pub destination_ip: String,
    /// Originating address, when the sender cares to record it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
}

impl Packet {
    /// A packet addressed to `destination_ip` with no source recorded.
    pub fn to(destination_ip: impl Into<String>) -> Self {
        Packet {
            destination_ip: destination_ip.into(),
            source_ip: None,
        }
    }
}

/// Outcome of a successful forwarding decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardingDecision {
    /// Address of the next router toward the destination.
    pub next_hop: Ipv4Addr,
    /// Egress interface the packet leaves through.
    pub iface: String,
}

/// Local-delivery classification for a received packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The destination is bound to one of the router's own subnets.
    Local { iface: String },
    /// Not addressed to this router.
    NotLocal,
}

/// A router with named interfaces and a static routing table.
///
/// Interfaces and routes are added incrementally and never removed.
#[derive(Debug, Clone)]
pub struct Router {
    id: String,
    interfaces: BTreeMap<String, Interface>,
    table: RoutingTable,
}

impl Router {
    pub fn new(id: impl Into<String>) -> Self {
        Router {
            id: id.into(),
            interfaces: BTreeMap::new(),
            table: RoutingTable::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register an interface; re-adding a name overwrites its binding.
    pub fn add_interface(&mut self, name: &str, ip: &str, mask: &str) -> Result<(), NetError> {
        let ip = addr::parse_dotted_quad(ip)?;
        let len = addr::mask_length(mask)?;
        let prefix = Ipv4Prefix::new(ip, len)?;
        log::debug!("router {}: interface {} bound to {}/{}", self.id, name, ip, len);
        self.interfaces.insert(
            name.to_string(),
            Interface {
                name: name.to_string(),
                ip,
                mask: mask.to_string(),
                prefix,
            },
        );
        Ok(())
    }

    /// Insert or overwrite the static route for a destination network.
    pub fn configure_route(
        &mut self,
        dest_net: &str,
        next_hop: &str,
        iface: &str,
        mask: &str,
    ) -> Result<(), NetError> {
        let len = addr::mask_length(mask)?;
        let dest = Ipv4Prefix::new(addr::parse_dotted_quad(dest_net)?, len)?;
        let next_hop = addr::parse_dotted_quad(next_hop)?;
        log::debug!(
            "router {}: route {} via {} on {}",
            self.id,
            dest,
            next_hop,
            iface
        );
        self.table.insert(RouteEntry {
            dest,
            next_hop,
            iface: iface.to_string(),
        });
        Ok(())
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(name)
    }

    /// Routes in insertion order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry> {
        self.table.iter()
    }

    /// Pick the longest-prefix-match route for a packet.
    ///
    /// Every route whose prefix contains the destination is a candidate; the
    /// greatest mask length wins, and ties at equal maximal length resolve
    /// to the first-inserted route. An empty candidate set is
    /// [`NetError::NoRouteFound`].
    pub fn forward(&self, packet: &Packet) -> Result<ForwardingDecision, NetError> {
        // validate the destination before consulting the table
        let (host, _) = addr::split_prefix_len(&packet.destination_ip)?;
        addr::parse_dotted_quad(host)?;

        let mut best: Option<&RouteEntry> = None;
        for route in self.table.iter() {
            if !addr::contains_in_subnet(
                &packet.destination_ip,
                route.dest.network(),
                Some(route.dest.prefix_len()),
            )? {
                continue;
            }
            // strictly greater replaces; equal keeps the earlier insertion
            if best.map_or(true, |b| route.dest.prefix_len() > b.dest.prefix_len()) {
                best = Some(route);
            }
        }

        match best {
            Some(route) => {
                log::debug!(
                    "router {}: forwarding {} via {} on {}",
                    self.id,
                    packet.destination_ip,
                    route.next_hop,
                    route.iface
                );
                Ok(ForwardingDecision {
                    next_hop: route.next_hop,
                    iface: route.iface.clone(),
                })
            }
            None => {
                log::debug!("router {}: no route for {}", self.id, packet.destination_ip);
                Err(NetError::NoRouteFound {
                    destination: packet.destination_ip.clone(),
                })
            }
        }
    }

    /// Classify a received packet against the router's own interfaces.
    ///
    /// Interfaces are checked in name order; a subnet match means local
    /// delivery on that interface.
    pub fn receive(&self, packet: &Packet) -> Result<Delivery, NetError> {
        let (host, _) = addr::split_prefix_len(&packet.destination_ip)?;
        addr::parse_dotted_quad(host)?;

        for (name, iface) in &self.interfaces {
            if addr::contains_in_subnet(
                &packet.destination_ip,
                iface.prefix.network(),
                Some(iface.prefix.prefix_len()),
            )? {
                log::debug!(
                    "router {}: packet for {} delivered locally on {}",
                    self.id,
                    packet.destination_ip,
                    name
                );
                return Ok(Delivery::Local {
                    iface: name.clone(),
                });
            }
        }
        Ok(Delivery::NotLocal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The two-interface router used throughout the forwarding tests.
    fn base_router() -> Router {
        let mut router = Router::new("router1");
        router.add_interface("eth0", "192.168.1.1", "255.255.255.0").unwrap();
        router.add_interface("eth1", "10.0.0.1", "255.255.255.0").unwrap();
        router
            .configure_route("192.168.2.0", "192.168.1.2", "eth0", "255.255.255.0")
            .unwrap();
        router
    }

    #[test]
    fn forwards_along_matching_route() {
        let router = base_router();
        let decision = router.forward(&Packet::to("192.168.2.10")).unwrap();
        assert_eq!(decision.next_hop, Ipv4Addr::new(192, 168, 1, 2));
        assert_eq!(decision.iface, "eth0");
    }

    #[test]
    fn unmatched_destination_is_no_route() {
        let router = base_router();
        let err = router.forward(&Packet::to("172.16.0.5")).unwrap_err();
        assert_eq!(
            err,
            NetError::NoRouteFound {
                destination: "172.16.0.5".to_string()
            }
        );
    }

    #[test]
    fn longest_prefix_wins() {
        let mut router = base_router();
        router
            .configure_route("192.168.0.0", "10.0.0.9", "eth1", "255.255.0.0")
            .unwrap();
        // the /24 is more specific than the /16 covering the same address
        let decision = router.forward(&Packet::to("192.168.2.10")).unwrap();
        assert_eq!(decision.iface, "eth0");
        assert_eq!(decision.next_hop, Ipv4Addr::new(192, 168, 1, 2));
    }

    #[test]
    fn equal_length_ties_keep_first_inserted() {
        let mut router = Router::new("r");
        router
            .configure_route("10.1.0.0", "10.0.0.1", "ethA", "255.255.0.0")
            .unwrap();
        router
            .configure_route("10.2.0.0", "10.0.0.2", "ethB", "255.255.0.0")
            .unwrap();
        // a /8 suffix on the destination makes both /16 routes match
        for _ in 0..10 {
            let decision = router.forward(&Packet::to("10.9.9.9/8")).unwrap();
            assert_eq!(decision.iface, "ethA");
            assert_eq!(decision.next_hop, Ipv4Addr::new(10, 0, 0, 1));
        }
    }

    #[test]
    fn tie_break_survives_route_overwrite() {
        let mut router = Router::new("r");
        router
            .configure_route("10.1.0.0", "10.0.0.1", "ethA", "255.255.0.0")
            .unwrap();
        router
            .configure_route("10.2.0.0", "10.0.0.2", "ethB", "255.255.0.0")
            .unwrap();
        // overwriting the first route keeps its position, so it still wins
        router
            .configure_route("10.1.0.0", "10.0.0.7", "ethC", "255.255.0.0")
            .unwrap();
        let decision = router.forward(&Packet::to("10.9.9.9/8")).unwrap();
        assert_eq!(decision.iface, "ethC");
        assert_eq!(decision.next_hop, Ipv4Addr::new(10, 0, 0, 7));
    }

    #[test]
    fn receive_classifies_local_delivery() {
        let router = base_router();
        assert_eq!(
            router.receive(&Packet::to("192.168.1.1")).unwrap(),
            Delivery::Local {
                iface: "eth0".to_string()
            }
        );
        assert_eq!(
            router.receive(&Packet::to("8.8.8.8")).unwrap(),
            Delivery::NotLocal
        );
    }

    #[test]
    fn malformed_destination_is_format_error() {
        let router = base_router();
        assert!(matches!(
            router.forward(&Packet::to("192.168.2")),
            Err(NetError::Format(_))
        ));
        assert!(matches!(
            router.forward(&Packet::to("192.168.2.10/40")),
            Err(NetError::Format(_))
        ));
    }

    #[test]
    fn malformed_destination_rejected_even_with_empty_table() {
        let router = Router::new("r");
        assert!(matches!(
            router.forward(&Packet::to("not-an-address")),
            Err(NetError::Format(_))
        ));
        assert!(matches!(
            router.receive(&Packet::to("not-an-address")),
            Err(NetError::Format(_))
        ));
    }
}
