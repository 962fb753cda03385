//! Routers, routing tables and the forwarding engine.
//!
//! This module holds the per-router state (named interfaces plus a static
//! routing table) and the longest-prefix-match decision procedure that
//! turns a destination address into a next hop and egress interface.

pub mod forward;
pub mod table;

// Re-export commonly used types
pub use forward::{Delivery, ForwardingDecision, Packet, Router};
pub use table::{Interface, RouteEntry, RoutingTable};
