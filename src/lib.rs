//! # RouteSim - Network-layer routing and address-resolution simulation core
//!
//! This library models the network layer of a protocol stack: address and
//! subnet arithmetic, per-router routing tables with longest-prefix-match
//! forwarding, a Dijkstra shortest-path planner, and a synchronous ARP-style
//! address-resolution exchange between devices sharing a segment.
//!
//! ## Overview
//!
//! Everything is an in-process call contract. A [`network::Network`] assigns
//! sequential host addresses to joining devices; members resolve each
//! other's physical addresses through a broadcast request answered
//! synchronously by the owner. A [`router::Router`] answers forwarding
//! queries from its static routing table, and the planner in [`planner`]
//! produces advisory node costs that a caller may translate into routes.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `addr`: dotted-quad parsing, subnet containment, canonical prefixes
//! - `router`: routers, routing tables and the forwarding engine
//! - `planner`: single-source shortest paths over non-negative weights
//! - `network`: segments, devices, address assignment and resolution
//! - `scenario`: YAML scenario configuration and the demo runner
//! - `error`: the recoverable error taxonomy shared by the core
//!
//! ## Example Usage
//!
//! ```rust
//! use routesim::router::{Packet, Router};
//!
//! let mut router = Router::new("router1");
//! router.add_interface("eth0", "192.168.1.1", "255.255.255.0")?;
//! router.configure_route("192.168.2.0", "192.168.1.2", "eth0", "255.255.255.0")?;
//!
//! let decision = router.forward(&Packet::to("192.168.2.10"))?;
//! assert_eq!(decision.iface, "eth0");
//! # Ok::<(), routesim::error::NetError>(())
//! ```
//!
//! ## Error Handling
//!
//! The core returns [`error::NetError`] values for every recoverable
//! condition (malformed addresses, missing routes, exhausted subnets,
//! negative planner weights); nothing aborts. The scenario layer and the
//! binary wrap those into `color_eyre` reports with context.
//!
//! ## Determinism
//!
//! The whole core is single-threaded and fully synchronous: every
//! call resolves immediately with no queuing, forwarding tie-breaks follow
//! insertion order, and iteration orders are fixed, so runs reproduce
//! exactly.

pub mod addr;
pub mod error;
pub mod network;
pub mod planner;
pub mod router;
pub mod scenario;
