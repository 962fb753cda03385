//! Error taxonomy for the routing core.
//!
//! Every variant is a local, recoverable result value handed back to the
//! caller; nothing in this crate aborts the process on a bad address or a
//! missing route.

use thiserror::Error;

/// Errors surfaced by the network-layer core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    /// Malformed address, mask or prefix string.
    #[error("malformed address or mask: {0}")]
    Format(String),

    /// No routing-table entry matches the destination. Recoverable; the
    /// caller decides whether to drop or escalate.
    #[error("no route found for destination {destination}")]
    NoRouteFound { destination: String },

    /// The subnet's host pool is exhausted.
    #[error("subnet {network} exceeded its capacity of {capacity} hosts")]
    CapacityExceeded { network: String, capacity: u32 },

    /// A negative edge weight was handed to the shortest-path planner.
    #[error("negative weight {weight} on edge {from} -> {to}")]
    NegativeWeight {
        from: String,
        to: String,
        weight: i64,
    },

    /// A scenario step referenced a device the segment does not own.
    #[error("device {name} is not a member of network {network}")]
    UnknownDevice { name: String, network: String },
}
