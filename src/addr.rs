//! IPv4 address and subnet arithmetic.
//!
//! This file contains the address-space primitives the rest of the crate
//! builds on: dotted-quad parsing, binary rendering, subnet containment
//! checks, mask-length computation and the canonical [`Ipv4Prefix`] type
//! used as a routing-table key.

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::NetError;

/// Parse a dotted-quad IPv4 address.
///
/// Accepts exactly four numeric octets in 0-255 separated by dots; anything
/// else is a [`NetError::Format`].
pub fn parse_dotted_quad(s: &str) -> Result<Ipv4Addr, NetError> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return Err(NetError::Format(format!(
            "expected 4 octets in '{}', found {}",
            s,
            parts.len()
        )));
    }
    let mut octets = [0u8; 4];
    for (i, part) in parts.iter().enumerate() {
        octets[i] = part
            .parse::<u8>()
            .map_err(|_| NetError::Format(format!("invalid octet '{}' in '{}'", part, s)))?;
    }
    Ok(Ipv4Addr::from(octets))
}

/// Render an address as its 32-bit binary form.
pub fn to_binary_string(addr: Ipv4Addr) -> String {
    format!("{:032b}", u32::from(addr))
}

/// Length of a dotted subnet mask, computed as the popcount of its octets.
pub fn mask_length(dotted: &str) -> Result<u8, NetError> {
    let mask = parse_dotted_quad(dotted)?;
    Ok(u32::from(mask).count_ones() as u8)
}

/// Split an optional `/len` suffix off an address string.
///
/// Returns the bare address text and the parsed length, if one was embedded.
pub fn split_prefix_len(s: &str) -> Result<(&str, Option<u8>), NetError> {
    match s.split_once('/') {
        Some((host, len)) => {
            let len = len
                .parse::<u8>()
                .ok()
                .filter(|&len| len <= 32)
                .ok_or_else(|| {
                    NetError::Format(format!("invalid prefix length suffix in '{}'", s))
                })?;
            Ok((host, Some(len)))
        }
        None => Ok((s, None)),
    }
}

/// Check whether an IP address falls inside a subnet.
///
/// The comparison covers the top `L` bits, where `L` is the `/len` suffix
/// embedded in `ip` if present (overriding `mask_len`), otherwise
/// `mask_len`, otherwise 32. The 32-bit default makes a bare address a
/// host-only match.
pub fn contains_in_subnet(
    ip: &str,
    network: Ipv4Addr,
    mask_len: Option<u8>,
) -> Result<bool, NetError> {
    let (host, suffix) = split_prefix_len(ip)?;
    let addr = parse_dotted_quad(host)?;
    if let Some(len) = mask_len {
        if len > 32 {
            return Err(NetError::Format(format!("prefix length {} exceeds 32", len)));
        }
    }
    let len = suffix.or(mask_len).unwrap_or(32);
    Ok(subnet_match(addr, network, len))
}

/// Compare the top `len` bits of `addr` and `network`.
///
/// Callers must have validated `len <= 32`.
pub fn subnet_match(addr: Ipv4Addr, network: Ipv4Addr, len: u8) -> bool {
    let mask = mask_bits(len);
    u32::from(addr) & mask == u32::from(network) & mask
}

fn mask_bits(len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(len))
    }
}

/// An IPv4 prefix in canonical form: host bits zeroed, length at most 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Prefix {
    network: Ipv4Addr,
    len: u8,
}

impl Ipv4Prefix {
    /// Build a canonical prefix, zeroing any host bits in `network`.
    pub fn new(network: Ipv4Addr, len: u8) -> Result<Self, NetError> {
        if len > 32 {
            return Err(NetError::Format(format!("prefix length {} exceeds 32", len)));
        }
        let canonical = Ipv4Addr::from(u32::from(network) & mask_bits(len));
        Ok(Ipv4Prefix {
            network: canonical,
            len,
        })
    }

    /// The canonical network address.
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// The prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Whether `addr` lies inside this prefix.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        subnet_match(addr, self.network, self.len)
    }

    /// Number of assignable host addresses.
    ///
    /// The all-zeros host is the network address and the all-ones host the
    /// broadcast address; neither is assignable, so /31 and /32 hold no
    /// hosts at all.
    pub fn host_capacity(&self) -> u32 {
        if self.len >= 31 {
            0
        } else {
            ((1u64 << (32 - u32::from(self.len))) - 2) as u32
        }
    }

    /// The address obtained by writing `host` into the host bits.
    pub fn with_host(&self, host: u32) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) | host)
    }
}

impl fmt::Display for Ipv4Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.len)
    }
}
