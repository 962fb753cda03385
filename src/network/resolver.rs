//! Address resolution over a shared segment.
//!
//! A synchronous broadcast request / unicast response exchange binding a
//! member's IP address to its physical address. The requester caches the
//! binding; a request nobody answers is a quiet no-op, not an error.

use std::net::Ipv4Addr;

use crate::addr;
use crate::error::NetError;

use super::Network;

/// Outcome of an address-resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The owning member answered; the binding was cached on the requester.
    Resolved {
        ip: Ipv4Addr,
        physical_address: String,
    },
    /// No member owns the target address; caches are left untouched.
    NoAnswer,
}

impl Network {
    /// Broadcast an address-resolution request from `requester`.
    ///
    /// The request fans out to every member in membership order and each
    /// compares the target with its own address. The owner answers
    /// synchronously with its physical address, and the requester's cache
    /// entry for that peer is overwritten. Resolution is single-shot: the
    /// request is either answered during this call or not at all.
    pub fn send_request(
        &mut self,
        requester: &str,
        target_ip: &str,
    ) -> Result<Resolution, NetError> {
        let target = addr::parse_dotted_quad(target_ip)?;
        let requester_idx = self
            .devices
            .iter()
            .position(|d| d.name() == requester)
            .ok_or_else(|| NetError::UnknownDevice {
                name: requester.to_string(),
                network: self.prefix.to_string(),
            })?;

        log::debug!(
            "network {}: {} broadcasting resolution request for {}",
            self.prefix,
            requester,
            target
        );

        let answer = self
            .devices
            .iter()
            .find(|d| d.ip() == Some(target))
            .map(|owner| (owner.name().to_string(), owner.physical_address().to_string()));

        match answer {
            Some((owner, physical_address)) => {
                log::info!(
                    "network {}: {} answered {} with {}",
                    self.prefix,
                    owner,
                    requester,
                    physical_address
                );
                self.devices[requester_idx].cache_binding(target, physical_address.clone());
                Ok(Resolution::Resolved {
                    ip: target,
                    physical_address,
                })
            }
            None => {
                log::debug!("network {}: no member owns {}", self.prefix, target);
                Ok(Resolution::NoAnswer)
            }
        }
    }
}
