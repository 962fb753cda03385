//! Network segments, devices and address assignment.
//!
//! A [`Network`] owns an ordered set of member devices and hands out
//! sequential host addresses within its subnet. The address-resolution
//! exchange between members lives in [`resolver`].

pub mod device;
pub mod resolver;

// Re-export commonly used types
pub use device::Device;
pub use resolver::Resolution;

use std::net::Ipv4Addr;

use crate::addr::{self, Ipv4Prefix};
use crate::error::NetError;

/// A single shared network segment.
#[derive(Debug, Clone)]
pub struct Network {
    prefix: Ipv4Prefix,
    mask: String,
    devices: Vec<Device>,
}

impl Network {
    /// Create a segment from a network address and dotted subnet mask.
    pub fn new(network_addr: &str, mask: &str) -> Result<Self, NetError> {
        let network = addr::parse_dotted_quad(network_addr)?;
        let len = addr::mask_length(mask)?;
        let prefix = Ipv4Prefix::new(network, len)?;
        Ok(Network {
            prefix,
            mask: mask.to_string(),
            devices: Vec::new(),
        })
    }

    /// Canonical subnet of this segment.
    pub fn prefix(&self) -> Ipv4Prefix {
        self.prefix
    }

    /// Subnet mask as configured, in dotted form.
    pub fn subnet_mask(&self) -> &str {
        &self.mask
    }

    /// Members in assignment order; position equals host number minus one.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name() == name)
    }

    /// Assign the next sequential host address and take ownership of the
    /// device.
    ///
    /// Host numbers grow in join order starting at 1. The all-ones host is
    /// the broadcast address and is never handed out; once the pool is
    /// empty the call fails with [`NetError::CapacityExceeded`] and the
    /// device is dropped. A device's address is set here exactly once and
    /// never reassigned.
    pub fn assign_address(&mut self, mut device: Device) -> Result<Ipv4Addr, NetError> {
        let host = self.devices.len() as u32 + 1;
        if host > self.prefix.host_capacity() {
            return Err(NetError::CapacityExceeded {
                network: self.prefix.to_string(),
                capacity: self.prefix.host_capacity(),
            });
        }
        let ip = self.prefix.with_host(host);
        device.set_ip(ip);
        log::info!("network {}: assigned {} to device {}", self.prefix, ip, device.name());
        self.devices.push(device);
        Ok(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_sequential_host_addresses() {
        let mut network = Network::new("192.168.1.0", "255.255.255.0").unwrap();
        let mut assigned = Vec::new();
        for name in ["device1", "device2", "device3"] {
            assigned.push(network.assign_address(Device::new(name)).unwrap());
        }
        assert_eq!(
            assigned,
            vec![
                Ipv4Addr::new(192, 168, 1, 1),
                Ipv4Addr::new(192, 168, 1, 2),
                Ipv4Addr::new(192, 168, 1, 3),
            ]
        );
        // strictly increasing, and recorded on the members in join order
        for (i, device) in network.devices().iter().enumerate() {
            assert_eq!(device.ip(), Some(assigned[i]));
        }
    }

    #[test]
    fn exhausted_subnet_reports_capacity() {
        // a /30 holds exactly two hosts
        let mut network = Network::new("10.0.0.0", "255.255.255.252").unwrap();
        network.assign_address(Device::new("a")).unwrap();
        network.assign_address(Device::new("b")).unwrap();
        let err = network.assign_address(Device::new("c")).unwrap_err();
        assert_eq!(
            err,
            NetError::CapacityExceeded {
                network: "10.0.0.0/30".to_string(),
                capacity: 2,
            }
        );
        assert_eq!(network.devices().len(), 2);
    }

    #[test]
    fn point_to_point_masks_hold_no_hosts() {
        let mut network = Network::new("10.0.0.0", "255.255.255.255").unwrap();
        assert!(matches!(
            network.assign_address(Device::new("a")),
            Err(NetError::CapacityExceeded { capacity: 0, .. })
        ));
    }

    #[test]
    fn rejects_malformed_network_address() {
        assert!(matches!(
            Network::new("192.168.1", "255.255.255.0"),
            Err(NetError::Format(_))
        ));
        assert!(matches!(
            Network::new("192.168.1.0", "255.255.256.0"),
            Err(NetError::Format(_))
        ));
    }
}
