//! Local subnet detection.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use ipnetwork::Ipv4Network;
use serde::{Serialize, Serializer};

/// Used when the primary interface has no usable IPv4 address.
pub const FALLBACK_LOCAL_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 100);

/// Used when no default route is found.
pub const FALLBACK_GATEWAY: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);

/// A /24 network derived from a host address by dropping its last octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet(Ipv4Network);

impl Subnet {
    pub fn from_address(ip: Ipv4Addr) -> Self {
        let [a, b, c, _] = ip.octets();
        // A /24 prefix is always valid.
        let network = Ipv4Network::new(Ipv4Addr::new(a, b, c, 0), 24)
            .unwrap_or_else(|_| Ipv4Network::from(Ipv4Addr::new(a, b, c, 0)));
        Self(network)
    }

    pub fn network(&self) -> Ipv4Network {
        self.0
    }

    /// Dotted prefix including the trailing dot, e.g. `192.168.1.`.
    pub fn prefix(&self) -> String {
        let [a, b, c, _] = self.0.network().octets();
        format!("{}.{}.{}.", a, b, c)
    }

    pub fn host(&self, suffix: u8) -> Ipv4Addr {
        let [a, b, c, _] = self.0.network().octets();
        Ipv4Addr::new(a, b, c, suffix)
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.0.contains(ip)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}0/24", self.prefix())
    }
}

impl Serialize for Subnet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What the panel host knows about its own network position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalNetwork {
    pub address: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

impl LocalNetwork {
    /// Inspect the default interface and route, falling back to
    /// `192.168.1.100` / `192.168.1.1` when either is unknown.
    pub fn detect() -> Self {
        let address = match default_net::get_default_interface() {
            Ok(iface) => iface.ipv4.first().map(|net| net.addr).unwrap_or_else(|| {
                log::debug!("Interface {} has no IPv4 address", iface.name);
                FALLBACK_LOCAL_ADDRESS
            }),
            Err(e) => {
                log::debug!("Could not determine default interface: {}", e);
                FALLBACK_LOCAL_ADDRESS
            }
        };

        let gateway = match default_net::get_default_gateway() {
            Ok(gw) => match gw.ip_addr {
                IpAddr::V4(ip) => ip,
                IpAddr::V6(_) => FALLBACK_GATEWAY,
            },
            Err(e) => {
                log::debug!("Could not determine default gateway: {}", e);
                FALLBACK_GATEWAY
            }
        };

        Self { address, gateway }
    }

    pub fn subnet(&self) -> Subnet {
        Subnet::from_address(self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_last_octet() {
        let subnet = Subnet::from_address(Ipv4Addr::new(192, 168, 1, 37));
        assert_eq!(subnet.prefix(), "192.168.1.");
        assert_eq!(subnet.to_string(), "192.168.1.0/24");
        assert_eq!(subnet.host(15), Ipv4Addr::new(192, 168, 1, 15));
    }

    #[test]
    fn test_contains() {
        let subnet = Subnet::from_address(Ipv4Addr::new(10, 0, 3, 1));
        assert!(subnet.contains(Ipv4Addr::new(10, 0, 3, 254)));
        assert!(!subnet.contains(Ipv4Addr::new(10, 0, 4, 1)));
    }

    #[test]
    fn test_local_network_subnet() {
        let local = LocalNetwork {
            address: Ipv4Addr::new(192, 168, 50, 8),
            gateway: Ipv4Addr::new(192, 168, 50, 1),
        };
        assert_eq!(local.subnet().prefix(), "192.168.50.");
    }
}
