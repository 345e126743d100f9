//! Result filtering shared by every discovery strategy.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::settings::Settings;
use crate::types::DiscoveredDevice;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    excluded: Vec<Ipv4Network>,
}

impl ScanFilter {
    pub fn new(excluded: Vec<Ipv4Network>) -> Self {
        Self { excluded }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.excluded_networks.clone())
    }

    pub fn is_excluded(&self, ip: Ipv4Addr) -> bool {
        self.excluded.iter().any(|net| net.contains(ip))
    }

    /// Whether a device survives filtering. Unknown MACs are kept; broadcast
    /// and all-zero placeholders are not.
    pub fn accepts(&self, device: &DiscoveredDevice) -> bool {
        if self.is_excluded(device.ip) {
            return false;
        }
        match device.mac {
            Some(mac) => !mac.is_broadcast() && !mac.is_zero(),
            None => true,
        }
    }

    /// Filter and de-duplicate by address (first occurrence wins).
    pub fn apply(&self, devices: Vec<DiscoveredDevice>) -> Vec<DiscoveredDevice> {
        let mut seen = HashSet::new();
        devices
            .into_iter()
            .filter(|d| self.accepts(d))
            .filter(|d| seen.insert(d.ip))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MacAddress;

    fn device(ip: [u8; 4], mac: Option<&str>) -> DiscoveredDevice {
        DiscoveredDevice::new(Ipv4Addr::from(ip), mac.map(|m| m.parse::<MacAddress>().unwrap()))
    }

    #[test]
    fn test_default_excludes_172() {
        let filter = ScanFilter::from_settings(&Settings::default());
        assert!(filter.is_excluded(Ipv4Addr::new(172, 16, 0, 5)));
        assert!(filter.is_excluded(Ipv4Addr::new(172, 17, 0, 1)));
        assert!(!filter.is_excluded(Ipv4Addr::new(192, 168, 1, 1)));
        assert!(!filter.is_excluded(Ipv4Addr::new(10, 172, 0, 1)));
    }

    #[test]
    fn test_drops_placeholder_macs() {
        let filter = ScanFilter::default();
        let kept = filter.apply(vec![
            device([192, 168, 1, 1], Some("AA:BB:CC:DD:EE:FF")),
            device([192, 168, 1, 255], Some("FF:FF:FF:FF:FF:FF")),
            device([192, 168, 1, 3], Some("00:00:00:00:00:00")),
            device([192, 168, 1, 4], None),
        ]);
        let ips: Vec<_> = kept.iter().map(|d| d.ip.octets()[3]).collect();
        assert_eq!(ips, vec![1, 4]);
    }

    #[test]
    fn test_dedupes_by_address() {
        let filter = ScanFilter::default();
        let kept = filter.apply(vec![
            device([192, 168, 1, 1], Some("AA:BB:CC:DD:EE:01")),
            device([192, 168, 1, 1], Some("AA:BB:CC:DD:EE:02")),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].mac.unwrap().to_string(), "AA:BB:CC:DD:EE:01");
    }
}
