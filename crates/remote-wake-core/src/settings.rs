//! Tunable settings stored alongside the device list in `config.json`.
//!
//! Every field has a default so older or hand-edited files stay valid.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};

/// Ports tried in order by the reachability probe.
pub const DEFAULT_PROBE_PORTS: [u16; 5] = [80, 443, 22, 3389, 135];

/// Limited-broadcast address on the discard port.
pub const DEFAULT_WAKE_TARGET: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::BROADCAST, 9);

/// Host suffixes covered by the ping sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRange {
    pub start: u8,
    pub end: u8,
}

impl Default for ScanRange {
    fn default() -> Self {
        Self { start: 1, end: 15 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cache_ttl_secs: u64,
    pub probe_ports: Vec<u16>,
    pub connect_timeout_ms: u64,
    pub attempt_delay_ms: u64,
    pub probe_concurrency: usize,
    pub refresh_deadline_ms: u64,
    pub scan_range: ScanRange,
    pub excluded_networks: Vec<Ipv4Network>,
    pub ping_timeout_ms: u64,
    pub wake_target: SocketAddrV4,
}

/// Site-specific exclusion of the 172.x.x.x range (container bridges on the panel host).
fn default_excluded_networks() -> Vec<Ipv4Network> {
    Ipv4Network::new(Ipv4Addr::new(172, 0, 0, 0), 8)
        .into_iter()
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 30,
            probe_ports: DEFAULT_PROBE_PORTS.to_vec(),
            connect_timeout_ms: 300,
            attempt_delay_ms: 50,
            probe_concurrency: 8,
            refresh_deadline_ms: 10_000,
            scan_range: ScanRange::default(),
            excluded_networks: default_excluded_networks(),
            ping_timeout_ms: 1000,
            wake_target: DEFAULT_WAKE_TARGET,
        }
    }
}

impl Settings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn attempt_delay(&self) -> Duration {
        Duration::from_millis(self.attempt_delay_ms)
    }

    pub fn refresh_deadline(&self) -> Duration {
        Duration::from_millis(self.refresh_deadline_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }
}
