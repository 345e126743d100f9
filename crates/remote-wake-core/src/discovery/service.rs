//! Discovery orchestrator.
//!
//! Strategies run strictly in order; the first one whose filtered result is
//! non-empty wins and later ones are skipped. Strategy failures are logged
//! and never reach the caller.

use std::sync::Arc;

use serde::Serialize;

use super::filter::ScanFilter;
use super::neighbor::{system_neighbor_table, NeighborTable};
use super::ping::default_pinger;
use super::strategy::{ActiveScanStrategy, ArpTableStrategy, PingSweepStrategy, ScanStrategy};
use super::subnet::{LocalNetwork, Subnet};
use crate::settings::Settings;
use crate::types::DiscoveredDevice;

/// Result of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub subnet: Subnet,
    /// Strategy that produced `devices`, or the last one tried when empty.
    pub strategy: Option<&'static str>,
    pub devices: Vec<DiscoveredDevice>,
}

pub struct Discovery {
    strategies: Vec<Box<dyn ScanStrategy>>,
    filter: ScanFilter,
}

impl Discovery {
    pub fn new(strategies: Vec<Box<dyn ScanStrategy>>, filter: ScanFilter) -> Self {
        Self {
            strategies,
            filter,
        }
    }

    /// Neighbour cache, then nmap, then a ping sweep. Must be called inside
    /// a Tokio runtime.
    pub fn from_settings(settings: &Settings) -> Self {
        let table: Arc<dyn NeighborTable> = Arc::from(system_neighbor_table());
        let filter = ScanFilter::from_settings(settings);
        let sweep = PingSweepStrategy::new(
            default_pinger(),
            table.clone(),
            settings.scan_range,
            settings.ping_timeout(),
        )
        .with_filter(filter.clone());

        Self::new(
            vec![
                Box::new(ArpTableStrategy::new(table)),
                Box::new(ActiveScanStrategy),
                Box::new(sweep),
            ],
            filter,
        )
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn scan(&self, subnet: &Subnet) -> ScanOutcome {
        let mut last = None;

        for strategy in &self.strategies {
            last = Some(strategy.name());

            let found = match strategy.scan(subnet).await {
                Ok(found) => found,
                Err(e) => {
                    log::debug!("Strategy {} skipped: {}", strategy.name(), e);
                    continue;
                }
            };

            let raw = found.len();
            let devices = self.filter.apply(found);
            log::debug!(
                "Strategy {} found {} hosts, {} after filtering",
                strategy.name(),
                raw,
                devices.len()
            );

            if !devices.is_empty() {
                return ScanOutcome {
                    subnet: *subnet,
                    strategy: last,
                    devices,
                };
            }
        }

        ScanOutcome {
            subnet: *subnet,
            strategy: last,
            devices: Vec::new(),
        }
    }

    /// Scan the subnet of the host's primary interface.
    pub async fn scan_local(&self) -> ScanOutcome {
        let local = LocalNetwork::detect();
        log::debug!("Local address {}, gateway {}", local.address, local.gateway);
        self.scan(&local.subnet()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::strategy::tests::{FakePinger, StaticTable};
    use crate::error::ScanError;
    use crate::settings::ScanRange;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Strategy with canned output that counts its invocations.
    struct Canned {
        name: &'static str,
        result: Option<Vec<DiscoveredDevice>>,
        calls: Arc<AtomicUsize>,
    }

    impl Canned {
        fn new(name: &'static str, result: Option<Vec<DiscoveredDevice>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    result,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl ScanStrategy for Canned {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn scan(&self, _subnet: &Subnet) -> Result<Vec<DiscoveredDevice>, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .ok_or_else(|| ScanError::unavailable(self.name, "not installed"))
        }
    }

    fn found(ip: [u8; 4], mac: &str) -> DiscoveredDevice {
        DiscoveredDevice::new(Ipv4Addr::from(ip), Some(mac.parse().unwrap()))
    }

    fn subnet() -> Subnet {
        Subnet::from_address(Ipv4Addr::new(192, 168, 1, 100))
    }

    #[tokio::test]
    async fn test_arp_result_filtered_and_wins() {
        let table = StaticTable::with(&[
            ([192, 168, 1, 1], "AA:BB:CC:DD:EE:FF"),
            ([172, 16, 0, 5], "11:22:33:44:55:66"),
        ]);
        let (nmap, nmap_calls) = Canned::new("nmap", Some(vec![]));
        let discovery = Discovery::new(
            vec![
                Box::new(ArpTableStrategy::new(Arc::new(table))),
                Box::new(nmap),
            ],
            ScanFilter::from_settings(&Settings::default()),
        );

        let outcome = discovery.scan(&subnet()).await;

        assert_eq!(outcome.strategy, Some("arp"));
        assert_eq!(outcome.devices.len(), 1);
        assert_eq!(outcome.devices[0].ip, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(
            outcome.devices[0].mac.unwrap().to_string(),
            "AA:BB:CC:DD:EE:FF"
        );
        assert_eq!(nmap_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_ping_sweep() {
        let (nmap, nmap_calls) = Canned::new("nmap", None);
        let sweep = PingSweepStrategy::new(
            Arc::new(FakePinger::up(&[[192, 168, 1, 7]])),
            Arc::new(StaticTable(Some(vec![]))),
            ScanRange::default(),
            Duration::from_millis(10),
        );
        let discovery = Discovery::new(
            vec![
                Box::new(ArpTableStrategy::new(Arc::new(StaticTable(Some(vec![]))))),
                Box::new(nmap),
                Box::new(sweep),
            ],
            ScanFilter::from_settings(&Settings::default()),
        );

        let outcome = discovery.scan(&subnet()).await;

        assert_eq!(nmap_calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.strategy, Some("ping"));
        assert_eq!(outcome.devices.len(), 1);
        assert_eq!(outcome.devices[0].ip, Ipv4Addr::new(192, 168, 1, 7));
        assert_eq!(outcome.devices[0].mac, None);
    }

    #[tokio::test]
    async fn test_fully_filtered_result_counts_as_empty() {
        let (arp, _) = Canned::new("arp", Some(vec![found([172, 17, 0, 2], "02:42:AC:11:00:02")]));
        let (nmap, nmap_calls) = Canned::new(
            "nmap",
            Some(vec![found([192, 168, 1, 20], "AA:BB:CC:DD:EE:14")]),
        );
        let discovery = Discovery::new(
            vec![Box::new(arp), Box::new(nmap)],
            ScanFilter::from_settings(&Settings::default()),
        );

        let outcome = discovery.scan(&subnet()).await;

        assert_eq!(nmap_calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.strategy, Some("nmap"));
        assert_eq!(outcome.devices.len(), 1);
    }

    #[tokio::test]
    async fn test_excluded_subnet_yields_nothing_from_any_strategy() {
        let docker = Subnet::from_address(Ipv4Addr::new(172, 17, 0, 1));
        let everyone: Vec<[u8; 4]> = (1..=254).map(|n| [172, 17, 0, n]).collect();
        let pinger = Arc::new(FakePinger::up(&everyone));
        let filter = ScanFilter::from_settings(&Settings::default());

        let arp = ArpTableStrategy::new(Arc::new(StaticTable::with(&[(
            [172, 17, 0, 2],
            "02:42:AC:11:00:02",
        )])));
        let (nmap, _) = Canned::new("nmap", Some(vec![found([172, 17, 0, 3], "02:42:AC:11:00:03")]));
        let sweep = PingSweepStrategy::new(
            pinger.clone(),
            Arc::new(StaticTable(Some(vec![]))),
            ScanRange::default(),
            Duration::from_millis(10),
        )
        .with_filter(filter.clone());
        let discovery = Discovery::new(
            vec![Box::new(arp), Box::new(nmap), Box::new(sweep)],
            filter,
        );

        let outcome = discovery.scan(&docker).await;

        assert!(outcome.devices.is_empty());
        assert_eq!(outcome.strategy, Some("ping"));
        assert!(pinger.pinged.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_everything_empty() {
        let (arp, _) = Canned::new("arp", None);
        let (nmap, _) = Canned::new("nmap", Some(vec![]));
        let discovery = Discovery::new(vec![Box::new(arp), Box::new(nmap)], ScanFilter::default());

        let outcome = discovery.scan(&subnet()).await;

        assert!(outcome.devices.is_empty());
        assert_eq!(outcome.strategy, Some("nmap"));
        assert_eq!(outcome.subnet.to_string(), "192.168.1.0/24");
    }

    #[tokio::test]
    async fn test_duplicates_collapse() {
        let (arp, _) = Canned::new(
            "arp",
            Some(vec![
                found([192, 168, 1, 1], "AA:BB:CC:DD:EE:01"),
                found([192, 168, 1, 1], "AA:BB:CC:DD:EE:01"),
            ]),
        );
        let discovery = Discovery::new(vec![Box::new(arp)], ScanFilter::default());
        assert_eq!(discovery.scan(&subnet()).await.devices.len(), 1);
    }

    #[tokio::test]
    async fn test_default_strategy_order() {
        let discovery = Discovery::from_settings(&Settings::default());
        assert_eq!(discovery.strategy_names(), vec!["arp", "nmap", "ping"]);
    }
}
