//! Discovery strategies, tried in order by [`super::Discovery`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::discovery::filter::ScanFilter;
use crate::discovery::neighbor::NeighborTable;
use crate::discovery::nmap::{self, NMAP};
use crate::discovery::ping::Pinger;
use crate::discovery::subnet::Subnet;
use crate::error::ScanError;
use crate::settings::ScanRange;
use crate::types::DiscoveredDevice;

#[async_trait]
pub trait ScanStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Err(ScanError::Unavailable)` means "try the next strategy".
    async fn scan(&self, subnet: &Subnet) -> Result<Vec<DiscoveredDevice>, ScanError>;
}

// ==================== Neighbour cache ====================

/// Reports every host the OS has a hardware address for.
pub struct ArpTableStrategy {
    table: Arc<dyn NeighborTable>,
}

impl ArpTableStrategy {
    pub fn new(table: Arc<dyn NeighborTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl ScanStrategy for ArpTableStrategy {
    fn name(&self) -> &'static str {
        "arp"
    }

    async fn scan(&self, _subnet: &Subnet) -> Result<Vec<DiscoveredDevice>, ScanError> {
        let entries = self.table.entries().await?;
        log::debug!("{} reported {} neighbours", self.table.name(), entries.len());
        Ok(entries
            .into_iter()
            .map(|e| DiscoveredDevice::new(e.ip, Some(e.mac)))
            .collect())
    }
}

// ==================== nmap ====================

/// Ping scan of the whole /24 through `nmap`, when installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActiveScanStrategy;

#[async_trait]
impl ScanStrategy for ActiveScanStrategy {
    fn name(&self) -> &'static str {
        NMAP
    }

    async fn scan(&self, subnet: &Subnet) -> Result<Vec<DiscoveredDevice>, ScanError> {
        if let Err(e) = which::which(NMAP) {
            return Err(ScanError::unavailable(NMAP, e.to_string()));
        }
        nmap::run_ping_scan(subnet).await
    }
}

// ==================== Ping sweep ====================

/// Pings a range of host suffixes and resolves responders' MACs
/// from the neighbour table. Addresses the filter excludes are never pinged.
pub struct PingSweepStrategy {
    pinger: Arc<dyn Pinger>,
    table: Arc<dyn NeighborTable>,
    range: ScanRange,
    timeout: Duration,
    concurrency: usize,
    filter: ScanFilter,
}

impl PingSweepStrategy {
    pub fn new(
        pinger: Arc<dyn Pinger>,
        table: Arc<dyn NeighborTable>,
        range: ScanRange,
        timeout: Duration,
    ) -> Self {
        Self {
            pinger,
            table,
            range,
            timeout,
            concurrency: 16,
            filter: ScanFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ScanFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Host suffixes to try; network and broadcast suffixes are never included.
    fn suffixes(&self) -> impl Iterator<Item = u8> {
        let start = self.range.start.max(1);
        let end = self.range.end.min(254);
        start..=end
    }
}

#[async_trait]
impl ScanStrategy for PingSweepStrategy {
    fn name(&self) -> &'static str {
        "ping"
    }

    async fn scan(&self, subnet: &Subnet) -> Result<Vec<DiscoveredDevice>, ScanError> {
        let targets: Vec<_> = self
            .suffixes()
            .map(|n| subnet.host(n))
            .filter(|ip| !self.filter.is_excluded(*ip))
            .collect();
        if targets.is_empty() {
            log::debug!("Every host in {} is excluded, nothing to ping", subnet);
            return Ok(Vec::new());
        }
        log::debug!("Pinging {} hosts in {}", targets.len(), subnet);

        let devices: Vec<DiscoveredDevice> = stream::iter(targets)
            .map(|ip| async move {
                if !self.pinger.ping(ip, self.timeout).await {
                    return None;
                }
                let mac = self.table.lookup(ip).await;
                Some(DiscoveredDevice::new(ip, mac))
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|found| async move { found })
            .collect()
            .await;

        Ok(devices)
    }
}
