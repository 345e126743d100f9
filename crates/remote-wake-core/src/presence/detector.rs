//! Cached presence queries.
//!
//! `PresenceDetector` owns the status cache for the lifetime of the process
//! and commits it to its store after every mutation it makes.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::{timeout_at, Instant};

use super::cache::{Clock, StatusCache, SystemClock};
use super::probe::{ProbeConfig, Prober, TcpProber};
use super::store::CacheStore;
use crate::settings::Settings;
use crate::types::StatusReport;

/// Default number of devices probed at once by `refresh_all`.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 8;

pub struct PresenceDetector {
    prober: Arc<dyn Prober>,
    cache: StatusCache,
    store: Option<Arc<dyn CacheStore>>,
    clock: Arc<dyn Clock>,
    concurrency: usize,
    commit_lock: Mutex<()>,
}

impl PresenceDetector {
    pub fn new(prober: Arc<dyn Prober>, cache: StatusCache) -> Self {
        Self {
            prober,
            cache,
            store: None,
            clock: Arc::new(SystemClock),
            concurrency: DEFAULT_PROBE_CONCURRENCY,
            commit_lock: Mutex::new(()),
        }
    }

    /// Build a detector from settings, seeding the cache from `store`.
    ///
    /// An unreadable store is logged and treated as empty.
    pub async fn open(settings: &Settings, store: Arc<dyn CacheStore>) -> Self {
        let entries = match store.load().await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Status cache unreadable, starting empty: {}", e);
                HashMap::new()
            }
        };
        log::debug!("Loaded {} cached status entries", entries.len());

        let prober = TcpProber::new(ProbeConfig::from(settings));
        let cache = StatusCache::with_entries(settings.cache_ttl(), entries);

        Self::new(Arc::new(prober), cache)
            .with_store(store)
            .with_concurrency(settings.probe_concurrency)
    }

    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &StatusCache {
        &self.cache
    }

    /// Status of one address.
    ///
    /// Unless `force` is set, a cache entry younger than the TTL is returned
    /// without network I/O. Otherwise the address is probed, recorded and the
    /// cache committed.
    pub async fn get_status(&self, ip: Ipv4Addr, force: bool) -> StatusReport {
        let report = self.query(ip, force).await;
        if !report.cached {
            self.commit().await;
        }
        report
    }

    /// Status of many addresses, probed concurrently.
    ///
    /// Addresses still probing when `deadline` elapses are reported with
    /// `timed_out` set and their last known value (or offline). Reports come
    /// back in input order; repeated addresses are probed once.
    pub async fn refresh_all(
        &self,
        ips: &[Ipv4Addr],
        force: bool,
        deadline: Duration,
    ) -> Vec<StatusReport> {
        let mut seen = HashSet::new();
        let unique: Vec<Ipv4Addr> = ips.iter().copied().filter(|ip| seen.insert(*ip)).collect();

        let deadline_at = Instant::now() + deadline;
        let mut done: HashMap<Ipv4Addr, StatusReport> = HashMap::with_capacity(unique.len());
        let mut probed = 0usize;

        {
            let mut queries = stream::iter(unique.iter().copied())
                .map(|ip| self.query(ip, force))
                .buffer_unordered(self.concurrency);

            loop {
                match timeout_at(deadline_at, queries.next()).await {
                    Ok(Some(report)) => {
                        if !report.cached {
                            probed += 1;
                        }
                        done.insert(report.ip, report);
                    }
                    Ok(None) => break,
                    Err(_) => {
                        log::warn!(
                            "Status refresh deadline of {:?} reached with {} of {} devices pending",
                            deadline,
                            unique.len() - done.len(),
                            unique.len()
                        );
                        break;
                    }
                }
            }
        }

        if probed > 0 {
            self.commit().await;
        }

        ips.iter()
            .map(|ip| {
                done.get(ip).copied().unwrap_or_else(|| StatusReport {
                    ip: *ip,
                    online: self.cache.last_known(*ip).unwrap_or(false),
                    cached: false,
                    timed_out: true,
                })
            })
            .collect()
    }

    /// Persist the current cache. Failures are logged; the in-memory cache
    /// keeps working.
    pub async fn commit(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let _guard = self.commit_lock.lock().await;
        let snapshot = self.cache.snapshot();
        if let Err(e) = store.save(&snapshot).await {
            log::warn!("Failed to persist status cache: {}", e);
        }
    }

    async fn query(&self, ip: Ipv4Addr, force: bool) -> StatusReport {
        if !force {
            if let Some(online) = self.cache.fresh(ip, self.clock.now()) {
                return StatusReport {
                    ip,
                    online,
                    cached: true,
                    timed_out: false,
                };
            }
        }

        let online = self.prober.is_reachable(ip).await;
        self.cache.record(ip, online, self.clock.now());

        StatusReport {
            ip,
            online,
            cached: false,
            timed_out: false,
        }
    }
}
