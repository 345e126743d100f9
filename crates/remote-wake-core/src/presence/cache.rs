//! In-memory status cache with a time-to-live.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::types::StatusEntry;

/// Source of "now" for TTL decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Process-wide probe results keyed by address.
///
/// Each write replaces a whole entry, so concurrent probes of the same
/// address resolve to whichever finished last.
pub struct StatusCache {
    entries: DashMap<Ipv4Addr, StatusEntry>,
    ttl: Duration,
}

impl StatusCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn with_entries(ttl: Duration, entries: HashMap<Ipv4Addr, StatusEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value while `now - observed_at < ttl`.
    pub fn fresh(&self, ip: Ipv4Addr, now: DateTime<Utc>) -> Option<bool> {
        let entry = self.entries.get(&ip)?;
        let age = now.signed_duration_since(entry.observed_at);
        // A timestamp in the future (clock moved back) is never fresh.
        let age = age.to_std().ok()?;
        (age < self.ttl).then_some(entry.online)
    }

    /// Last known value regardless of age.
    pub fn last_known(&self, ip: Ipv4Addr) -> Option<bool> {
        self.entries.get(&ip).map(|e| e.online)
    }

    pub fn record(&self, ip: Ipv4Addr, online: bool, now: DateTime<Utc>) {
        self.entries.insert(
            ip,
            StatusEntry {
                online,
                observed_at: now,
            },
        );
    }

    pub fn snapshot(&self) -> HashMap<Ipv4Addr, StatusEntry> {
        self.entries
            .iter()
            .map(|item| (*item.key(), *item.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
