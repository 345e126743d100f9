//! Shared data types for remote-wake.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::MacParseError;

// ==================== Hardware address ====================

/// A 6-byte hardware address, displayed as `AA:BB:CC:DD:EE:FF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const BROADCAST: MacAddress = MacAddress([0xFF; 6]);
    pub const ZERO: MacAddress = MacAddress([0x00; 6]);

    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// All-zero placeholder some neighbour tables report for incomplete entries.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a, b, c, d, e, g
        )
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    /// Accepts colon, dash or no separators in any case. Characters that are
    /// neither hex digits nor separators are dropped first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| MacParseError {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let digits: Vec<u8> = s
            .chars()
            .filter(|c| c.is_ascii_hexdigit())
            .map(|c| c.to_digit(16).unwrap_or(0) as u8)
            .collect();

        if digits.is_empty() {
            return Err(err("no hex digits"));
        }
        if digits.len() != 12 {
            return Err(err("expected 12 hex digits"));
        }

        let mut octets = [0u8; 6];
        for (i, pair) in digits.chunks(2).enumerate() {
            octets[i] = (pair[0] << 4) | pair[1];
        }
        Ok(MacAddress(octets))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ==================== Devices ====================

/// Stable opaque identifier assigned when a device is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DeviceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A registered device that can be woken and monitored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Records written before identifiers existed get one on load.
    #[serde(default)]
    pub id: DeviceId,
    pub name: String,
    pub mac: MacAddress,
    pub ip: Ipv4Addr,
}

/// Fields for a device that has not been registered yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDevice {
    pub name: String,
    pub mac: String,
    pub ip: String,
}

/// Partial update of a registered device; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceUpdate {
    pub name: Option<String>,
    pub mac: Option<String>,
    pub ip: Option<String>,
}

// ==================== Status ====================

/// One remembered probe result.
///
/// On disk: `{"status": true, "timestamp": 1700000000}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    #[serde(rename = "status")]
    pub online: bool,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_seconds")]
    pub observed_at: DateTime<Utc>,
}

/// Answer to a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub ip: Ipv4Addr,
    pub online: bool,
    /// Served from the cache without touching the network.
    pub cached: bool,
    /// The batch deadline passed before this address finished probing.
    pub timed_out: bool,
}

// ==================== Discovery ====================

/// A host seen during a LAN scan. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    pub ip: Ipv4Addr,
    pub mac: Option<MacAddress>,
    pub online: bool,
}

impl DiscoveredDevice {
    pub fn new(ip: Ipv4Addr, mac: Option<MacAddress>) -> Self {
        Self {
            ip,
            mac,
            online: true,
        }
    }
}
