//! Core library for remote-wake.
//!
//! Presence detection with a TTL status cache, LAN discovery, the device
//! registry and the Wake-on-LAN packet sender. Interface layers (the CLI)
//! build on top of these services.

pub mod discovery;
pub mod error;
pub mod presence;
pub mod settings;
pub mod storage;
pub mod types;
pub mod wol;

pub use error::{CoreError, Result};
pub use types::{DeviceId, DiscoveredDevice, MacAddress, StatusReport};
