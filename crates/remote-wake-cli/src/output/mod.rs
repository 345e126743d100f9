//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use std::net::SocketAddrV4;

use remote_wake_core::discovery::ScanOutcome;
use remote_wake_core::types::Device;
use remote_wake_core::{MacAddress, StatusReport};

/// One status result, with the registered device it belongs to if any.
#[derive(Debug, Clone)]
pub struct StatusLine {
    pub device: Option<Device>,
    pub report: StatusReport,
}

/// Output formatter trait
pub trait OutputFormatter {
    /// Format device list
    fn format_devices(&self, devices: &[Device]) -> String;

    /// Format a single device after a change (`action` is e.g. "Added")
    fn format_device(&self, action: &str, device: &Device) -> String;

    /// Format status results
    fn format_status(&self, lines: &[StatusLine]) -> String;

    /// Format a sent wake packet
    fn format_wake(&self, mac: MacAddress, device: Option<&Device>, target: SocketAddrV4) -> String;

    /// Format scan results; `registered` marks devices already in the registry
    fn format_scan(&self, outcome: &ScanOutcome, registered: &[Device]) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}

pub(crate) fn is_registered(registered: &[Device], mac: Option<MacAddress>) -> bool {
    mac.is_some_and(|mac| registered.iter().any(|d| d.mac == mac))
}
