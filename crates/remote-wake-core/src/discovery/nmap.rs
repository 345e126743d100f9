//! `nmap -sn` host discovery.

use std::net::Ipv4Addr;
use std::process::Stdio;
use std::sync::OnceLock;

use regex::Regex;
use tokio::process::Command;

use crate::discovery::neighbor::parse_loose_mac;
use crate::discovery::subnet::Subnet;
use crate::error::ScanError;
use crate::types::{DiscoveredDevice, MacAddress};

pub const NMAP: &str = "nmap";

fn report_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Nmap scan report for (?:.*\()?(\d{1,3}(?:\.\d{1,3}){3})\)?\s*$")
            .unwrap_or_else(|e| unreachable!("static regex: {}", e))
    })
}

fn mac_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^MAC Address: ([0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5})")
            .unwrap_or_else(|e| unreachable!("static regex: {}", e))
    })
}

/// Parse ping-scan output into hosts that reported a hardware address.
///
/// A report line opens a host and the next `MAC Address:` line closes it.
/// The scanning machine itself never gets a MAC line and is dropped.
pub fn parse_nmap_output(output: &str) -> Vec<DiscoveredDevice> {
    let mut devices = Vec::new();
    let mut current: Option<Ipv4Addr> = None;

    for line in output.lines().map(str::trim) {
        if let Some(caps) = report_regex().captures(line) {
            current = caps[1].parse().ok();
            continue;
        }
        if let Some(caps) = mac_regex().captures(line) {
            let mac: Option<MacAddress> = parse_loose_mac(&caps[1]);
            if let (Some(ip), Some(mac)) = (current.take(), mac) {
                devices.push(DiscoveredDevice::new(ip, Some(mac)));
            }
        }
    }

    devices
}

/// Run `nmap -sn <subnet>` and parse the result.
pub async fn run_ping_scan(subnet: &Subnet) -> Result<Vec<DiscoveredDevice>, ScanError> {
    let output = Command::new(NMAP)
        .arg("-sn")
        .arg(subnet.to_string())
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ScanError::unavailable(NMAP, e.to_string()))?;

    if !output.status.success() {
        return Err(ScanError::unavailable(
            NMAP,
            format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }

    Ok(parse_nmap_output(&String::from_utf8_lossy(&output.stdout)))
}
