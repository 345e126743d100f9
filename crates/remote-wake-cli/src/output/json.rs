//! JSON-formatted output for CLI.

use std::net::SocketAddrV4;

use serde::Serialize;
use serde_json::{json, Value};

use super::{is_registered, OutputFormatter, StatusLine};
use remote_wake_core::discovery::ScanOutcome;
use remote_wake_core::types::Device;
use remote_wake_core::MacAddress;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_devices(&self, devices: &[Device]) -> String {
        let output = json!({
            "devices": devices,
            "count": devices.len()
        });
        Self::to_json(&output)
    }

    fn format_device(&self, action: &str, device: &Device) -> String {
        Self::to_json(&json!({
            "action": action.to_lowercase(),
            "device": device
        }))
    }

    fn format_status(&self, lines: &[StatusLine]) -> String {
        let items: Vec<Value> = lines
            .iter()
            .map(|line| {
                let mut value = serde_json::to_value(line.report).unwrap_or(json!({}));
                if let (Some(device), Value::Object(map)) = (&line.device, &mut value) {
                    map.insert("id".to_string(), json!(device.id));
                    map.insert("name".to_string(), json!(device.name));
                }
                value
            })
            .collect();

        let online = lines.iter().filter(|l| l.report.online).count();

        Self::to_json(&json!({
            "statuses": items,
            "summary": {
                "total": lines.len(),
                "online": online,
                "offline": lines.len() - online
            }
        }))
    }

    fn format_wake(&self, mac: MacAddress, device: Option<&Device>, target: SocketAddrV4) -> String {
        Self::to_json(&json!({
            "success": true,
            "mac": mac,
            "device": device.map(|d| &d.name),
            "target": target.to_string()
        }))
    }

    fn format_scan(&self, outcome: &ScanOutcome, registered: &[Device]) -> String {
        let devices: Vec<Value> = outcome
            .devices
            .iter()
            .map(|d| {
                json!({
                    "ip": d.ip,
                    "mac": d.mac,
                    "online": d.online,
                    "registered": is_registered(registered, d.mac)
                })
            })
            .collect();

        Self::to_json(&json!({
            "subnet": outcome.subnet,
            "strategy": outcome.strategy,
            "devices": devices,
            "count": outcome.devices.len()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote_wake_core::discovery::Subnet;
    use remote_wake_core::types::{DeviceId, DiscoveredDevice};
    use remote_wake_core::StatusReport;
    use std::net::Ipv4Addr;

    fn nas() -> Device {
        Device {
            id: DeviceId::new(),
            name: "NAS".to_string(),
            mac: "AA:BB:CC:DD:EE:FF".parse().unwrap(),
            ip: Ipv4Addr::new(192, 168, 1, 20),
        }
    }

    #[test]
    fn test_status_shape() {
        let lines = vec![StatusLine {
            device: Some(nas()),
            report: StatusReport {
                ip: Ipv4Addr::new(192, 168, 1, 20),
                online: true,
                cached: false,
                timed_out: false,
            },
        }];

        let value: Value = serde_json::from_str(&JsonOutput::new().format_status(&lines)).unwrap();
        let first = &value["statuses"][0];
        assert_eq!(first["ip"], "192.168.1.20");
        assert_eq!(first["online"], true);
        assert_eq!(first["timedOut"], false);
        assert_eq!(first["name"], "NAS");
        assert_eq!(value["summary"]["online"], 1);
    }

    #[test]
    fn test_scan_marks_registered() {
        let outcome = ScanOutcome {
            subnet: Subnet::from_address(Ipv4Addr::new(192, 168, 1, 100)),
            strategy: Some("arp"),
            devices: vec![
                DiscoveredDevice::new(Ipv4Addr::new(192, 168, 1, 20), Some(nas().mac)),
                DiscoveredDevice::new(Ipv4Addr::new(192, 168, 1, 7), None),
            ],
        };

        let value: Value =
            serde_json::from_str(&JsonOutput::new().format_scan(&outcome, &[nas()])).unwrap();
        assert_eq!(value["subnet"], "192.168.1.0/24");
        assert_eq!(value["strategy"], "arp");
        assert_eq!(value["devices"][0]["registered"], true);
        assert_eq!(value["devices"][1]["mac"], Value::Null);
        assert_eq!(value["devices"][1]["registered"], false);
    }
}
