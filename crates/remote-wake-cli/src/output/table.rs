//! Table-formatted output for CLI.

use std::net::SocketAddrV4;

use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use super::{is_registered, OutputFormatter, StatusLine};
use remote_wake_core::discovery::ScanOutcome;
use remote_wake_core::types::Device;
use remote_wake_core::{MacAddress, StatusReport};

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn short_id(device: &Device) -> String {
        device.id.to_string().chars().take(8).collect()
    }

    fn status_cell(report: &StatusReport) -> Cell {
        match (report.online, report.timed_out) {
            (_, true) => Cell::new("TIMEOUT").fg(Color::Yellow),
            (true, false) => Cell::new("ONLINE").fg(Color::Green),
            (false, false) => Cell::new("OFFLINE").fg(Color::Red),
        }
    }

    fn source(report: &StatusReport) -> &'static str {
        if report.timed_out {
            "last known"
        } else if report.cached {
            "cache"
        } else {
            "probe"
        }
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_devices(&self, devices: &[Device]) -> String {
        if devices.is_empty() {
            return "No devices registered.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["ID", "Name", "MAC", "IP"]);

        for device in devices {
            table.add_row(vec![
                Cell::new(Self::short_id(device)),
                Cell::new(&device.name),
                Cell::new(device.mac),
                Cell::new(device.ip),
            ]);
        }

        format!("{}\n\n{} device(s)", table, devices.len())
    }

    fn format_device(&self, action: &str, device: &Device) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} {}", action.green(), device.name.bold()));
        lines.push(format!("  ID:   {}", device.id));
        lines.push(format!("  MAC:  {}", device.mac));
        lines.push(format!("  IP:   {}", device.ip));

        lines.join("\n")
    }

    fn format_status(&self, lines: &[StatusLine]) -> String {
        if lines.is_empty() {
            return "No devices registered.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Name", "IP", "Status", "Source"]);

        let mut online = 0;
        for line in lines {
            if line.report.online {
                online += 1;
            }
            let name = line
                .device
                .as_ref()
                .map(|d| d.name.clone())
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                Cell::new(name),
                Cell::new(line.report.ip),
                Self::status_cell(&line.report),
                Cell::new(Self::source(&line.report)),
            ]);
        }

        let summary = format!(
            "\nSummary: {} online, {} offline",
            online.to_string().green(),
            (lines.len() - online).to_string().red()
        );

        format!("{}{}", table, summary)
    }

    fn format_wake(&self, mac: MacAddress, device: Option<&Device>, target: SocketAddrV4) -> String {
        let label = match device {
            Some(device) => format!("{} ({})", device.name, mac),
            None => mac.to_string(),
        };
        format!("{} Magic packet sent to {} via {}", "[OK]".green(), label, target)
    }

    fn format_scan(&self, outcome: &ScanOutcome, registered: &[Device]) -> String {
        let strategy = outcome.strategy.unwrap_or("none");

        if outcome.devices.is_empty() {
            return format!(
                "No devices found on {} (last method tried: {}).",
                outcome.subnet, strategy
            );
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["IP", "MAC", "Registered"]);

        let mut devices = outcome.devices.clone();
        devices.sort_by_key(|d| d.ip);

        for device in &devices {
            let mac = device
                .mac
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let registered_cell = if is_registered(registered, device.mac) {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("no")
            };

            table.add_row(vec![Cell::new(device.ip), Cell::new(mac), registered_cell]);
        }

        format!(
            "{}\n\nFound {} device(s) on {} via {}",
            table,
            devices.len(),
            outcome.subnet,
            strategy
        )
    }
}
