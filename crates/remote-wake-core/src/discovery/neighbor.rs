//! Operating-system neighbour (ARP) cache access.
//!
//! Reading the table is platform specific; parsing is kept in pure
//! functions so it can be tested against captured output.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::fs;
use tokio::process::Command;

use crate::error::ScanError;
use crate::types::MacAddress;

/// One IP → MAC pair from the neighbour cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
}

#[async_trait]
pub trait NeighborTable: Send + Sync {
    fn name(&self) -> &'static str;

    async fn entries(&self) -> Result<Vec<NeighborEntry>, ScanError>;

    async fn lookup(&self, ip: Ipv4Addr) -> Option<MacAddress> {
        match self.entries().await {
            Ok(entries) => entries.into_iter().find(|e| e.ip == ip).map(|e| e.mac),
            Err(e) => {
                log::debug!("Neighbour lookup for {} failed: {}", ip, e);
                None
            }
        }
    }
}

// ==================== /proc/net/arp ====================

pub const PROC_NET_ARP: &str = "/proc/net/arp";

/// Linux kernel ARP table.
pub struct ProcNetArp {
    path: PathBuf,
}

impl ProcNetArp {
    pub fn new() -> Self {
        Self::at(PathBuf::from(PROC_NET_ARP))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for ProcNetArp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NeighborTable for ProcNetArp {
    fn name(&self) -> &'static str {
        "proc-net-arp"
    }

    async fn entries(&self) -> Result<Vec<NeighborEntry>, ScanError> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ScanError::unavailable(self.name(), e.to_string()))?;
        Ok(parse_proc_net_arp(&content))
    }
}

/// Parse `/proc/net/arp`. Incomplete rows (flags `0x0`) are skipped.
pub fn parse_proc_net_arp(content: &str) -> Vec<NeighborEntry> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 || fields[2] == "0x0" {
                return None;
            }
            let ip = fields[0].parse().ok()?;
            let mac = parse_loose_mac(fields[3])?;
            Some(NeighborEntry { ip, mac })
        })
        .collect()
}

// ==================== arp command ====================

/// Neighbour table read from the `arp` tool's output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArpCommand;

impl ArpCommand {
    fn args() -> &'static [&'static str] {
        if cfg!(windows) {
            &["-a"]
        } else if cfg!(target_os = "macos") {
            &["-a", "-n"]
        } else {
            &["-n"]
        }
    }
}

#[async_trait]
impl NeighborTable for ArpCommand {
    fn name(&self) -> &'static str {
        "arp"
    }

    async fn entries(&self) -> Result<Vec<NeighborEntry>, ScanError> {
        let output = Command::new("arp")
            .args(Self::args())
            .output()
            .await
            .map_err(|e| ScanError::unavailable(self.name(), e.to_string()))?;

        if !output.status.success() {
            return Err(ScanError::unavailable(
                self.name(),
                format!("exited with {}", output.status),
            ));
        }

        Ok(parse_arp_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn arp_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(\d{1,3}(?:\.\d{1,3}){3})\D.*?\b([0-9A-Fa-f]{1,2}(?:[:-][0-9A-Fa-f]{1,2}){5})\b",
        )
        .unwrap_or_else(|e| unreachable!("static regex: {}", e))
    })
}

/// Parse `arp -n` (Linux), `arp -an` (BSD/macOS) or `arp -a` (Windows)
/// output. Lines without a complete hardware address are ignored.
pub fn parse_arp_output(output: &str) -> Vec<NeighborEntry> {
    let re = arp_line_regex();
    output
        .lines()
        .filter_map(|line| {
            let caps = re.captures(line)?;
            let ip = caps.get(1)?.as_str().parse().ok()?;
            let mac = parse_loose_mac(caps.get(2)?.as_str())?;
            Some(NeighborEntry { ip, mac })
        })
        .collect()
}

/// Accepts `:` or `-` separated octets that may omit a leading zero
/// (`0:1b:2c:3d:4e:5f` on BSD).
pub fn parse_loose_mac(s: &str) -> Option<MacAddress> {
    let parts: Vec<&str> = s.split([':', '-']).collect();
    if parts.len() != 6 {
        return None;
    }
    let mut octets = [0u8; 6];
    for (octet, part) in octets.iter_mut().zip(parts) {
        if part.is_empty() || part.len() > 2 {
            return None;
        }
        *octet = u8::from_str_radix(part, 16).ok()?;
    }
    Some(MacAddress::new(octets))
}

/// The neighbour table reader for the current platform.
pub fn system_neighbor_table() -> Box<dyn NeighborTable> {
    if cfg!(target_os = "linux") {
        Box::new(ProcNetArp::new())
    } else {
        Box::new(ArpCommand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_SAMPLE: &str = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.1.1      0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0
192.168.1.23     0x1         0x0         00:00:00:00:00:00     *        eth0
172.17.0.2       0x1         0x2         02:42:ac:11:00:02     *        docker0
";

    const LINUX_ARP_SAMPLE: &str = "\
Address                  HWtype  HWaddress           Flags Mask            Iface
192.168.1.1              ether   aa:bb:cc:dd:ee:ff   C                     eth0
192.168.1.7                      (incomplete)                              eth0
192.168.1.42             ether   00:11:22:33:44:55   C                     eth0
";

    const WINDOWS_ARP_SAMPLE: &str = "
Interface: 192.168.1.5 --- 0xb
  Internet Address      Physical Address      Type
  192.168.1.1           aa-bb-cc-dd-ee-ff     dynamic
  192.168.1.255         ff-ff-ff-ff-ff-ff     static
";

    const MACOS_ARP_SAMPLE: &str = "\
? (192.168.1.1) at aa:bb:cc:dd:ee:ff on en0 ifscope [ethernet]
? (192.168.1.9) at 0:1b:2c:3d:4e:5f on en0 ifscope [ethernet]
? (192.168.1.10) at (incomplete) on en0 ifscope [ethernet]
";

    #[test]
    fn test_parse_proc_net_arp() {
        let entries = parse_proc_net_arp(PROC_SAMPLE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ip, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(entries[0].mac.to_string(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(entries[1].ip, Ipv4Addr::new(172, 17, 0, 2));
    }

    #[test]
    fn test_parse_linux_arp() {
        let entries = parse_arp_output(LINUX_ARP_SAMPLE);
        let ips: Vec<_> = entries.iter().map(|e| e.ip.to_string()).collect();
        assert_eq!(ips, vec!["192.168.1.1", "192.168.1.42"]);
    }

    #[test]
    fn test_parse_windows_arp() {
        let entries = parse_arp_output(WINDOWS_ARP_SAMPLE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mac.to_string(), "AA:BB:CC:DD:EE:FF");
        assert!(entries[1].mac.is_broadcast());
    }

    #[test]
    fn test_parse_macos_arp() {
        let entries = parse_arp_output(MACOS_ARP_SAMPLE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].mac.to_string(), "00:1B:2C:3D:4E:5F");
    }

    #[test]
    fn test_parse_loose_mac_rejects_garbage() {
        assert!(parse_loose_mac("aa:bb:cc").is_none());
        assert!(parse_loose_mac("aaa:bb:cc:dd:ee:ff").is_none());
        assert!(parse_loose_mac("gg:bb:cc:dd:ee:ff").is_none());
    }

    #[tokio::test]
    async fn test_proc_table_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("arp");
        std::fs::write(&path, PROC_SAMPLE).unwrap();

        let table = ProcNetArp::at(path);
        assert_eq!(table.entries().await.unwrap().len(), 2);
        assert_eq!(
            table.lookup(Ipv4Addr::new(192, 168, 1, 1)).await,
            Some("AA:BB:CC:DD:EE:FF".parse().unwrap())
        );
        assert_eq!(table.lookup(Ipv4Addr::new(192, 168, 1, 2)).await, None);
    }

    #[tokio::test]
    async fn test_missing_proc_file_is_unavailable() {
        let table = ProcNetArp::at(PathBuf::from("/nonexistent/arp"));
        assert!(matches!(
            table.entries().await,
            Err(ScanError::Unavailable { .. })
        ));
    }
}
