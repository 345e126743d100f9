//! CLI argument definitions using clap.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// remote-wake - wake and monitor devices on the local network
#[derive(Parser, Debug)]
#[command(name = "remote-wake")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding config.json and status_cache.json
    #[arg(long, global = true, env = "REMOTE_WAKE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage registered devices
    Devices(DevicesArgs),

    /// Send a Wake-on-LAN packet
    Wake(WakeArgs),

    /// Show whether devices are online
    Status(StatusArgs),

    /// Scan the local network for devices
    Scan(ScanArgs),
}

// ==================== Devices ====================

#[derive(Args, Debug)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommands,
}

#[derive(Subcommand, Debug)]
pub enum DevicesCommands {
    /// List registered devices
    List,

    /// Register a new device
    Add(DeviceAddArgs),

    /// Change a registered device
    Edit(DeviceEditArgs),

    /// Remove a registered device
    Remove(DeviceRemoveArgs),
}

#[derive(Args, Debug)]
pub struct DeviceAddArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Hardware address (AA:BB:CC:DD:EE:FF)
    #[arg(long)]
    pub mac: String,

    /// IPv4 address used for status checks
    #[arg(long)]
    pub ip: String,
}

#[derive(Args, Debug)]
pub struct DeviceEditArgs {
    /// Device id, id prefix, name, IP or MAC
    pub target: String,

    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New hardware address
    #[arg(long)]
    pub mac: Option<String>,

    /// New IPv4 address
    #[arg(long)]
    pub ip: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeviceRemoveArgs {
    /// Device id, id prefix, name, IP or MAC
    pub target: String,
}

// ==================== Wake ====================

#[derive(Args, Debug)]
pub struct WakeArgs {
    /// Registered device (id, name, IP or MAC) or a raw MAC address
    pub target: String,
}

// ==================== Status ====================

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Registered device, an IPv4 address, or "all"
    #[arg(default_value = "all")]
    pub target: String,

    /// Probe even when a fresh cached result exists
    #[arg(short, long)]
    pub force: bool,

    /// Overall deadline for "all" in milliseconds (default from settings)
    #[arg(long)]
    pub deadline_ms: Option<u64>,
}

// ==================== Scan ====================

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// First host suffix for the ping sweep
    #[arg(long)]
    pub start: Option<u8>,

    /// Last host suffix for the ping sweep
    #[arg(long)]
    pub end: Option<u8>,

    /// Register the discovered device with this IP
    #[arg(long, requires = "name")]
    pub add: Option<Ipv4Addr>,

    /// Name for the device registered with --add
    #[arg(long, requires = "add")]
    pub name: Option<String>,
}
