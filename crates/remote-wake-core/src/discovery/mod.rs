//! LAN device discovery.
//!
//! Finds hosts on the local /24 by reading the neighbour cache, then with
//! `nmap`, then by a ping sweep, keeping the first non-empty result.

pub mod filter;
pub mod neighbor;
pub mod nmap;
pub mod ping;
pub mod service;
pub mod strategy;
pub mod subnet;

pub use filter::ScanFilter;
pub use neighbor::{system_neighbor_table, ArpCommand, NeighborEntry, NeighborTable, ProcNetArp};
pub use ping::{default_pinger, IcmpPinger, Pinger, SystemPinger};
pub use service::{Discovery, ScanOutcome};
pub use strategy::{ActiveScanStrategy, ArpTableStrategy, PingSweepStrategy, ScanStrategy};
pub use subnet::{LocalNetwork, Subnet};
