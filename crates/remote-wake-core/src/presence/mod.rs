//! Device presence detection.
//!
//! A TCP port probe decides reachability; results are memoised in a TTL
//! cache that is committed to disk after each change.

pub mod cache;
pub mod detector;
pub mod probe;
pub mod store;

pub use cache::{Clock, StatusCache, SystemClock};
pub use detector::PresenceDetector;
pub use probe::{Connector, ProbeConfig, Prober, TcpProber, TokioConnector};
pub use store::{CacheStore, JsonCacheStore};
