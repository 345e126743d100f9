//! TCP reachability probe.
//!
//! A host counts as reachable when any of a fixed, ordered list of ports
//! accepts a connection. This is a heuristic: a host with all candidate
//! ports closed or filtered is reported offline even if it answers ping.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::settings::{Settings, DEFAULT_PROBE_PORTS};

/// Opens (and immediately drops) a TCP connection.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, addr: SocketAddr, connect_timeout: Duration) -> io::Result<()>;
}

/// Connector backed by `tokio::net::TcpStream`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioConnector;

#[async_trait]
impl Connector for TokioConnector {
    async fn connect(&self, addr: SocketAddr, connect_timeout: Duration) -> io::Result<()> {
        timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))?
            .map(drop)
    }
}

/// Answers "is this address reachable right now?".
#[async_trait]
pub trait Prober: Send + Sync {
    async fn is_reachable(&self, ip: Ipv4Addr) -> bool;
}

/// Probe parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub ports: Vec<u16>,
    pub connect_timeout: Duration,
    pub attempt_delay: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PROBE_PORTS.to_vec(),
            connect_timeout: Duration::from_millis(300),
            attempt_delay: Duration::from_millis(50),
        }
    }
}

impl From<&Settings> for ProbeConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            ports: settings.probe_ports.clone(),
            connect_timeout: settings.connect_timeout(),
            attempt_delay: settings.attempt_delay(),
        }
    }
}

/// Sequential port prober. Stops at the first port that accepts.
pub struct TcpProber<C = TokioConnector> {
    connector: C,
    config: ProbeConfig,
}

impl TcpProber<TokioConnector> {
    pub fn new(config: ProbeConfig) -> Self {
        Self::with_connector(TokioConnector, config)
    }
}

impl<C: Connector> TcpProber<C> {
    pub fn with_connector(connector: C, config: ProbeConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}

#[async_trait]
impl<C: Connector> Prober for TcpProber<C> {
    async fn is_reachable(&self, ip: Ipv4Addr) -> bool {
        let ports = &self.config.ports;

        for (i, &port) in ports.iter().enumerate() {
            let addr = SocketAddr::V4(SocketAddrV4::new(ip, port));
            match self.connector.connect(addr, self.config.connect_timeout).await {
                Ok(()) => {
                    log::debug!("{} reachable on port {}", ip, port);
                    return true;
                }
                Err(e) => {
                    log::trace!("{}:{} inconclusive: {}", ip, port, e);
                }
            }

            if i + 1 < ports.len() && !self.config.attempt_delay.is_zero() {
                tokio::time::sleep(self.config.attempt_delay).await;
            }
        }

        log::debug!("{} unreachable on all {} probe ports", ip, ports.len());
        false
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// Records every attempt; accepts only the configured ports.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedConnector {
        open: Arc<Mutex<HashSet<SocketAddr>>>,
        pub attempts: Arc<Mutex<Vec<SocketAddr>>>,
    }

    impl ScriptedConnector {
        pub(crate) fn open(&self, ip: Ipv4Addr, port: u16) {
            self.open
                .lock()
                .unwrap()
                .insert(SocketAddr::V4(SocketAddrV4::new(ip, port)));
        }

        pub(crate) fn close_all(&self) {
            self.open.lock().unwrap().clear();
        }

        pub(crate) fn attempted_ports(&self, ip: Ipv4Addr) -> Vec<u16> {
            self.attempts
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.ip() == std::net::IpAddr::V4(ip))
                .map(|a| a.port())
                .collect()
        }

        pub(crate) fn attempt_count(&self) -> usize {
            self.attempts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        async fn connect(&self, addr: SocketAddr, _timeout: Duration) -> io::Result<()> {
            self.attempts.lock().unwrap().push(addr);
            if self.open.lock().unwrap().contains(&addr) {
                Ok(())
            } else {
                Err(io::Error::from(io::ErrorKind::ConnectionRefused))
            }
        }
    }

    pub(crate) fn fast_config() -> ProbeConfig {
        ProbeConfig {
            attempt_delay: Duration::ZERO,
            ..ProbeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_open_port() {
        let ip = Ipv4Addr::new(192, 168, 1, 50);
        let connector = ScriptedConnector::default();
        connector.open(ip, 22);
        connector.open(ip, 3389);

        let prober = TcpProber::with_connector(connector.clone(), fast_config());
        assert!(prober.is_reachable(ip).await);
        assert_eq!(connector.attempted_ports(ip), vec![80, 443, 22]);
    }

    #[tokio::test]
    async fn test_all_closed_tries_every_port_in_order() {
        let ip = Ipv4Addr::new(10, 0, 0, 9);
        let connector = ScriptedConnector::default();

        let prober = TcpProber::with_connector(connector.clone(), fast_config());
        assert!(!prober.is_reachable(ip).await);
        assert_eq!(connector.attempted_ports(ip), vec![80, 443, 22, 3389, 135]);
    }

    #[tokio::test]
    async fn test_first_port_open_is_single_attempt() {
        let ip = Ipv4Addr::new(10, 0, 0, 1);
        let connector = ScriptedConnector::default();
        connector.open(ip, 80);

        let prober = TcpProber::with_connector(connector.clone(), ProbeConfig::default());
        assert!(prober.is_reachable(ip).await);
        assert_eq!(connector.attempt_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_failures() {
        let ip = Ipv4Addr::new(10, 0, 0, 2);
        let connector = ScriptedConnector::default();
        let config = ProbeConfig {
            ports: vec![1, 2, 3],
            connect_timeout: Duration::from_millis(10),
            attempt_delay: Duration::from_millis(40),
        };

        let prober = TcpProber::with_connector(connector, config);
        let start = tokio::time::Instant::now();
        assert!(!prober.is_reachable(ip).await);
        // Two gaps for three attempts, none after the last.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(80), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(120), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_real_listener_is_reachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = ProbeConfig {
            ports: vec![port],
            ..ProbeConfig::default()
        };
        let prober = TcpProber::new(config);
        assert!(prober.is_reachable(Ipv4Addr::LOCALHOST).await);
    }

    #[tokio::test]
    async fn test_refused_port_is_unreachable() {
        // Bind then drop to get a port with nothing listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let config = ProbeConfig {
            ports: vec![port],
            ..ProbeConfig::default()
        };
        let prober = TcpProber::new(config);
        assert!(!prober.is_reachable(Ipv4Addr::LOCALHOST).await);
    }
}
