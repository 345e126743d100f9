//! Single-echo liveness checks used by the ping sweep.

use std::net::{IpAddr, Ipv4Addr};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use surge_ping::{Client, Config, PingIdentifier, PingSequence};
use tokio::process::Command;

const PAYLOAD: [u8; 8] = [0; 8];

#[async_trait]
pub trait Pinger: Send + Sync {
    /// One echo request; `true` only if a reply arrived within `timeout`.
    async fn ping(&self, ip: Ipv4Addr, timeout: Duration) -> bool;
}

/// ICMP echo through `surge-ping`.
#[derive(Clone)]
pub struct IcmpPinger {
    client: Client,
}

impl IcmpPinger {
    /// Opens the ICMP socket. Must be called inside a Tokio runtime.
    pub fn new() -> std::io::Result<Self> {
        let client = Client::new(&Config::builder().build())?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Pinger for IcmpPinger {
    async fn ping(&self, ip: Ipv4Addr, timeout: Duration) -> bool {
        let mut pinger = self
            .client
            .pinger(IpAddr::V4(ip), PingIdentifier(rand::random()))
            .await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &PAYLOAD).await {
            Ok((_, rtt)) => {
                log::trace!("{} replied in {:?}", ip, rtt);
                true
            }
            Err(e) => {
                log::trace!("{} did not reply: {}", ip, e);
                false
            }
        }
    }
}

/// Shells out to the platform `ping` binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPinger;

impl SystemPinger {
    fn args(ip: Ipv4Addr, timeout: Duration) -> Vec<String> {
        if cfg!(windows) {
            vec![
                "-n".into(),
                "1".into(),
                "-w".into(),
                timeout.as_millis().max(1).to_string(),
                ip.to_string(),
            ]
        } else {
            // -W takes whole seconds on Linux
            let secs = timeout.as_secs_f64().ceil().max(1.0) as u64;
            vec![
                "-c".into(),
                "1".into(),
                "-W".into(),
                secs.to_string(),
                ip.to_string(),
            ]
        }
    }
}

#[async_trait]
impl Pinger for SystemPinger {
    async fn ping(&self, ip: Ipv4Addr, timeout: Duration) -> bool {
        let child = Command::new("ping")
            .args(Self::args(ip, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        match tokio::time::timeout(timeout + Duration::from_secs(1), child).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                log::debug!("Failed to run ping for {}: {}", ip, e);
                false
            }
            Err(_) => false,
        }
    }
}

/// ICMP when the OS lets us open the socket, otherwise the `ping` binary.
pub fn default_pinger() -> Arc<dyn Pinger> {
    match IcmpPinger::new() {
        Ok(pinger) => Arc::new(pinger),
        Err(e) => {
            log::debug!("ICMP socket unavailable ({}), using system ping", e);
            Arc::new(SystemPinger)
        }
    }
}
