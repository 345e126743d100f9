use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use super::packet::MagicPacket;
use crate::error::WakeError;
use crate::settings::DEFAULT_WAKE_TARGET;

#[async_trait]
pub trait PacketSender: Send + Sync {
    async fn send(&self, packet: &MagicPacket) -> Result<(), WakeError>;
}

/// Create a UDP socket allowed to send to broadcast addresses.
pub fn create_broadcast_socket() -> Result<std::net::UdpSocket, std::io::Error> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    socket.set_broadcast(true)?;

    let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
    socket.bind(&addr.into())?;

    socket.set_nonblocking(true)?;

    Ok(socket.into())
}

/// Sends each packet as a single UDP datagram to a fixed target.
#[derive(Debug, Clone, Copy)]
pub struct UdpBroadcastSender {
    target: SocketAddrV4,
}

impl UdpBroadcastSender {
    pub fn new(target: SocketAddrV4) -> Self {
        Self { target }
    }

    pub fn target(&self) -> SocketAddrV4 {
        self.target
    }
}

impl Default for UdpBroadcastSender {
    fn default() -> Self {
        Self::new(DEFAULT_WAKE_TARGET)
    }
}

#[async_trait]
impl PacketSender for UdpBroadcastSender {
    async fn send(&self, packet: &MagicPacket) -> Result<(), WakeError> {
        let send_err = |source| WakeError::Send {
            target: self.target.to_string(),
            source,
        };

        let socket = create_broadcast_socket()
            .and_then(UdpSocket::from_std)
            .map_err(send_err)?;
        let sent = socket
            .send_to(packet.as_bytes(), SocketAddr::V4(self.target))
            .await
            .map_err(send_err)?;

        log::debug!("Sent {} byte magic packet for {} to {}", sent, packet.mac(), self.target);
        Ok(())
    }
}
