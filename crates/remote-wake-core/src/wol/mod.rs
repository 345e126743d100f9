//! Wake-on-LAN magic packets.

pub mod packet;
pub mod sender;

pub use packet::{MagicPacket, MAGIC_PACKET_LEN};
pub use sender::{create_broadcast_socket, PacketSender, UdpBroadcastSender};

use crate::error::WakeError;
use crate::types::MacAddress;

/// Parse `raw_mac` and send one magic packet for it.
///
/// A malformed address is rejected before anything is sent.
pub async fn wake(sender: &dyn PacketSender, raw_mac: &str) -> Result<MacAddress, WakeError> {
    let mac: MacAddress = raw_mac.parse()?;
    sender.send(&MagicPacket::new(mac)).await?;
    log::info!("Magic packet sent to {}", mac);
    Ok(mac)
}
