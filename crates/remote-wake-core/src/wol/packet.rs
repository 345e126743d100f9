use crate::types::MacAddress;

const SYNC_LEN: usize = 6;
const REPEAT: usize = 16;

/// Total length of a magic packet: 6 sync bytes plus 16 copies of the MAC.
pub const MAGIC_PACKET_LEN: usize = SYNC_LEN + REPEAT * 6;

/// Wake-on-LAN magic packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicPacket {
    mac: MacAddress,
    bytes: [u8; MAGIC_PACKET_LEN],
}

impl MagicPacket {
    pub fn new(mac: MacAddress) -> Self {
        let mut bytes = [0xFF; MAGIC_PACKET_LEN];
        let octets = mac.octets();
        for chunk in bytes[SYNC_LEN..].chunks_exact_mut(6) {
            chunk.copy_from_slice(&octets);
        }
        Self { mac, bytes }
    }

    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let mac: MacAddress = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        let packet = MagicPacket::new(mac);
        let bytes = packet.as_bytes();

        assert_eq!(bytes.len(), 102);
        assert_eq!(&bytes[..6], &[0xFF; 6]);
        for copy in bytes[6..].chunks(6) {
            assert_eq!(copy, &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        }
    }

    #[test]
    fn test_zero_octets_are_kept() {
        let mac = MacAddress::new([0x00, 0x11, 0x00, 0x22, 0x00, 0x33]);
        let packet = MagicPacket::new(mac);
        assert_eq!(&packet.as_bytes()[96..], &mac.octets());
    }
}
