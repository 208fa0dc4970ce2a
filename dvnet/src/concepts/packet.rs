use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::address::{Address, ADDRESS_WIDTH};
use crate::feedback::PacketError;

/// Destination field followed by the one byte kind discriminator.
pub const HEADER_LEN: usize = ADDRESS_WIDTH + 1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PacketKind {
    /// end-to-end payload between hosts
    Data,
    /// a routing advertisement between routers
    Control,
}

impl PacketKind {
    pub fn discriminator(self) -> u8 {
        match self {
            PacketKind::Data => b'1',
            PacketKind::Control => b'2',
        }
    }

    pub fn from_discriminator(byte: u8) -> Result<Self, PacketError> {
        match byte {
            b'1' => Ok(PacketKind::Data),
            b'2' => Ok(PacketKind::Control),
            other => Err(PacketError::UnknownKind(other)),
        }
    }
}

/// A network layer packet.
///
/// Wire layout: `[destination: 5 bytes, zero padded][kind: '1' | '2'][payload]`.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkPacket {
    pub destination: Address,
    pub kind: PacketKind,
    pub payload: Vec<u8>,
}

impl NetworkPacket {
    pub fn data(destination: Address, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            destination,
            kind: PacketKind::Data,
            payload: payload.into(),
        }
    }

    /// Control packets always go to the broadcast address, the receiving router
    /// consumes them regardless.
    pub fn control(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            destination: Address::broadcast(),
            kind: PacketKind::Control,
            payload: payload.into(),
        }
    }

    /// Never fails: a constructed [`Address`] always fits the destination field.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.payload.len());
        bytes.extend_from_slice(&self.destination.to_field());
        bytes.push(self.kind.discriminator());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < HEADER_LEN {
            return Err(PacketError::TooShort {
                len: bytes.len(),
                header: HEADER_LEN,
            });
        }
        let destination = Address::from_field(&bytes[..ADDRESS_WIDTH])?;
        let kind = PacketKind::from_discriminator(bytes[ADDRESS_WIDTH])?;
        Ok(Self {
            destination,
            kind,
            payload: bytes[HEADER_LEN..].to_vec(),
        })
    }
}

impl Display for NetworkPacket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.encode()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_packet_layout() {
        let packet = NetworkPacket::data(Address::new("H3").unwrap(), "hello");
        assert_eq!(packet.encode(), b"000H31hello".to_vec());
        assert_eq!(NetworkPacket::decode(b"000H31hello").unwrap(), packet);
    }

    #[test]
    fn control_packet_round_trip() {
        let packet = NetworkPacket::control("A///B/0/1//");
        let bytes = packet.encode();
        assert_eq!(&bytes[..HEADER_LEN], b"000002");
        assert_eq!(NetworkPacket::decode(&bytes).unwrap(), packet);
    }

    #[test]
    fn empty_payload_is_valid() {
        let packet = NetworkPacket::data(Address::new("7").unwrap(), Vec::new());
        assert_eq!(NetworkPacket::decode(&packet.encode()).unwrap(), packet);
    }

    #[test]
    fn every_address_width_kind_and_payload_survives() {
        let names = ["A", "9", "H1", "R12", "1270", "abcde", "99999", "Z0000"];
        let payloads: [&[u8]; 5] = [
            b"",
            b"0",
            b"00000",
            b"A///B/0/1//",
            &[0xff, 0x00, b'/', 0xfe],
        ];
        for name in names {
            for kind in [PacketKind::Data, PacketKind::Control] {
                for payload in payloads {
                    let packet = NetworkPacket {
                        destination: Address::new(name).unwrap(),
                        kind,
                        payload: payload.to_vec(),
                    };
                    let bytes = packet.encode();
                    assert_eq!(bytes.len(), HEADER_LEN + payload.len());
                    let decoded = NetworkPacket::decode(&bytes).unwrap();
                    assert_eq!(decoded, packet, "{name} {payload:?}");
                }
            }
        }
        let broadcast = NetworkPacket::control(vec![0xff, b'/']);
        assert_eq!(NetworkPacket::decode(&broadcast.encode()).unwrap(), broadcast);
    }

    #[test]
    fn unknown_discriminator_is_rejected() {
        assert_eq!(
            NetworkPacket::decode(b"000H13payload"),
            Err(PacketError::UnknownKind(b'3'))
        );
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert_eq!(
            NetworkPacket::decode(b"000H"),
            Err(PacketError::TooShort { len: 4, header: HEADER_LEN })
        );
    }

    #[test]
    fn garbage_destination_is_rejected() {
        assert!(matches!(
            NetworkPacket::decode(b"0/#H11x"),
            Err(PacketError::BadAddress(_))
        ));
    }
}
