//! Wire parameters of the two supported framings.
//!
//! The differences between UBX and Unicore binary frames are pure data
//! (sync bytes, header lengths, field offsets, checksum width), so a single
//! [`FrameReader`](crate::FrameReader) is parameterized by a [`ProtocolVariant`]
//! value instead of having one reader type per protocol.

use log::warn;

use crate::constants::{
    MAX_PAYLOAD_LEN, UBX_CHECKSUM_LEN, UBX_CLASS_OFFSET, UBX_HEADER_LEN, UBX_LENGTH_OFFSET,
    UBX_MSG_ID_OFFSET, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2, UNICORE_BIN_HEADER_LEN,
    UNICORE_BIN_LENGTH_OFFSET, UNICORE_BIN_SYNC_CHAR_3, UNICORE_CRC_LEN, UNICORE_HEADER_SKIP,
    UNICORE_MIN_LENGTH_PEEK, UNICORE_MSG_ID_OFFSET, UNICORE_OEM_HEADER_LEN,
    UNICORE_OEM_LENGTH_OFFSET, UNICORE_OEM_SYNC_CHAR_3, UNICORE_SYNC3_OFFSET, UNICORE_SYNC_CHAR_1,
    UNICORE_SYNC_CHAR_2,
};

/// Identity under which registry entries and handlers are indexed.
///
/// Message ids are widened to 32 bits so UBX (one byte) and Unicore (two bytes)
/// ids share one key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageKey {
    pub class_id: u8,
    pub message_id: u32,
}

impl MessageKey {
    pub const fn new(class_id: u8, message_id: u32) -> Self {
        Self {
            class_id,
            message_id,
        }
    }
}

impl core::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:02x} / 0x{:04x}", self.class_id, self.message_id)
    }
}

/// Framing family of a [`ProtocolVariant`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Protocol {
    /// u-blox UBX: 6-byte header, 2-byte running-sum checksum
    Ubx,
    /// Unicore binary: 24 or 28-byte header, 4-byte CRC-32
    Unicore,
}

/// Unicore header flavour, selected by the third sync byte of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnicoreHeader {
    /// `AA 44 B5`, 24-byte header, length at offset 6
    Oem,
    /// `AA 44 12`, 28-byte header, length at offset 8
    Bin,
}

impl UnicoreHeader {
    pub const fn from_sync_char(sync3: u8) -> Option<Self> {
        match sync3 {
            UNICORE_OEM_SYNC_CHAR_3 => Some(Self::Oem),
            UNICORE_BIN_SYNC_CHAR_3 => Some(Self::Bin),
            _ => None,
        }
    }

    pub const fn sync_char(self) -> u8 {
        match self {
            Self::Oem => UNICORE_OEM_SYNC_CHAR_3,
            Self::Bin => UNICORE_BIN_SYNC_CHAR_3,
        }
    }

    pub const fn header_len(self) -> usize {
        match self {
            Self::Oem => UNICORE_OEM_HEADER_LEN,
            Self::Bin => UNICORE_BIN_HEADER_LEN,
        }
    }

    pub const fn length_offset(self) -> usize {
        match self {
            Self::Oem => UNICORE_OEM_LENGTH_OFFSET,
            Self::Bin => UNICORE_BIN_LENGTH_OFFSET,
        }
    }
}

/// Immutable description of one framing.
///
/// Only the two canonical framings exist, [`ProtocolVariant::UBX`] and
/// [`ProtocolVariant::UNICORE`]; the maximum accepted payload length is the one
/// adjustable parameter. The layout fields are private so that a variant always
/// agrees with the offsets the reader uses.
///
/// For [`Protocol::Unicore`] `header_length` is only the fallback used while the
/// header flavour byte is unknown; the effective length is re-derived from every
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "VariantConfig", into = "VariantConfig")
)]
pub struct ProtocolVariant {
    protocol: Protocol,
    sync_a: u8,
    sync_b: u8,
    header_length: usize,
    checksum_length: usize,
    /// Offset into the header where the bytes handed to payload codecs begin
    header_skip: usize,
    max_payload_length: usize,
}

/// Serialized form of a [`ProtocolVariant`]: the framing and its payload limit
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct VariantConfig {
    protocol: Protocol,
    max_payload_length: usize,
}

#[cfg(feature = "serde")]
impl From<VariantConfig> for ProtocolVariant {
    fn from(config: VariantConfig) -> Self {
        Self::for_protocol(config.protocol).with_max_payload_length(config.max_payload_length)
    }
}

#[cfg(feature = "serde")]
impl From<ProtocolVariant> for VariantConfig {
    fn from(variant: ProtocolVariant) -> Self {
        Self {
            protocol: variant.protocol,
            max_payload_length: variant.max_payload_length,
        }
    }
}

impl Default for ProtocolVariant {
    fn default() -> Self {
        Self::UBX
    }
}

impl ProtocolVariant {
    pub const UBX: Self = Self {
        protocol: Protocol::Ubx,
        sync_a: UBX_SYNC_CHAR_1,
        sync_b: UBX_SYNC_CHAR_2,
        header_length: UBX_HEADER_LEN,
        checksum_length: UBX_CHECKSUM_LEN,
        header_skip: UBX_HEADER_LEN,
        max_payload_length: MAX_PAYLOAD_LEN,
    };

    pub const UNICORE: Self = Self {
        protocol: Protocol::Unicore,
        sync_a: UNICORE_SYNC_CHAR_1,
        sync_b: UNICORE_SYNC_CHAR_2,
        header_length: UNICORE_BIN_HEADER_LEN,
        checksum_length: UNICORE_CRC_LEN,
        header_skip: UNICORE_HEADER_SKIP,
        max_payload_length: MAX_PAYLOAD_LEN,
    };

    /// Canonical variant of `protocol` with the default payload limit
    pub const fn for_protocol(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Ubx => Self::UBX,
            Protocol::Unicore => Self::UNICORE,
        }
    }

    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub const fn sync_a(&self) -> u8 {
        self.sync_a
    }

    pub const fn sync_b(&self) -> u8 {
        self.sync_b
    }

    /// Header length assumed when the frame does not say otherwise
    pub const fn header_length(&self) -> usize {
        self.header_length
    }

    pub const fn checksum_length(&self) -> usize {
        self.checksum_length
    }

    pub const fn header_skip(&self) -> usize {
        self.header_skip
    }

    pub const fn max_payload_length(&self) -> usize {
        self.max_payload_length
    }

    #[must_use]
    pub const fn with_max_payload_length(mut self, max_payload_length: usize) -> Self {
        self.max_payload_length = max_payload_length;
        self
    }

    /// Header plus checksum length for the frame starting at `frame[0]`
    pub fn wrapper_length(&self, frame: &[u8]) -> usize {
        self.header_length_of(frame) + self.checksum_length
    }

    /// Unicore header flavour of the frame starting at `frame[0]`, if readable
    pub fn unicore_header(&self, frame: &[u8]) -> Option<UnicoreHeader> {
        match self.protocol {
            Protocol::Ubx => None,
            Protocol::Unicore => frame
                .get(UNICORE_SYNC3_OFFSET)
                .and_then(|sync3| UnicoreHeader::from_sync_char(*sync3)),
        }
    }

    pub fn header_length_of(&self, frame: &[u8]) -> usize {
        match self.unicore_header(frame) {
            Some(header) => header.header_len(),
            None => self.header_length,
        }
    }

    /// Declared payload length, or 0 while the length field is not yet in `frame`
    pub fn payload_length(&self, frame: &[u8]) -> usize {
        match self.protocol {
            Protocol::Ubx => {
                if frame.len() < UBX_HEADER_LEN {
                    return 0;
                }
                read_le16(frame, UBX_LENGTH_OFFSET)
            }
            Protocol::Unicore => {
                if frame.len() < UNICORE_MIN_LENGTH_PEEK {
                    return 0;
                }
                match self.unicore_header(frame) {
                    Some(header) => read_le16(frame, header.length_offset()),
                    None => {
                        warn!(
                            "unicore frame with unknown header flavour 0x{:02x}",
                            frame[UNICORE_SYNC3_OFFSET]
                        );
                        0
                    }
                }
            }
        }
    }

    /// For Unicore this is the header flavour byte, which keeps OEM and BIN ids apart
    pub fn class_id(&self, frame: &[u8]) -> u8 {
        frame.get(UBX_CLASS_OFFSET).copied().unwrap_or_default()
    }

    pub fn message_id(&self, frame: &[u8]) -> u32 {
        match self.protocol {
            Protocol::Ubx => frame
                .get(UBX_MSG_ID_OFFSET)
                .map(|id| u32::from(*id))
                .unwrap_or_default(),
            Protocol::Unicore => {
                if frame.len() < UNICORE_MSG_ID_OFFSET + 2 || self.unicore_header(frame).is_none() {
                    return 0;
                }
                read_le16(frame, UNICORE_MSG_ID_OFFSET) as u32
            }
        }
    }

    /// Range of a complete frame handed to the payload codec
    pub(crate) fn payload_range(&self, header_len: usize, payload_len: usize) -> core::ops::Range<usize> {
        let start = match self.protocol {
            Protocol::Ubx => header_len,
            Protocol::Unicore => self.header_skip,
        };
        start..header_len + payload_len
    }
}

fn read_le16(frame: &[u8], offset: usize) -> usize {
    usize::from(u16::from_le_bytes([frame[offset], frame[offset + 1]]))
}
