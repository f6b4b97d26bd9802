//! # ublox_link
//!
//! Frame-level plumbing for GNSS receivers speaking the u-blox UBX protocol or
//! the Unicore binary protocol: locating frames in a received byte stream,
//! validating their checksums, decoding them through user-supplied message
//! types and routing them to callbacks. Payload layouts are not part of this
//! crate; they are supplied by implementing [`Message`] (and [`MessageEncode`]
//! for frames you want to send).
//!
//! Reading Frames
//! ==============
//!
//! A [`FrameReader`] walks a byte slice for one [`ProtocolVariant`]. Types must
//! be listed in a [`MessageRegistry`] for the keys they decode:
//! ```
//! use ublox_link::{DecodeError, FrameReader, Message, MessageRegistry, ProtocolVariant};
//!
//! struct AckAck {
//!     class: u8,
//!     msg_id: u8,
//! }
//!
//! impl Message for AckAck {
//!     const CLASS_ID: u8 = 0x05;
//!     const MESSAGE_ID: u32 = 0x01;
//!
//!     fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
//!         match payload {
//!             [class, msg_id] => Ok(Self { class: *class, msg_id: *msg_id }),
//!             _ => Err(DecodeError::InvalidPayloadLen { packet: "AckAck", expect: 2, got: payload.len() }),
//!         }
//!     }
//! }
//!
//! let mut registry = MessageRegistry::new();
//! registry.register::<AckAck>();
//!
//! let data = [0x00, 0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38];
//! let mut reader = FrameReader::new(&data, ProtocolVariant::UBX, &registry);
//! let ack = reader.read::<AckAck>(true).unwrap();
//! assert_eq!((ack.class, ack.msg_id), (0x06, 0x01));
//! assert_eq!(reader.unused_data(), &[0x00]);
//! ```
//!
//! Writing Frames
//! ==============
//!
//! [`FrameWriter`] appends UBX frames to caller storage:
//! ```
//! let mut buf = [0u8; 16];
//! let mut writer = ublox_link::FrameWriter::new(&mut buf);
//! // Poll CFG-RATE
//! assert_eq!(writer.write_raw(&[], 0x06, 0x08), Ok(8));
//! assert_eq!(writer.written(), &[0xb5, 0x62, 0x06, 0x08, 0x00, 0x00, 0x0e, 0x30]);
//! ```
//!
//! Dispatching
//! ===========
//!
//! With the `std` feature, [`CallbackHub`] owns the registry and the callbacks.
//! The transport hands it every chunk it reads, consumers subscribe or block
//! in [`CallbackHub::wait_for`] from other threads.
//!
//! no_std Support
//! ==============
//!
//! Without the `std` feature the reader, the writer and the receive buffers
//! are available on any target with an allocator.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
extern crate core;

pub use crate::{
    buffer::{FixedBuffer, FixedLinearBuffer, UnderlyingBuffer},
    checksum::{ubx_checksum, unicore_crc32, UbxChecksumCalc, CRC_32_UNICORE},
    constants::{
        MAX_PAYLOAD_LEN, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2, UNICORE_BIN_SYNC_CHAR_3,
        UNICORE_OEM_SYNC_CHAR_3, UNICORE_SYNC_CHAR_1, UNICORE_SYNC_CHAR_2,
    },
    error::{DecodeError, ReadError, WriteError},
    nmea::{sentences, Sentences},
    reader::FrameReader,
    registry::{Message, MessageEncode, MessageRegistry},
    variant::{MessageKey, Protocol, ProtocolVariant, UnicoreHeader},
    writer::{encode_frame, FrameWriter},
};

#[cfg(feature = "std")]
pub use crate::{
    capture::RawCapture,
    dispatch::{CallbackHub, CallbackHubBuilder, FrameHandler, HandlerId},
    error::WaitError,
};

mod buffer;
#[cfg(feature = "std")]
mod capture;
mod checksum;
mod constants;
#[cfg(feature = "std")]
mod dispatch;
mod error;
mod nmea;
mod reader;
mod registry;
mod variant;
mod writer;
