//! Associates Rust message types with the `(class, id)` keys they decode from.

use alloc::{collections::BTreeMap, vec::Vec};
use core::any::TypeId;

use crate::{error::DecodeError, variant::MessageKey};

/// A message that can be decoded from the payload bytes of a frame.
///
/// `decode` receives exactly the bytes the reader hands out for the frame
/// (for UBX the payload, for Unicore the header from offset 3 plus payload).
pub trait Message: Sized + 'static {
    const CLASS_ID: u8;
    const MESSAGE_ID: u32;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError>;

    fn key() -> MessageKey {
        MessageKey::new(Self::CLASS_ID, Self::MESSAGE_ID)
    }
}

/// A message that can also be encoded, used by [`FrameWriter`](crate::FrameWriter)
pub trait MessageEncode: Message {
    /// Exact number of bytes `encode_payload` writes
    fn payload_len(&self) -> usize;

    /// `out` is exactly `payload_len()` bytes long
    fn encode_payload(&self, out: &mut [u8]);
}

/// Type-to-key table consulted by the reader before decoding.
///
/// A type may be registered under more than one key, for message families
/// that share a payload layout.
#[derive(Debug, Default, Clone)]
pub struct MessageRegistry {
    entries: BTreeMap<TypeId, Vec<MessageKey>>,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under its own `(CLASS_ID, MESSAGE_ID)`
    pub fn register<T: Message>(&mut self) -> &mut Self {
        self.add_key::<T>(T::CLASS_ID, T::MESSAGE_ID)
    }

    /// Register `T` under an additional key
    pub fn add_key<T: Message>(&mut self, class_id: u8, message_id: u32) -> &mut Self {
        let key = MessageKey::new(class_id, message_id);
        let keys = self.entries.entry(TypeId::of::<T>()).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
        self
    }

    pub fn can_decode<T: Message>(&self, class_id: u8, message_id: u32) -> bool {
        self.keys::<T>()
            .contains(&MessageKey::new(class_id, message_id))
    }

    pub fn keys<T: Message>(&self) -> &[MessageKey] {
        self.entries
            .get(&TypeId::of::<T>())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_registered<T: Message>(&self) -> bool {
        !self.keys::<T>().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
