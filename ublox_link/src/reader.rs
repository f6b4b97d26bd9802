use alloc::vec::Vec;

use log::{trace, warn};

use crate::{
    checksum::{unicore_crc32, UbxChecksumCalc},
    constants::{UBX_SYNC_SIZE, UNUSED_DATA_CAPACITY},
    error::ReadError,
    registry::{Message, MessageRegistry},
    variant::{MessageKey, Protocol, ProtocolVariant},
};

/// Cursor over a received byte buffer that locates and validates frames of one
/// [`ProtocolVariant`].
///
/// The reader never copies or mutates the buffer. It moves between two states:
/// searching for a sync pattern, and sitting on a complete frame (after
/// [`found`](Self::found) returned `true`). [`search`](Self::search) on a found
/// frame first steps past it.
///
/// Header accessors (`length`, `class_id`, `message_id`, ...) read whatever
/// bytes are at the cursor; they only describe a real frame once `found()`
/// holds.
pub struct FrameReader<'a> {
    data: &'a [u8],
    pos: usize,
    found: bool,
    variant: ProtocolVariant,
    registry: &'a MessageRegistry,
    unused: Vec<u8>,
}

impl<'a> FrameReader<'a> {
    pub fn new(data: &'a [u8], variant: ProtocolVariant, registry: &'a MessageRegistry) -> Self {
        Self {
            data,
            pos: 0,
            found: false,
            variant,
            registry,
            unused: Vec::with_capacity(UNUSED_DATA_CAPACITY.min(data.len())),
        }
    }

    pub fn variant(&self) -> &ProtocolVariant {
        &self.variant
    }

    /// Advance to the next frame start candidate and return its offset, or
    /// [`end`](Self::end) once the buffer is exhausted.
    ///
    /// Skipped bytes are collected into [`unused_data`](Self::unused_data).
    /// A candidate whose declared length exceeds the variant maximum is a false
    /// sync match and is skipped like any other byte.
    pub fn search(&mut self) -> usize {
        if self.found {
            self.next();
        }

        while self.pos < self.data.len() {
            let cur = &self.data[self.pos..];
            let (sync_a, sync_b) = (self.variant.sync_a(), self.variant.sync_b());
            if cur[0] == sync_a && (cur.len() == 1 || cur[1] == sync_b) {
                let length = self.variant.payload_length(cur);
                let max = self.variant.max_payload_length();
                if length <= max {
                    break;
                }
                warn!(
                    "skipping sync match at {} with oversized payload length {} (max {})",
                    self.pos, length, max
                );
            }
            self.unused.push(cur[0]);
            self.pos += 1;
        }
        self.pos
    }

    /// Whether a complete frame (header, declared payload and checksum) starts at
    /// the cursor
    pub fn found(&mut self) -> bool {
        if !self.found {
            self.found = self.is_complete();
        }
        self.found
    }

    /// Step past the current frame. Without a complete frame at the cursor the
    /// position is left untouched.
    pub fn next(&mut self) {
        if self.found() {
            self.pos += self.frame_len();
        }
        self.found = false;
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn end(&self) -> usize {
        self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn class_id(&self) -> u8 {
        self.variant.class_id(self.cursor())
    }

    pub fn message_id(&self) -> u32 {
        self.variant.message_id(self.cursor())
    }

    pub fn key(&self) -> MessageKey {
        MessageKey::new(self.class_id(), self.message_id())
    }

    /// Declared payload length
    pub fn length(&self) -> usize {
        self.variant.payload_length(self.cursor())
    }

    pub fn header_length(&self) -> usize {
        self.variant.header_length_of(self.cursor())
    }

    /// Little-endian trailer following the payload, 0 if it is not in the buffer yet
    pub fn checksum(&self) -> u32 {
        let start = self.header_length() + self.length();
        let Some(trailer) = self
            .cursor()
            .get(start..start + self.variant.checksum_length())
        else {
            return 0;
        };
        trailer
            .iter()
            .rev()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte))
    }

    /// The complete frame at the cursor, sync bytes through checksum
    pub fn frame(&self) -> Option<&'a [u8]> {
        if !self.is_complete() {
            return None;
        }
        Some(&self.data[self.pos..self.pos + self.frame_len()])
    }

    /// Bytes handed to [`Message::decode`] for the frame at the cursor
    pub fn payload(&self) -> Option<&'a [u8]> {
        self.frame()?
            .get(self.variant.payload_range(self.header_length(), self.length()))
    }

    /// Decode the frame at the cursor as `T`.
    ///
    /// With `auto_search` the reader first moves to the next candidate. The
    /// frame is validated against the registry and its checksum before the
    /// payload reaches `T::decode`. The cursor is never advanced past the frame,
    /// so several handlers can read the same frame.
    pub fn read<T: Message>(&mut self, auto_search: bool) -> Result<T, ReadError> {
        if auto_search {
            self.search();
        }
        if !self.found() {
            return Err(ReadError::NotFound);
        }

        let class_id = self.class_id();
        let message_id = self.message_id();
        if !self.registry.can_decode::<T>(class_id, message_id) {
            return Err(ReadError::UnregisteredType {
                class_id,
                message_id,
            });
        }

        if let Err(err) = self.validate_checksum() {
            warn!("dropping frame {}: {}", self.key(), err);
            return Err(err);
        }

        let payload = self.payload().ok_or(ReadError::InvalidLayout)?;
        T::decode(payload).map_err(|err| {
            warn!("failed to decode frame {}: {}", self.key(), err);
            ReadError::from(err)
        })
    }

    /// Whether the frame at the cursor is complete and `T` is registered for its key
    pub fn has_type<T: Message>(&mut self) -> bool {
        self.found()
            && self
                .registry
                .can_decode::<T>(self.class_id(), self.message_id())
    }

    pub fn is_message(&mut self, class_id: u8, message_id: u32) -> bool {
        self.found() && self.class_id() == class_id && self.message_id() == message_id
    }

    /// Bytes skipped so far that did not start a frame
    pub fn unused_data(&self) -> &[u8] {
        &self.unused
    }

    /// Recompute the checksum of the frame at the cursor and compare it with the trailer
    pub fn validate_checksum(&self) -> Result<(), ReadError> {
        let Some(frame) = self.frame() else {
            return Err(ReadError::NotFound);
        };
        let end = self.header_length() + self.length();
        match self.variant.protocol() {
            Protocol::Ubx => {
                let (Some(body), Some(&[ck_a, ck_b])) =
                    (frame.get(UBX_SYNC_SIZE..end), frame.get(end..end + 2))
                else {
                    return Err(ReadError::InvalidLayout);
                };
                let mut calc = UbxChecksumCalc::new();
                calc.update(body);
                calc.validate_result(ck_a, ck_b)
            }
            Protocol::Unicore => {
                let body = frame.get(..end).ok_or(ReadError::InvalidLayout)?;
                let got = unicore_crc32(body);
                let expect = self.checksum();
                if got == expect {
                    Ok(())
                } else {
                    Err(ReadError::InvalidChecksum { expect, got })
                }
            }
        }
    }

    fn cursor(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn frame_len(&self) -> usize {
        self.length() + self.variant.wrapper_length(self.cursor())
    }

    fn is_complete(&self) -> bool {
        let cur = self.cursor();
        let wrapper = self.variant.wrapper_length(cur);
        let complete = cur.len() >= wrapper
            && cur.first() == Some(&self.variant.sync_a())
            && cur.get(1) == Some(&self.variant.sync_b())
            && cur.len() >= self.length() + wrapper;
        if !complete && cur.len() >= wrapper {
            trace!(
                "incomplete frame at {}: {} of {} bytes",
                self.pos,
                cur.len(),
                self.length() + wrapper
            );
        }
        complete
    }
}

impl core::fmt::Debug for FrameReader<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameReader")
            .field("pos", &self.pos)
            .field("end", &self.data.len())
            .field("found", &self.found)
            .field("protocol", &self.variant.protocol())
            .field("unused", &self.unused.len())
            .finish()
    }
}
