use alloc::{vec, vec::Vec};

use crate::{
    checksum::ubx_checksum,
    constants::{
        MAX_PAYLOAD_LEN, UBX_CHECKSUM_LEN, UBX_HEADER_LEN, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2,
        UBX_SYNC_SIZE,
    },
    error::WriteError,
    registry::MessageEncode,
};

/// Appends UBX frames to a caller-provided output buffer.
///
/// Every successful write appends one complete frame after the previous ones.
/// A failed write leaves the buffer contents and the cursor as they were.
#[derive(Debug)]
pub struct FrameWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FrameWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Encode `msg` under its own class and message id, returns the frame length
    pub fn write<T: MessageEncode>(&mut self, msg: &T) -> Result<usize, WriteError> {
        self.write_with_id(msg, T::CLASS_ID, T::MESSAGE_ID)
    }

    /// Encode `msg` under an explicit key, for families sharing one payload layout
    pub fn write_with_id<T: MessageEncode>(
        &mut self,
        msg: &T,
        class_id: u8,
        message_id: u32,
    ) -> Result<usize, WriteError> {
        self.write_frame(class_id, message_id, msg.payload_len(), |out| {
            msg.encode_payload(out)
        })
    }

    /// Wrap already encoded payload bytes into a frame
    pub fn write_raw(
        &mut self,
        payload: &[u8],
        class_id: u8,
        message_id: u32,
    ) -> Result<usize, WriteError> {
        self.write_frame(class_id, message_id, payload.len(), |out| {
            out.copy_from_slice(payload)
        })
    }

    /// All frames written so far
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn write_frame(
        &mut self,
        class_id: u8,
        message_id: u32,
        payload_len: usize,
        fill: impl FnOnce(&mut [u8]),
    ) -> Result<usize, WriteError> {
        let message_id = u8::try_from(message_id)
            .map_err(|_| WriteError::MessageIdOutOfRange(message_id))?;
        if payload_len > MAX_PAYLOAD_LEN {
            return Err(WriteError::PayloadTooLarge(payload_len));
        }
        let frame_len = payload_len + UBX_HEADER_LEN + UBX_CHECKSUM_LEN;
        if frame_len > self.remaining() {
            return Err(WriteError::NotEnoughMem {
                required: frame_len,
                available: self.remaining(),
            });
        }

        let frame = &mut self.buf[self.pos..self.pos + frame_len];
        let payload_end = UBX_HEADER_LEN + payload_len;
        fill(&mut frame[UBX_HEADER_LEN..payload_end]);

        let len_bytes = (payload_len as u16).to_le_bytes();
        frame[..UBX_HEADER_LEN].copy_from_slice(&[
            UBX_SYNC_CHAR_1,
            UBX_SYNC_CHAR_2,
            class_id,
            message_id,
            len_bytes[0],
            len_bytes[1],
        ]);
        let (ck_a, ck_b) = ubx_checksum(&frame[UBX_SYNC_SIZE..payload_end]);
        frame[payload_end] = ck_a;
        frame[payload_end + 1] = ck_b;

        self.pos += frame_len;
        Ok(frame_len)
    }
}

/// Encode `msg` into a freshly allocated frame
pub fn encode_frame<T: MessageEncode>(msg: &T) -> Result<Vec<u8>, WriteError> {
    let mut out = vec![0u8; msg.payload_len() + UBX_HEADER_LEN + UBX_CHECKSUM_LEN];
    FrameWriter::new(&mut out).write(msg)?;
    Ok(out)
}
