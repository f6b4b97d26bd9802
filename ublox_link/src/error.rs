use thiserror::Error;

/// Error reported by a message payload codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid payload length of {packet}, expect {expect}, got {got}")]
    InvalidPayloadLen {
        packet: &'static str,
        expect: usize,
        got: usize,
    },
    #[error("invalid field {field} of packet {packet}")]
    InvalidField {
        packet: &'static str,
        field: &'static str,
    },
}

/// Error that possible while reading a frame from the buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// No complete frame at the current reader position
    #[error("no complete frame at the current position")]
    NotFound,
    /// The requested message type is not registered for this class / message id
    #[error("message type cannot decode {class_id:#04x} / {message_id:#06x}")]
    UnregisteredType { class_id: u8, message_id: u32 },
    #[error("not valid frame checksum, expect {expect:#x}, got {got:#x}")]
    InvalidChecksum { expect: u32, got: u32 },
    #[error("payload decoding failed: {0}")]
    Decode(#[from] DecodeError),
    /// Header, payload and checksum ranges of the variant do not fit the frame
    #[error("frame layout does not match the protocol variant")]
    InvalidLayout,
}

/// Error that possible while encoding a frame into an output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("not enough memory, frame needs {required} bytes but only {available} are left")]
    NotEnoughMem { required: usize, available: usize },
    #[error("payload of {0} bytes exceeds the maximum payload length")]
    PayloadTooLarge(usize),
    #[error("message id {0:#x} does not fit a single UBX id byte")]
    MessageIdOutOfRange(u32),
}

/// Error returned by a blocking wait for a message
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("timed out waiting for message")]
    Timeout,
    /// A matching frame arrived but could not be delivered
    #[error("matching frame could not be read: {0}")]
    Read(#[from] ReadError),
}
