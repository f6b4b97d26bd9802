pub const UBX_SYNC_CHAR_1: u8 = 0xb5;
pub const UBX_SYNC_CHAR_2: u8 = 0x62;
pub(crate) const UBX_SYNC_SIZE: usize = 2;
pub(crate) const UBX_PAYLOAD_SIZE_LEN: usize = 2;
pub(crate) const UBX_CLASS_LEN: usize = 1;
pub(crate) const UBX_ID_LEN: usize = 1;
pub(crate) const UBX_HEADER_LEN: usize =
    UBX_SYNC_SIZE + UBX_PAYLOAD_SIZE_LEN + UBX_CLASS_LEN + UBX_ID_LEN;
pub(crate) const UBX_CHECKSUM_LEN: usize = 2;

pub(crate) const UBX_CLASS_OFFSET: usize = 2; // After SYNC_CHAR_1, SYNC_CHAR_2
pub(crate) const UBX_MSG_ID_OFFSET: usize = 3; // After CLASS
pub(crate) const UBX_LENGTH_OFFSET: usize = 4; // After MSG_ID

pub const UNICORE_SYNC_CHAR_1: u8 = 0xaa;
pub const UNICORE_SYNC_CHAR_2: u8 = 0x44;
/// Third sync byte of the 24-byte "OEM" header
pub const UNICORE_OEM_SYNC_CHAR_3: u8 = 0xb5;
/// Third sync byte of the 28-byte "BIN" header
pub const UNICORE_BIN_SYNC_CHAR_3: u8 = 0x12;
pub(crate) const UNICORE_SYNC3_OFFSET: usize = 2;
pub(crate) const UNICORE_MSG_ID_OFFSET: usize = 4;
pub(crate) const UNICORE_OEM_LENGTH_OFFSET: usize = 6;
pub(crate) const UNICORE_BIN_LENGTH_OFFSET: usize = 8;
pub(crate) const UNICORE_OEM_HEADER_LEN: usize = 24;
pub(crate) const UNICORE_BIN_HEADER_LEN: usize = 28;
pub(crate) const UNICORE_CRC_LEN: usize = 4;
// Payload handed to codecs starts right after the three sync bytes
pub(crate) const UNICORE_HEADER_SKIP: usize = 3;
// Length field is only read once the BIN length offset is covered
pub(crate) const UNICORE_MIN_LENGTH_PEEK: usize = 10;

/// Largest payload accepted by the default variants (receive buffer size minus header and checksum)
pub const MAX_PAYLOAD_LEN: usize = 8184;

pub const NMEA_SYNC_CHAR: u8 = 0x24; // '$'
pub const NMEA_END_CHAR: u8 = 0x0a; // '\n' (<LF>)

pub(crate) const UNUSED_DATA_CAPACITY: usize = 1024;
