use crc::{Algorithm, Crc};

use crate::error::ReadError;

/// Unicore binary frames use the reflected 0xEDB88320 table with a zero
/// initial value and no final xor, so the result differs from the zlib CRC-32
pub const CRC_32_UNICORE: Algorithm<u32> = Algorithm {
    width: 32,
    poly: 0x04c1_1db7,
    init: 0x0000_0000,
    refin: true,
    refout: true,
    xorout: 0x0000_0000,
    check: 0x2dfd_2d88,
    residue: 0x0000_0000,
};

static UNICORE_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_UNICORE);

/// UBX [Fletcher-16 checksum](https://en.wikipedia.org/wiki/Fletcher%27s_checksum) calculator supporting both streaming and single-shot validation
#[derive(Debug, Default, Clone, Copy)]
pub struct UbxChecksumCalc {
    ck_a: u8,
    ck_b: u8,
}

impl UbxChecksumCalc {
    pub const fn new() -> Self {
        Self { ck_a: 0, ck_b: 0 }
    }

    /// Update checksum with new bytes
    pub const fn update(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.update_byte(bytes[i]);
            i += 1;
        }
    }

    /// Update checksum with a single byte
    pub const fn update_byte(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    /// Get the current checksum result
    pub const fn result(self) -> (u8, u8) {
        (self.ck_a, self.ck_b)
    }

    /// Validate against the two trailer bytes that follow the payload
    pub const fn validate_result(
        self,
        received_ck_a: u8,
        received_ck_b: u8,
    ) -> Result<(), ReadError> {
        if self.is_valid(received_ck_a, received_ck_b) {
            Ok(())
        } else {
            Err(ReadError::InvalidChecksum {
                expect: u16::from_le_bytes([received_ck_a, received_ck_b]) as u32,
                got: u16::from_le_bytes([self.ck_a, self.ck_b]) as u32,
            })
        }
    }

    const fn is_valid(&self, received_ck_a: u8, received_ck_b: u8) -> bool {
        self.ck_a == received_ck_a && self.ck_b == received_ck_b
    }
}

/// The checksum is calculated over the frame, starting and including the CLASS field,
/// up until, but excluding, the checksum field.
/// So the slice should start with the class id.
pub const fn ubx_checksum(data: &[u8]) -> (u8, u8) {
    let mut calc = UbxChecksumCalc::new();
    calc.update(data);
    calc.result()
}

/// CRC of a Unicore binary frame, computed from the first sync byte through the end of the payload
pub fn unicore_crc32(data: &[u8]) -> u32 {
    UNICORE_CRC.checksum(data)
}
