//! Message types and frame builders shared by the integration tests.
#![allow(dead_code)]

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ublox_link::{
    ubx_checksum, unicore_crc32, DecodeError, Message, MessageEncode, MessageRegistry,
    UNICORE_BIN_SYNC_CHAR_3, UNICORE_OEM_SYNC_CHAR_3, UNICORE_SYNC_CHAR_1, UNICORE_SYNC_CHAR_2,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn expect_len(packet: &'static str, payload: &[u8], expect: usize) -> Result<(), DecodeError> {
    if payload.len() == expect {
        Ok(())
    } else {
        Err(DecodeError::InvalidPayloadLen {
            packet,
            expect,
            got: payload.len(),
        })
    }
}

/// UBX-ACK-ACK, also registered under ACK-NAK (0x05 / 0x00) which shares the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub class: u8,
    pub msg_id: u8,
}

impl Message for Ack {
    const CLASS_ID: u8 = 0x05;
    const MESSAGE_ID: u32 = 0x01;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len("Ack", payload, 2)?;
        Ok(Self {
            class: payload[0],
            msg_id: payload[1],
        })
    }
}

impl MessageEncode for Ack {
    fn payload_len(&self) -> usize {
        2
    }

    fn encode_payload(&self, out: &mut [u8]) {
        out.copy_from_slice(&[self.class, self.msg_id]);
    }
}

pub const ACK_NAK_ID: u32 = 0x00;

/// UBX-INF-* text messages; ERROR, WARNING, NOTICE, TEST and DEBUG share one layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inf {
    pub text: String,
}

pub const INF_ERROR_ID: u32 = 0x00;
pub const INF_WARNING_ID: u32 = 0x01;
pub const INF_NOTICE_ID: u32 = 0x02;

impl Message for Inf {
    const CLASS_ID: u8 = 0x04;
    const MESSAGE_ID: u32 = INF_NOTICE_ID;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let text = core::str::from_utf8(payload).map_err(|_| DecodeError::InvalidField {
            packet: "Inf",
            field: "message",
        })?;
        Ok(Self {
            text: text.to_owned(),
        })
    }
}

impl MessageEncode for Inf {
    fn payload_len(&self) -> usize {
        self.text.len()
    }

    fn encode_payload(&self, out: &mut [u8]) {
        out.copy_from_slice(self.text.as_bytes());
    }
}

/// UBX-NAV-POSLLH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavPosLlh {
    pub itow: u32,
    pub lon: i32,
    pub lat: i32,
    pub height_meters: i32,
    pub height_msl: i32,
    pub h_acc: u32,
    pub v_acc: u32,
}

impl Message for NavPosLlh {
    const CLASS_ID: u8 = 0x01;
    const MESSAGE_ID: u32 = 0x02;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len("NavPosLlh", payload, 28)?;
        let mut rdr = payload;
        Ok(Self {
            itow: rdr.read_u32::<LittleEndian>().unwrap(),
            lon: rdr.read_i32::<LittleEndian>().unwrap(),
            lat: rdr.read_i32::<LittleEndian>().unwrap(),
            height_meters: rdr.read_i32::<LittleEndian>().unwrap(),
            height_msl: rdr.read_i32::<LittleEndian>().unwrap(),
            h_acc: rdr.read_u32::<LittleEndian>().unwrap(),
            v_acc: rdr.read_u32::<LittleEndian>().unwrap(),
        })
    }
}

impl MessageEncode for NavPosLlh {
    fn payload_len(&self) -> usize {
        28
    }

    fn encode_payload(&self, out: &mut [u8]) {
        let mut wtr = Vec::with_capacity(28);
        wtr.write_u32::<LittleEndian>(self.itow).unwrap();
        wtr.write_i32::<LittleEndian>(self.lon).unwrap();
        wtr.write_i32::<LittleEndian>(self.lat).unwrap();
        wtr.write_i32::<LittleEndian>(self.height_meters).unwrap();
        wtr.write_i32::<LittleEndian>(self.height_msl).unwrap();
        wtr.write_u32::<LittleEndian>(self.h_acc).unwrap();
        wtr.write_u32::<LittleEndian>(self.v_acc).unwrap();
        out.copy_from_slice(&wtr);
    }
}

pub const NAV_POS_LLH: NavPosLlh = NavPosLlh {
    itow: 345_600_000,
    lon: 139_691_706,
    lat: 356_894_870,
    height_meters: 40_000,
    height_msl: 3_500,
    h_acc: 1_200,
    v_acc: 2_100,
};

/// Unicore BESTPOSB (BIN header). The decoder receives the header from offset 3.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestPos {
    pub sol_status: u32,
    pub pos_type: u32,
    pub lat: f64,
    pub lon: f64,
    pub height: f64,
}

const BIN_BODY_OFFSET: usize = 28 - 3;
const OEM_BODY_OFFSET: usize = 24 - 3;

impl Message for BestPos {
    const CLASS_ID: u8 = UNICORE_BIN_SYNC_CHAR_3;
    const MESSAGE_ID: u32 = 42;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len("BestPos", payload, BIN_BODY_OFFSET + 32)?;
        let mut rdr = &payload[BIN_BODY_OFFSET..];
        Ok(Self {
            sol_status: rdr.read_u32::<LittleEndian>().unwrap(),
            pos_type: rdr.read_u32::<LittleEndian>().unwrap(),
            lat: rdr.read_f64::<LittleEndian>().unwrap(),
            lon: rdr.read_f64::<LittleEndian>().unwrap(),
            height: rdr.read_f64::<LittleEndian>().unwrap(),
        })
    }
}

impl BestPos {
    pub fn body(&self) -> Vec<u8> {
        let mut wtr = Vec::with_capacity(32);
        wtr.write_u32::<LittleEndian>(self.sol_status).unwrap();
        wtr.write_u32::<LittleEndian>(self.pos_type).unwrap();
        wtr.write_f64::<LittleEndian>(self.lat).unwrap();
        wtr.write_f64::<LittleEndian>(self.lon).unwrap();
        wtr.write_f64::<LittleEndian>(self.height).unwrap();
        wtr
    }
}

pub const BEST_POS: BestPos = BestPos {
    sol_status: 0,
    pos_type: 50,
    lat: 35.689487,
    lon: 139.691706,
    height: 40.125,
};

/// Unicore HEADING (OEM header)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    pub length: f32,
    pub heading: f32,
    pub pitch: f32,
}

impl Message for Heading {
    const CLASS_ID: u8 = UNICORE_OEM_SYNC_CHAR_3;
    const MESSAGE_ID: u32 = 971;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len("Heading", payload, OEM_BODY_OFFSET + 12)?;
        let mut rdr = &payload[OEM_BODY_OFFSET..];
        Ok(Self {
            length: rdr.read_f32::<LittleEndian>().unwrap(),
            heading: rdr.read_f32::<LittleEndian>().unwrap(),
            pitch: rdr.read_f32::<LittleEndian>().unwrap(),
        })
    }
}

impl Heading {
    pub fn body(&self) -> Vec<u8> {
        let mut wtr = Vec::with_capacity(12);
        wtr.write_f32::<LittleEndian>(self.length).unwrap();
        wtr.write_f32::<LittleEndian>(self.heading).unwrap();
        wtr.write_f32::<LittleEndian>(self.pitch).unwrap();
        wtr
    }
}

pub const HEADING: Heading = Heading {
    length: 1.5,
    heading: 271.25,
    pitch: -0.5,
};

/// Any payload, for round-trip properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload(pub Vec<u8>);

impl Message for RawPayload {
    const CLASS_ID: u8 = 0x02;
    const MESSAGE_ID: u32 = 0x15;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self(payload.to_vec()))
    }
}

impl MessageEncode for RawPayload {
    fn payload_len(&self) -> usize {
        self.0.len()
    }

    fn encode_payload(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.0);
    }
}

pub fn registry() -> MessageRegistry {
    let mut registry = MessageRegistry::new();
    registry
        .register::<Ack>()
        .add_key::<Ack>(Ack::CLASS_ID, ACK_NAK_ID)
        .register::<Inf>()
        .add_key::<Inf>(Inf::CLASS_ID, INF_ERROR_ID)
        .add_key::<Inf>(Inf::CLASS_ID, INF_WARNING_ID)
        .register::<NavPosLlh>()
        .register::<BestPos>()
        .register::<Heading>()
        .register::<RawPayload>();
    registry
}

pub fn ubx_frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xb5, 0x62, class, id];
    frame
        .write_u16::<LittleEndian>(payload.len() as u16)
        .unwrap();
    frame.extend_from_slice(payload);
    let (ck_a, ck_b) = ubx_checksum(&frame[2..]);
    frame.extend_from_slice(&[ck_a, ck_b]);
    frame
}

pub fn ack_frame(msg_id: u8) -> Vec<u8> {
    ubx_frame(0x05, 0x01, &[0x06, msg_id])
}

/// Unicore frame with the header flavour selected by `sync3`; `body` follows the header
pub fn unicore_frame(sync3: u8, message_id: u16, body: &[u8]) -> Vec<u8> {
    let (header_len, length_offset) = if sync3 == UNICORE_OEM_SYNC_CHAR_3 {
        (24, 6)
    } else {
        (28, 8)
    };
    let mut frame = vec![0u8; header_len];
    frame[..3].copy_from_slice(&[UNICORE_SYNC_CHAR_1, UNICORE_SYNC_CHAR_2, sync3]);
    frame[4..6].copy_from_slice(&message_id.to_le_bytes());
    frame[length_offset..length_offset + 2].copy_from_slice(&(body.len() as u16).to_le_bytes());
    frame.extend_from_slice(body);
    let crc = unicore_crc32(&frame);
    frame.write_u32::<LittleEndian>(crc).unwrap();
    frame
}

pub fn best_pos_frame() -> Vec<u8> {
    unicore_frame(UNICORE_BIN_SYNC_CHAR_3, 42, &BEST_POS.body())
}

pub fn heading_frame() -> Vec<u8> {
    unicore_frame(UNICORE_OEM_SYNC_CHAR_3, 971, &HEADING.body())
}
