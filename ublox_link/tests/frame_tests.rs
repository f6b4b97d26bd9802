mod common;

use common::*;
use ublox_link::{
    encode_frame, FrameReader, FrameWriter, Message, MessageKey, ProtocolVariant, ReadError,
    UnicoreHeader, WriteError, UNICORE_BIN_SYNC_CHAR_3, UNICORE_OEM_SYNC_CHAR_3,
};

#[test]
fn nav_pos_llh_round_trip() {
    init_logger();
    let registry = registry();
    let frame = encode_frame(&NAV_POS_LLH).unwrap();
    assert_eq!(frame.len(), 36);

    let mut reader = FrameReader::new(&frame, ProtocolVariant::UBX, &registry);
    assert_eq!(reader.read::<NavPosLlh>(true), Ok(NAV_POS_LLH));
    assert_eq!(reader.frame(), Some(&frame[..]));
}

#[test]
fn known_ack_bytes() {
    let frame = encode_frame(&Ack {
        class: 0x06,
        msg_id: 0x01,
    })
    .unwrap();
    assert_eq!(frame, [0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38]);
}

#[test]
fn mixed_stream_is_read_in_order() {
    init_logger();
    let registry = registry();
    let mut data = b"$GNGGA,,,,,,0,00,99.99,,,,,,*56\r\n".to_vec();
    data.extend(ack_frame(0x01));
    data.extend_from_slice(&[0x00, 0xb5, 0x00]);
    data.extend(encode_frame(&NAV_POS_LLH).unwrap());

    let mut reader = FrameReader::new(&data, ProtocolVariant::UBX, &registry);
    assert_eq!(
        reader.read::<Ack>(true),
        Ok(Ack {
            class: 0x06,
            msg_id: 0x01
        })
    );
    assert_eq!(reader.read::<NavPosLlh>(true), Ok(NAV_POS_LLH));
    assert_eq!(reader.search(), reader.end());

    let mut unused = b"$GNGGA,,,,,,0,00,99.99,,,,,,*56\r\n".to_vec();
    unused.extend_from_slice(&[0x00, 0xb5, 0x00]);
    assert_eq!(reader.unused_data(), &unused[..]);
}

#[test]
fn wrong_type_for_frame() {
    let registry = registry();
    let data = ack_frame(0x01);
    let mut reader = FrameReader::new(&data, ProtocolVariant::UBX, &registry);
    assert_eq!(reader.search(), 0);
    assert!(reader.has_type::<Ack>());
    assert!(!reader.has_type::<NavPosLlh>());
    assert_eq!(
        reader.read::<NavPosLlh>(false),
        Err(ReadError::UnregisteredType {
            class_id: 0x05,
            message_id: 0x01
        })
    );
    // The frame is still there for the right type
    assert!(reader.read::<Ack>(false).is_ok());
}

#[test]
fn shared_layout_under_additional_keys() {
    let registry = registry();
    let mut buf = [0u8; 64];
    let mut writer = FrameWriter::new(&mut buf);
    let warning = Inf {
        text: "ANTENNA OPEN".to_owned(),
    };
    writer
        .write_with_id(&warning, Inf::CLASS_ID, INF_WARNING_ID)
        .unwrap();
    writer
        .write_with_id(
            &Ack {
                class: 0x06,
                msg_id: 0x8a,
            },
            Ack::CLASS_ID,
            ACK_NAK_ID,
        )
        .unwrap();
    let data = writer.written().to_vec();

    let mut reader = FrameReader::new(&data, ProtocolVariant::UBX, &registry);
    assert_eq!(reader.search(), 0);
    assert!(reader.is_message(Inf::CLASS_ID, INF_WARNING_ID));
    assert_eq!(reader.read::<Inf>(false), Ok(warning));

    assert_eq!(reader.search(), 20);
    assert_eq!(reader.key(), MessageKey::new(0x05, 0x00));
    assert_eq!(reader.read::<Ack>(false).map(|nak| nak.msg_id), Ok(0x8a));
}

#[test]
fn writer_reports_exhausted_buffer() {
    let mut buf = [0u8; 40];
    let mut writer = FrameWriter::new(&mut buf);
    assert_eq!(writer.write(&NAV_POS_LLH), Ok(36));
    assert_eq!(
        writer.write(&NAV_POS_LLH),
        Err(WriteError::NotEnoughMem {
            required: 36,
            available: 4
        })
    );
    assert_eq!(writer.written().len(), 36);
}

#[test]
fn corrupted_payload_is_never_decoded() {
    let registry = registry();
    let frame = encode_frame(&NAV_POS_LLH).unwrap();
    for i in 6..34 {
        let mut data = frame.clone();
        data[i] ^= 0x40;
        let mut reader = FrameReader::new(&data, ProtocolVariant::UBX, &registry);
        assert!(
            matches!(
                reader.read::<NavPosLlh>(true),
                Err(ReadError::InvalidChecksum { .. })
            ),
            "byte {i}"
        );
    }
}

#[test]
fn unicore_stream_with_both_headers() {
    init_logger();
    let registry = registry();
    let mut data = b"#garbage\r\n".to_vec();
    data.extend(heading_frame());
    data.extend(best_pos_frame());

    let mut reader = FrameReader::new(&data, ProtocolVariant::UNICORE, &registry);
    assert_eq!(reader.search(), 10);
    assert!(reader.found());
    assert_eq!(
        ProtocolVariant::UNICORE.unicore_header(&data[10..]),
        Some(UnicoreHeader::Oem)
    );
    assert_eq!(reader.header_length(), 24);
    assert_eq!(reader.length(), 12);
    assert_eq!(reader.key(), MessageKey::new(UNICORE_OEM_SYNC_CHAR_3, 971));
    assert_eq!(reader.read::<Heading>(false), Ok(HEADING));

    assert_eq!(reader.read::<BestPos>(true), Ok(BEST_POS));
    assert_eq!(reader.header_length(), 28);
    assert_eq!(reader.key(), MessageKey::new(UNICORE_BIN_SYNC_CHAR_3, 42));
    assert_eq!(reader.search(), data.len());
    assert_eq!(reader.unused_data(), b"#garbage\r\n");
}

#[test]
fn unicore_trailer_is_little_endian_crc() {
    let registry = registry();
    let data = best_pos_frame();
    let mut reader = FrameReader::new(&data, ProtocolVariant::UNICORE, &registry);
    assert!(reader.found());
    let trailer = &data[data.len() - 4..];
    assert_eq!(
        reader.checksum(),
        u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]])
    );
    assert_eq!(
        reader.checksum(),
        ublox_link::unicore_crc32(&data[..data.len() - 4])
    );
}

#[test]
fn unicore_unknown_header_flavour() {
    init_logger();
    let registry = registry();
    let mut data = vec![0u8; 40];
    data[..3].copy_from_slice(&[0xaa, 0x44, 0x77]);
    data[4] = 42;
    data[8] = 4;

    let mut reader = FrameReader::new(&data, ProtocolVariant::UNICORE, &registry);
    assert_eq!(reader.search(), 0);
    assert_eq!(reader.length(), 0);
    assert_eq!(reader.message_id(), 0);
    assert_eq!(reader.header_length(), 28);
    // Treated as an empty frame with the fallback header
    assert!(reader.found());
    assert!(!reader.has_type::<BestPos>());
    reader.next();
    assert_eq!(reader.pos(), 32);
}

#[test]
fn unicore_partial_header_waits_for_more() {
    let registry = registry();
    let frame = best_pos_frame();
    for len in 1..frame.len() {
        let mut reader = FrameReader::new(&frame[..len], ProtocolVariant::UNICORE, &registry);
        assert_eq!(reader.search(), 0, "prefix {len}");
        assert!(!reader.found(), "prefix {len}");
    }
}
