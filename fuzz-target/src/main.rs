#[macro_use]
extern crate afl;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use ublox_link::{
    CallbackHub, DecodeError, FixedLinearBuffer, Message, MessageRegistry, ProtocolVariant,
};

struct AckAck;

impl Message for AckAck {
    const CLASS_ID: u8 = 0x05;
    const MESSAGE_ID: u32 = 0x01;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() == 2 {
            Ok(Self)
        } else {
            Err(DecodeError::InvalidPayloadLen {
                packet: "AckAck",
                expect: 2,
                got: payload.len(),
            })
        }
    }
}

struct BestPos;

impl Message for BestPos {
    const CLASS_ID: u8 = ublox_link::UNICORE_BIN_SYNC_CHAR_3;
    const MESSAGE_ID: u32 = 42;

    fn decode(_: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self)
    }
}

fn process(variant: ProtocolVariant, bufsize: usize, chunksize: usize, data: &[u8]) {
    let mut registry = MessageRegistry::new();
    registry.register::<AckAck>().register::<BestPos>();
    let hub = CallbackHub::new(variant, registry);
    let acks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&acks);
    hub.subscribe(move |_: AckAck| {
        counter.fetch_add(1, Ordering::Relaxed);
    });
    hub.subscribe(|_: BestPos| {});
    hub.set_sentence_callback(|sentence| assert!(sentence.starts_with('$')));

    let mut storage = vec![0; bufsize];
    let mut buf = FixedLinearBuffer::new(&mut storage[..]);
    for chunk in data.chunks(chunksize) {
        hub.receive(&mut buf, chunk);
    }

    if variant == ProtocolVariant::UBX {
        // A partial frame left by the garbage may swallow acks until its
        // declared length (at most the maximum payload) is used up
        let ack_ack = [0xb5, 0x62, 0x5, 0x1, 0x2, 0x0, 0x4, 0x5, 0x11, 0x38];
        let before = acks.load(Ordering::Relaxed);
        for _ in 0..1000 {
            hub.receive(&mut buf, &ack_ack);
            if acks.load(Ordering::Relaxed) > before {
                break;
            }
        }
        assert!(acks.load(Ordering::Relaxed) > before);
    }
}

fn main() {
    fuzz!(|data: &[u8]| {
        if data.len() > 2 {
            let bufsize = 64 + data[0] as usize;
            let chunksize = data[1] as usize;
            if chunksize != 0 {
                process(ProtocolVariant::UBX, bufsize, chunksize, &data[2..]);
                process(ProtocolVariant::UNICORE, bufsize, chunksize, &data[2..]);
            }
        }
    });
}
