//! Replays a raw capture (see `RawCapture`) through a `CallbackHub`.
//!
//! ```text
//! cargo run --example replay -- 2024_05_01_1200.log [ubx|unicore] [chunk size]
//! ```

use std::{
    fs,
    path::PathBuf,
    process,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use clap::{Parser, ValueEnum};
use log::{error, info};
use ublox_link::{CallbackHub, DecodeError, Message, MessageRegistry, ProtocolVariant};

#[derive(Parser)]
struct Args {
    /// Capture file written by `RawCapture`
    capture: PathBuf,

    /// Framing of the captured stream
    #[arg(value_enum, default_value_t = Framing::Ubx)]
    protocol: Framing,

    /// Bytes handed to the hub per receive call
    #[arg(value_parser = clap::value_parser!(u64).range(1..), default_value_t = 256)]
    chunk_size: u64,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Framing {
    Ubx,
    Unicore,
}

impl From<Framing> for ProtocolVariant {
    fn from(framing: Framing) -> Self {
        match framing {
            Framing::Ubx => ProtocolVariant::UBX,
            Framing::Unicore => ProtocolVariant::UNICORE,
        }
    }
}

struct AckAck {
    class: u8,
    msg_id: u8,
}

impl Message for AckAck {
    const CLASS_ID: u8 = 0x05;
    const MESSAGE_ID: u32 = 0x01;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        match payload {
            [class, msg_id] => Ok(Self {
                class: *class,
                msg_id: *msg_id,
            }),
            _ => Err(DecodeError::InvalidPayloadLen {
                packet: "AckAck",
                expect: 2,
                got: payload.len(),
            }),
        }
    }
}

struct NavPosLlh {
    lon: f64,
    lat: f64,
    height_msl: f64,
}

impl Message for NavPosLlh {
    const CLASS_ID: u8 = 0x01;
    const MESSAGE_ID: u32 = 0x02;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() != 28 {
            return Err(DecodeError::InvalidPayloadLen {
                packet: "NavPosLlh",
                expect: 28,
                got: payload.len(),
            });
        }
        let field = |offset: usize| {
            i32::from_le_bytes([
                payload[offset],
                payload[offset + 1],
                payload[offset + 2],
                payload[offset + 3],
            ])
        };
        Ok(Self {
            lon: f64::from(field(4)) * 1e-7,
            lat: f64::from(field(8)) * 1e-7,
            height_msl: f64::from(field(16)) * 1e-3,
        })
    }
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp(None)
        .format_target(false)
        .filter_level(log::LevelFilter::Info)
        .parse_env("LOG_LEVEL")
        .init();

    let args = Args::parse();
    let chunk_size = usize::try_from(args.chunk_size).unwrap_or(usize::MAX);

    let data = match fs::read(&args.capture) {
        Ok(data) => data,
        Err(err) => {
            error!("cannot read {}: {err}", args.capture.display());
            process::exit(1);
        }
    };

    let mut registry = MessageRegistry::new();
    registry.register::<AckAck>().register::<NavPosLlh>();
    let hub = CallbackHub::builder()
        .protocol(args.protocol.into())
        .registry(registry)
        .sentence_callback(|sentence| info!("{}", sentence.trim_end()))
        .build();

    let frames = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&frames);
    hub.subscribe(move |pos: NavPosLlh| {
        counter.fetch_add(1, Ordering::Relaxed);
        info!(
            "position {:.7} {:.7} {:.3} m",
            pos.lat, pos.lon, pos.height_msl
        );
    });
    hub.subscribe(|ack: AckAck| info!("ack for {:#04x} / {:#04x}", ack.class, ack.msg_id));

    let mut buffer = Vec::with_capacity(8192);
    for chunk in data.chunks(chunk_size) {
        hub.receive(&mut buffer, chunk);
    }
    info!(
        "replayed {} bytes, {} positions, {} bytes left unparsed",
        data.len(),
        frames.load(Ordering::Relaxed),
        buffer.len()
    );
}
