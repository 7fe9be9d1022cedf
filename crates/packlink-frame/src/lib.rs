//! Packet-type tagged framing for prop controller links.
//!
//! Every message on a link is framed with:
//! - A 1-byte packet type selecting the typed decode
//! - A 2-byte little-endian payload length
//!
//! Payloads are fixed-layout records ([`CommandRecord`], [`DataRecord`] and the
//! preference/sync snapshots) encoded field by field, little-endian, with no
//! padding, so each packet type has a fixed payload length. A partial frame is
//! held until complete; anything that cannot start a frame (unknown tag, a
//! length no record has, a command or data payload without sentinels) is
//! skipped a byte at a time. Writers queue what a slow peer has not taken yet
//! and refuse new frames once that backlog is full.

pub mod codec;
pub mod error;
pub mod packet;
pub mod reader;
pub mod record;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, DEFAULT_WRITE_BACKLOG,
    HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use packet::PacketType;
pub use reader::{FrameReader, ReaderStats};
pub use record::{
    decode_command, decode_data, CommandRecord, DataRecord, Sentinels, WireField, WireRecord,
    END_SENTINELS, START_SENTINEL,
};
pub use writer::{FrameWriter, WriterStats};

use packlink_transport::{LinkStream, TransportError};

#[doc(hidden)]
pub mod __private {
    pub use bytes::BytesMut;
}

/// Split a link into a reader and a writer sharing the same physical stream.
pub fn split_link(
    stream: LinkStream,
    config: FrameConfig,
) -> Result<(FrameReader<LinkStream>, FrameWriter<LinkStream>)> {
    let write_half = stream.try_clone().map_err(transport_to_frame_error)?;
    Ok((
        FrameReader::with_config(stream, config.clone()),
        FrameWriter::with_config(write_half, config),
    ))
}

fn transport_to_frame_error(err: TransportError) -> FrameError {
    match err {
        TransportError::Io(io) => FrameError::Io(io),
        TransportError::Open { source, .. } | TransportError::Configure { source, .. } => {
            FrameError::Io(source)
        }
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use packlink_transport::MemoryLink;

    use super::*;

    #[test]
    fn split_link_roundtrip_over_memory() {
        let (left, right) = MemoryLink::pair();
        let (_left_reader, mut left_writer) = split_link(left, FrameConfig::default()).unwrap();
        let (mut right_reader, _right_writer) = split_link(right, FrameConfig::default()).unwrap();

        let sender = Sentinels::new(0x01, 0x7F);
        left_writer
            .send_record(&CommandRecord::new(sender, 3, 7))
            .unwrap();

        let frame = right_reader.poll_frame().unwrap().unwrap();
        let record = decode_command(&frame, sender).unwrap();
        assert_eq!((record.command_id, record.arg), (3, 7));
    }

    #[test]
    #[cfg(unix)]
    fn split_link_roundtrip_over_socket_pair() {
        let (left, right) = LinkStream::socket_pair().unwrap();
        let (_r, mut writer) = split_link(left, FrameConfig::default()).unwrap();
        let (mut reader, _w) = split_link(right, FrameConfig::default()).unwrap();

        writer.send(PacketType::Data, &[1, 2, 3, 4, 5, 0x7E]).unwrap();
        let frame = reader.poll_frame().unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), &[1, 2, 3, 4, 5, 0x7E]);
    }

    #[test]
    #[cfg(unix)]
    fn full_socket_never_blocks_the_writer() {
        use std::io::{ErrorKind, Write};

        let (left, _right) = LinkStream::socket_pair().unwrap();
        let mut raw = left.try_clone().unwrap();
        for size in [4096, 64, 1] {
            let chunk = vec![0u8; size];
            loop {
                match raw.write(&chunk) {
                    Ok(_) => continue,
                    Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                    Err(err) => panic!("filling socket failed: {err}"),
                }
            }
        }

        let mut writer = FrameWriter::new(left);
        let record = CommandRecord::new(Sentinels::new(0x01, 0x7F), 3, 0);
        let mut refused = None;
        for attempt in 0..=DEFAULT_WRITE_BACKLOG {
            if let Err(err) = writer.send_record(&record) {
                refused = Some((attempt, err));
                break;
            }
        }
        let (attempt, err) = refused.expect("a stalled peer should eventually refuse frames");
        assert!(matches!(err, FrameError::Backpressure { .. }));
        assert!(attempt > 0, "the first frame is queued, not refused");
        assert!(writer.queued() > 0);
    }
}
