use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::packet::PacketType;
use crate::record::Sentinels;

/// Packet type (1) + payload length (2, little-endian).
pub const HEADER_SIZE: usize = 3;

/// The largest record on the wire is 31 bytes.
pub const DEFAULT_MAX_PAYLOAD: usize = 64;

/// Bytes a writer may hold for a peer that is not reading. Several frames of any type.
pub const DEFAULT_WRITE_BACKLOG: usize = 256;

/// One record as it travels on a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub packet_type: PacketType,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(packet_type: PacketType, payload: impl Into<Bytes>) -> Self {
        Self {
            packet_type,
            payload: payload.into(),
        }
    }

    /// Header plus payload.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Per-link framing limits.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest payload accepted or sent.
    pub max_payload_size: usize,
    /// Upper bound on bytes pulled from the stream per poll.
    pub read_budget: usize,
    /// Upper bound on queued outbound bytes before new frames are refused.
    pub write_backlog: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_budget: 512,
            write_backlog: DEFAULT_WRITE_BACKLOG,
        }
    }
}

fn check_length(packet_type: PacketType, length: usize) -> Result<()> {
    if packet_type.accepts_len(length) {
        return Ok(());
    }
    Err(FrameError::BadLength {
        packet_type,
        length,
    })
}

fn check_brackets(packet_type: PacketType, payload: &[u8]) -> Result<()> {
    if packet_type.is_bracketed() && !Sentinels::brackets(payload) {
        return Err(FrameError::Unbracketed(packet_type));
    }
    Ok(())
}

/// Append one frame to `dst`.
///
/// ```text
/// [type u8][length u16 LE][payload; length]
/// ```
///
/// Payloads the reader would discard (wrong size for the type, command or
/// data without sentinels) are refused and nothing is written.
pub fn encode_frame(packet_type: PacketType, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if packet_type == PacketType::Unknown {
        return Err(FrameError::UnknownPacketType(packet_type.as_u8()));
    }
    check_length(packet_type, payload.len())?;
    check_brackets(packet_type, payload)?;

    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8(packet_type.as_u8());
    // Every accepted length is well under u16::MAX.
    dst.put_u16_le(payload.len() as u16);
    dst.put_slice(payload);
    Ok(())
}

/// Take one frame off the front of `src`.
///
/// `Ok(None)` means more bytes are needed; `src` is left as is. An error means
/// the front of `src` cannot start a frame. Nothing is consumed in that case
/// either, and the caller drops one byte to resync. The length is checked as
/// soon as the header is in, so a torn header never waits on bytes that
/// belong to the next frame.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    let Some(&tag) = src.first() else {
        return Ok(None);
    };
    let packet_type = PacketType::from_u8(tag).ok_or(FrameError::UnknownPacketType(tag))?;
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let length = u16::from_le_bytes([src[1], src[2]]) as usize;
    if length > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: length,
            max: max_payload,
        });
    }
    check_length(packet_type, length)?;

    let total = HEADER_SIZE + length;
    if src.len() < total {
        return Ok(None);
    }
    check_brackets(packet_type, &src[HEADER_SIZE..total])?;

    src.advance(HEADER_SIZE);
    Ok(Some(Frame::new(packet_type, src.split_to(length).freeze())))
}
