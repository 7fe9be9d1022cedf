use crate::packet::PacketType;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The header carries a packet type this firmware does not know.
    #[error("unknown packet type {0}")]
    UnknownPacketType(u8),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The header declares a length no record of that packet type has.
    #[error("{packet_type} frame cannot carry {length} bytes")]
    BadLength {
        packet_type: PacketType,
        length: usize,
    },

    /// A command or data payload does not open and close with sender sentinels.
    #[error("{0} payload is not bracketed by sender sentinels")]
    Unbracketed(PacketType),

    /// The peer stopped reading and the outbound backlog is full.
    #[error("peer is not draining the link ({queued} bytes queued)")]
    Backpressure { queued: usize },

    /// A typed record was decoded from a payload of the wrong size.
    #[error("{packet_type} payload is {actual} bytes, expected {expected}")]
    LengthMismatch {
        packet_type: PacketType,
        expected: usize,
        actual: usize,
    },

    /// Start/end sentinels do not belong to the expected sender.
    #[error(
        "sentinel mismatch (got {start:#04x}..{end:#04x}, expected {expected_start:#04x}..{expected_end:#04x})"
    )]
    SentinelMismatch {
        start: u8,
        end: u8,
        expected_start: u8,
        expected_end: u8,
    },

    /// Command or message id zero is reserved and never carries meaning.
    #[error("record id is zero")]
    NullId,

    /// The frame holds a different packet type than the decoder was asked for.
    #[error("expected {expected} frame, got {actual}")]
    UnexpectedPacketType {
        expected: PacketType,
        actual: PacketType,
    },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream reported end-of-file.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// True for errors caused by bytes on the wire rather than by the local stream.
    ///
    /// Framing errors cost one frame and nothing else; the rest concern the link itself.
    pub fn is_framing(&self) -> bool {
        !matches!(
            self,
            FrameError::Io(_) | FrameError::ConnectionClosed | FrameError::Backpressure { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
