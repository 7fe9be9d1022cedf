//! Fixed-layout records carried inside frames.
//!
//! Records are written field by field in declaration order, little-endian,
//! with no padding. Nothing here reinterprets raw memory, so the layout is
//! identical on every node regardless of compiler or architecture.

use std::ops::RangeInclusive;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::Frame;
use crate::error::{FrameError, Result};
use crate::packet::PacketType;

/// A primitive that can appear as a record field.
pub trait WireField: Copy {
    /// Encoded size in bytes.
    const SIZE: usize;

    fn put(self, dst: &mut BytesMut);

    /// Read the field. The caller guarantees `src` holds at least `SIZE` bytes.
    fn take(src: &mut &[u8]) -> Self;
}

impl WireField for u8 {
    const SIZE: usize = 1;

    fn put(self, dst: &mut BytesMut) {
        dst.put_u8(self);
    }

    fn take(src: &mut &[u8]) -> Self {
        src.get_u8()
    }
}

impl WireField for u16 {
    const SIZE: usize = 2;

    fn put(self, dst: &mut BytesMut) {
        dst.put_u16_le(self);
    }

    fn take(src: &mut &[u8]) -> Self {
        src.get_u16_le()
    }
}

impl<const N: usize> WireField for [u8; N] {
    const SIZE: usize = N;

    fn put(self, dst: &mut BytesMut) {
        dst.put_slice(&self);
    }

    fn take(src: &mut &[u8]) -> Self {
        let mut out = [0u8; N];
        src.copy_to_slice(&mut out);
        out
    }
}

/// A record with a fixed wire size and a fixed packet type.
pub trait WireRecord: Sized {
    /// Packet type this record travels under.
    const PACKET_TYPE: PacketType;
    /// Exact payload size in bytes.
    const WIRE_SIZE: usize;

    /// Append the encoded record to `dst`.
    fn encode(&self, dst: &mut BytesMut);

    /// Read every field in order. `src` holds exactly `WIRE_SIZE` bytes.
    fn decode_fields(src: &mut &[u8]) -> Self;

    /// Decode from a payload of exactly `WIRE_SIZE` bytes.
    fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != Self::WIRE_SIZE {
            return Err(FrameError::LengthMismatch {
                packet_type: Self::PACKET_TYPE,
                expected: Self::WIRE_SIZE,
                actual: payload.len(),
            });
        }
        let mut src = payload;
        Ok(Self::decode_fields(&mut src))
    }

    /// Decode from a frame, checking the packet type first.
    fn from_frame(frame: &Frame) -> Result<Self> {
        if frame.packet_type != Self::PACKET_TYPE {
            return Err(FrameError::UnexpectedPacketType {
                expected: Self::PACKET_TYPE,
                actual: frame.packet_type,
            });
        }
        Self::decode(frame.payload.as_ref())
    }

    /// Encode into a standalone payload buffer.
    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::WIRE_SIZE);
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Encode into a frame ready for a writer.
    fn to_frame(&self) -> Frame {
        Frame::new(Self::PACKET_TYPE, self.to_bytes())
    }
}

/// Declare a struct and derive its [`WireRecord`] layout from field order.
///
/// ```
/// use packlink_frame::{wire_record, PacketType, WireRecord};
///
/// wire_record! {
///     packet = PacketType::Data;
///     #[derive(Debug, PartialEq)]
///     pub struct Pair {
///         pub hue: u8,
///         pub count: u16,
///     }
/// }
///
/// let pair = Pair { hue: 7, count: 0x0102 };
/// assert_eq!(Pair::WIRE_SIZE, 3);
/// assert_eq!(pair.to_bytes().as_ref(), &[7, 0x02, 0x01]);
/// assert_eq!(Pair::decode(&[7, 0x02, 0x01]).unwrap(), pair);
/// ```
#[macro_export]
macro_rules! wire_record {
    (
        packet = $packet_type:path;
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::WireRecord for $name {
            const PACKET_TYPE: $crate::PacketType = $packet_type;
            const WIRE_SIZE: usize = 0 $( + <$ty as $crate::WireField>::SIZE )*;

            fn encode(&self, dst: &mut $crate::__private::BytesMut) {
                dst.reserve(<Self as $crate::WireRecord>::WIRE_SIZE);
                $( $crate::WireField::put(self.$field, dst); )*
            }

            fn decode_fields(src: &mut &[u8]) -> Self {
                Self {
                    $( $field: <$ty as $crate::WireField>::take(src), )*
                }
            }
        }
    };
}

/// First byte of every command and data record, whoever sends it.
pub const START_SENTINEL: u8 = 0x01;

/// Last byte of a command or data record; one value per sending role.
pub const END_SENTINELS: RangeInclusive<u8> = 0x7D..=0x7F;

/// Start/end marker bytes identifying the sender of a command or data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sentinels {
    pub start: u8,
    pub end: u8,
}

impl Sentinels {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// True when `payload` opens and closes like a record from some known sender.
    ///
    /// The reader uses this to tell a real record from bytes that merely
    /// parse as a header; the exact sender is checked later by [`Self::check`].
    pub fn brackets(payload: &[u8]) -> bool {
        match (payload.first(), payload.last()) {
            (Some(&start), Some(end)) => start == START_SENTINEL && END_SENTINELS.contains(end),
            _ => false,
        }
    }

    fn check(self, start: u8, end: u8) -> Result<()> {
        if start == self.start && end == self.end {
            return Ok(());
        }
        Err(FrameError::SentinelMismatch {
            start,
            end,
            expected_start: self.start,
            expected_end: self.end,
        })
    }
}

wire_record! {
    packet = PacketType::Command;
    /// A single command with an optional 16-bit argument.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandRecord {
        pub start: u8,
        pub command_id: u8,
        pub arg: u16,
        pub end: u8,
    }
}

impl CommandRecord {
    pub fn new(sentinels: Sentinels, command_id: u8, arg: u16) -> Self {
        Self {
            start: sentinels.start,
            command_id,
            arg,
            end: sentinels.end,
        }
    }

    /// Check sentinels against the expected sender and reject the null id.
    pub fn validate(&self, expected: Sentinels) -> Result<()> {
        expected.check(self.start, self.end)?;
        if self.command_id == 0 {
            return Err(FrameError::NullId);
        }
        Ok(())
    }
}

wire_record! {
    packet = PacketType::Data;
    /// A small auxiliary payload, e.g. three volume percentages or a colour pair.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DataRecord {
        pub start: u8,
        pub message_id: u8,
        pub data: [u8; 3],
        pub end: u8,
    }
}

impl DataRecord {
    pub fn new(sentinels: Sentinels, message_id: u8, data: [u8; 3]) -> Self {
        Self {
            start: sentinels.start,
            message_id,
            data,
            end: sentinels.end,
        }
    }

    /// Check sentinels against the expected sender and reject the null id.
    pub fn validate(&self, expected: Sentinels) -> Result<()> {
        expected.check(self.start, self.end)?;
        if self.message_id == 0 {
            return Err(FrameError::NullId);
        }
        Ok(())
    }
}

/// Decode and validate a command frame from the sender owning `expected`.
pub fn decode_command(frame: &Frame, expected: Sentinels) -> Result<CommandRecord> {
    let record = CommandRecord::from_frame(frame)?;
    record.validate(expected)?;
    Ok(record)
}

/// Decode and validate a data frame from the sender owning `expected`.
pub fn decode_data(frame: &Frame, expected: Sentinels) -> Result<DataRecord> {
    let record = DataRecord::from_frame(frame)?;
    record.validate(expected)?;
    Ok(record)
}
