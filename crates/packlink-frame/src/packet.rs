//! Packet types carried in the first header byte.
//!
//! The numeric values are shared by every firmware image and must never be
//! renumbered. New types may only be appended.

use std::fmt;

/// Selects how a frame's payload is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    /// Never sent; a zero tag is a framing error.
    Unknown = 0,
    /// A [`crate::CommandRecord`].
    Command = 1,
    /// A [`crate::DataRecord`].
    Data = 2,
    /// Pack preferences snapshot.
    PackConfig = 3,
    /// Wand preferences snapshot.
    WandConfig = 4,
    /// Smoke preferences snapshot.
    SmokeConfig = 5,
    /// Live-state sync snapshot.
    Sync = 6,
}

impl PacketType {
    /// Highest tag value in use.
    pub const MAX: u8 = PacketType::Sync as u8;

    /// Parse a header tag. Returns `None` for `Unknown` and for anything out of range.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(PacketType::Command),
            2 => Some(PacketType::Data),
            3 => Some(PacketType::PackConfig),
            4 => Some(PacketType::WandConfig),
            5 => Some(PacketType::SmokeConfig),
            6 => Some(PacketType::Sync),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name for logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            PacketType::Unknown => "UNKNOWN",
            PacketType::Command => "COMMAND",
            PacketType::Data => "DATA",
            PacketType::PackConfig => "PACK_CONFIG",
            PacketType::WandConfig => "WAND_CONFIG",
            PacketType::SmokeConfig => "SMOKE_CONFIG",
            PacketType::Sync => "SYNC",
        }
    }

    /// Payload lengths a frame of this type may declare.
    ///
    /// Every record has a fixed layout, so any other length marks a torn or
    /// misaligned header. Sync carries either the wand or the attenuator variant.
    pub fn payload_sizes(self) -> &'static [usize] {
        match self {
            PacketType::Unknown => &[],
            PacketType::Command => &[5],
            PacketType::Data => &[6],
            PacketType::PackConfig => &[31],
            PacketType::WandConfig => &[20],
            PacketType::SmokeConfig => &[21],
            PacketType::Sync => &[15, 27],
        }
    }

    pub fn accepts_len(self, len: usize) -> bool {
        self.payload_sizes().contains(&len)
    }

    /// True for records bracketed by sender sentinels.
    pub fn is_bracketed(self) -> bool {
        matches!(self, PacketType::Command | PacketType::Data)
    }

    /// True for the preference and sync snapshot types.
    pub fn is_snapshot(self) -> bool {
        matches!(
            self,
            PacketType::PackConfig
                | PacketType::WandConfig
                | PacketType::SmokeConfig
                | PacketType::Sync
        )
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_stable() {
        assert_eq!(PacketType::Command.as_u8(), 1);
        assert_eq!(PacketType::Data.as_u8(), 2);
        assert_eq!(PacketType::PackConfig.as_u8(), 3);
        assert_eq!(PacketType::WandConfig.as_u8(), 4);
        assert_eq!(PacketType::SmokeConfig.as_u8(), 5);
        assert_eq!(PacketType::Sync.as_u8(), 6);
    }

    #[test]
    fn zero_and_out_of_range_are_rejected() {
        assert_eq!(PacketType::from_u8(0), None);
        assert_eq!(PacketType::from_u8(PacketType::MAX + 1), None);
        assert_eq!(PacketType::from_u8(0xFF), None);
    }

    #[test]
    fn every_known_tag_parses_back() {
        for tag in 1..=PacketType::MAX {
            let packet_type = PacketType::from_u8(tag).unwrap();
            assert_eq!(packet_type.as_u8(), tag);
        }
    }

    #[test]
    fn only_fixed_lengths_are_accepted() {
        assert!(PacketType::Command.accepts_len(5));
        assert!(!PacketType::Command.accepts_len(9));
        assert!(PacketType::Sync.accepts_len(15));
        assert!(PacketType::Sync.accepts_len(27));
        assert!(!PacketType::Sync.accepts_len(21));
        assert!(!PacketType::Unknown.accepts_len(0));
    }

    #[test]
    fn snapshot_classification() {
        assert!(!PacketType::Command.is_snapshot());
        assert!(!PacketType::Data.is_snapshot());
        assert!(PacketType::Sync.is_snapshot());
        assert!(PacketType::WandConfig.is_snapshot());
    }
}
