//! Typed runtime enums and their small-integer wire codes.
//!
//! Wire codes are part of the inter-controller contract. Decoding is lenient:
//! an unrecognised code falls back to the same default the receiving firmware
//! would boot with, never to an error.

use serde::{Deserialize, Serialize};

/// Overall operating style of the pack and wand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemMode {
    #[default]
    SuperHero,
    Original,
}

impl SystemMode {
    pub fn to_wire(self) -> u8 {
        match self {
            SystemMode::SuperHero => 1,
            SystemMode::Original => 2,
        }
    }

    pub fn from_wire(code: u8) -> Self {
        match code {
            2 => SystemMode::Original,
            _ => SystemMode::SuperHero,
        }
    }
}

/// Film era the props imitate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemYear {
    Y1984,
    Y1989,
    #[default]
    Afterlife,
    FrozenEmpire,
}

impl SystemYear {
    pub fn to_wire(self) -> u8 {
        match self {
            SystemYear::Y1984 => 1,
            SystemYear::Y1989 => 2,
            SystemYear::Afterlife => 3,
            SystemYear::FrozenEmpire => 4,
        }
    }

    pub fn from_wire(code: u8) -> Self {
        match code {
            1 => SystemYear::Y1984,
            2 => SystemYear::Y1989,
            4 => SystemYear::FrozenEmpire,
            _ => SystemYear::Afterlife,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SystemYear::Y1984 => "1984",
            SystemYear::Y1989 => "1989",
            SystemYear::Afterlife => "afterlife",
            SystemYear::FrozenEmpire => "frozen_empire",
        }
    }
}

/// A year preference: either follow the toggle/pack, or pin a year.
///
/// Encoded as 1 for [`YearPreference::Toggle`], otherwise the year's sync code plus one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearPreference {
    #[default]
    Toggle,
    Fixed(SystemYear),
}

impl YearPreference {
    pub fn to_wire(self) -> u8 {
        match self {
            YearPreference::Toggle => 1,
            YearPreference::Fixed(year) => year.to_wire() + 1,
        }
    }

    pub fn from_wire(code: u8) -> Self {
        match code {
            2..=5 => YearPreference::Fixed(SystemYear::from_wire(code - 1)),
            _ => YearPreference::Toggle,
        }
    }
}

/// Firing stream selected on the wand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
    #[default]
    Proton,
    Stasis,
    Slime,
    Meson,
    Spectral,
    Halloween,
    Christmas,
    SpectralCustom,
}

impl StreamMode {
    pub const ALL: [StreamMode; 8] = [
        StreamMode::Proton,
        StreamMode::Stasis,
        StreamMode::Slime,
        StreamMode::Meson,
        StreamMode::Spectral,
        StreamMode::Halloween,
        StreamMode::Christmas,
        StreamMode::SpectralCustom,
    ];

    pub fn to_wire(self) -> u8 {
        match self {
            StreamMode::Proton => 1,
            StreamMode::Stasis => 2,
            StreamMode::Slime => 3,
            StreamMode::Meson => 4,
            StreamMode::Spectral => 5,
            StreamMode::Halloween => 6,
            StreamMode::Christmas => 7,
            StreamMode::SpectralCustom => 8,
        }
    }

    pub fn from_wire(code: u8) -> Self {
        match code {
            2 => StreamMode::Stasis,
            3 => StreamMode::Slime,
            4 => StreamMode::Meson,
            5 => StreamMode::Spectral,
            6 => StreamMode::Halloween,
            7 => StreamMode::Christmas,
            8 => StreamMode::SpectralCustom,
            _ => StreamMode::Proton,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StreamMode::Proton => "PROTON",
            StreamMode::Stasis => "STASIS",
            StreamMode::Slime => "SLIME",
            StreamMode::Meson => "MESON",
            StreamMode::Spectral => "SPECTRAL",
            StreamMode::Halloween => "HALLOWEEN",
            StreamMode::Christmas => "CHRISTMAS",
            StreamMode::SpectralCustom => "SPECTRAL_CUSTOM",
        }
    }
}

/// Pack vibration behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackVibration {
    Always,
    FiringOnly,
    Off,
    /// Follow the physical vibration switch.
    #[default]
    Switch,
    CyclotronMotor,
}

impl PackVibration {
    pub fn to_wire(self) -> u8 {
        match self {
            PackVibration::Always => 1,
            PackVibration::FiringOnly => 2,
            PackVibration::Off => 3,
            PackVibration::Switch => 4,
            PackVibration::CyclotronMotor => 5,
        }
    }

    pub fn from_wire(code: u8) -> Self {
        match code {
            1 => PackVibration::Always,
            2 => PackVibration::FiringOnly,
            3 => PackVibration::Off,
            5 => PackVibration::CyclotronMotor,
            _ => PackVibration::Switch,
        }
    }
}

/// Wand vibration behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WandVibration {
    Always,
    FiringOnly,
    Off,
    #[default]
    Switch,
}

impl WandVibration {
    pub fn to_wire(self) -> u8 {
        match self {
            WandVibration::Always => 1,
            WandVibration::FiringOnly => 2,
            WandVibration::Off => 3,
            WandVibration::Switch => 4,
        }
    }

    pub fn from_wire(code: u8) -> Self {
        match code {
            1 => WandVibration::Always,
            2 => WandVibration::FiringOnly,
            3 => WandVibration::Off,
            _ => WandVibration::Switch,
        }
    }
}

/// Default firing style of the wand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiringMode {
    #[default]
    VideoGame,
    CrossTheStreams,
    CrossTheStreamsMix,
}

impl FiringMode {
    pub fn to_wire(self) -> u8 {
        match self {
            FiringMode::VideoGame => 1,
            FiringMode::CrossTheStreams => 2,
            FiringMode::CrossTheStreamsMix => 3,
        }
    }

    pub fn from_wire(code: u8) -> Self {
        match code {
            2 => FiringMode::CrossTheStreams,
            3 => FiringMode::CrossTheStreamsMix,
            _ => FiringMode::VideoGame,
        }
    }
}

/// Bargraph animation style; `SystemDefault` follows the system mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BargraphAnimation {
    #[default]
    SystemDefault,
    SuperHero,
    Original,
}

impl BargraphAnimation {
    pub fn to_wire(self) -> u8 {
        match self {
            BargraphAnimation::SystemDefault => 1,
            BargraphAnimation::SuperHero => 2,
            BargraphAnimation::Original => 3,
        }
    }

    pub fn from_wire(code: u8) -> Self {
        match code {
            2 => BargraphAnimation::SuperHero,
            3 => BargraphAnimation::Original,
            _ => BargraphAnimation::SystemDefault,
        }
    }
}

/// Power level range shared by every node.
pub const MIN_POWER_LEVEL: u8 = 1;
pub const MAX_POWER_LEVEL: u8 = 5;

/// Clamp a received power level into range.
pub fn clamp_power_level(level: u8) -> u8 {
    level.clamp(MIN_POWER_LEVEL, MAX_POWER_LEVEL)
}

/// 1 = off, 2 = on.
pub(crate) fn two_state(on: bool) -> u8 {
    if on {
        2
    } else {
        1
    }
}

pub(crate) fn from_two_state(code: u8) -> bool {
    code == 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_codes_match_sync_layout() {
        assert_eq!(SystemYear::Y1984.to_wire(), 1);
        assert_eq!(SystemYear::Y1989.to_wire(), 2);
        assert_eq!(SystemYear::Afterlife.to_wire(), 3);
        assert_eq!(SystemYear::FrozenEmpire.to_wire(), 4);
        assert_eq!(SystemYear::from_wire(0), SystemYear::Afterlife);
        assert_eq!(SystemYear::from_wire(9), SystemYear::Afterlife);
    }

    #[test]
    fn year_preference_is_offset_by_one() {
        assert_eq!(YearPreference::Toggle.to_wire(), 1);
        assert_eq!(YearPreference::Fixed(SystemYear::Y1984).to_wire(), 2);
        assert_eq!(YearPreference::Fixed(SystemYear::FrozenEmpire).to_wire(), 5);
        assert_eq!(
            YearPreference::from_wire(4),
            YearPreference::Fixed(SystemYear::Afterlife)
        );
        assert_eq!(YearPreference::from_wire(0), YearPreference::Toggle);
    }

    #[test]
    fn stream_modes_cover_codes_one_through_eight() {
        for (index, mode) in StreamMode::ALL.iter().enumerate() {
            assert_eq!(mode.to_wire() as usize, index + 1);
            assert_eq!(StreamMode::from_wire(mode.to_wire()), *mode);
        }
        assert_eq!(StreamMode::from_wire(42), StreamMode::Proton);
    }

    #[test]
    fn vibration_codes_fall_back_to_switch() {
        assert_eq!(PackVibration::from_wire(5), PackVibration::CyclotronMotor);
        assert_eq!(PackVibration::from_wire(0), PackVibration::Switch);
        assert_eq!(WandVibration::from_wire(5), WandVibration::Switch);
        assert_eq!(WandVibration::FiringOnly.to_wire(), 2);
    }

    #[test]
    fn system_mode_and_two_state() {
        assert_eq!(SystemMode::Original.to_wire(), 2);
        assert_eq!(SystemMode::from_wire(7), SystemMode::SuperHero);
        assert_eq!(two_state(true), 2);
        assert!(!from_two_state(1));
        assert!(!from_two_state(0));
    }

    #[test]
    fn power_level_is_clamped() {
        assert_eq!(clamp_power_level(0), 1);
        assert_eq!(clamp_power_level(3), 3);
        assert_eq!(clamp_power_level(200), 5);
    }
}
