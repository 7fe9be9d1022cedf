//! Hub relay tables.
//!
//! The wand and the attenuator never talk directly. After handling a command
//! locally the hub looks it up here and, on a hit, re-emits the mapped command
//! to the other peripheral with the original argument.

use crate::command::{AttenuatorToPack, PackToAttenuator, PackToWand, WandToPack};

/// Wand events the attenuator displays.
pub const WAND_TO_ATTENUATOR: &[(WandToPack, PackToAttenuator)] = &[
    (WandToPack::On, PackToAttenuator::WandOn),
    (WandToPack::Off, PackToAttenuator::WandOff),
    (WandToPack::BarrelExtended, PackToAttenuator::BarrelExtended),
    (WandToPack::BarrelRetracted, PackToAttenuator::BarrelRetracted),
    (WandToPack::Firing, PackToAttenuator::Firing),
    (WandToPack::FiringStopped, PackToAttenuator::FiringStopped),
    (WandToPack::PowerLevel1, PackToAttenuator::PowerLevel1),
    (WandToPack::PowerLevel2, PackToAttenuator::PowerLevel2),
    (WandToPack::PowerLevel3, PackToAttenuator::PowerLevel3),
    (WandToPack::PowerLevel4, PackToAttenuator::PowerLevel4),
    (WandToPack::PowerLevel5, PackToAttenuator::PowerLevel5),
    (WandToPack::ProtonMode, PackToAttenuator::ProtonMode),
    (WandToPack::StasisMode, PackToAttenuator::StasisMode),
    (WandToPack::SlimeMode, PackToAttenuator::SlimeMode),
    (WandToPack::MesonMode, PackToAttenuator::MesonMode),
    (WandToPack::SpectralMode, PackToAttenuator::SpectralMode),
    (WandToPack::HalloweenMode, PackToAttenuator::HalloweenMode),
    (WandToPack::ChristmasMode, PackToAttenuator::ChristmasMode),
    (
        WandToPack::SpectralCustomMode,
        PackToAttenuator::SpectralCustomMode,
    ),
    (WandToPack::SettingsMode, PackToAttenuator::SettingsMode),
    (WandToPack::Venting, PackToAttenuator::Venting),
    (WandToPack::Overheating, PackToAttenuator::Overheating),
    (
        WandToPack::CyclotronIncreaseSpeed,
        PackToAttenuator::CyclotronIncreaseSpeed,
    ),
    (
        WandToPack::CyclotronNormalSpeed,
        PackToAttenuator::CyclotronNormalSpeed,
    ),
];

/// Attenuator requests the wand must also act on.
pub const ATTENUATOR_TO_WAND: &[(AttenuatorToPack, PackToWand)] = &[
    (AttenuatorToPack::VolumeIncrease, PackToWand::VolumeIncrease),
    (AttenuatorToPack::VolumeDecrease, PackToWand::VolumeDecrease),
    (
        AttenuatorToPack::VolumeSoundEffectsIncrease,
        PackToWand::VolumeSoundEffectsIncrease,
    ),
    (
        AttenuatorToPack::VolumeSoundEffectsDecrease,
        PackToWand::VolumeSoundEffectsDecrease,
    ),
    (
        AttenuatorToPack::VolumeMusicIncrease,
        PackToWand::VolumeMusicIncrease,
    ),
    (
        AttenuatorToPack::VolumeMusicDecrease,
        PackToWand::VolumeMusicDecrease,
    ),
    (
        AttenuatorToPack::WarningCancelled,
        PackToWand::WarningCancelled,
    ),
    (AttenuatorToPack::ManualOverheat, PackToWand::ManualOverheat),
];

pub fn wand_to_attenuator(command: WandToPack) -> Option<PackToAttenuator> {
    WAND_TO_ATTENUATOR
        .iter()
        .find(|(from, _)| *from == command)
        .map(|(_, to)| *to)
}

pub fn attenuator_to_wand(command: AttenuatorToPack) -> Option<PackToWand> {
    ATTENUATOR_TO_WAND
        .iter()
        .find(|(from, _)| *from == command)
        .map(|(_, to)| *to)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::command::CommandSet;

    #[test]
    fn firing_and_mute_routes() {
        assert_eq!(
            wand_to_attenuator(WandToPack::Firing),
            Some(PackToAttenuator::Firing)
        );
        assert_eq!(
            attenuator_to_wand(AttenuatorToPack::VolumeIncrease),
            Some(PackToWand::VolumeIncrease)
        );
        assert_eq!(wand_to_attenuator(WandToPack::SyncNow), None);
        assert_eq!(attenuator_to_wand(AttenuatorToPack::ToggleMute), None);
    }

    #[test]
    fn tables_never_relay_handshakes() {
        for (from, to) in WAND_TO_ATTENUATOR {
            assert!(!from.is_handshake() && !to.is_handshake());
        }
        for (from, to) in ATTENUATOR_TO_WAND {
            assert!(!from.is_handshake() && !to.is_handshake());
        }
    }

    #[test]
    fn sources_are_unique() {
        let wand: HashSet<_> = WAND_TO_ATTENUATOR.iter().map(|(from, _)| from.id()).collect();
        assert_eq!(wand.len(), WAND_TO_ATTENUATOR.len());
        let attenuator: HashSet<_> = ATTENUATOR_TO_WAND
            .iter()
            .map(|(from, _)| from.id())
            .collect();
        assert_eq!(attenuator.len(), ATTENUATOR_TO_WAND.len());
    }

    #[test]
    fn stream_modes_keep_their_order() {
        let relayed: Vec<_> = WAND_TO_ATTENUATOR
            .iter()
            .filter(|(from, _)| from.name().ends_with("_MODE") && *from != WandToPack::SettingsMode)
            .map(|(_, to)| to.id() - PackToAttenuator::ProtonMode.id())
            .collect();
        assert_eq!(relayed, (0..8).collect::<Vec<u8>>());
    }
}
