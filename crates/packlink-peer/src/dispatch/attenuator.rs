//! Attenuator dispatcher.
//!
//! The attenuator is a remote display and control panel. It shows what the
//! pack reports, sends requests upstream and edits preferences for both the
//! pack and the wand through the pack.

use packlink_prefs::{Snapshot, SystemMode, Volume, VolumeChannel};
use serde::Serialize;
use tracing::{debug, info};

use super::DispatchContext;
use crate::capability::{AudioCue, LightingCue};
use crate::command::{AttenuatorToPack, PackToAttenuator};
use crate::mirror::Flag;
use crate::role::Role;

/// Which preference block an editor action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKind {
    Pack,
    Wand,
    Smoke,
}

pub fn pack_link_up(ctx: &mut DispatchContext<'_>) {
    ctx.mirror.set(Flag::PackConnected, true);
    ctx.caps.lighting.show(LightingCue::LinkUp(Role::Pack));
}

/// Everything the attenuator shows came from the pack.
pub fn pack_link_down(ctx: &mut DispatchContext<'_>) {
    let live = &mut ctx.state.live;
    live.pack_on = false;
    live.wand_on = false;
    live.wand_firing = false;
    live.barrel_extended = false;
    live.alarm = false;
    live.venting = false;
    live.overheating = false;
    ctx.mirror.clear_owned_by(Role::Pack);
    ctx.caps.lighting.show(LightingCue::LinkDown(Role::Pack));
}

pub fn acknowledge_sync(ctx: &mut DispatchContext<'_>) {
    ctx.out.command(Role::Pack, AttenuatorToPack::SyncEnd, 0);
}

pub fn on_pack_command(ctx: &mut DispatchContext<'_>, command: PackToAttenuator, arg: u16) {
    debug!(command = command.name(), arg, "pack command");
    match command {
        PackToAttenuator::PackOn | PackToAttenuator::PackOff => {
            let on = command == PackToAttenuator::PackOn;
            ctx.state.live.pack_on = on;
            ctx.mirror.set(Flag::PackOn, on);
            ctx.caps.lighting.show(LightingCue::PackPower(on));
        }
        PackToAttenuator::WandOn | PackToAttenuator::WandOff => {
            let on = command == PackToAttenuator::WandOn;
            ctx.state.live.wand_on = on;
            ctx.mirror.set(Flag::WandOn, on);
        }
        PackToAttenuator::WandConnected => {
            info!("pack reports wand connected");
            ctx.mirror.set(Flag::WandConnected, true);
        }
        PackToAttenuator::WandDisconnected => {
            info!("pack reports wand disconnected");
            let live = &mut ctx.state.live;
            live.wand_on = false;
            live.wand_firing = false;
            live.barrel_extended = false;
            ctx.mirror.clear_owned_by(Role::Wand);
        }
        PackToAttenuator::IonArmSwitchOn => ctx.state.live.ion_arm_switch_on = true,
        PackToAttenuator::IonArmSwitchOff => ctx.state.live.ion_arm_switch_on = false,
        PackToAttenuator::ModeSuperHero | PackToAttenuator::ModeOriginal => {
            let mode = if command == PackToAttenuator::ModeSuperHero {
                SystemMode::SuperHero
            } else {
                SystemMode::Original
            };
            ctx.state.live.system_mode = mode;
            ctx.mirror.set_system_mode(mode);
        }
        PackToAttenuator::Year1984
        | PackToAttenuator::Year1989
        | PackToAttenuator::YearAfterlife
        | PackToAttenuator::YearFrozenEmpire => {
            if let Some(year) = command.system_year() {
                ctx.state.live.system_year = year;
                ctx.mirror.set_system_year(year);
            }
        }
        PackToAttenuator::ProtonMode
        | PackToAttenuator::StasisMode
        | PackToAttenuator::SlimeMode
        | PackToAttenuator::MesonMode
        | PackToAttenuator::SpectralMode
        | PackToAttenuator::HalloweenMode
        | PackToAttenuator::ChristmasMode
        | PackToAttenuator::SpectralCustomMode => {
            if let Some(mode) = command.stream_mode() {
                ctx.state.live.stream_mode = mode;
                ctx.mirror.set_stream_mode(mode);
                ctx.caps.lighting.show(LightingCue::StreamMode(mode));
            }
        }
        PackToAttenuator::SettingsMode => debug!("wand entered its settings menu"),
        PackToAttenuator::PowerLevel1
        | PackToAttenuator::PowerLevel2
        | PackToAttenuator::PowerLevel3
        | PackToAttenuator::PowerLevel4
        | PackToAttenuator::PowerLevel5 => {
            if let Some(level) = command.power_level() {
                ctx.state.live.set_power_level(level);
                ctx.mirror.set_power_level(level);
                ctx.caps.lighting.show(LightingCue::PowerLevel(level));
            }
        }
        PackToAttenuator::AlarmOn | PackToAttenuator::AlarmOff => {
            let on = command == PackToAttenuator::AlarmOn;
            ctx.state.live.alarm = on;
            ctx.mirror.set(Flag::Alarm, on);
            ctx.caps.lighting.show(LightingCue::Alarm(on));
        }
        PackToAttenuator::Venting | PackToAttenuator::VentingFinished => {
            let venting = command == PackToAttenuator::Venting;
            ctx.state.live.venting = venting;
            ctx.mirror.set(Flag::Venting, venting);
            ctx.caps.lighting.show(LightingCue::Venting(venting));
        }
        PackToAttenuator::Overheating | PackToAttenuator::OverheatingFinished => {
            let overheating = command == PackToAttenuator::Overheating;
            ctx.state.live.overheating = overheating;
            ctx.mirror.set(Flag::Overheating, overheating);
            ctx.caps.lighting.show(LightingCue::Overheat(overheating));
        }
        PackToAttenuator::Firing | PackToAttenuator::FiringStopped => {
            let firing = command == PackToAttenuator::Firing;
            ctx.state.live.wand_firing = firing;
            ctx.mirror.set(Flag::WandFiring, firing);
            ctx.caps.lighting.show(LightingCue::Firing(firing));
        }
        PackToAttenuator::BarrelExtended | PackToAttenuator::BarrelRetracted => {
            let extended = command == PackToAttenuator::BarrelExtended;
            ctx.state.live.barrel_extended = extended;
            ctx.mirror.set(Flag::BarrelExtended, extended);
        }
        PackToAttenuator::CyclotronIncreaseSpeed => ctx.state.live.increase_speed(),
        PackToAttenuator::CyclotronNormalSpeed => ctx.state.live.reset_speed(),
        PackToAttenuator::ToggleMute => {
            let muted = arg == 2;
            ctx.state.live.muted = muted;
            ctx.caps.audio.play(AudioCue::Muted(muted));
        }
        PackToAttenuator::MusicPlayTrack => {
            let music = &mut ctx.state.live.music;
            music.current_track = arg;
            music.playing = true;
            music.paused = false;
        }
        PackToAttenuator::MusicStop => {
            let music = &mut ctx.state.live.music;
            music.playing = false;
            music.paused = false;
        }
        PackToAttenuator::MusicTrackLoopToggle => ctx.state.live.music.looped = arg == 2,
        PackToAttenuator::WarningCancelled => {
            ctx.caps.lighting.show(LightingCue::Overheat(false));
        }
        PackToAttenuator::VolumeSync
        | PackToAttenuator::SpectralColourData
        | PackToAttenuator::SyncData => {
            debug!(
                command = command.name(),
                "data id sent as a command; expected a data record"
            );
        }
        PackToAttenuator::Null
        | PackToAttenuator::ComStart
        | PackToAttenuator::Handshake
        | PackToAttenuator::SyncStart
        | PackToAttenuator::SyncEnd => {}
    }
}

pub fn on_pack_data(ctx: &mut DispatchContext<'_>, message: PackToAttenuator, data: [u8; 3]) {
    match message {
        PackToAttenuator::VolumeSync => {
            ctx.state.live.volume = Volume::from_data(data);
        }
        PackToAttenuator::SpectralColourData => {
            let [hue, saturation, _] = data;
            ctx.state.live.spectral_hue = hue;
            ctx.state.live.spectral_saturation = saturation;
            ctx.caps
                .lighting
                .show(LightingCue::SpectralColour { hue, saturation });
        }
        PackToAttenuator::SyncData => {
            debug!(?data, "sync data arrives as a SYNC packet; ignoring record");
        }
        other => debug!(message = other.name(), ?data, "ignoring data record from pack"),
    }
}

pub fn on_pack_snapshot(ctx: &mut DispatchContext<'_>, snapshot: Snapshot) {
    match snapshot {
        Snapshot::AttenuatorSync(data) => {
            let live = &mut ctx.state.live;
            live.apply_attenuator_sync(&data);
            let wand_present = data.wand_present != 0;
            ctx.mirror.set(Flag::WandConnected, wand_present);
            ctx.mirror.set(Flag::PackOn, live.pack_on);
            ctx.mirror.set(Flag::WandOn, live.wand_on);
            ctx.mirror.set(Flag::WandFiring, live.wand_firing);
            ctx.mirror.set(Flag::BarrelExtended, live.barrel_extended);
            ctx.mirror.set(Flag::Overheating, live.overheating);
            ctx.mirror.set_power_level(live.power_level);
            ctx.mirror.set_stream_mode(live.stream_mode);
            ctx.mirror.set_system_mode(live.system_mode);
            ctx.mirror.set_system_year(live.system_year);
            debug!(wand_present, "applied pack sync");
        }
        Snapshot::Pack(prefs) => {
            ctx.state.pack.apply_prefs(&prefs);
            debug!("received pack preferences");
        }
        Snapshot::Wand(prefs) => {
            ctx.state.wand.apply_prefs(&prefs);
            debug!("received wand preferences");
        }
        Snapshot::Smoke(prefs) => {
            ctx.state.smoke.apply_prefs(&prefs);
            debug!("received smoke preferences");
        }
        other => debug!(?other, "unexpected snapshot from pack"),
    }
}

/// Ask the pack for a preference block. The reply lands in the node's state.
pub fn request_preferences(ctx: &mut DispatchContext<'_>, kind: PreferenceKind) {
    let command = match kind {
        PreferenceKind::Pack => AttenuatorToPack::RequestPreferencesPack,
        PreferenceKind::Wand => AttenuatorToPack::RequestPreferencesWand,
        PreferenceKind::Smoke => AttenuatorToPack::RequestPreferencesSmoke,
    };
    ctx.out.command(Role::Pack, command, 0);
}

/// Send the locally edited block back to the pack.
pub fn push_preferences(ctx: &mut DispatchContext<'_>, kind: PreferenceKind) {
    match kind {
        PreferenceKind::Pack => ctx.out.record(Role::Pack, &ctx.state.pack.to_prefs()),
        PreferenceKind::Wand => ctx.out.record(Role::Pack, &ctx.state.wand.to_prefs()),
        PreferenceKind::Smoke => ctx.out.record(Role::Pack, &ctx.state.smoke.to_prefs()),
    }
}

/// Ask the owning device to persist a block. Smoke settings are split, so
/// both halves are saved.
pub fn save_preferences(ctx: &mut DispatchContext<'_>, kind: PreferenceKind) {
    match kind {
        PreferenceKind::Pack => {
            ctx.out
                .command(Role::Pack, AttenuatorToPack::SaveEepromSettingsPack, 0);
        }
        PreferenceKind::Wand => {
            ctx.out
                .command(Role::Pack, AttenuatorToPack::SaveEepromSettingsWand, 0);
        }
        PreferenceKind::Smoke => {
            ctx.out
                .command(Role::Pack, AttenuatorToPack::SaveEepromSettingsPack, 0);
            ctx.out
                .command(Role::Pack, AttenuatorToPack::SaveEepromSettingsWand, 0);
        }
    }
}

/// The pack owns the mute state and echoes the result back.
pub fn toggle_mute(ctx: &mut DispatchContext<'_>) {
    ctx.out.command(Role::Pack, AttenuatorToPack::ToggleMute, 0);
}

pub fn set_pack_on(ctx: &mut DispatchContext<'_>, on: bool) {
    let command = if on {
        AttenuatorToPack::TurnPackOn
    } else {
        AttenuatorToPack::TurnPackOff
    };
    ctx.out.command(Role::Pack, command, 0);
}

pub fn step_volume(ctx: &mut DispatchContext<'_>, channel: VolumeChannel, up: bool) {
    let command = match (channel, up) {
        (VolumeChannel::Master, true) => AttenuatorToPack::VolumeIncrease,
        (VolumeChannel::Master, false) => AttenuatorToPack::VolumeDecrease,
        (VolumeChannel::Effects, true) => AttenuatorToPack::VolumeSoundEffectsIncrease,
        (VolumeChannel::Effects, false) => AttenuatorToPack::VolumeSoundEffectsDecrease,
        (VolumeChannel::Music, true) => AttenuatorToPack::VolumeMusicIncrease,
        (VolumeChannel::Music, false) => AttenuatorToPack::VolumeMusicDecrease,
    };
    ctx.out.command(Role::Pack, command, 0);
}

/// Send the spectral custom colour picked on the attenuator.
pub fn set_spectral_colour(ctx: &mut DispatchContext<'_>, hue: u8, saturation: u8) {
    ctx.state.live.spectral_hue = hue;
    ctx.state.live.spectral_saturation = saturation;
    ctx.out.data(
        Role::Pack,
        AttenuatorToPack::SpectralColourData,
        [hue, saturation, 0],
    );
}

#[cfg(test)]
mod tests {
    use packlink_frame::WireRecord;
    use packlink_prefs::{LiveState, PackPrefs, StreamMode, SystemYear};

    use super::*;
    use crate::dispatch::testing::Harness;
    use crate::dispatch::{Outbound, Peers};

    fn with_pack() -> Harness {
        Harness::new(Peers {
            pack: true,
            ..Peers::default()
        })
    }

    #[test]
    fn relayed_firing_shows_in_mirror() {
        let mut h = with_pack();
        on_pack_command(&mut h.ctx(), PackToAttenuator::WandConnected, 0);
        on_pack_command(&mut h.ctx(), PackToAttenuator::Firing, 3);
        let snapshot = h.reader.snapshot();
        assert!(snapshot.wand_connected);
        assert!(snapshot.wand_firing);
    }

    #[test]
    fn wand_disconnect_clears_wand_flags() {
        let mut h = with_pack();
        on_pack_command(&mut h.ctx(), PackToAttenuator::PackOn, 0);
        on_pack_command(&mut h.ctx(), PackToAttenuator::WandConnected, 0);
        on_pack_command(&mut h.ctx(), PackToAttenuator::WandOn, 0);
        on_pack_command(&mut h.ctx(), PackToAttenuator::BarrelExtended, 0);

        on_pack_command(&mut h.ctx(), PackToAttenuator::WandDisconnected, 0);
        let snapshot = h.reader.snapshot();
        assert!(!snapshot.wand_connected);
        assert!(!snapshot.wand_on);
        assert!(!snapshot.barrel_extended);
        assert!(snapshot.pack_on);
    }

    #[test]
    fn sync_snapshot_populates_everything() {
        let mut h = with_pack();
        let pack = LiveState {
            pack_on: true,
            wand_firing: true,
            stream_mode: StreamMode::Meson,
            system_year: SystemYear::Y1984,
            power_level: 2,
            ..LiveState::default()
        };
        on_pack_snapshot(
            &mut h.ctx(),
            Snapshot::AttenuatorSync(pack.attenuator_sync(true)),
        );
        let snapshot = h.reader.snapshot();
        assert!(snapshot.pack_on);
        assert!(snapshot.wand_connected);
        assert!(snapshot.wand_firing);
        assert_eq!(snapshot.stream_mode, StreamMode::Meson);
        assert_eq!(snapshot.power_level, 2);
        assert_eq!(snapshot.system_year, SystemYear::Y1984);
    }

    #[test]
    fn sync_without_wand_hides_wand_state() {
        let mut h = with_pack();
        let pack = LiveState {
            wand_firing: true,
            ..LiveState::default()
        };
        on_pack_snapshot(
            &mut h.ctx(),
            Snapshot::AttenuatorSync(pack.attenuator_sync(false)),
        );
        assert!(!h.reader.snapshot().wand_connected);
        assert!(!h.reader.snapshot().wand_firing);
    }

    #[test]
    fn mute_and_loop_follow_echo_arguments() {
        let mut h = with_pack();
        on_pack_command(&mut h.ctx(), PackToAttenuator::ToggleMute, 2);
        assert!(h.state.live.muted);
        on_pack_command(&mut h.ctx(), PackToAttenuator::ToggleMute, 1);
        assert!(!h.state.live.muted);
        on_pack_command(&mut h.ctx(), PackToAttenuator::MusicTrackLoopToggle, 2);
        assert!(h.state.live.music.looped);
    }

    #[test]
    fn preference_requests_and_saves() {
        let mut h = with_pack();
        request_preferences(&mut h.ctx(), PreferenceKind::Smoke);
        save_preferences(&mut h.ctx(), PreferenceKind::Smoke);
        assert_eq!(
            h.sent_to(Role::Pack),
            vec![
                "A_REQUEST_PREFERENCES_SMOKE",
                "A_SAVE_EEPROM_SETTINGS_PACK",
                "A_SAVE_EEPROM_SETTINGS_WAND"
            ]
        );
    }

    #[test]
    fn pushed_preferences_carry_local_edits() {
        let mut h = with_pack();
        h.state.pack.default_volume_percent = 35;
        push_preferences(&mut h.ctx(), PreferenceKind::Pack);

        let out = h.out.take_for(Role::Pack);
        let Outbound::Snapshot(frame) = &out[0] else {
            panic!("expected a snapshot, got {out:?}");
        };
        let prefs = PackPrefs::from_frame(frame).expect("pack prefs should decode");
        assert_eq!(prefs.default_system_volume, 35);
    }

    #[test]
    fn received_preferences_are_stored() {
        let mut h = with_pack();
        let mut settings = h.state.pack;
        settings.ribbon_cable_alarm = !settings.ribbon_cable_alarm;
        on_pack_snapshot(&mut h.ctx(), Snapshot::Pack(settings.to_prefs()));
        assert_eq!(h.state.pack, settings);
    }

    #[test]
    fn volume_and_colour_records() {
        let mut h = with_pack();
        on_pack_data(&mut h.ctx(), PackToAttenuator::VolumeSync, [10, 20, 30]);
        assert_eq!(h.state.live.volume, Volume::from_percentages(10, 20, 30));

        set_spectral_colour(&mut h.ctx(), 90, 200);
        assert_eq!(
            h.out.take_for(Role::Pack),
            vec![Outbound::data(
                AttenuatorToPack::SpectralColourData,
                [90, 200, 0]
            )]
        );
    }

    #[test]
    fn acknowledge_is_sync_end() {
        let mut h = with_pack();
        acknowledge_sync(&mut h.ctx());
        assert_eq!(h.sent_to(Role::Pack), vec!["A_SYNC_END"]);
    }
}
