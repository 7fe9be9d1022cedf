//! Hub (pack) dispatcher.
//!
//! The pack owns the authoritative live state. Wand events update it and are
//! relayed to the attenuator; attenuator requests are applied and announced
//! to whichever peripherals care.

use packlink_prefs::{
    SmokeSettings, Snapshot, SystemMode, SystemYear, Volume, VolumeChannel, WandPrefs,
};
use tracing::{debug, info, warn};

use super::{relay, DispatchContext};
use crate::capability::{AudioCue, LightingCue};
use crate::command::{AttenuatorToPack, PackToAttenuator, PackToWand, WandToPack};
use crate::mirror::Flag;
use crate::role::Role;

/// Full-state sync toward the wand.
pub fn sync_wand(ctx: &mut DispatchContext<'_>) {
    let live = &ctx.state.live;
    ctx.out.command(Role::Wand, PackToWand::SyncStart, 0);
    ctx.out.record(Role::Wand, &live.wand_sync());
    if live.alarm {
        ctx.out.command(Role::Wand, PackToWand::AlarmOn, 0);
    }
    ctx.out.command(Role::Wand, PackToWand::SyncEnd, 0);
}

/// Full-state sync toward the attenuator.
pub fn sync_attenuator(ctx: &mut DispatchContext<'_>) {
    let live = &ctx.state.live;
    ctx.out.command(Role::Attenuator, PackToAttenuator::SyncStart, 0);
    ctx.out
        .record(Role::Attenuator, &live.attenuator_sync(ctx.peers.wand));
    if live.alarm {
        ctx.out
            .command(Role::Attenuator, PackToAttenuator::AlarmOn, 0);
    }
    ctx.out.command(Role::Attenuator, PackToAttenuator::SyncEnd, 0);
}

pub fn wand_link_up(ctx: &mut DispatchContext<'_>) {
    ctx.mirror.set(Flag::WandConnected, true);
    ctx.caps.lighting.show(LightingCue::LinkUp(Role::Wand));
    ctx.out
        .command(Role::Attenuator, PackToAttenuator::WandConnected, 0);
}

/// The wand went silent or restarted; nothing it reported still holds.
pub fn wand_link_down(ctx: &mut DispatchContext<'_>) {
    let live = &mut ctx.state.live;
    let was_firing = live.wand_firing;
    live.wand_on = false;
    live.wand_firing = false;
    live.barrel_extended = false;

    ctx.mirror.clear_owned_by(Role::Wand);
    if was_firing {
        ctx.caps.audio.play(AudioCue::FiringStop);
        ctx.caps.lighting.show(LightingCue::Firing(false));
    }
    ctx.caps.lighting.show(LightingCue::LinkDown(Role::Wand));
    ctx.out
        .command(Role::Attenuator, PackToAttenuator::WandDisconnected, 0);
}

pub fn attenuator_link_up(ctx: &mut DispatchContext<'_>) {
    ctx.mirror.set(Flag::AttenuatorConnected, true);
    ctx.caps.lighting.show(LightingCue::LinkUp(Role::Attenuator));
}

pub fn attenuator_link_down(ctx: &mut DispatchContext<'_>) {
    ctx.mirror.clear_owned_by(Role::Attenuator);
    ctx.caps
        .lighting
        .show(LightingCue::LinkDown(Role::Attenuator));
}

pub fn on_wand_command(ctx: &mut DispatchContext<'_>, command: WandToPack, arg: u16) {
    debug!(command = command.name(), arg, "wand command");
    match command {
        WandToPack::On | WandToPack::Off => {
            let on = command == WandToPack::On;
            ctx.state.live.wand_on = on;
            ctx.mirror.set(Flag::WandOn, on);
            ctx.caps
                .audio
                .play(if on { AudioCue::WandOn } else { AudioCue::WandOff });
        }
        WandToPack::BarrelExtended | WandToPack::BarrelRetracted => {
            let extended = command == WandToPack::BarrelExtended;
            ctx.state.live.barrel_extended = extended;
            ctx.mirror.set(Flag::BarrelExtended, extended);
            ctx.caps
                .lighting
                .show(LightingCue::BarrelExtended(extended));
        }
        WandToPack::Firing | WandToPack::FiringStopped => {
            let firing = command == WandToPack::Firing;
            ctx.state.live.wand_firing = firing;
            ctx.mirror.set(Flag::WandFiring, firing);
            ctx.caps.audio.play(if firing {
                AudioCue::FiringStart
            } else {
                AudioCue::FiringStop
            });
            ctx.caps.lighting.show(LightingCue::Firing(firing));
        }
        WandToPack::PowerLevel1
        | WandToPack::PowerLevel2
        | WandToPack::PowerLevel3
        | WandToPack::PowerLevel4
        | WandToPack::PowerLevel5 => {
            if let Some(level) = command.power_level() {
                ctx.state.live.set_power_level(level);
                ctx.mirror.set_power_level(level);
                ctx.caps.audio.play(AudioCue::PowerLevel(level));
                ctx.caps.lighting.show(LightingCue::PowerLevel(level));
            }
        }
        WandToPack::ProtonMode
        | WandToPack::StasisMode
        | WandToPack::SlimeMode
        | WandToPack::MesonMode
        | WandToPack::SpectralMode
        | WandToPack::HalloweenMode
        | WandToPack::ChristmasMode
        | WandToPack::SpectralCustomMode => {
            if let Some(mode) = command.stream_mode() {
                ctx.state.live.stream_mode = mode;
                ctx.mirror.set_stream_mode(mode);
                ctx.caps.audio.play(AudioCue::StreamMode(mode));
                ctx.caps.lighting.show(LightingCue::StreamMode(mode));
            }
        }
        WandToPack::SettingsMode => {}
        WandToPack::Venting => {
            ctx.state.live.venting = true;
            ctx.mirror.set(Flag::Venting, true);
            ctx.caps.audio.play(AudioCue::Venting);
            ctx.caps.lighting.show(LightingCue::Venting(true));
        }
        WandToPack::Overheating => {
            ctx.state.live.overheating = true;
            ctx.mirror.set(Flag::Overheating, true);
            ctx.caps.audio.play(AudioCue::Overheating);
            ctx.caps.lighting.show(LightingCue::Overheat(true));
        }
        WandToPack::CyclotronIncreaseSpeed => ctx.state.live.increase_speed(),
        WandToPack::CyclotronNormalSpeed => ctx.state.live.reset_speed(),
        WandToPack::ModeToggle => {
            ctx.state.live.system_mode = match ctx.state.live.system_mode {
                SystemMode::SuperHero => SystemMode::Original,
                SystemMode::Original => SystemMode::SuperHero,
            };
            announce_mode(ctx);
        }
        WandToPack::YearModesCycle => {
            ctx.state.live.system_year = next_year(ctx.state.live.system_year);
            announce_year(ctx);
        }
        WandToPack::VolumeIncrease => step_volume(ctx, VolumeChannel::Master, true),
        WandToPack::VolumeDecrease => step_volume(ctx, VolumeChannel::Master, false),
        WandToPack::VolumeSoundEffectsIncrease => step_volume(ctx, VolumeChannel::Effects, true),
        WandToPack::VolumeSoundEffectsDecrease => step_volume(ctx, VolumeChannel::Effects, false),
        WandToPack::VolumeMusicIncrease => step_volume(ctx, VolumeChannel::Music, true),
        WandToPack::VolumeMusicDecrease => step_volume(ctx, VolumeChannel::Music, false),
        WandToPack::ToggleMute => toggle_mute(ctx),
        WandToPack::MusicToggle => toggle_music(ctx),
        WandToPack::MusicNextTrack => {
            ctx.state.live.music.next_track();
            announce_track(ctx);
        }
        WandToPack::MusicPrevTrack => {
            ctx.state.live.music.prev_track();
            announce_track(ctx);
        }
        WandToPack::MusicTrackLoopToggle => toggle_loop(ctx),
        WandToPack::VibrationCycleToggle => {
            let enabled = !ctx.state.live.vibration_switch_on;
            ctx.state.live.vibration_switch_on = enabled;
            let command = if enabled {
                PackToWand::VibrationEnabled
            } else {
                PackToWand::VibrationDisabled
            };
            ctx.out.command(Role::Wand, command, 0);
        }
        WandToPack::SmokeToggle => {
            let enabled = !ctx.state.smoke.smoke_enabled;
            ctx.state.smoke.smoke_enabled = enabled;
            let command = if enabled {
                PackToWand::SmokeEnabled
            } else {
                PackToWand::SmokeDisabled
            };
            ctx.out.command(Role::Wand, command, 0);
        }
        WandToPack::WandBeepStart => ctx.caps.audio.play(AudioCue::Beep),
        WandToPack::WandBeepStop => {}
        WandToPack::ButtonMashing => {
            ctx.state.live.wand_firing = false;
            ctx.mirror.set(Flag::WandFiring, false);
            ctx.caps.audio.play(AudioCue::MashError);
            ctx.caps.lighting.show(LightingCue::Firing(false));
            ctx.out
                .command(Role::Attenuator, PackToAttenuator::FiringStopped, 0);
        }
        WandToPack::MashErrorRestart => {
            debug!("wand left button-mash lockout");
        }
        WandToPack::SaveConfigEepromSettings => save_pack_preferences(ctx),
        WandToPack::ClearConfigEepromSettings => {
            info!("clearing pack preferences");
            ctx.state.pack = Default::default();
            ctx.state.smoke = SmokeSettings::default();
            save_pack_preferences(ctx);
        }
        WandToPack::Null
        | WandToPack::ComStart
        | WandToPack::Handshake
        | WandToPack::SyncNow
        | WandToPack::Synchronized => {}
    }

    if let Some(relayed) = relay::wand_to_attenuator(command) {
        debug!(
            from = command.name(),
            to = relayed.name(),
            arg,
            "relaying to attenuator"
        );
        ctx.out.command(Role::Attenuator, relayed, arg);
        if relayed == PackToAttenuator::SpectralCustomMode {
            send_spectral_colour(ctx);
        }
    }
}

/// The wand sends no data records; anything arriving is logged and ignored.
pub fn on_wand_data(_ctx: &mut DispatchContext<'_>, message: WandToPack, data: [u8; 3]) {
    debug!(message = message.name(), ?data, "ignoring data record from wand");
}

/// Preference replies from the wand are relayed to the attenuator that asked.
pub fn on_wand_snapshot(ctx: &mut DispatchContext<'_>, snapshot: Snapshot) {
    match snapshot {
        Snapshot::Wand(prefs) => {
            ctx.state.wand.apply_prefs(&prefs);
            ctx.out.record(Role::Attenuator, &prefs);
        }
        Snapshot::Smoke(mut prefs) => {
            ctx.state.smoke.apply_wand_half(&prefs);
            ctx.state.smoke.fill_pack_half(&mut prefs);
            ctx.out.record(Role::Attenuator, &prefs);
        }
        other => debug!(?other, "unexpected snapshot from wand"),
    }
}

pub fn on_attenuator_command(ctx: &mut DispatchContext<'_>, command: AttenuatorToPack, arg: u16) {
    debug!(command = command.name(), arg, "attenuator command");
    match command {
        AttenuatorToPack::TurnPackOn => set_pack_on(ctx, true),
        AttenuatorToPack::TurnPackOff => set_pack_on(ctx, false),
        AttenuatorToPack::ToggleMute => toggle_mute(ctx),
        AttenuatorToPack::VolumeIncrease => step_volume(ctx, VolumeChannel::Master, true),
        AttenuatorToPack::VolumeDecrease => step_volume(ctx, VolumeChannel::Master, false),
        AttenuatorToPack::VolumeSoundEffectsIncrease => {
            step_volume(ctx, VolumeChannel::Effects, true)
        }
        AttenuatorToPack::VolumeSoundEffectsDecrease => {
            step_volume(ctx, VolumeChannel::Effects, false)
        }
        AttenuatorToPack::VolumeMusicIncrease => step_volume(ctx, VolumeChannel::Music, true),
        AttenuatorToPack::VolumeMusicDecrease => step_volume(ctx, VolumeChannel::Music, false),
        AttenuatorToPack::MusicStartStop => toggle_music(ctx),
        AttenuatorToPack::MusicPauseResume => {
            let music = &mut ctx.state.live.music;
            if music.playing {
                music.paused = !music.paused;
                let command = if music.paused {
                    PackToWand::MusicPause
                } else {
                    PackToWand::MusicResume
                };
                ctx.out.command(Role::Wand, command, 0);
            }
        }
        AttenuatorToPack::MusicNextTrack => {
            ctx.state.live.music.next_track();
            announce_track(ctx);
        }
        AttenuatorToPack::MusicPrevTrack => {
            ctx.state.live.music.prev_track();
            announce_track(ctx);
        }
        AttenuatorToPack::MusicTrackLoopToggle => toggle_loop(ctx),
        AttenuatorToPack::MusicPlayTrack => play_track(ctx, arg),
        AttenuatorToPack::WarningCancelled => {}
        AttenuatorToPack::ManualOverheat => {}
        AttenuatorToPack::RequestPreferencesPack => {
            let prefs = ctx.state.pack.to_prefs();
            ctx.out.record(Role::Attenuator, &prefs);
        }
        AttenuatorToPack::RequestPreferencesWand => {
            if ctx.peers.wand {
                ctx.out.command(Role::Wand, PackToWand::SendPreferencesWand, 0);
            } else {
                debug!("no wand connected; answering with default wand preferences");
                ctx.out.record(Role::Attenuator, &WandPrefs::default());
            }
        }
        AttenuatorToPack::RequestPreferencesSmoke => {
            if ctx.peers.wand {
                ctx.out
                    .command(Role::Wand, PackToWand::SendPreferencesSmoke, 0);
            } else {
                debug!("no wand connected; answering with default wand smoke half");
                let mut prefs = SmokeSettings::default().to_prefs();
                ctx.state.smoke.fill_pack_half(&mut prefs);
                ctx.out.record(Role::Attenuator, &prefs);
            }
        }
        AttenuatorToPack::SaveEepromSettingsPack => save_pack_preferences(ctx),
        AttenuatorToPack::SaveEepromSettingsWand => {
            ctx.out.command(Role::Wand, PackToWand::SaveEepromWand, 0);
        }
        AttenuatorToPack::SpectralColourData => {
            debug!("spectral colour sent as a command; expected a data record");
        }
        AttenuatorToPack::Null
        | AttenuatorToPack::ComStart
        | AttenuatorToPack::Handshake
        | AttenuatorToPack::SyncStart
        | AttenuatorToPack::SyncEnd => {}
    }

    if let Some(relayed) = relay::attenuator_to_wand(command) {
        debug!(
            from = command.name(),
            to = relayed.name(),
            arg,
            "relaying to wand"
        );
        ctx.out.command(Role::Wand, relayed, arg);
    }
}

pub fn on_attenuator_data(ctx: &mut DispatchContext<'_>, message: AttenuatorToPack, data: [u8; 3]) {
    match message {
        AttenuatorToPack::SpectralColourData => {
            let [hue, saturation, _] = data;
            ctx.state.live.spectral_hue = hue;
            ctx.state.live.spectral_saturation = saturation;
            ctx.caps
                .lighting
                .show(LightingCue::SpectralColour { hue, saturation });
        }
        other => debug!(message = other.name(), ?data, "ignoring data record from attenuator"),
    }
}

/// Preferences pushed from the attenuator's editor.
pub fn on_attenuator_snapshot(ctx: &mut DispatchContext<'_>, snapshot: Snapshot) {
    match snapshot {
        Snapshot::Pack(prefs) => {
            let live = &mut ctx.state.live;
            let (mode, year) = (live.system_mode, live.system_year);
            ctx.state.pack.apply_prefs(&prefs);
            live.system_mode = ctx.state.pack.default_system_mode;
            live.system_year = ctx.state.pack.current_year;
            info!("pack preferences updated from attenuator");
            if live.system_mode != mode {
                announce_mode(ctx);
            }
            if ctx.state.live.system_year != year {
                announce_year(ctx);
            }
        }
        Snapshot::Wand(prefs) => {
            if ctx.peers.wand {
                ctx.state.wand.apply_prefs(&prefs);
                ctx.out.record(Role::Wand, &prefs);
            } else {
                debug!("no wand connected; dropping wand preferences");
            }
        }
        Snapshot::Smoke(prefs) => {
            ctx.state.smoke.apply_prefs(&prefs);
            ctx.out.record(Role::Wand, &prefs);
        }
        other => debug!(?other, "unexpected snapshot from attenuator"),
    }
}

pub fn set_pack_on(ctx: &mut DispatchContext<'_>, on: bool) {
    ctx.state.live.pack_on = on;
    ctx.mirror.set(Flag::PackOn, on);
    ctx.caps
        .audio
        .play(if on { AudioCue::PackOn } else { AudioCue::PackOff });
    ctx.caps.lighting.show(LightingCue::PackPower(on));
    if on {
        ctx.out.command(Role::Wand, PackToWand::On, 0);
        ctx.out.command(Role::Attenuator, PackToAttenuator::PackOn, 0);
    } else {
        ctx.out.command(Role::Wand, PackToWand::Off, 0);
        ctx.out.command(Role::Attenuator, PackToAttenuator::PackOff, 0);
    }
}

pub fn set_alarm(ctx: &mut DispatchContext<'_>, on: bool) {
    ctx.state.live.alarm = on;
    ctx.mirror.set(Flag::Alarm, on);
    ctx.caps
        .audio
        .play(if on { AudioCue::AlarmOn } else { AudioCue::AlarmOff });
    ctx.caps.lighting.show(LightingCue::Alarm(on));
    if on {
        ctx.out.command(Role::Wand, PackToWand::AlarmOn, 0);
        ctx.out.command(Role::Attenuator, PackToAttenuator::AlarmOn, 0);
    } else {
        ctx.out.command(Role::Wand, PackToWand::AlarmOff, 0);
        ctx.out
            .command(Role::Attenuator, PackToAttenuator::AlarmOff, 0);
    }
}

/// Set all three levels at once and push them to both peripherals.
pub fn set_volume(ctx: &mut DispatchContext<'_>, volume: Volume) {
    ctx.state.live.volume =
        Volume::from_percentages(volume.master, volume.effects, volume.music);
    ctx.caps.audio.play(AudioCue::VolumeChanged);
    let data = ctx.state.live.volume.to_data();
    ctx.out.data(Role::Wand, PackToWand::VolumeSync, data);
    ctx.out
        .data(Role::Attenuator, PackToAttenuator::VolumeSync, data);
}

/// The vent cycle completed: clear the warning state everywhere.
pub fn finish_venting(ctx: &mut DispatchContext<'_>) {
    let live = &mut ctx.state.live;
    live.venting = false;
    live.overheating = false;
    ctx.mirror.set(Flag::Venting, false);
    ctx.mirror.set(Flag::Overheating, false);
    ctx.caps.lighting.show(LightingCue::Venting(false));
    ctx.caps.lighting.show(LightingCue::Overheat(false));
    ctx.out.command(Role::Wand, PackToWand::VentingFinished, 0);
    ctx.out
        .command(Role::Wand, PackToWand::OverheatingFinished, 0);
    ctx.out
        .command(Role::Attenuator, PackToAttenuator::VentingFinished, 0);
    ctx.out
        .command(Role::Attenuator, PackToAttenuator::OverheatingFinished, 0);
}

fn step_volume(ctx: &mut DispatchContext<'_>, channel: VolumeChannel, up: bool) {
    if !ctx.state.live.step_volume(channel, up) {
        return;
    }
    ctx.caps.audio.play(AudioCue::VolumeChanged);
    let data = ctx.state.live.volume.to_data();
    ctx.out
        .data(Role::Attenuator, PackToAttenuator::VolumeSync, data);
}

fn toggle_mute(ctx: &mut DispatchContext<'_>) {
    let muted = !ctx.state.live.muted;
    ctx.state.live.muted = muted;
    ctx.caps.audio.play(AudioCue::Muted(muted));
    let command = if muted {
        PackToWand::MasterAudioSilentMode
    } else {
        PackToWand::MasterAudioNormal
    };
    ctx.out.command(Role::Wand, command, 0);
    ctx.out.command(
        Role::Attenuator,
        PackToAttenuator::ToggleMute,
        if muted { 2 } else { 1 },
    );
}

fn toggle_music(ctx: &mut DispatchContext<'_>) {
    let music = ctx.state.live.music;
    if music.playing {
        stop_music(ctx);
    } else {
        play_track(ctx, music.current_track);
    }
}

fn play_track(ctx: &mut DispatchContext<'_>, track: u16) {
    let music = &mut ctx.state.live.music;
    if music.track_count == 0 {
        debug!("no music tracks loaded");
        return;
    }
    music.current_track = track.min(music.track_count - 1);
    music.playing = true;
    music.paused = false;
    let track = music.current_track;
    ctx.caps.audio.play(AudioCue::MusicTrack(track));
    ctx.out.command(Role::Wand, PackToWand::MusicPlayTrack, track);
    ctx.out
        .command(Role::Attenuator, PackToAttenuator::MusicPlayTrack, track);
}

fn stop_music(ctx: &mut DispatchContext<'_>) {
    let music = &mut ctx.state.live.music;
    music.playing = false;
    music.paused = false;
    ctx.caps.audio.play(AudioCue::MusicStopped);
    ctx.out.command(Role::Wand, PackToWand::MusicStop, 0);
    ctx.out
        .command(Role::Attenuator, PackToAttenuator::MusicStop, 0);
}

/// A new track was selected; start it only if music is already running.
fn announce_track(ctx: &mut DispatchContext<'_>) {
    let music = ctx.state.live.music;
    if music.playing {
        play_track(ctx, music.current_track);
    }
}

fn toggle_loop(ctx: &mut DispatchContext<'_>) {
    let looped = !ctx.state.live.music.looped;
    ctx.state.live.music.looped = looped;
    let command = if looped {
        PackToWand::MusicRepeat
    } else {
        PackToWand::MusicNoRepeat
    };
    ctx.out.command(Role::Wand, command, 0);
    ctx.out.command(
        Role::Attenuator,
        PackToAttenuator::MusicTrackLoopToggle,
        if looped { 2 } else { 1 },
    );
}

fn announce_mode(ctx: &mut DispatchContext<'_>) {
    let mode = ctx.state.live.system_mode;
    ctx.mirror.set_system_mode(mode);
    ctx.caps.audio.play(AudioCue::SystemMode(mode));
    ctx.out
        .command(Role::Wand, PackToWand::for_system_mode(mode), 0);
    ctx.out.command(
        Role::Attenuator,
        PackToAttenuator::for_system_mode(mode),
        0,
    );
}

fn announce_year(ctx: &mut DispatchContext<'_>) {
    let year = ctx.state.live.system_year;
    ctx.mirror.set_system_year(year);
    ctx.caps.audio.play(AudioCue::SystemYear(year));
    ctx.out
        .command(Role::Wand, PackToWand::for_system_year(year), 0);
    ctx.out.command(
        Role::Attenuator,
        PackToAttenuator::for_system_year(year),
        0,
    );
}

fn send_spectral_colour(ctx: &mut DispatchContext<'_>) {
    let live = &ctx.state.live;
    ctx.out.data(
        Role::Attenuator,
        PackToAttenuator::SpectralColourData,
        [live.spectral_hue, live.spectral_saturation, 0],
    );
}

fn save_pack_preferences(ctx: &mut DispatchContext<'_>) {
    let pack = ctx.state.pack.to_prefs();
    let smoke = ctx.state.smoke.to_prefs();
    let saved = ctx
        .caps
        .store
        .save_pack(&pack)
        .and_then(|()| ctx.caps.store.save_smoke(&smoke));
    match saved {
        Ok(()) => {
            info!("pack preferences saved");
            ctx.caps.audio.play(AudioCue::PreferencesSaved);
        }
        Err(err) => warn!(error = %err, "failed to save pack preferences"),
    }
}

fn next_year(year: SystemYear) -> SystemYear {
    match year {
        SystemYear::Y1984 => SystemYear::Y1989,
        SystemYear::Y1989 => SystemYear::Afterlife,
        SystemYear::Afterlife => SystemYear::FrozenEmpire,
        SystemYear::FrozenEmpire => SystemYear::Y1984,
    }
}

#[cfg(test)]
mod tests {
    use packlink_frame::WireRecord;
    use packlink_prefs::{PackPrefs, SmokePrefs, StreamMode};

    use super::*;
    use crate::capability::Cue;
    use crate::dispatch::testing::Harness;
    use crate::dispatch::{Outbound, Peers};

    fn both_peers() -> Harness {
        Harness::new(Peers {
            pack: false,
            wand: true,
            attenuator: true,
        })
    }

    #[test]
    fn firing_is_mirrored_and_relayed_with_its_argument() {
        let mut h = both_peers();
        on_wand_command(&mut h.ctx(), WandToPack::Firing, 7);

        assert!(h.reader.snapshot().wand_firing);
        assert!(h.state.live.wand_firing);
        assert!(h.cues.contains(Cue::Audio(AudioCue::FiringStart)));
        assert_eq!(h.sent_to(Role::Attenuator), vec!["A_FIRING(7)"]);
        assert!(h.sent_to(Role::Wand).is_empty());
    }

    #[test]
    fn stream_mode_updates_state_and_relays() {
        let mut h = both_peers();
        on_wand_command(&mut h.ctx(), WandToPack::SlimeMode, 0);
        assert_eq!(h.state.live.stream_mode, StreamMode::Slime);
        assert_eq!(h.reader.stream_mode(), StreamMode::Slime);
        assert_eq!(h.sent_to(Role::Attenuator), vec!["A_SLIME_MODE"]);
    }

    #[test]
    fn spectral_custom_mode_carries_colour() {
        let mut h = both_peers();
        h.state.live.spectral_hue = 42;
        on_wand_command(&mut h.ctx(), WandToPack::SpectralCustomMode, 0);
        let out = h.out.take_for(Role::Attenuator);
        assert_eq!(
            out[1],
            Outbound::data(PackToAttenuator::SpectralColourData, [42, 255, 0])
        );
    }

    #[test]
    fn attenuator_mute_reaches_wand_and_echoes_back() {
        let mut h = both_peers();
        on_attenuator_command(&mut h.ctx(), AttenuatorToPack::ToggleMute, 0);
        assert!(h.state.live.muted);
        assert_eq!(h.sent_to(Role::Wand), vec!["P_MASTER_AUDIO_SILENT_MODE"]);
        assert_eq!(h.sent_to(Role::Attenuator), vec!["A_TOGGLE_MUTE(2)"]);

        on_attenuator_command(&mut h.ctx(), AttenuatorToPack::ToggleMute, 0);
        assert_eq!(h.sent_to(Role::Wand), vec!["P_MASTER_AUDIO_NORMAL"]);
        assert_eq!(h.sent_to(Role::Attenuator), vec!["A_TOGGLE_MUTE(1)"]);
    }

    #[test]
    fn attenuator_volume_steps_locally_and_relays() {
        let mut h = both_peers();
        on_attenuator_command(&mut h.ctx(), AttenuatorToPack::VolumeDecrease, 0);
        assert_eq!(h.state.live.volume.master, 95);
        assert_eq!(h.sent_to(Role::Wand), vec!["P_VOLUME_DECREASE"]);
        assert_eq!(
            h.out.take_for(Role::Attenuator),
            vec![Outbound::data(
                PackToAttenuator::VolumeSync,
                [95, 100, 100]
            )]
        );
    }

    #[test]
    fn volume_at_limit_sends_no_sync() {
        let mut h = both_peers();
        on_wand_command(&mut h.ctx(), WandToPack::VolumeIncrease, 0);
        assert_eq!(h.state.live.volume.master, 100);
        assert!(h.out.is_empty());
    }

    #[test]
    fn wand_preferences_default_without_wand() {
        let mut h = Harness::new(Peers {
            attenuator: true,
            ..Peers::default()
        });
        on_attenuator_command(&mut h.ctx(), AttenuatorToPack::RequestPreferencesWand, 0);
        assert_eq!(
            h.out.take_for(Role::Attenuator),
            vec![Outbound::record(&WandPrefs::default())]
        );
    }

    #[test]
    fn wand_preferences_forwarded_when_wand_present() {
        let mut h = both_peers();
        on_attenuator_command(&mut h.ctx(), AttenuatorToPack::RequestPreferencesWand, 0);
        assert_eq!(h.sent_to(Role::Wand), vec!["P_SEND_PREFERENCES_WAND"]);

        let mut reply = WandPrefs::default();
        reply.led_wand_count = 48;
        on_wand_snapshot(&mut h.ctx(), Snapshot::Wand(reply));
        assert_eq!(
            h.out.take_for(Role::Attenuator),
            vec![Outbound::record(&reply)]
        );
        assert_eq!(h.state.wand.barrel_led_count, 48);
    }

    #[test]
    fn smoke_reply_gets_pack_half_overlaid() {
        let mut h = both_peers();
        h.state.smoke.smoke_enabled = false;
        let reply = SmokeSettings::default().to_prefs();
        on_wand_snapshot(&mut h.ctx(), Snapshot::Smoke(reply));

        let out = h.out.take_for(Role::Attenuator);
        let Outbound::Snapshot(frame) = &out[0] else {
            panic!("expected a snapshot, got {out:?}");
        };
        let relayed = SmokePrefs::from_frame(frame).expect("smoke prefs should decode");
        assert_eq!(relayed.smoke_enabled, 0);
    }

    #[test]
    fn pushed_pack_preferences_reannounce_changed_year() {
        let mut h = both_peers();
        let mut settings = h.state.pack;
        settings.current_year = SystemYear::Y1989;
        let prefs: PackPrefs = settings.to_prefs();

        on_attenuator_snapshot(&mut h.ctx(), Snapshot::Pack(prefs));
        assert_eq!(h.state.live.system_year, SystemYear::Y1989);
        assert_eq!(h.sent_to(Role::Wand), vec!["P_YEAR_1989"]);
        assert_eq!(h.sent_to(Role::Attenuator), vec!["A_YEAR_1989"]);
    }

    #[test]
    fn wand_preferences_dropped_without_wand() {
        let mut h = Harness::new(Peers::default());
        on_attenuator_snapshot(&mut h.ctx(), Snapshot::Wand(WandPrefs::default()));
        assert!(h.out.is_empty());
    }

    #[test]
    fn save_pack_uses_the_store() {
        let mut h = both_peers();
        on_attenuator_command(&mut h.ctx(), AttenuatorToPack::SaveEepromSettingsPack, 0);
        assert!(h
            .caps
            .store
            .load_pack()
            .expect("memory store should load")
            .is_some());
        assert!(h.cues.contains(Cue::Audio(AudioCue::PreferencesSaved)));
    }

    #[test]
    fn sync_sequences_include_alarm_only_when_active() {
        let mut h = both_peers();
        sync_wand(&mut h.ctx());
        assert_eq!(
            h.sent_to(Role::Wand),
            vec!["P_SYNC_START", "SYNC", "P_SYNC_END"]
        );

        h.state.live.alarm = true;
        sync_attenuator(&mut h.ctx());
        assert_eq!(
            h.sent_to(Role::Attenuator),
            vec!["A_SYNC_START", "SYNC", "A_ALARM_ON", "A_SYNC_END"]
        );
    }

    #[test]
    fn wand_loss_forces_firing_stopped() {
        let mut h = both_peers();
        on_wand_command(&mut h.ctx(), WandToPack::On, 0);
        on_wand_command(&mut h.ctx(), WandToPack::Firing, 0);
        h.out.take_for(Role::Attenuator);

        wand_link_down(&mut h.ctx());
        let snapshot = h.reader.snapshot();
        assert!(!snapshot.wand_firing);
        assert!(!snapshot.wand_on);
        assert!(!h.state.live.wand_firing);
        assert_eq!(h.sent_to(Role::Attenuator), vec!["A_WAND_DISCONNECTED"]);
    }

    #[test]
    fn music_needs_a_library() {
        let mut h = both_peers();
        on_attenuator_command(&mut h.ctx(), AttenuatorToPack::MusicStartStop, 0);
        assert!(h.out.is_empty());

        h.state.live.music.track_count = 3;
        on_attenuator_command(&mut h.ctx(), AttenuatorToPack::MusicNextTrack, 0);
        assert!(h.out.is_empty());
        on_attenuator_command(&mut h.ctx(), AttenuatorToPack::MusicStartStop, 0);
        assert_eq!(h.sent_to(Role::Wand), vec!["P_MUSIC_PLAY_TRACK(1)"]);
        assert_eq!(h.sent_to(Role::Attenuator), vec!["A_MUSIC_PLAY_TRACK(1)"]);

        on_wand_command(&mut h.ctx(), WandToPack::MusicToggle, 0);
        assert_eq!(h.sent_to(Role::Wand), vec!["P_MUSIC_STOP"]);
    }

    #[test]
    fn finish_venting_clears_both_flags() {
        let mut h = both_peers();
        on_wand_command(&mut h.ctx(), WandToPack::Venting, 0);
        on_wand_command(&mut h.ctx(), WandToPack::Overheating, 0);
        h.out.take_for(Role::Attenuator);

        finish_venting(&mut h.ctx());
        assert!(!h.reader.snapshot().venting);
        assert!(!h.reader.snapshot().overheating);
        assert_eq!(
            h.sent_to(Role::Wand),
            vec!["P_VENTING_FINISHED", "P_OVERHEATING_FINISHED"]
        );
    }

    #[test]
    fn year_cycle_wraps() {
        let mut h = both_peers();
        h.state.live.system_year = SystemYear::FrozenEmpire;
        on_wand_command(&mut h.ctx(), WandToPack::YearModesCycle, 0);
        assert_eq!(h.state.live.system_year, SystemYear::Y1984);
        assert_eq!(h.reader.system_year(), SystemYear::Y1984);
    }
}
