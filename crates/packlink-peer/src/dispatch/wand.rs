//! Wand dispatcher.
//!
//! The wand mirrors the pack's state and reports its own trigger, barrel and
//! selector changes upstream. Everything it hears comes from the pack.

use packlink_prefs::{SmokeSettings, Snapshot, StreamMode, SystemMode, Volume, VolumeChannel};
use tracing::{debug, info, warn};

use super::DispatchContext;
use crate::capability::{AudioCue, LightingCue};
use crate::command::{PackToWand, WandToPack};
use crate::mirror::Flag;
use crate::role::Role;

pub fn pack_link_up(ctx: &mut DispatchContext<'_>) {
    ctx.mirror.set(Flag::PackConnected, true);
    ctx.caps.lighting.show(LightingCue::LinkUp(Role::Pack));
}

/// Nothing the pack told us survives a lost link.
pub fn pack_link_down(ctx: &mut DispatchContext<'_>) {
    let live = &mut ctx.state.live;
    live.pack_on = false;
    live.alarm = false;
    live.venting = false;
    live.overheating = false;
    ctx.mirror.clear_owned_by(Role::Pack);
    // The wand's own switches are still where they were.
    ctx.mirror.set(Flag::WandOn, live.wand_on);
    ctx.mirror.set(Flag::WandFiring, live.wand_firing);
    ctx.mirror.set(Flag::BarrelExtended, live.barrel_extended);
    ctx.caps.lighting.show(LightingCue::LinkDown(Role::Pack));
}

/// Confirm a completed sync and re-announce the one thing only the wand knows.
pub fn acknowledge_sync(ctx: &mut DispatchContext<'_>) {
    ctx.out.command(Role::Pack, WandToPack::Synchronized, 0);
    if ctx.state.live.barrel_extended {
        ctx.out.command(Role::Pack, WandToPack::BarrelExtended, 0);
    }
}

pub fn on_pack_command(ctx: &mut DispatchContext<'_>, command: PackToWand, arg: u16) {
    debug!(command = command.name(), arg, "pack command");
    match command {
        PackToWand::On => {
            ctx.state.live.pack_on = true;
            ctx.mirror.set(Flag::PackOn, true);
        }
        PackToWand::Off => {
            ctx.state.live.pack_on = false;
            ctx.mirror.set(Flag::PackOn, false);
            if ctx.state.live.wand_on {
                power_off(ctx);
            }
        }
        PackToWand::AlarmOn | PackToWand::AlarmOff => {
            set_alarm(ctx, command == PackToWand::AlarmOn)
        }
        PackToWand::RibbonCableOn => set_alarm(ctx, false),
        PackToWand::RibbonCableOff => set_alarm(ctx, true),
        PackToWand::ModeSuperHero | PackToWand::ModeOriginal => {
            let mode = if command == PackToWand::ModeSuperHero {
                SystemMode::SuperHero
            } else {
                SystemMode::Original
            };
            ctx.state.live.system_mode = mode;
            ctx.mirror.set_system_mode(mode);
            ctx.caps.audio.play(AudioCue::SystemMode(mode));
        }
        PackToWand::ModeOriginalRedSwitchOn => ctx.state.live.ion_arm_switch_on = true,
        PackToWand::ModeOriginalRedSwitchOff => ctx.state.live.ion_arm_switch_on = false,
        PackToWand::Year1984
        | PackToWand::Year1989
        | PackToWand::YearAfterlife
        | PackToWand::YearFrozenEmpire => {
            if let Some(year) = command.system_year() {
                ctx.state.live.system_year = year;
                ctx.mirror.set_system_year(year);
                ctx.caps.audio.play(AudioCue::SystemYear(year));
            }
        }
        PackToWand::YearModeDefault => ctx.caps.audio.play(AudioCue::YearModeDefault),
        PackToWand::VolumeIncrease => step_volume(ctx, VolumeChannel::Master, true),
        PackToWand::VolumeDecrease => step_volume(ctx, VolumeChannel::Master, false),
        PackToWand::VolumeSoundEffectsIncrease => step_volume(ctx, VolumeChannel::Effects, true),
        PackToWand::VolumeSoundEffectsDecrease => step_volume(ctx, VolumeChannel::Effects, false),
        PackToWand::VolumeMusicIncrease => step_volume(ctx, VolumeChannel::Music, true),
        PackToWand::VolumeMusicDecrease => step_volume(ctx, VolumeChannel::Music, false),
        PackToWand::MasterAudioSilentMode | PackToWand::MasterAudioNormal => {
            let muted = command == PackToWand::MasterAudioSilentMode;
            ctx.state.live.muted = muted;
            ctx.caps.audio.play(AudioCue::Muted(muted));
        }
        PackToWand::MusicStart => {
            let track = ctx.state.live.music.current_track;
            play_track(ctx, track);
        }
        PackToWand::MusicPlayTrack => play_track(ctx, arg),
        PackToWand::MusicStop => {
            let music = &mut ctx.state.live.music;
            music.playing = false;
            music.paused = false;
            ctx.caps.audio.play(AudioCue::MusicStopped);
        }
        PackToWand::MusicPause => ctx.state.live.music.paused = true,
        PackToWand::MusicResume => ctx.state.live.music.paused = false,
        PackToWand::MusicRepeat => ctx.state.live.music.looped = true,
        PackToWand::MusicNoRepeat => ctx.state.live.music.looped = false,
        PackToWand::VentingFinished => {
            ctx.state.live.venting = false;
            ctx.mirror.set(Flag::Venting, false);
            ctx.caps.lighting.show(LightingCue::Venting(false));
        }
        PackToWand::OverheatingFinished => {
            ctx.state.live.overheating = false;
            ctx.mirror.set(Flag::Overheating, false);
            ctx.caps.lighting.show(LightingCue::Overheat(false));
        }
        PackToWand::ManualOverheat => start_overheat(ctx),
        PackToWand::WarningCancelled => {
            debug!("overheat warning cancelled by pack");
            ctx.caps.lighting.show(LightingCue::Overheat(false));
        }
        PackToWand::CyclotronLidOn => ctx.state.live.cyclotron_lid_on = true,
        PackToWand::CyclotronLidOff => ctx.state.live.cyclotron_lid_on = false,
        PackToWand::VibrationEnabled => ctx.state.live.vibration_switch_on = true,
        PackToWand::VibrationDisabled => ctx.state.live.vibration_switch_on = false,
        PackToWand::SmokeEnabled => ctx.state.smoke.smoke_enabled = true,
        PackToWand::SmokeDisabled => ctx.state.smoke.smoke_enabled = false,
        PackToWand::SendPreferencesWand => {
            let prefs = ctx.state.wand.to_prefs();
            ctx.out.record(Role::Pack, &prefs);
        }
        PackToWand::SendPreferencesSmoke => {
            // The pack overlays its own half before forwarding.
            let mut prefs = SmokeSettings::default().to_prefs();
            ctx.state.smoke.fill_wand_half(&mut prefs);
            ctx.out.record(Role::Pack, &prefs);
        }
        PackToWand::SaveEepromWand => save_wand_preferences(ctx),
        PackToWand::PackBootup => debug!("pack finished booting"),
        PackToWand::PowerLevel1
        | PackToWand::PowerLevel2
        | PackToWand::PowerLevel3
        | PackToWand::PowerLevel4
        | PackToWand::PowerLevel5 => {
            if let Some(level) = command.power_level() {
                ctx.state.live.set_power_level(level);
                ctx.mirror.set_power_level(level);
                ctx.caps.lighting.show(LightingCue::PowerLevel(level));
            }
        }
        PackToWand::VolumeSync => {
            debug!("volume sync sent as a command; expected a data record");
        }
        PackToWand::Null
        | PackToWand::ComStart
        | PackToWand::Handshake
        | PackToWand::SyncStart
        | PackToWand::SyncEnd => {}
    }
}

pub fn on_pack_data(ctx: &mut DispatchContext<'_>, message: PackToWand, data: [u8; 3]) {
    match message {
        PackToWand::VolumeSync => {
            ctx.state.live.volume = Volume::from_data(data);
            ctx.caps.audio.play(AudioCue::VolumeChanged);
        }
        other => debug!(message = other.name(), ?data, "ignoring data record from pack"),
    }
}

pub fn on_pack_snapshot(ctx: &mut DispatchContext<'_>, snapshot: Snapshot) {
    match snapshot {
        Snapshot::WandSync(data) => {
            let live = &mut ctx.state.live;
            live.apply_wand_sync(&data);
            ctx.mirror.set(Flag::PackOn, live.pack_on);
            ctx.mirror.set_power_level(live.power_level);
            ctx.mirror.set_stream_mode(live.stream_mode);
            ctx.mirror.set_system_mode(live.system_mode);
            ctx.mirror.set_system_year(live.system_year);
            debug!(
                power_level = live.power_level,
                stream_mode = live.stream_mode.name(),
                "applied pack sync"
            );
        }
        Snapshot::Wand(prefs) => {
            ctx.state.wand.apply_prefs(&prefs);
            info!("wand preferences updated from pack");
        }
        Snapshot::Smoke(prefs) => {
            ctx.state.smoke.apply_prefs(&prefs);
            info!("smoke preferences updated from pack");
        }
        other => debug!(?other, "unexpected snapshot from pack"),
    }
}

pub fn power_on(ctx: &mut DispatchContext<'_>) {
    ctx.state.live.wand_on = true;
    ctx.mirror.set(Flag::WandOn, true);
    ctx.caps.audio.play(AudioCue::WandOn);
    ctx.out.command(Role::Pack, WandToPack::On, 0);
}

/// Turning off releases the trigger first.
pub fn power_off(ctx: &mut DispatchContext<'_>) {
    if ctx.state.live.wand_firing {
        set_firing(ctx, false);
    }
    ctx.state.live.wand_on = false;
    ctx.mirror.set(Flag::WandOn, false);
    ctx.caps.audio.play(AudioCue::WandOff);
    ctx.out.command(Role::Pack, WandToPack::Off, 0);
}

/// Start or stop firing. The start command carries the current power level.
pub fn set_firing(ctx: &mut DispatchContext<'_>, firing: bool) {
    let live = &mut ctx.state.live;
    live.wand_firing = firing;
    ctx.mirror.set(Flag::WandFiring, firing);
    ctx.caps.audio.play(if firing {
        AudioCue::FiringStart
    } else {
        AudioCue::FiringStop
    });
    ctx.caps.lighting.show(LightingCue::Firing(firing));
    if firing {
        let level = u16::from(live.power_level);
        ctx.out.command(Role::Pack, WandToPack::Firing, level);
    } else {
        ctx.out.command(Role::Pack, WandToPack::FiringStopped, 0);
    }
}

pub fn set_barrel_extended(ctx: &mut DispatchContext<'_>, extended: bool) {
    ctx.state.live.barrel_extended = extended;
    ctx.mirror.set(Flag::BarrelExtended, extended);
    ctx.caps
        .lighting
        .show(LightingCue::BarrelExtended(extended));
    let command = if extended {
        WandToPack::BarrelExtended
    } else {
        WandToPack::BarrelRetracted
    };
    ctx.out.command(Role::Pack, command, 0);
}

pub fn set_power_level(ctx: &mut DispatchContext<'_>, level: u8) {
    ctx.state.live.set_power_level(level);
    let level = ctx.state.live.power_level;
    ctx.mirror.set_power_level(level);
    ctx.caps.lighting.show(LightingCue::PowerLevel(level));
    ctx.out
        .command(Role::Pack, WandToPack::for_power_level(level), 0);
}

pub fn set_stream_mode(ctx: &mut DispatchContext<'_>, mode: StreamMode) {
    ctx.state.live.stream_mode = mode;
    ctx.mirror.set_stream_mode(mode);
    ctx.caps.lighting.show(LightingCue::StreamMode(mode));
    ctx.out
        .command(Role::Pack, WandToPack::for_stream_mode(mode), 0);
}

/// Begin a vent cycle. The pack answers with `P_VENTING_FINISHED`.
pub fn vent(ctx: &mut DispatchContext<'_>) {
    ctx.state.live.venting = true;
    ctx.mirror.set(Flag::Venting, true);
    ctx.caps.lighting.show(LightingCue::Venting(true));
    ctx.out.command(Role::Pack, WandToPack::Venting, 0);
}

/// Overheat after sustained firing, or when the pack forces one.
pub fn start_overheat(ctx: &mut DispatchContext<'_>) {
    if ctx.state.live.wand_firing {
        set_firing(ctx, false);
    }
    ctx.state.live.overheating = true;
    ctx.mirror.set(Flag::Overheating, true);
    ctx.caps.audio.play(AudioCue::Overheating);
    ctx.caps.lighting.show(LightingCue::Overheat(true));
    ctx.out.command(Role::Pack, WandToPack::Overheating, 0);
}

fn set_alarm(ctx: &mut DispatchContext<'_>, on: bool) {
    if ctx.state.live.alarm == on {
        return;
    }
    ctx.state.live.alarm = on;
    ctx.mirror.set(Flag::Alarm, on);
    ctx.caps
        .audio
        .play(if on { AudioCue::AlarmOn } else { AudioCue::AlarmOff });
    ctx.caps.lighting.show(LightingCue::Alarm(on));
    if on && ctx.state.live.wand_firing {
        set_firing(ctx, false);
    }
}

fn step_volume(ctx: &mut DispatchContext<'_>, channel: VolumeChannel, up: bool) {
    if ctx.state.live.step_volume(channel, up) {
        ctx.caps.audio.play(AudioCue::VolumeChanged);
    }
}

fn play_track(ctx: &mut DispatchContext<'_>, track: u16) {
    let music = &mut ctx.state.live.music;
    music.current_track = track;
    music.playing = true;
    music.paused = false;
    ctx.caps.audio.play(AudioCue::MusicTrack(track));
}

fn save_wand_preferences(ctx: &mut DispatchContext<'_>) {
    let wand = ctx.state.wand.to_prefs();
    let smoke = ctx.state.smoke.to_prefs();
    let saved = ctx
        .caps
        .store
        .save_wand(&wand)
        .and_then(|()| ctx.caps.store.save_smoke(&smoke));
    match saved {
        Ok(()) => {
            info!("wand preferences saved");
            ctx.caps.audio.play(AudioCue::PreferencesSaved);
        }
        Err(err) => warn!(error = %err, "failed to save wand preferences"),
    }
}
