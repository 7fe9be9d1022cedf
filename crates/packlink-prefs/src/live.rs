//! Live (non-persistent) prop state and the sync snapshots built from it.

use serde::{Deserialize, Serialize};

use crate::model::{
    clamp_power_level, from_two_state, two_state, StreamMode, SystemMode, SystemYear,
    MAX_POWER_LEVEL,
};
use crate::snapshot::{AttenuatorSyncData, WandSyncData};

/// Volume step for relative volume commands, in percent.
pub const VOLUME_STEP: u8 = 5;

/// Speed multiplier ceiling for the cyclotron spin-up.
pub const MAX_SPEED_MULTIPLIER: u8 = 5;

/// Master, effects and music volume, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub master: u8,
    pub effects: u8,
    pub music: u8,
}

impl Default for Volume {
    fn default() -> Self {
        Self {
            master: 100,
            effects: 100,
            music: 100,
        }
    }
}

impl Volume {
    pub fn from_percentages(master: u8, effects: u8, music: u8) -> Self {
        Self {
            master: master.min(100),
            effects: effects.min(100),
            music: music.min(100),
        }
    }

    /// Payload of a VolumeSync data record.
    pub fn to_data(self) -> [u8; 3] {
        [self.master, self.effects, self.music]
    }

    pub fn from_data(data: [u8; 3]) -> Self {
        Self::from_percentages(data[0], data[1], data[2])
    }
}

/// Which volume channel a relative adjustment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeChannel {
    Master,
    Effects,
    Music,
}

/// Background music state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicState {
    pub playing: bool,
    pub paused: bool,
    pub looped: bool,
    pub current_track: u16,
    pub track_count: u16,
}

impl MusicState {
    /// Advance to the next track, wrapping at the end of the library.
    pub fn next_track(&mut self) -> u16 {
        if self.track_count > 0 {
            self.current_track = (self.current_track + 1) % self.track_count;
        }
        self.current_track
    }

    pub fn prev_track(&mut self) -> u16 {
        if self.track_count > 0 {
            self.current_track = self
                .current_track
                .checked_sub(1)
                .unwrap_or(self.track_count - 1);
        }
        self.current_track
    }
}

/// State every node tracks at runtime. Nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveState {
    pub system_mode: SystemMode,
    pub system_year: SystemYear,
    pub stream_mode: StreamMode,
    pub power_level: u8,
    pub pack_on: bool,
    pub wand_on: bool,
    pub wand_firing: bool,
    pub barrel_extended: bool,
    pub overheating: bool,
    pub venting: bool,
    pub alarm: bool,
    pub cyclotron_lid_on: bool,
    pub ion_arm_switch_on: bool,
    pub vibration_switch_on: bool,
    pub speed_multiplier: u8,
    pub volume: Volume,
    pub muted: bool,
    pub music: MusicState,
    /// Pack supply voltage in hundredths of a volt; 0 when not measured.
    pub pack_voltage: u16,
    pub spectral_hue: u8,
    pub spectral_saturation: u8,
}

impl Default for LiveState {
    fn default() -> Self {
        Self {
            system_mode: SystemMode::SuperHero,
            system_year: SystemYear::Afterlife,
            stream_mode: StreamMode::Proton,
            power_level: MAX_POWER_LEVEL,
            pack_on: false,
            wand_on: false,
            wand_firing: false,
            barrel_extended: false,
            overheating: false,
            venting: false,
            alarm: false,
            cyclotron_lid_on: true,
            ion_arm_switch_on: false,
            vibration_switch_on: true,
            speed_multiplier: 1,
            volume: Volume::default(),
            muted: false,
            music: MusicState::default(),
            pack_voltage: 0,
            spectral_hue: 254,
            spectral_saturation: 255,
        }
    }
}

impl LiveState {
    /// Apply a relative volume step. Returns true when the level changed.
    pub fn step_volume(&mut self, channel: VolumeChannel, up: bool) -> bool {
        let level = match channel {
            VolumeChannel::Master => &mut self.volume.master,
            VolumeChannel::Effects => &mut self.volume.effects,
            VolumeChannel::Music => &mut self.volume.music,
        };
        let before = *level;
        *level = if up {
            level.saturating_add(VOLUME_STEP).min(100)
        } else {
            level.saturating_sub(VOLUME_STEP)
        };
        *level != before
    }

    pub fn set_power_level(&mut self, level: u8) {
        self.power_level = clamp_power_level(level);
    }

    pub fn increase_speed(&mut self) {
        self.speed_multiplier = (self.speed_multiplier + 1).min(MAX_SPEED_MULTIPLIER);
    }

    pub fn reset_speed(&mut self) {
        self.speed_multiplier = 1;
    }

    /// Build the snapshot the pack sends to a wand during sync.
    pub fn wand_sync(&self) -> WandSyncData {
        WandSyncData {
            system_mode: self.system_mode.to_wire(),
            ion_arm_switch: two_state(self.ion_arm_switch_on),
            cyclotron_lid_state: two_state(self.cyclotron_lid_on),
            system_year: self.system_year.to_wire(),
            pack_on: two_state(self.pack_on),
            power_level: self.power_level,
            stream_mode: self.stream_mode.to_wire(),
            vibration_enabled: two_state(self.vibration_switch_on),
            master_volume: self.volume.master,
            effects_volume: self.volume.effects,
            music_volume: self.volume.music,
            master_muted: two_state(self.muted),
            current_music_track: self.music.current_track,
            repeat_music_track: two_state(self.music.looped),
        }
    }

    /// Apply a sync snapshot received from the pack.
    pub fn apply_wand_sync(&mut self, data: &WandSyncData) {
        self.system_mode = SystemMode::from_wire(data.system_mode);
        self.ion_arm_switch_on = from_two_state(data.ion_arm_switch);
        self.cyclotron_lid_on = from_two_state(data.cyclotron_lid_state);
        self.system_year = SystemYear::from_wire(data.system_year);
        self.pack_on = from_two_state(data.pack_on);
        self.set_power_level(data.power_level);
        self.stream_mode = StreamMode::from_wire(data.stream_mode);
        self.vibration_switch_on = from_two_state(data.vibration_enabled);
        self.volume =
            Volume::from_percentages(data.master_volume, data.effects_volume, data.music_volume);
        self.muted = from_two_state(data.master_muted);
        self.music.current_track = data.current_music_track;
        self.music.looped = from_two_state(data.repeat_music_track);
    }

    /// Build the snapshot the pack sends to an attenuator during sync.
    pub fn attenuator_sync(&self, wand_present: bool) -> AttenuatorSyncData {
        AttenuatorSyncData {
            system_mode: self.system_mode.to_wire(),
            ion_arm_switch: two_state(self.ion_arm_switch_on),
            cyclotron_lid_state: u8::from(self.cyclotron_lid_on),
            system_year: self.system_year.to_wire(),
            pack_on: u8::from(self.pack_on),
            power_level: self.power_level,
            stream_mode: self.stream_mode.to_wire(),
            wand_present: u8::from(wand_present),
            barrel_extended: u8::from(wand_present && self.barrel_extended),
            wand_firing: u8::from(wand_present && self.wand_firing),
            overheating_now: u8::from(self.overheating),
            speed_multiplier: self.speed_multiplier,
            spectral_colour: self.spectral_hue,
            spectral_saturation: self.spectral_saturation,
            master_muted: two_state(self.muted),
            master_volume: self.volume.master,
            effects_volume: self.volume.effects,
            music_volume: self.volume.music,
            music_playing: u8::from(self.music.playing),
            music_paused: u8::from(self.music.paused),
            track_looped: two_state(self.music.looped),
            current_track: self.music.current_track,
            music_count: self.music.track_count,
            pack_voltage: self.pack_voltage,
        }
    }

    /// Apply a sync snapshot received from the pack.
    ///
    /// The snapshot says whether a wand is present, not whether it is powered.
    /// `wand_on` follows the `A_WAND_ON`/`A_WAND_OFF` commands and is only
    /// cleared here, when the pack reports no wand at all.
    pub fn apply_attenuator_sync(&mut self, data: &AttenuatorSyncData) {
        self.system_mode = SystemMode::from_wire(data.system_mode);
        self.ion_arm_switch_on = from_two_state(data.ion_arm_switch);
        self.cyclotron_lid_on = data.cyclotron_lid_state != 0;
        self.system_year = SystemYear::from_wire(data.system_year);
        self.pack_on = data.pack_on != 0;
        self.set_power_level(data.power_level);
        self.stream_mode = StreamMode::from_wire(data.stream_mode);
        self.wand_on = data.wand_present != 0 && self.wand_on;
        self.barrel_extended = data.barrel_extended != 0;
        self.wand_firing = data.wand_firing != 0;
        self.overheating = data.overheating_now != 0;
        self.speed_multiplier = data.speed_multiplier.clamp(1, MAX_SPEED_MULTIPLIER);
        self.spectral_hue = data.spectral_colour;
        self.spectral_saturation = data.spectral_saturation;
        self.muted = from_two_state(data.master_muted);
        self.volume =
            Volume::from_percentages(data.master_volume, data.effects_volume, data.music_volume);
        self.music = MusicState {
            playing: data.music_playing != 0,
            paused: data.music_paused != 0,
            looped: from_two_state(data.track_looped),
            current_track: data.current_track,
            track_count: data.music_count,
        };
        self.pack_voltage = data.pack_voltage;
    }
}
