//! Preference and sync snapshots.
//!
//! Each snapshot is a flat record of small integers. Field order is the wire
//! order; see [`packlink_frame::wire_record`].

use packlink_frame::{wire_record, Frame, PacketType, WireRecord};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::{PackSettings, SmokeSettings, WandSettings};

wire_record! {
    packet = PacketType::PackConfig;
    /// Pack preferences as exchanged with the attenuator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PackPrefs {
        pub default_system_mode: u8,
        pub default_year_theme: u8,
        pub current_year_theme: u8,
        pub default_system_volume: u8,
        pub pack_vibration: u8,
        pub ribbon_cable_alarm: u8,
        pub cyclotron_direction: u8,
        pub demo_light_mode: u8,
        pub proton_stream_effects: u8,
        pub overheat_strobe: u8,
        pub overheat_sync_to_fan: u8,
        pub overheat_lights_off: u8,
        pub led_cyc_lid_count: u8,
        pub led_cyc_lid_hue: u8,
        pub led_cyc_lid_sat: u8,
        pub led_cyc_lid_center: u8,
        pub led_cyc_lid_fade: u8,
        pub led_cyc_lid_sim_ring: u8,
        pub led_cyc_inner_panel: u8,
        pub led_cyc_cake_count: u8,
        pub led_cyc_cake_hue: u8,
        pub led_cyc_cake_sat: u8,
        pub led_cyc_cake_grb: u8,
        pub led_cyc_cav_count: u8,
        pub led_cyc_cav_type: u8,
        pub led_vg_cyclotron: u8,
        pub led_powercell_count: u8,
        pub led_invert_powercell: u8,
        pub led_powercell_hue: u8,
        pub led_powercell_sat: u8,
        pub led_vg_powercell: u8,
    }
}

impl Default for PackPrefs {
    fn default() -> Self {
        PackSettings::default().to_prefs()
    }
}

wire_record! {
    packet = PacketType::WandConfig;
    /// Wand preferences as exchanged with the attenuator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct WandPrefs {
        pub led_wand_count: u8,
        pub led_wand_hue: u8,
        pub led_wand_sat: u8,
        pub rgb_vent_enabled: u8,
        pub spectral_modes_enabled: u8,
        pub overheat_enabled: u8,
        pub default_firing_mode: u8,
        pub wand_vibration: u8,
        pub wand_sounds_to_pack: u8,
        pub quick_venting: u8,
        pub auto_vent_light: u8,
        pub wand_beep_loop: u8,
        pub wand_boot_error: u8,
        pub default_year_mode_wand: u8,
        pub default_year_mode_cts: u8,
        pub num_bargraph_segments: u8,
        pub invert_wand_bargraph: u8,
        pub bargraph_overheat_blink: u8,
        pub bargraph_idle_animation: u8,
        pub bargraph_fire_animation: u8,
    }
}

/// The factory wand snapshot, also sent by a hub with no wand attached.
impl Default for WandPrefs {
    fn default() -> Self {
        WandSettings::default().to_prefs()
    }
}

wire_record! {
    packet = PacketType::SmokeConfig;
    /// Smoke preferences. Arrays run from power level 5 down to level 1.
    ///
    /// The pack owns `smoke_enabled` and the continuous/duration fields; the
    /// wand owns the overheat enable and delay fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SmokePrefs {
        pub smoke_enabled: u8,
        pub overheat_continuous: [u8; 5],
        pub overheat_duration: [u8; 5],
        pub overheat_level: [u8; 5],
        pub overheat_delay: [u8; 5],
    }
}

impl Default for SmokePrefs {
    fn default() -> Self {
        SmokeSettings::default().to_prefs()
    }
}

wire_record! {
    packet = PacketType::Sync;
    /// Live state pushed from the pack to the wand during a sync.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct WandSyncData {
        pub system_mode: u8,
        pub ion_arm_switch: u8,
        pub cyclotron_lid_state: u8,
        pub system_year: u8,
        pub pack_on: u8,
        pub power_level: u8,
        pub stream_mode: u8,
        pub vibration_enabled: u8,
        pub master_volume: u8,
        pub effects_volume: u8,
        pub music_volume: u8,
        pub master_muted: u8,
        pub current_music_track: u16,
        pub repeat_music_track: u8,
    }
}

wire_record! {
    packet = PacketType::Sync;
    /// Live state pushed from the pack to the attenuator during a sync.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AttenuatorSyncData {
        pub system_mode: u8,
        pub ion_arm_switch: u8,
        pub cyclotron_lid_state: u8,
        pub system_year: u8,
        pub pack_on: u8,
        pub power_level: u8,
        pub stream_mode: u8,
        pub wand_present: u8,
        pub barrel_extended: u8,
        pub wand_firing: u8,
        pub overheating_now: u8,
        pub speed_multiplier: u8,
        pub spectral_colour: u8,
        pub spectral_saturation: u8,
        pub master_muted: u8,
        pub master_volume: u8,
        pub effects_volume: u8,
        pub music_volume: u8,
        pub music_playing: u8,
        pub music_paused: u8,
        pub track_looped: u8,
        pub current_track: u16,
        pub music_count: u16,
        pub pack_voltage: u16,
    }
}

/// Any preference snapshot, as seen by a monitor that does not know the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    Pack(PackPrefs),
    Wand(WandPrefs),
    Smoke(SmokePrefs),
    WandSync(WandSyncData),
    AttenuatorSync(AttenuatorSyncData),
}

impl Snapshot {
    /// Decode a snapshot frame. Returns `None` for command and data frames.
    ///
    /// Sync frames are told apart by payload size.
    pub fn from_frame(frame: &Frame) -> Result<Option<Self>> {
        let snapshot = match frame.packet_type {
            PacketType::PackConfig => Snapshot::Pack(PackPrefs::from_frame(frame)?),
            PacketType::WandConfig => Snapshot::Wand(WandPrefs::from_frame(frame)?),
            PacketType::SmokeConfig => Snapshot::Smoke(SmokePrefs::from_frame(frame)?),
            PacketType::Sync if frame.payload.len() == AttenuatorSyncData::WIRE_SIZE => {
                Snapshot::AttenuatorSync(AttenuatorSyncData::from_frame(frame)?)
            }
            PacketType::Sync => Snapshot::WandSync(WandSyncData::from_frame(frame)?),
            _ => return Ok(None),
        };
        Ok(Some(snapshot))
    }
}
