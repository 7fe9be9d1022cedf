//! Typed runtime preferences and their snapshot conversions.

use serde::{Deserialize, Serialize};

use crate::model::{
    BargraphAnimation, FiringMode, PackVibration, SystemMode, SystemYear, WandVibration,
    YearPreference,
};
use crate::snapshot::{PackPrefs, SmokePrefs, WandPrefs};

const DEFAULT_HUE: u8 = 254;
const DEFAULT_SATURATION: u8 = 255;

fn flag(on: bool) -> u8 {
    u8::from(on)
}

fn is_set(code: u8) -> bool {
    code != 0
}

/// Pack LED geometry and colour codes.
///
/// These are opaque to the link: the lighting engine interprets them and the
/// pack only stores and forwards them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackLeds {
    pub cyc_lid_count: u8,
    pub cyc_lid_hue: u8,
    pub cyc_lid_sat: u8,
    pub cyc_lid_center: u8,
    pub cyc_lid_fade: u8,
    pub cyc_lid_sim_ring: u8,
    pub cyc_inner_panel: u8,
    pub cyc_cake_count: u8,
    pub cyc_cake_hue: u8,
    pub cyc_cake_sat: u8,
    pub cyc_cake_grb: u8,
    pub cyc_cav_count: u8,
    pub cyc_cav_type: u8,
    pub vg_cyclotron: u8,
    pub powercell_count: u8,
    pub invert_powercell: u8,
    pub powercell_hue: u8,
    pub powercell_sat: u8,
    pub vg_powercell: u8,
}

impl Default for PackLeds {
    fn default() -> Self {
        Self {
            cyc_lid_count: 1,
            cyc_lid_hue: DEFAULT_HUE,
            cyc_lid_sat: DEFAULT_SATURATION,
            cyc_lid_center: 0,
            cyc_lid_fade: 1,
            cyc_lid_sim_ring: 1,
            cyc_inner_panel: 1,
            cyc_cake_count: 1,
            cyc_cake_hue: DEFAULT_HUE,
            cyc_cake_sat: DEFAULT_SATURATION,
            cyc_cake_grb: 0,
            cyc_cav_count: 0,
            cyc_cav_type: 0,
            vg_cyclotron: 1,
            powercell_count: 0,
            invert_powercell: 0,
            powercell_hue: DEFAULT_HUE,
            powercell_sat: DEFAULT_SATURATION,
            vg_powercell: 1,
        }
    }
}

/// Runtime preferences owned by the pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackSettings {
    pub default_system_mode: SystemMode,
    pub default_year: YearPreference,
    pub current_year: SystemYear,
    pub default_volume_percent: u8,
    pub vibration: PackVibration,
    pub ribbon_cable_alarm: bool,
    pub cyclotron_clockwise: bool,
    pub demo_light_mode: bool,
    pub proton_stream_effects: bool,
    pub overheat_strobe: bool,
    pub overheat_sync_to_fan: bool,
    pub overheat_lights_off: bool,
    pub leds: PackLeds,
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            default_system_mode: SystemMode::SuperHero,
            default_year: YearPreference::Toggle,
            current_year: SystemYear::Afterlife,
            default_volume_percent: 100,
            vibration: PackVibration::Switch,
            ribbon_cable_alarm: true,
            cyclotron_clockwise: true,
            demo_light_mode: false,
            proton_stream_effects: true,
            overheat_strobe: false,
            overheat_sync_to_fan: false,
            overheat_lights_off: true,
            leds: PackLeds::default(),
        }
    }
}

impl PackSettings {
    pub fn to_prefs(&self) -> PackPrefs {
        let leds = &self.leds;
        PackPrefs {
            default_system_mode: self.default_system_mode.to_wire(),
            default_year_theme: self.default_year.to_wire(),
            current_year_theme: YearPreference::Fixed(self.current_year).to_wire(),
            default_system_volume: self.default_volume_percent.min(100),
            pack_vibration: self.vibration.to_wire(),
            ribbon_cable_alarm: flag(self.ribbon_cable_alarm),
            cyclotron_direction: flag(self.cyclotron_clockwise),
            demo_light_mode: flag(self.demo_light_mode),
            proton_stream_effects: flag(self.proton_stream_effects),
            overheat_strobe: flag(self.overheat_strobe),
            overheat_sync_to_fan: flag(self.overheat_sync_to_fan),
            overheat_lights_off: flag(self.overheat_lights_off),
            led_cyc_lid_count: leds.cyc_lid_count,
            led_cyc_lid_hue: leds.cyc_lid_hue,
            led_cyc_lid_sat: leds.cyc_lid_sat,
            led_cyc_lid_center: leds.cyc_lid_center,
            led_cyc_lid_fade: leds.cyc_lid_fade,
            led_cyc_lid_sim_ring: leds.cyc_lid_sim_ring,
            led_cyc_inner_panel: leds.cyc_inner_panel,
            led_cyc_cake_count: leds.cyc_cake_count,
            led_cyc_cake_hue: leds.cyc_cake_hue,
            led_cyc_cake_sat: leds.cyc_cake_sat,
            led_cyc_cake_grb: leds.cyc_cake_grb,
            led_cyc_cav_count: leds.cyc_cav_count,
            led_cyc_cav_type: leds.cyc_cav_type,
            led_vg_cyclotron: leds.vg_cyclotron,
            led_powercell_count: leds.powercell_count,
            led_invert_powercell: leds.invert_powercell,
            led_powercell_hue: leds.powercell_hue,
            led_powercell_sat: leds.powercell_sat,
            led_vg_powercell: leds.vg_powercell,
        }
    }

    /// Overwrite every field from a received snapshot.
    pub fn apply_prefs(&mut self, prefs: &PackPrefs) {
        self.default_system_mode = SystemMode::from_wire(prefs.default_system_mode);
        self.default_year = YearPreference::from_wire(prefs.default_year_theme);
        self.current_year = match YearPreference::from_wire(prefs.current_year_theme) {
            YearPreference::Fixed(year) => year,
            YearPreference::Toggle => self.current_year,
        };
        self.default_volume_percent = prefs.default_system_volume.min(100);
        self.vibration = PackVibration::from_wire(prefs.pack_vibration);
        self.ribbon_cable_alarm = is_set(prefs.ribbon_cable_alarm);
        self.cyclotron_clockwise = is_set(prefs.cyclotron_direction);
        self.demo_light_mode = is_set(prefs.demo_light_mode);
        self.proton_stream_effects = is_set(prefs.proton_stream_effects);
        self.overheat_strobe = is_set(prefs.overheat_strobe);
        self.overheat_sync_to_fan = is_set(prefs.overheat_sync_to_fan);
        self.overheat_lights_off = is_set(prefs.overheat_lights_off);
        self.leds = PackLeds {
            cyc_lid_count: prefs.led_cyc_lid_count,
            cyc_lid_hue: prefs.led_cyc_lid_hue,
            cyc_lid_sat: prefs.led_cyc_lid_sat,
            cyc_lid_center: prefs.led_cyc_lid_center,
            cyc_lid_fade: prefs.led_cyc_lid_fade,
            cyc_lid_sim_ring: prefs.led_cyc_lid_sim_ring,
            cyc_inner_panel: prefs.led_cyc_inner_panel,
            cyc_cake_count: prefs.led_cyc_cake_count,
            cyc_cake_hue: prefs.led_cyc_cake_hue,
            cyc_cake_sat: prefs.led_cyc_cake_sat,
            cyc_cake_grb: prefs.led_cyc_cake_grb,
            cyc_cav_count: prefs.led_cyc_cav_count,
            cyc_cav_type: prefs.led_cyc_cav_type,
            vg_cyclotron: prefs.led_vg_cyclotron,
            powercell_count: prefs.led_powercell_count,
            invert_powercell: prefs.led_invert_powercell,
            powercell_hue: prefs.led_powercell_hue,
            powercell_sat: prefs.led_powercell_sat,
            vg_powercell: prefs.led_vg_powercell,
        };
    }
}

/// Runtime preferences owned by the wand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WandSettings {
    pub barrel_led_count: u8,
    pub barrel_hue: u8,
    pub barrel_saturation: u8,
    pub rgb_vent: bool,
    pub spectral_modes: bool,
    pub overheat: bool,
    pub default_firing_mode: FiringMode,
    pub vibration: WandVibration,
    pub sounds_to_pack: bool,
    pub quick_venting: bool,
    pub auto_vent_light: bool,
    pub beep_loop: bool,
    pub boot_errors: bool,
    /// `Toggle` here means "follow the pack".
    pub default_year: YearPreference,
    pub cross_the_streams_year: YearPreference,
    pub bargraph_segments: u8,
    pub invert_bargraph: bool,
    pub bargraph_overheat_blink: bool,
    pub bargraph_idle_animation: BargraphAnimation,
    pub bargraph_fire_animation: BargraphAnimation,
}

impl Default for WandSettings {
    fn default() -> Self {
        Self {
            barrel_led_count: 0,
            barrel_hue: DEFAULT_HUE,
            barrel_saturation: DEFAULT_SATURATION,
            rgb_vent: false,
            spectral_modes: false,
            overheat: true,
            default_firing_mode: FiringMode::VideoGame,
            vibration: WandVibration::Switch,
            sounds_to_pack: false,
            quick_venting: true,
            auto_vent_light: true,
            beep_loop: true,
            boot_errors: true,
            default_year: YearPreference::Toggle,
            cross_the_streams_year: YearPreference::Toggle,
            bargraph_segments: 1,
            invert_bargraph: false,
            bargraph_overheat_blink: false,
            bargraph_idle_animation: BargraphAnimation::SystemDefault,
            bargraph_fire_animation: BargraphAnimation::SystemDefault,
        }
    }
}

impl WandSettings {
    pub fn to_prefs(&self) -> WandPrefs {
        WandPrefs {
            led_wand_count: self.barrel_led_count,
            led_wand_hue: self.barrel_hue,
            led_wand_sat: self.barrel_saturation,
            rgb_vent_enabled: flag(self.rgb_vent),
            spectral_modes_enabled: flag(self.spectral_modes),
            overheat_enabled: flag(self.overheat),
            default_firing_mode: self.default_firing_mode.to_wire(),
            wand_vibration: self.vibration.to_wire(),
            wand_sounds_to_pack: flag(self.sounds_to_pack),
            quick_venting: flag(self.quick_venting),
            auto_vent_light: flag(self.auto_vent_light),
            wand_beep_loop: flag(self.beep_loop),
            wand_boot_error: flag(self.boot_errors),
            default_year_mode_wand: self.default_year.to_wire(),
            default_year_mode_cts: self.cross_the_streams_year.to_wire(),
            num_bargraph_segments: self.bargraph_segments,
            invert_wand_bargraph: flag(self.invert_bargraph),
            bargraph_overheat_blink: flag(self.bargraph_overheat_blink),
            bargraph_idle_animation: self.bargraph_idle_animation.to_wire(),
            bargraph_fire_animation: self.bargraph_fire_animation.to_wire(),
        }
    }

    pub fn apply_prefs(&mut self, prefs: &WandPrefs) {
        self.barrel_led_count = prefs.led_wand_count;
        self.barrel_hue = prefs.led_wand_hue;
        self.barrel_saturation = prefs.led_wand_sat;
        self.rgb_vent = is_set(prefs.rgb_vent_enabled);
        self.spectral_modes = is_set(prefs.spectral_modes_enabled);
        self.overheat = is_set(prefs.overheat_enabled);
        self.default_firing_mode = FiringMode::from_wire(prefs.default_firing_mode);
        self.vibration = WandVibration::from_wire(prefs.wand_vibration);
        self.sounds_to_pack = is_set(prefs.wand_sounds_to_pack);
        self.quick_venting = is_set(prefs.quick_venting);
        self.auto_vent_light = is_set(prefs.auto_vent_light);
        self.beep_loop = is_set(prefs.wand_beep_loop);
        self.boot_errors = is_set(prefs.wand_boot_error);
        self.default_year = YearPreference::from_wire(prefs.default_year_mode_wand);
        self.cross_the_streams_year = YearPreference::from_wire(prefs.default_year_mode_cts);
        self.bargraph_segments = prefs.num_bargraph_segments;
        self.invert_bargraph = is_set(prefs.invert_wand_bargraph);
        self.bargraph_overheat_blink = is_set(prefs.bargraph_overheat_blink);
        self.bargraph_idle_animation = BargraphAnimation::from_wire(prefs.bargraph_idle_animation);
        self.bargraph_fire_animation = BargraphAnimation::from_wire(prefs.bargraph_fire_animation);
    }
}

/// Smoke behaviour for one power level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSmoke {
    /// Pack: smoke for the whole firing duration.
    pub continuous: bool,
    /// Pack: overheat smoke duration in seconds.
    pub duration_secs: u8,
    /// Wand: overheat enabled at this level.
    pub overheat: bool,
    /// Wand: seconds of firing before overheat starts.
    pub overheat_delay_secs: u8,
}

/// Smoke preferences, indexed by power level (index 0 is level 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokeSettings {
    pub smoke_enabled: bool,
    pub levels: [LevelSmoke; 5],
}

impl Default for SmokeSettings {
    fn default() -> Self {
        let level = |duration_secs, overheat, overheat_delay_secs| LevelSmoke {
            continuous: false,
            duration_secs,
            overheat,
            overheat_delay_secs,
        };
        Self {
            smoke_enabled: true,
            levels: [
                level(2, false, 60),
                level(3, false, 50),
                level(4, false, 40),
                level(5, false, 30),
                level(6, true, 20),
            ],
        }
    }
}

/// Wire arrays run level 5 first.
fn wire_slot(level_index: usize) -> usize {
    4 - level_index
}

impl SmokeSettings {
    pub fn to_prefs(&self) -> SmokePrefs {
        let mut prefs = SmokePrefs {
            smoke_enabled: 0,
            overheat_continuous: [0; 5],
            overheat_duration: [0; 5],
            overheat_level: [0; 5],
            overheat_delay: [0; 5],
        };
        self.fill_pack_half(&mut prefs);
        self.fill_wand_half(&mut prefs);
        prefs
    }

    pub fn apply_prefs(&mut self, prefs: &SmokePrefs) {
        self.apply_pack_half(prefs);
        self.apply_wand_half(prefs);
    }

    /// Write the pack-owned fields into `prefs`, leaving the wand half alone.
    pub fn fill_pack_half(&self, prefs: &mut SmokePrefs) {
        prefs.smoke_enabled = flag(self.smoke_enabled);
        for (index, level) in self.levels.iter().enumerate() {
            let slot = wire_slot(index);
            prefs.overheat_continuous[slot] = flag(level.continuous);
            prefs.overheat_duration[slot] = level.duration_secs;
        }
    }

    /// Write the wand-owned fields into `prefs`, leaving the pack half alone.
    pub fn fill_wand_half(&self, prefs: &mut SmokePrefs) {
        for (index, level) in self.levels.iter().enumerate() {
            let slot = wire_slot(index);
            prefs.overheat_level[slot] = flag(level.overheat);
            prefs.overheat_delay[slot] = level.overheat_delay_secs;
        }
    }

    pub fn apply_pack_half(&mut self, prefs: &SmokePrefs) {
        self.smoke_enabled = is_set(prefs.smoke_enabled);
        for (index, level) in self.levels.iter_mut().enumerate() {
            let slot = wire_slot(index);
            level.continuous = is_set(prefs.overheat_continuous[slot]);
            level.duration_secs = prefs.overheat_duration[slot];
        }
    }

    pub fn apply_wand_half(&mut self, prefs: &SmokePrefs) {
        for (index, level) in self.levels.iter_mut().enumerate() {
            let slot = wire_slot(index);
            level.overheat = is_set(prefs.overheat_level[slot]);
            level.overheat_delay_secs = prefs.overheat_delay[slot];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_settings_round_trip_through_prefs() {
        let settings = PackSettings {
            default_system_mode: SystemMode::Original,
            default_year: YearPreference::Fixed(SystemYear::Y1989),
            current_year: SystemYear::FrozenEmpire,
            default_volume_percent: 35,
            vibration: PackVibration::CyclotronMotor,
            ribbon_cable_alarm: false,
            cyclotron_clockwise: false,
            demo_light_mode: true,
            proton_stream_effects: false,
            overheat_strobe: true,
            overheat_sync_to_fan: true,
            overheat_lights_off: false,
            leds: PackLeds {
                cyc_cake_hue: 12,
                powercell_count: 2,
                ..PackLeds::default()
            },
        };

        let mut restored = PackSettings::default();
        restored.apply_prefs(&settings.to_prefs());
        assert_eq!(restored, settings);
    }

    #[test]
    fn pack_prefs_use_documented_codes() {
        let prefs = PackSettings::default().to_prefs();
        assert_eq!(prefs.default_system_mode, 1);
        assert_eq!(prefs.default_year_theme, 1);
        assert_eq!(prefs.current_year_theme, 4);
        assert_eq!(prefs.pack_vibration, 4);
        assert_eq!(prefs.ribbon_cable_alarm, 1);
    }

    #[test]
    fn toggle_current_year_keeps_runtime_year() {
        let mut settings = PackSettings {
            current_year: SystemYear::Y1984,
            ..PackSettings::default()
        };
        let prefs = PackPrefs {
            current_year_theme: 1,
            ..settings.to_prefs()
        };
        settings.apply_prefs(&prefs);
        assert_eq!(settings.current_year, SystemYear::Y1984);
    }

    #[test]
    fn wand_settings_round_trip_through_prefs() {
        let settings = WandSettings {
            barrel_led_count: 3,
            rgb_vent: true,
            default_firing_mode: FiringMode::CrossTheStreamsMix,
            vibration: WandVibration::FiringOnly,
            default_year: YearPreference::Fixed(SystemYear::Y1984),
            cross_the_streams_year: YearPreference::Fixed(SystemYear::Afterlife),
            bargraph_idle_animation: BargraphAnimation::Original,
            ..WandSettings::default()
        };
        let mut restored = WandSettings::default();
        restored.apply_prefs(&settings.to_prefs());
        assert_eq!(restored, settings);
    }

    #[test]
    fn default_wand_prefs_are_fixed() {
        let prefs = WandPrefs::default();
        assert_eq!(prefs.default_firing_mode, 1);
        assert_eq!(prefs.wand_vibration, 4);
        assert_eq!(prefs.default_year_mode_wand, 1);
        assert_eq!(prefs.overheat_enabled, 1);
    }

    #[test]
    fn smoke_arrays_run_from_level_five() {
        let prefs = SmokeSettings::default().to_prefs();
        assert_eq!(prefs.overheat_duration, [6, 5, 4, 3, 2]);
        assert_eq!(prefs.overheat_delay, [20, 30, 40, 50, 60]);
        assert_eq!(prefs.overheat_level, [1, 0, 0, 0, 0]);
    }

    #[test]
    fn smoke_halves_are_independent() {
        let mut pack = SmokeSettings::default();
        pack.smoke_enabled = false;
        pack.levels[0].duration_secs = 9;

        let mut wand = SmokeSettings::default();
        wand.levels[4].overheat_delay_secs = 99;
        wand.levels[2].overheat = true;

        let mut prefs = wand.to_prefs();
        pack.fill_pack_half(&mut prefs);

        assert_eq!(prefs.smoke_enabled, 0);
        assert_eq!(prefs.overheat_duration[4], 9);
        assert_eq!(prefs.overheat_delay[0], 99);
        assert_eq!(prefs.overheat_level[2], 1);

        let mut hub = SmokeSettings::default();
        hub.apply_wand_half(&prefs);
        assert!(hub.smoke_enabled);
        assert_eq!(hub.levels[4].overheat_delay_secs, 99);
        assert_eq!(hub.levels[0].duration_secs, 2);
    }
}
