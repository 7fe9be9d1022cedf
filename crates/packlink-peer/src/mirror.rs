//! Single-writer, multi-reader view of peer state.
//!
//! The dispatcher owns the only [`MirrorWriter`]. Lighting, audio and UI code
//! hold [`MirrorReader`]s and may read from any thread.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use packlink_prefs::{StreamMode, SystemMode, SystemYear, MAX_POWER_LEVEL};
use serde::Serialize;

use crate::role::Role;

const FLAG_COUNT: usize = 10;

/// Boolean fields of the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    PackConnected,
    WandConnected,
    AttenuatorConnected,
    WandOn,
    PackOn,
    WandFiring,
    BarrelExtended,
    Overheating,
    Venting,
    Alarm,
}

impl Flag {
    pub const ALL: [Flag; FLAG_COUNT] = [
        Flag::PackConnected,
        Flag::WandConnected,
        Flag::AttenuatorConnected,
        Flag::WandOn,
        Flag::PackOn,
        Flag::WandFiring,
        Flag::BarrelExtended,
        Flag::Overheating,
        Flag::Venting,
        Flag::Alarm,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Flags whose truth comes from the link to `peer`.
    fn owned_by(self, peer: Role) -> bool {
        match peer {
            Role::Wand => matches!(
                self,
                Flag::WandConnected | Flag::WandOn | Flag::WandFiring | Flag::BarrelExtended
            ),
            Role::Attenuator => self == Flag::AttenuatorConnected,
            Role::Pack => true,
        }
    }

    /// Presence flag for a peer role.
    pub fn connected(role: Role) -> Flag {
        match role {
            Role::Pack => Flag::PackConnected,
            Role::Wand => Flag::WandConnected,
            Role::Attenuator => Flag::AttenuatorConnected,
        }
    }
}

#[derive(Debug)]
struct Shared {
    flags: [AtomicBool; FLAG_COUNT],
    power_level: AtomicU8,
    stream_mode: AtomicU8,
    system_mode: AtomicU8,
    system_year: AtomicU8,
}

/// Constructor for a writer/reader pair.
pub struct StateMirror;

impl StateMirror {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (MirrorWriter, MirrorReader) {
        let shared = Arc::new(Shared {
            flags: std::array::from_fn(|_| AtomicBool::new(false)),
            power_level: AtomicU8::new(MAX_POWER_LEVEL),
            stream_mode: AtomicU8::new(StreamMode::default().to_wire()),
            system_mode: AtomicU8::new(SystemMode::default().to_wire()),
            system_year: AtomicU8::new(SystemYear::default().to_wire()),
        });
        (
            MirrorWriter {
                shared: Arc::clone(&shared),
            },
            MirrorReader { shared },
        )
    }
}

/// The only handle that can change the mirror. Not `Clone`.
#[derive(Debug)]
pub struct MirrorWriter {
    shared: Arc<Shared>,
}

impl MirrorWriter {
    pub fn set(&mut self, flag: Flag, value: bool) {
        self.shared.flags[flag.index()].store(value, Ordering::Release);
    }

    pub fn set_power_level(&mut self, level: u8) {
        self.shared.power_level.store(level, Ordering::Release);
    }

    pub fn set_stream_mode(&mut self, mode: StreamMode) {
        self.shared
            .stream_mode
            .store(mode.to_wire(), Ordering::Release);
    }

    pub fn set_system_mode(&mut self, mode: SystemMode) {
        self.shared
            .system_mode
            .store(mode.to_wire(), Ordering::Release);
    }

    pub fn set_system_year(&mut self, year: SystemYear) {
        self.shared
            .system_year
            .store(year.to_wire(), Ordering::Release);
    }

    /// Reset every flag sourced from the link to `peer`.
    pub fn clear_owned_by(&mut self, peer: Role) {
        for flag in Flag::ALL {
            if flag.owned_by(peer) {
                self.set(flag, false);
            }
        }
    }

    /// A new reader over the same state.
    pub fn reader(&self) -> MirrorReader {
        MirrorReader {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Read-only handle, cheap to clone and share.
#[derive(Debug, Clone)]
pub struct MirrorReader {
    shared: Arc<Shared>,
}

impl MirrorReader {
    pub fn get(&self, flag: Flag) -> bool {
        self.shared.flags[flag.index()].load(Ordering::Acquire)
    }

    pub fn power_level(&self) -> u8 {
        self.shared.power_level.load(Ordering::Acquire)
    }

    pub fn stream_mode(&self) -> StreamMode {
        StreamMode::from_wire(self.shared.stream_mode.load(Ordering::Acquire))
    }

    pub fn system_mode(&self) -> SystemMode {
        SystemMode::from_wire(self.shared.system_mode.load(Ordering::Acquire))
    }

    pub fn system_year(&self) -> SystemYear {
        SystemYear::from_wire(self.shared.system_year.load(Ordering::Acquire))
    }

    pub fn snapshot(&self) -> MirrorSnapshot {
        MirrorSnapshot {
            pack_connected: self.get(Flag::PackConnected),
            wand_connected: self.get(Flag::WandConnected),
            attenuator_connected: self.get(Flag::AttenuatorConnected),
            wand_on: self.get(Flag::WandOn),
            pack_on: self.get(Flag::PackOn),
            wand_firing: self.get(Flag::WandFiring),
            barrel_extended: self.get(Flag::BarrelExtended),
            overheating: self.get(Flag::Overheating),
            venting: self.get(Flag::Venting),
            alarm: self.get(Flag::Alarm),
            power_level: self.power_level(),
            stream_mode: self.stream_mode(),
            system_mode: self.system_mode(),
            system_year: self.system_year(),
        }
    }
}

/// Point-in-time copy of the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MirrorSnapshot {
    pub pack_connected: bool,
    pub wand_connected: bool,
    pub attenuator_connected: bool,
    pub wand_on: bool,
    pub pack_on: bool,
    pub wand_firing: bool,
    pub barrel_extended: bool,
    pub overheating: bool,
    pub venting: bool,
    pub alarm: bool,
    pub power_level: u8,
    pub stream_mode: StreamMode,
    pub system_mode: SystemMode,
    pub system_year: SystemYear,
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn reader_is_shareable() {
        assert_send_sync::<MirrorReader>();
    }

    #[test]
    fn writes_are_visible_to_every_reader() {
        let (mut writer, reader) = StateMirror::new();
        let second = writer.reader();

        writer.set(Flag::WandFiring, true);
        writer.set_stream_mode(StreamMode::Slime);
        writer.set_power_level(2);

        assert!(reader.get(Flag::WandFiring));
        assert_eq!(second.stream_mode(), StreamMode::Slime);
        assert_eq!(second.power_level(), 2);
    }

    #[test]
    fn clearing_wand_link_keeps_pack_flags() {
        let (mut writer, reader) = StateMirror::new();
        for flag in Flag::ALL {
            writer.set(flag, true);
        }

        writer.clear_owned_by(Role::Wand);

        let snapshot = reader.snapshot();
        assert!(!snapshot.wand_connected);
        assert!(!snapshot.wand_on);
        assert!(!snapshot.wand_firing);
        assert!(!snapshot.barrel_extended);
        assert!(snapshot.pack_on);
        assert!(snapshot.attenuator_connected);
        assert!(snapshot.alarm);
    }

    #[test]
    fn clearing_pack_link_clears_everything() {
        let (mut writer, reader) = StateMirror::new();
        for flag in Flag::ALL {
            writer.set(flag, true);
        }
        writer.clear_owned_by(Role::Pack);
        for flag in Flag::ALL {
            assert!(!reader.get(flag), "{flag:?} should be cleared");
        }
    }

    #[test]
    fn readers_on_other_threads_see_updates() {
        let (mut writer, reader) = StateMirror::new();
        writer.set(Flag::Alarm, true);
        writer.set_system_year(SystemYear::Y1984);

        let handle = thread::spawn(move || reader.snapshot());
        let snapshot = handle.join().expect("reader thread should finish");
        assert!(snapshot.alarm);
        assert_eq!(snapshot.system_year, SystemYear::Y1984);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let (_writer, reader) = StateMirror::new();
        let json = serde_json::to_value(reader.snapshot()).expect("snapshot should serialize");
        assert_eq!(json["power_level"], 5);
        assert_eq!(json["stream_mode"], "proton");
        assert_eq!(json["wand_connected"], false);
    }
}
