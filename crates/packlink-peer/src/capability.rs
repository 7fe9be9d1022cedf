//! Seams to the outside world: sound, lights and persistent storage.
//!
//! Dispatchers only ever call these traits. Real hardware drivers, the CLI
//! simulator and tests each plug in their own implementations.

use std::sync::{Arc, Mutex, PoisonError};

use packlink_prefs::{MemoryStore, PreferenceStore, StreamMode, SystemMode, SystemYear};
use serde::Serialize;

use crate::role::Role;

/// Something a node wants heard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    PackOn,
    PackOff,
    WandOn,
    WandOff,
    FiringStart,
    FiringStop,
    Venting,
    Overheating,
    AlarmOn,
    AlarmOff,
    PowerLevel(u8),
    StreamMode(StreamMode),
    SystemMode(SystemMode),
    SystemYear(SystemYear),
    /// The pack's year now follows its toggle switch.
    YearModeDefault,
    VolumeChanged,
    Muted(bool),
    MusicTrack(u16),
    MusicStopped,
    Beep,
    MashError,
    PreferencesSaved,
}

/// Something a node wants seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingCue {
    /// Searching-for-peer indicator.
    Presence(bool),
    LinkUp(Role),
    LinkDown(Role),
    PackPower(bool),
    Firing(bool),
    BarrelExtended(bool),
    Venting(bool),
    Overheat(bool),
    Alarm(bool),
    PowerLevel(u8),
    StreamMode(StreamMode),
    SpectralColour { hue: u8, saturation: u8 },
}

pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

pub trait LightingSink {
    fn show(&mut self, cue: LightingCue);
}

/// Discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _cue: AudioCue) {}
}

impl LightingSink for NullSink {
    fn show(&mut self, _cue: LightingCue) {}
}

/// One recorded cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Audio(AudioCue),
    Lighting(LightingCue),
}

/// Records cues in order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CueLog {
    entries: Arc<Mutex<Vec<Cue>>>,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, cue: Cue) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cue);
    }

    pub fn entries(&self) -> Vec<Cue> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, cue: Cue) -> bool {
        self.entries().contains(&cue)
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<Cue> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl AudioSink for CueLog {
    fn play(&mut self, cue: AudioCue) {
        self.push(Cue::Audio(cue));
    }
}

impl LightingSink for CueLog {
    fn show(&mut self, cue: LightingCue) {
        self.push(Cue::Lighting(cue));
    }
}

/// Everything a dispatcher may call out to.
pub struct Capabilities {
    pub audio: Box<dyn AudioSink + Send>,
    pub lighting: Box<dyn LightingSink + Send>,
    pub store: Box<dyn PreferenceStore + Send>,
}

impl Capabilities {
    pub fn new(
        audio: Box<dyn AudioSink + Send>,
        lighting: Box<dyn LightingSink + Send>,
        store: Box<dyn PreferenceStore + Send>,
    ) -> Self {
        Self {
            audio,
            lighting,
            store,
        }
    }

    /// Silent sinks and an empty in-memory store.
    pub fn null() -> Self {
        Self::new(
            Box::new(NullSink),
            Box::new(NullSink),
            Box::new(MemoryStore::new()),
        )
    }

    /// Send audio and lighting cues to `log`.
    pub fn recording(log: &CueLog) -> Self {
        Self::new(
            Box::new(log.clone()),
            Box::new(log.clone()),
            Box::new(MemoryStore::new()),
        )
    }

    pub fn with_store(mut self, store: Box<dyn PreferenceStore + Send>) -> Self {
        self.store = store;
        self
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_log_records_in_order() {
        let log = CueLog::new();
        let mut caps = Capabilities::recording(&log);

        caps.audio.play(AudioCue::FiringStart);
        caps.lighting.show(LightingCue::Firing(true));

        assert_eq!(
            log.entries(),
            vec![
                Cue::Audio(AudioCue::FiringStart),
                Cue::Lighting(LightingCue::Firing(true)),
            ]
        );
        assert_eq!(log.take().len(), 2);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn null_capabilities_store_is_empty() {
        let mut caps = Capabilities::null();
        caps.audio.play(AudioCue::Beep);
        assert_eq!(caps.store.load_pack().expect("memory store should load"), None);
    }
}
