//! Preference and live-state snapshots for the pack, wand and attenuator.
//!
//! Three layers live here:
//! - wire snapshots ([`PackPrefs`], [`WandPrefs`], [`SmokePrefs`],
//!   [`WandSyncData`], [`AttenuatorSyncData`]) with a fixed field order;
//! - typed runtime state ([`PackSettings`], [`LiveState`], ...) that nodes
//!   actually work with, converted to and from snapshots field by field;
//! - the [`PreferenceStore`] seam for persistence.

pub mod error;
pub mod live;
pub mod model;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use error::{PrefsError, Result};
pub use live::{LiveState, MusicState, Volume, VolumeChannel, VOLUME_STEP};
pub use model::{
    clamp_power_level, BargraphAnimation, FiringMode, PackVibration, StreamMode, SystemMode,
    SystemYear, WandVibration, YearPreference, MAX_POWER_LEVEL, MIN_POWER_LEVEL,
};
pub use settings::{LevelSmoke, PackLeds, PackSettings, SmokeSettings, WandSettings};
pub use snapshot::{AttenuatorSyncData, PackPrefs, SmokePrefs, Snapshot, WandPrefs, WandSyncData};
pub use store::{JsonFileStore, MemoryStore, PreferenceStore, StoredPreferences};
