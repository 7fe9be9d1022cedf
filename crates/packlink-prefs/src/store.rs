//! Preference persistence.
//!
//! Nodes load their settings from a store at construction and write back on
//! explicit save commands. The storage schema itself is the store's business.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PrefsError, Result};
use crate::snapshot::{PackPrefs, SmokePrefs, WandPrefs};

/// Persistent home for preference snapshots.
pub trait PreferenceStore {
    fn load_pack(&mut self) -> Result<Option<PackPrefs>>;
    fn load_wand(&mut self) -> Result<Option<WandPrefs>>;
    fn load_smoke(&mut self) -> Result<Option<SmokePrefs>>;
    fn save_pack(&mut self, prefs: &PackPrefs) -> Result<()>;
    fn save_wand(&mut self, prefs: &WandPrefs) -> Result<()>;
    fn save_smoke(&mut self, prefs: &SmokePrefs) -> Result<()>;
}

/// Everything a store can hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack: Option<PackPrefs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wand: Option<WandPrefs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoke: Option<SmokePrefs>,
}

/// In-memory store. Starts empty unless seeded.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: StoredPreferences,
    saves: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: StoredPreferences) -> Self {
        Self { contents, saves: 0 }
    }

    pub fn contents(&self) -> &StoredPreferences {
        &self.contents
    }

    /// Number of successful saves of any kind.
    pub fn saves(&self) -> u32 {
        self.saves
    }
}

impl PreferenceStore for MemoryStore {
    fn load_pack(&mut self) -> Result<Option<PackPrefs>> {
        Ok(self.contents.pack)
    }

    fn load_wand(&mut self) -> Result<Option<WandPrefs>> {
        Ok(self.contents.wand)
    }

    fn load_smoke(&mut self) -> Result<Option<SmokePrefs>> {
        Ok(self.contents.smoke)
    }

    fn save_pack(&mut self, prefs: &PackPrefs) -> Result<()> {
        self.contents.pack = Some(*prefs);
        self.saves += 1;
        Ok(())
    }

    fn save_wand(&mut self, prefs: &WandPrefs) -> Result<()> {
        self.contents.wand = Some(*prefs);
        self.saves += 1;
        Ok(())
    }

    fn save_smoke(&mut self, prefs: &SmokePrefs) -> Result<()> {
        self.contents.smoke = Some(*prefs);
        self.saves += 1;
        Ok(())
    }
}

/// A store backed by one JSON file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file.
    pub fn read(&self) -> Result<StoredPreferences> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StoredPreferences::default()),
            Err(source) => Err(PrefsError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut StoredPreferences)) -> Result<()> {
        let mut contents = self.read()?;
        apply(&mut contents);
        let json = serde_json::to_vec_pretty(&contents)?;
        fs::write(&self.path, json).map_err(|source| PrefsError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn load_pack(&mut self) -> Result<Option<PackPrefs>> {
        Ok(self.read()?.pack)
    }

    fn load_wand(&mut self) -> Result<Option<WandPrefs>> {
        Ok(self.read()?.wand)
    }

    fn load_smoke(&mut self) -> Result<Option<SmokePrefs>> {
        Ok(self.read()?.smoke)
    }

    fn save_pack(&mut self, prefs: &PackPrefs) -> Result<()> {
        let prefs = *prefs;
        self.update(|contents| contents.pack = Some(prefs))
    }

    fn save_wand(&mut self, prefs: &WandPrefs) -> Result<()> {
        let prefs = *prefs;
        self.update(|contents| contents.wand = Some(prefs))
    }

    fn save_smoke(&mut self, prefs: &SmokePrefs) -> Result<()> {
        let prefs = *prefs;
        self.update(|contents| contents.smoke = Some(prefs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PackSettings;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("packlink-prefs-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load_pack().unwrap(), None);

        store.save_pack(&PackPrefs::default()).unwrap();
        store.save_wand(&WandPrefs::default()).unwrap();

        assert_eq!(store.saves(), 2);
        assert_eq!(store.load_pack().unwrap(), Some(PackPrefs::default()));
        assert_eq!(store.load_smoke().unwrap(), None);
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let mut store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.load_wand().unwrap(), None);
    }

    #[test]
    fn json_store_keeps_other_sections() {
        let path = temp_path("sections");
        let mut store = JsonFileStore::new(&path);

        let mut settings = PackSettings::default();
        settings.default_volume_percent = 42;
        store.save_pack(&settings.to_prefs()).unwrap();
        store.save_smoke(&SmokePrefs::default()).unwrap();

        let mut reopened = JsonFileStore::new(&path);
        let pack = reopened.load_pack().unwrap().unwrap();
        assert_eq!(pack.default_system_volume, 42);
        assert_eq!(reopened.load_smoke().unwrap(), Some(SmokePrefs::default()));
        assert_eq!(reopened.load_wand().unwrap(), None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{ not json").unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(matches!(store.load_pack(), Err(PrefsError::Json(_))));

        let _ = fs::remove_file(&path);
    }
}
