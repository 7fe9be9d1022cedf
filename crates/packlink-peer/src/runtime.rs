use packlink_prefs::{LiveState, PackSettings, PreferenceStore, SmokeSettings, WandSettings};
use serde::Serialize;
use tracing::warn;

/// All mutable state of one node, owned by the node and lent to dispatchers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeRuntimeState {
    pub live: LiveState,
    pub pack: PackSettings,
    pub wand: WandSettings,
    pub smoke: SmokeSettings,
}

impl NodeRuntimeState {
    /// Start from defaults and overlay whatever `store` holds.
    ///
    /// A store that fails to load is logged and treated as empty, so a node
    /// always boots.
    pub fn load(store: &mut dyn PreferenceStore) -> Self {
        let mut state = Self::default();
        match store.load_pack() {
            Ok(Some(prefs)) => state.pack.apply_prefs(&prefs),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "pack preferences unreadable; using defaults"),
        }
        match store.load_wand() {
            Ok(Some(prefs)) => state.wand.apply_prefs(&prefs),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "wand preferences unreadable; using defaults"),
        }
        match store.load_smoke() {
            Ok(Some(prefs)) => state.smoke.apply_prefs(&prefs),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "smoke preferences unreadable; using defaults"),
        }

        state.live.system_mode = state.pack.default_system_mode;
        state.live.system_year = state.pack.current_year;
        state.live.volume.master = state.pack.default_volume_percent;
        state
    }
}

#[cfg(test)]
mod tests {
    use packlink_prefs::{
        MemoryStore, PrefsError, SmokePrefs, StoredPreferences, SystemMode, SystemYear, WandPrefs,
    };

    use super::*;

    #[test]
    fn load_applies_stored_prefs() {
        let mut pack = PackSettings::default();
        pack.default_system_mode = SystemMode::Original;
        pack.current_year = SystemYear::Y1984;
        pack.default_volume_percent = 30;

        let mut store = MemoryStore::with_contents(StoredPreferences {
            pack: Some(pack.to_prefs()),
            ..StoredPreferences::default()
        });

        let state = NodeRuntimeState::load(&mut store);
        assert_eq!(state.pack, pack);
        assert_eq!(state.live.system_mode, SystemMode::Original);
        assert_eq!(state.live.system_year, SystemYear::Y1984);
        assert_eq!(state.live.volume.master, 30);
        assert_eq!(state.wand, WandSettings::default());
    }

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn load_pack(&mut self) -> packlink_prefs::Result<Option<packlink_prefs::PackPrefs>> {
            Err(PrefsError::Io {
                path: "/nowhere".into(),
                source: std::io::Error::other("broken"),
            })
        }
        fn load_wand(&mut self) -> packlink_prefs::Result<Option<WandPrefs>> {
            Ok(None)
        }
        fn load_smoke(&mut self) -> packlink_prefs::Result<Option<SmokePrefs>> {
            Ok(None)
        }
        fn save_pack(&mut self, _: &packlink_prefs::PackPrefs) -> packlink_prefs::Result<()> {
            Ok(())
        }
        fn save_wand(&mut self, _: &WandPrefs) -> packlink_prefs::Result<()> {
            Ok(())
        }
        fn save_smoke(&mut self, _: &SmokePrefs) -> packlink_prefs::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn broken_store_boots_with_defaults() {
        let state = NodeRuntimeState::load(&mut BrokenStore);
        assert_eq!(state.pack, PackSettings::default());
    }
}
