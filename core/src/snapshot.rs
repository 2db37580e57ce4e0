//! Versioned snapshot load/save.
//!
//! A snapshot is the full game state as one JSON blob under a fixed key.
//! Both directions fail soft: a load that cannot be used falls back to the
//! defaults, a save that cannot be written is dropped until the next one.

use crate::{
    migration::migrate,
    state::GameState,
    store::SnapshotBackend,
    types::{StoreVersion, Timestamp},
};

/// Version stamped on every state this build writes.
pub const CURRENT_STORE_VERSION: StoreVersion = 0.72;

/// Saves older than this are discarded and the player is warned.
pub const MINIMUM_STORE_VERSION: StoreVersion = 0.713;

pub const DEFAULT_SNAPSHOT_KEY: &str = "state";

/// What a load produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A usable save, migrated and deep-filled.
    Restored(GameState),
    /// The save was too old. Defaults with `warnings.storeReset` set.
    Reset(GameState),
    /// Nothing usable: no save, unreadable storage, or a corrupt blob.
    Missing,
}

impl LoadOutcome {
    pub fn into_state(self, defaults: GameState) -> GameState {
        match self {
            LoadOutcome::Restored(state) | LoadOutcome::Reset(state) => state,
            LoadOutcome::Missing => defaults,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadOutcome::Restored(_) => "restored",
            LoadOutcome::Reset(_) => "reset",
            LoadOutcome::Missing => "missing",
        }
    }
}

pub struct SnapshotStore {
    backend: Box<dyn SnapshotBackend>,
    key: String,
    minimum_version: StoreVersion,
}

impl SnapshotStore {
    pub fn new(backend: Box<dyn SnapshotBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            minimum_version: MINIMUM_STORE_VERSION,
        }
    }

    pub fn with_minimum_version(mut self, minimum_version: StoreVersion) -> Self {
        self.minimum_version = minimum_version;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn load(&self, defaults: &GameState) -> LoadOutcome {
        match self.backend.read(&self.key) {
            Ok(Some(raw)) => migrate(&raw, defaults, self.minimum_version),
            Ok(None) => LoadOutcome::Missing,
            Err(e) => {
                log::warn!("snapshot read failed for '{}': {e}", self.key);
                LoadOutcome::Missing
            }
        }
    }

    /// Best effort. Returns whether the write landed.
    pub fn save(&self, state: &GameState, saved_at: Timestamp) -> bool {
        let json = match serde_json::to_string(state) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("snapshot serialization failed: {e}");
                return false;
            }
        };
        match self.backend.write(&self.key, &json, saved_at) {
            Ok(()) => {
                log::debug!("snapshot saved at {saved_at} ({} bytes)", json.len());
                true
            }
            Err(e) => {
                log::warn!("snapshot write dropped: {e}");
                false
            }
        }
    }

    /// Remove the persisted blob. Failures are logged and ignored.
    pub fn clear(&self) {
        if let Err(e) = self.backend.remove(&self.key) {
            log::warn!("snapshot clear failed: {e}");
        }
    }
}
