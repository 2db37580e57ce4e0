use crate::{
    snapshot::{DEFAULT_SNAPSHOT_KEY, MINIMUM_STORE_VERSION},
    types::StoreVersion,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_THROTTLE_MS: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key the snapshot is stored under.
    pub storage_key: String,
    /// Minimum gap between two snapshot writes.
    pub throttle_ms: i64,
    /// Saves below this version are reset.
    pub minimum_store_version: StoreVersion,
    /// Allow `LOAD_PRESET`. Off outside development builds.
    pub dev_tools: bool,
    /// Master seed for effect-runner randomness.
    pub race_seed: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            throttle_ms: DEFAULT_THROTTLE_MS,
            minimum_store_version: MINIMUM_STORE_VERSION,
            dev_tools: cfg!(debug_assertions),
            race_seed: 42,
        }
    }
}

impl StoreConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    /// In tests, use StoreConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: StoreConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        anyhow::ensure!(config.throttle_ms >= 0, "throttle_ms must be >= 0 in {path}");
        Ok(config)
    }

    /// Deterministic settings for tests: dev tools on, fixed seed.
    pub fn default_test() -> Self {
        Self {
            dev_tools: true,
            race_seed: 0xDEAD_BEEF,
            ..Self::default()
        }
    }
}
