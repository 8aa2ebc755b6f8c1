//! Workbench configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_STORAGE_KEY: &str = "TreeState";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WorkbenchConfig {
    /// Default tracing filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub tree_state: TreeStateConfig,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tree_state: TreeStateConfig::default(),
        }
    }
}

/// Settings of the tree persistence coordinator.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeStateConfig {
    /// Storage key the forest document is written under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Quiet period before a debounced save is written.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for TreeStateConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl TreeStateConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
