//! Configuration
//!
//! Storage keys default to the names the mobile app has always used, so a
//! store written by an earlier install stays readable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default profile key
pub const DEFAULT_PROFILE_KEY: &str = "userDetails";
/// Default goal collection key
pub const DEFAULT_GOALS_KEY: &str = "goals";
/// Default notification preference key
pub const DEFAULT_NOTIFICATIONS_KEY: &str = "notificationsEnabled";
/// Default dark mode preference key
pub const DEFAULT_DARK_MODE_KEY: &str = "darkModeEnabled";
/// Default data directory for file-backed stores
pub const DEFAULT_DATA_DIR: &str = ".wellness";

/// Keys under which each record is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    pub profile: String,
    pub goals: String,
    pub notifications: String,
    pub dark_mode: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE_KEY.to_string(),
            goals: DEFAULT_GOALS_KEY.to_string(),
            notifications: DEFAULT_NOTIFICATIONS_KEY.to_string(),
            dark_mode: DEFAULT_DARK_MODE_KEY.to_string(),
        }
    }
}

/// Top-level configuration for hosts that use a file-backed store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateConfig {
    /// Directory holding one JSON file per key
    pub data_dir: PathBuf,
    /// Storage key names
    pub keys: StorageKeys,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            keys: StorageKeys::default(),
        }
    }
}

impl StateConfig {
    /// Load configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
