//! Device preference flags
//!
//! Two independent booleans, each stored as JSON `true`/`false` under its own key.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::StorageKeys;
use crate::error::StateError;
use crate::storage::KeyValueStore;

/// Snapshot of all preference flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub notifications_enabled: bool,
    pub dark_mode_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            dark_mode_enabled: false,
        }
    }
}

/// Reads and writes preference flags
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
    notifications_key: String,
    dark_mode_key: String,
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, keys: &StorageKeys) -> Self {
        Self {
            storage,
            notifications_key: keys.notifications.clone(),
            dark_mode_key: keys.dark_mode.clone(),
        }
    }

    /// Load all flags; absent or malformed values take their defaults
    pub async fn load(&self) -> Result<Preferences, StateError> {
        let defaults = Preferences::default();
        Ok(Preferences {
            notifications_enabled: self
                .read_flag(&self.notifications_key, defaults.notifications_enabled)
                .await?,
            dark_mode_enabled: self
                .read_flag(&self.dark_mode_key, defaults.dark_mode_enabled)
                .await?,
        })
    }

    pub async fn set_notifications(&self, enabled: bool) -> Result<(), StateError> {
        self.write_flag(&self.notifications_key, enabled).await
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<(), StateError> {
        self.write_flag(&self.dark_mode_key, enabled).await
    }

    async fn read_flag(&self, key: &str, default: bool) -> Result<bool, StateError> {
        let Some(raw) = self.storage.get(key).await? else {
            return Ok(default);
        };
        match serde_json::from_str::<bool>(&raw) {
            Ok(flag) => Ok(flag),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed preference");
                Ok(default)
            }
        }
    }

    async fn write_flag(&self, key: &str, enabled: bool) -> Result<(), StateError> {
        let json = serde_json::to_string(&enabled)?;
        if let Err(e) = self.storage.set(key, &json).await {
            error!(key, error = %e, "failed to persist preference");
            return Err(e.into());
        }
        debug!(key, enabled, "persisted preference");
        Ok(())
    }
}
