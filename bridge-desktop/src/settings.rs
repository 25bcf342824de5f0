//! Preference Storage using a JSON file
//!
//! Cookie-equivalent persistence: each entry is a plain string stamped with
//! an expiry one year after the write, and expired entries read as absent.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

/// Entry lifetime, matching the one-year cookie expiry of the original client.
const ENTRY_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsEntry {
    value: String,
    expires_at: i64,
}

impl SettingsEntry {
    fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// JSON-file-backed settings store implementation
///
/// The whole store is one small JSON document; reads and writes go through
/// an in-memory map guarded by a mutex, and every mutation is flushed to
/// disk before returning.
pub struct JsonSettingsStore {
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, SettingsEntry>>,
}

impl JsonSettingsStore {
    /// Open a store backed by the given file, loading existing entries.
    ///
    /// Construction is synchronous so configuration defaults can be built
    /// outside an async context; mutations flush through `tokio::fs`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(BridgeError::Io)?;
        }

        let entries = match std::fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data).map_err(|e| {
                BridgeError::OperationFailed(format!("Corrupt settings file: {}", e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        debug!(path = ?path, "Initialized settings store");

        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// Create an in-memory settings store (for testing)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    async fn flush(&self, entries: &HashMap<String, SettingsEntry>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let data = serde_json::to_vec_pretty(entries)
            .map_err(|e| BridgeError::OperationFailed(format!("Serialize failed: {}", e)))?;

        tokio::fs::write(path, data).await.map_err(BridgeError::Io)
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            SettingsEntry {
                value: value.to_string(),
                expires_at: Self::now() + ENTRY_TTL_SECS,
            },
        );
        self.flush(&entries).await?;

        debug!(key = key, "Stored setting");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Self::now()) => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        self.flush(&entries).await?;

        debug!(key = key, "Deleted setting");
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let now = Self::now();
        let entries = self.entries.lock().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn clear_all(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.flush(&entries).await?;

        debug!("Cleared all settings");
        Ok(())
    }
}
