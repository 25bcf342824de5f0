//! Preference Storage Abstraction
//!
//! Provides a platform-agnostic trait for the handful of small string
//! preferences the client persists (queue size, audio quality). The contract
//! mirrors browser cookies: plain string values, each with an expiry.

use async_trait::async_trait;

use crate::error::Result;

/// Key-value preference storage trait
///
/// Abstracts platform-specific preference storage:
/// - Desktop: JSON file in the config directory
/// - Embedded web view: cookie jar / localStorage
/// - Tests: in-memory map
///
/// Values are plain strings. Implementations enforce the expiry recorded at
/// write time; an expired entry reads as absent.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn save_preference(store: &dyn SettingsStore) -> Result<()> {
///     store.set_string("settings-audio-quality", "high").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value with the store's default expiry (one year).
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value. Returns `Ok(None)` when the key is absent
    /// or its entry has expired.
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Delete a preference
    async fn delete(&self, key: &str) -> Result<()>;

    /// List all live (non-expired) keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all preferences
    async fn clear_all(&self) -> Result<()>;
}
