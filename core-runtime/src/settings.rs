//! # Persisted Client Preferences
//!
//! Typed accessors over the [`SettingsStore`] bridge for the two preferences
//! the client persists: playback queue size and audio quality. Both are
//! stored as plain strings with the store's one-year expiry, matching the
//! cookie behavior of the original web client.

use bridge_traits::{BridgeError, SettingsStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Storage key for the queue size preference.
pub const QUEUE_SIZE_KEY: &str = "settings-queue-size";

/// Storage key for the audio quality preference.
pub const AUDIO_QUALITY_KEY: &str = "settings-audio-quality";

/// Audio quality preference for track downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    #[default]
    High,
    Low,
}

impl AudioQuality {
    /// Stored string form ("high" / "low").
    pub fn as_str(self) -> &'static str {
        match self {
            AudioQuality::High => "high",
            AudioQuality::Low => "low",
        }
    }

    /// Audio type parameter sent to the track audio endpoint.
    pub fn audio_type(self) -> &'static str {
        match self {
            AudioQuality::High => "webm_opus_high",
            AudioQuality::Low => "webm_opus_low",
        }
    }

    /// Cover image quality parameter matching this audio quality.
    pub fn cover_quality(self) -> &'static str {
        match self {
            AudioQuality::High => "high",
            AudioQuality::Low => "low",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(AudioQuality::High),
            "low" => Some(AudioQuality::Low),
            _ => None,
        }
    }
}

/// Typed view over the persisted client preferences.
///
/// Unknown or corrupted stored values fall back to the defaults rather than
/// erroring; a stale preference is never worth failing playback over.
#[derive(Clone)]
pub struct ClientSettings {
    store: Arc<dyn SettingsStore>,
    default_queue_size: usize,
}

impl ClientSettings {
    pub fn new(store: Arc<dyn SettingsStore>, default_queue_size: usize) -> Self {
        Self {
            store,
            default_queue_size,
        }
    }

    /// Read the stored queue size, or the default when absent or invalid.
    pub async fn queue_size(&self) -> Result<usize, BridgeError> {
        match self.store.get_string(QUEUE_SIZE_KEY).await? {
            Some(raw) => match raw.parse::<usize>() {
                Ok(size) if size >= 1 => Ok(size),
                _ => {
                    warn!(value = %raw, "Ignoring invalid stored queue size");
                    Ok(self.default_queue_size)
                }
            },
            None => Ok(self.default_queue_size),
        }
    }

    /// Persist a new queue size.
    pub async fn set_queue_size(&self, size: usize) -> Result<(), BridgeError> {
        self.store
            .set_string(QUEUE_SIZE_KEY, &size.to_string())
            .await
    }

    /// Read the stored audio quality, or `High` when absent or invalid.
    pub async fn audio_quality(&self) -> Result<AudioQuality, BridgeError> {
        match self.store.get_string(AUDIO_QUALITY_KEY).await? {
            Some(raw) => match AudioQuality::parse(&raw) {
                Some(quality) => Ok(quality),
                None => {
                    warn!(value = %raw, "Ignoring invalid stored audio quality");
                    Ok(AudioQuality::default())
                }
            },
            None => Ok(AudioQuality::default()),
        }
    }

    /// Persist a new audio quality.
    pub async fn set_audio_quality(&self, quality: AudioQuality) -> Result<(), BridgeError> {
        self.store
            .set_string(AUDIO_QUALITY_KEY, quality.as_str())
            .await
    }
}
