//! # Queue Configuration
//!
//! Tuning knobs for the playback queue and its refill pipeline.

use crate::error::{PlaybackError, Result};
use std::time::Duration;

/// Configuration for [`PlaybackQueue`](crate::queue::PlaybackQueue).
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Initial queue bound. Adjustable at runtime via
    /// [`set_max_size`](crate::queue::PlaybackQueue::set_max_size).
    pub max_size: usize,

    /// Delay before the next refill check after a successful fetch.
    /// Kept short so the queue tops up quickly.
    pub refill_backoff_ok: Duration,

    /// Delay before retrying after a failed fetch. Deliberately much longer
    /// than the success backoff so a struggling server is not hammered.
    pub refill_backoff_err: Duration,

    /// Playlist drawn from when the selection has nothing enabled.
    pub fallback_playlist: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_size: 5,
            refill_backoff_ok: Duration::from_millis(500),
            refill_backoff_err: Duration::from_secs(5),
            fallback_playlist: "default".to_string(),
        }
    }
}

impl QueueConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(PlaybackError::Internal(
                "Queue bound must be at least 1".to_string(),
            ));
        }

        if self.refill_backoff_err < self.refill_backoff_ok {
            return Err(PlaybackError::Internal(
                "Error backoff must not be shorter than success backoff".to_string(),
            ));
        }

        if self.fallback_playlist.is_empty() {
            return Err(PlaybackError::Internal(
                "Fallback playlist cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
