//! # Playback Error Types

use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// A fetch against the server API failed.
    #[error("Fetch failed: {0}")]
    Api(#[from] core_api::ApiError),

    /// The host audio element reported a failure.
    #[error("Audio output error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    /// Attempted a transport action with no track loaded.
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be
    /// retried. Queue refills treat every transient error the same way:
    /// log, back off, try again.
    pub fn is_transient(&self) -> bool {
        match self {
            PlaybackError::Api(e) => e.is_transient(),
            PlaybackError::Bridge(_) => true,
            PlaybackError::NoTrackLoaded | PlaybackError::Internal(_) => false,
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
