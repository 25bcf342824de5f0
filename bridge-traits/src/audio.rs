//! Audio output bridge trait and supporting types.
//!
//! The client core drives exactly one audio element owned by the host (an
//! HTML `<audio>` tag, a desktop media pipeline, a mock in tests). This
//! abstraction deliberately models that element rather than a general mixer:
//! one source loaded at a time, autoplay on load, relative position control.

use crate::error::Result;
use bytes::Bytes;
use std::time::Duration;

/// Source handed to the audio element when a track becomes current.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Remote HTTP(S) stream fetched by the host element itself.
    RemoteStream { url: String },
    /// Prefetched in-memory audio supplied by the playback queue.
    MemoryBuffer { data: Bytes },
}

impl AudioSource {
    /// Determine whether the source represents remote content.
    pub fn is_remote(&self) -> bool {
        matches!(self, AudioSource::RemoteStream { .. })
    }
}

/// Lifecycle state of the audio element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    /// No source loaded.
    Idle,
    Playing,
    Paused,
    /// Natural end of media; stays until the next load.
    Completed,
}

/// Trait for the host's single audio element.
///
/// Loading a new source replaces whatever was playing and starts playback
/// (the autoplay behavior of the original element). Position and duration
/// are synchronous reads because hosts keep them continuously updated.
#[async_trait::async_trait]
pub trait AudioOutput: Send + Sync {
    /// Swap the element's source and begin playing it.
    async fn load(&self, source: AudioSource) -> Result<()>;

    /// Resume playback of the loaded source.
    async fn play(&self) -> Result<()>;

    /// Pause playback without unloading the source.
    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position within the loaded source.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Current lifecycle state.
    fn state(&self) -> AudioState;

    /// Current playback position. Zero when idle.
    fn position(&self) -> Duration;

    /// Duration of the loaded source, when known.
    fn duration(&self) -> Option<Duration>;

    /// Whether the element is not actively playing (paused, idle, or ended).
    fn is_paused(&self) -> bool {
        !matches!(self.state(), AudioState::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_source_remote_detection() {
        let remote = AudioSource::RemoteStream {
            url: "https://example.com/track".to_string(),
        };
        assert!(remote.is_remote());

        let buffered = AudioSource::MemoryBuffer {
            data: Bytes::from_static(b"pcm"),
        };
        assert!(!buffered.is_remote());
    }
}
