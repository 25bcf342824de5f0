//! Track sources
//!
//! The queue's refill pipeline fetches through the [`TrackSource`] trait so
//! it can be exercised against mocks; [`ApiTrackSource`] is the production
//! implementation over the server API.

use crate::error::Result;
use crate::media::{MediaHandle, MediaStore};
use async_trait::async_trait;
use core_api::ApiClient;
use core_library::models::{Lyrics, Track};
use core_runtime::settings::ClientSettings;
use std::sync::Arc;

/// Supplier of tracks and their media resources for the refill pipeline.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Choose the next track from a playlist.
    async fn choose_track(&self, playlist: &str) -> Result<Track>;

    /// Fetch the track's audio resource.
    async fn fetch_audio(&self, track: &Track) -> Result<MediaHandle>;

    /// Fetch the track's cover image resource.
    async fn fetch_cover(&self, track: &Track) -> Result<MediaHandle>;

    /// Fetch the track's lyrics, when the server has them.
    async fn fetch_lyrics(&self, track: &Track) -> Result<Option<Lyrics>>;
}

/// Whether media resources are prefetched into memory or streamed by the
/// host element on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Hand the host a server URL; nothing is downloaded up front.
    Stream,
    /// Download into memory so playback starts instantly and survives
    /// connectivity blips mid-track.
    Cache,
}

/// Production [`TrackSource`] backed by the server API.
///
/// Audio quality is re-read from the client settings on every fetch, so a
/// preference change applies to the next queued track without a restart.
pub struct ApiTrackSource {
    api: Arc<ApiClient>,
    store: Arc<MediaStore>,
    settings: ClientSettings,
    mode: FetchMode,
    meme_covers: bool,
}

impl ApiTrackSource {
    pub fn new(
        api: Arc<ApiClient>,
        store: Arc<MediaStore>,
        settings: ClientSettings,
        mode: FetchMode,
    ) -> Self {
        Self {
            api,
            store,
            settings,
            mode,
            meme_covers: false,
        }
    }

    /// Request joke covers instead of real album art.
    pub fn with_meme_covers(mut self, enabled: bool) -> Self {
        self.meme_covers = enabled;
        self
    }
}

#[async_trait]
impl TrackSource for ApiTrackSource {
    async fn choose_track(&self, playlist: &str) -> Result<Track> {
        Ok(self.api.choose_track(playlist).await?)
    }

    async fn fetch_audio(&self, track: &Track) -> Result<MediaHandle> {
        let quality = self.settings.audio_quality().await?;
        match self.mode {
            FetchMode::Stream => Ok(MediaHandle::Stream {
                url: self.api.audio_url(&track.path, quality),
            }),
            FetchMode::Cache => {
                let blob = self.api.audio_blob(&track.path, quality).await?;
                Ok(self.store.cache(blob))
            }
        }
    }

    async fn fetch_cover(&self, track: &Track) -> Result<MediaHandle> {
        let quality = self.settings.audio_quality().await?;
        match self.mode {
            FetchMode::Stream => Ok(MediaHandle::Stream {
                url: self.api.cover_url(&track.path, quality, self.meme_covers),
            }),
            FetchMode::Cache => {
                let blob = self
                    .api
                    .cover_blob(&track.path, quality, self.meme_covers)
                    .await?;
                Ok(self.store.cache(blob))
            }
        }
    }

    async fn fetch_lyrics(&self, track: &Track) -> Result<Option<Lyrics>> {
        Ok(self.api.lyrics(&track.path).await?)
    }
}
