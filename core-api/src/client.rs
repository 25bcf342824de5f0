//! Typed client for the music server's JSON/HTTP API.
//!
//! Wraps a [`HttpClient`] bridge with the endpoint surface the player uses.
//! All mutating endpoints are POSTs whose JSON body carries the anti-forgery
//! token in a `csrf` field; all responses are checked for a 2xx status.

use crate::error::{ApiError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_library::models::{Lyrics, Playlist, Track, TrackMetadata};
use core_runtime::settings::AudioQuality;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use urlencoding::encode;

/// Heartbeat payload for the now-playing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingReport {
    /// Track path.
    pub track: String,
    /// Whether playback is currently paused.
    pub paused: bool,
    /// Playback position in whole seconds.
    pub progress: u64,
}

/// Scrobble payload for the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayedReport {
    /// Track path.
    pub track: String,
    /// Owning playlist.
    pub playlist: String,
    /// Unix timestamp at which the track became current.
    #[serde(rename = "startTimestamp")]
    pub start_timestamp: i64,
    /// Whether the listen qualifies for external scrobbling
    /// (tracks of 30 seconds or less never do).
    #[serde(rename = "lastfmEligible")]
    pub lastfm_eligible: bool,
}

#[derive(Debug, Deserialize)]
struct TracksResponse {
    tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    found: bool,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    html: Option<String>,
}

/// Client for the music server API.
///
/// Cheap to clone behind an `Arc`; holds no per-request state.
pub struct ApiClient {
    pub(crate) http: Arc<dyn HttpClient>,
    base_url: String,
    csrf_token: String,
}

impl ApiClient {
    /// Creates a new API client.
    ///
    /// # Arguments
    ///
    /// * `http` - HTTP client bridge
    /// * `base_url` - server base URL; a trailing slash is stripped
    /// * `csrf_token` - anti-forgery token supplied by the hosting page
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: csrf_token.into(),
        }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    fn check_status(endpoint: &str, response: &HttpResponse) -> Result<()> {
        if response.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: response.status,
            })
        }
    }

    pub(crate) fn decode<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        response: &HttpResponse,
    ) -> Result<T> {
        response.json().map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let endpoint = path_and_query.split('?').next().unwrap_or(path_and_query);
        let response = self
            .http
            .execute(HttpRequest::get(self.url(path_and_query)))
            .await?;
        Self::check_status(endpoint, &response)?;
        Self::decode(endpoint, &response)
    }

    async fn get_bytes(&self, path_and_query: &str) -> Result<Bytes> {
        let endpoint = path_and_query.split('?').next().unwrap_or(path_and_query);
        let response = self
            .http
            .execute(HttpRequest::get(self.url(path_and_query)))
            .await?;
        Self::check_status(endpoint, &response)?;
        Ok(response.body)
    }

    /// Issue a POST with the CSRF token folded into the JSON body.
    pub(crate) async fn post_json(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<HttpResponse> {
        let request = self.post_request(endpoint, body)?;
        let response = self.http.execute(request).await?;
        Self::check_status(endpoint, &response)?;
        Ok(response)
    }

    pub(crate) fn post_request(
        &self,
        endpoint: &str,
        mut body: serde_json::Value,
    ) -> Result<HttpRequest> {
        let object = body.as_object_mut().ok_or_else(|| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: "POST body must be a JSON object".to_string(),
        })?;
        object.insert(
            "csrf".to_string(),
            serde_json::Value::String(self.csrf_token.clone()),
        );

        HttpRequest::post(self.url(endpoint))
            .json(&body)
            .map_err(ApiError::from)
    }

    // ------------------------------------------------------------------
    // Playlists and track listings
    // ------------------------------------------------------------------

    /// List all playlists.
    pub async fn playlists(&self) -> Result<Vec<Playlist>> {
        self.get_json("/playlists/list").await
    }

    /// Find a single playlist by name, if it exists.
    pub async fn playlist(&self, name: &str) -> Result<Option<Playlist>> {
        let playlists = self.playlists().await?;
        Ok(playlists.into_iter().find(|p| p.name == name))
    }

    /// Ask the server to choose a random track from a playlist.
    pub async fn choose_track(&self, playlist: &str) -> Result<Track> {
        let response = self
            .post_json("/track/choose", serde_json::json!({ "playlist": playlist }))
            .await?;
        let track: Track = Self::decode("/track/choose", &response)?;
        info!(path = %track.path, "Server chose track");
        Ok(track)
    }

    /// List the tracks of one playlist.
    pub async fn tracks(&self, playlist: &str) -> Result<Vec<Track>> {
        let response: TracksResponse = self
            .get_json(&format!("/track/filter?playlist={}", encode(playlist)))
            .await?;
        Ok(response.tracks)
    }

    /// Server-side full-text track search.
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<Track>> {
        let response: TracksResponse = self
            .get_json(&format!("/track/search?query={}", encode(query)))
            .await?;
        Ok(response.tracks)
    }

    /// Fetch a single track's info.
    pub async fn track_info(&self, path: &str) -> Result<Track> {
        self.get_json(&format!("/track/info?path={}", encode(path)))
            .await
    }

    /// List all known tags.
    pub async fn tags(&self) -> Result<Vec<String>> {
        self.get_json("/track/tags").await
    }

    // ------------------------------------------------------------------
    // Media resources (dual-mode: URL for streaming, bytes for caching)
    // ------------------------------------------------------------------

    /// URL for streaming a track's audio directly from the server.
    pub fn audio_url(&self, path: &str, quality: AudioQuality) -> String {
        self.url(&format!(
            "/track/audio?path={}&type={}",
            encode(path),
            quality.audio_type()
        ))
    }

    /// Download a track's audio into memory.
    pub async fn audio_blob(&self, path: &str, quality: AudioQuality) -> Result<Bytes> {
        let blob = self
            .get_bytes(&format!(
                "/track/audio?path={}&type={}",
                encode(path),
                quality.audio_type()
            ))
            .await?;
        debug!(path = path, bytes = blob.len(), "Downloaded audio");
        Ok(blob)
    }

    /// URL for streaming a track's album cover directly from the server.
    pub fn cover_url(&self, path: &str, quality: AudioQuality, meme: bool) -> String {
        self.url(&format!(
            "/track/album_cover?path={}&quality={}&meme={}",
            encode(path),
            quality.cover_quality(),
            u8::from(meme)
        ))
    }

    /// Download a track's album cover into memory.
    pub async fn cover_blob(
        &self,
        path: &str,
        quality: AudioQuality,
        meme: bool,
    ) -> Result<Bytes> {
        let blob = self
            .get_bytes(&format!(
                "/track/album_cover?path={}&quality={}&meme={}",
                encode(path),
                quality.cover_quality(),
                u8::from(meme)
            ))
            .await?;
        debug!(path = path, bytes = blob.len(), "Downloaded album cover");
        Ok(blob)
    }

    /// Fetch lyrics for a track. `Ok(None)` when the server found none.
    pub async fn lyrics(&self, path: &str) -> Result<Option<Lyrics>> {
        let response: LyricsResponse = self
            .get_json(&format!("/track/lyrics?path={}", encode(path)))
            .await?;

        if !response.found {
            return Ok(None);
        }

        Ok(Some(Lyrics {
            source: response.source,
            html: response.html.unwrap_or_default(),
        }))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Persist edited track metadata server-side.
    pub async fn update_metadata(&self, metadata: &TrackMetadata) -> Result<()> {
        let body = serde_json::to_value(metadata).map_err(|e| ApiError::Decode {
            endpoint: "/track/update_metadata".to_string(),
            message: e.to_string(),
        })?;
        self.post_json("/track/update_metadata", body).await?;
        info!(path = %metadata.path, "Saved track metadata");
        Ok(())
    }

    /// Delete a track by renaming it into the trash namespace.
    pub async fn delete_track(&self, path: &str) -> Result<()> {
        let old_name = path.rsplit('/').next().unwrap_or(path);
        let new_name = format!(".trash.{}", old_name);
        self.post_json(
            "/files/rename",
            serde_json::json!({ "path": path, "new_name": new_name }),
        )
        .await?;
        info!(path = path, "Moved track to trash");
        Ok(())
    }

    /// Mark a track as disliked.
    pub async fn dislike(&self, path: &str) -> Result<()> {
        self.post_json("/dislikes/add", serde_json::json!({ "track": path }))
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Listening history
    // ------------------------------------------------------------------

    /// Report the now-playing heartbeat.
    pub async fn report_now_playing(&self, report: &NowPlayingReport) -> Result<()> {
        let body = serde_json::to_value(report).map_err(|e| ApiError::Decode {
            endpoint: "/now_playing".to_string(),
            message: e.to_string(),
        })?;
        self.post_json("/now_playing", body).await?;
        Ok(())
    }

    /// Report a completed listen.
    pub async fn report_played(&self, report: &PlayedReport) -> Result<()> {
        let body = serde_json::to_value(report).map_err(|e| ApiError::Decode {
            endpoint: "/history_played".to_string(),
            message: e.to_string(),
        })?;
        self.post_json("/history_played", body).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
