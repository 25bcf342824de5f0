//! # Core Configuration Module
//!
//! Provides configuration management for the music web client core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all necessary dependencies and settings for the client.
//! It enforces fail-fast validation to ensure all required bridges are provided
//! before initialization.
//!
//! ## Required Dependencies
//!
//! - `AudioOutput` - the host's audio element; there is no default
//!
//! ## Optional Dependencies (with desktop defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//! - `SettingsStore` - preference persistence (desktop default: JSON file,
//!   requires `settings_path`)
//! - `Clock` - time source (default: system clock)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! `HttpClient` and `SettingsStore` are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .base_url("https://music.example.com")
//!     .csrf_token(csrf_from_hosting_page)
//!     .settings_path("/home/user/.config/music-client/settings.json")
//!     .audio_output(Arc::new(MyAudioElement::new()))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AudioOutput, Clock, HttpClient, SettingsStore, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;

/// Default bound for the playback queue when no preference is stored.
pub const DEFAULT_QUEUE_SIZE: usize = 5;

/// Default cap on fuzzy-search result lists.
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 500;

/// Core configuration for the music web client.
///
/// This struct holds all dependencies and settings required to initialize
/// the client core. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the music server, without a trailing slash.
    pub base_url: String,

    /// Anti-forgery token supplied by the hosting page, sent with every
    /// mutating POST.
    pub csrf_token: String,

    /// HTTP client for talking to the server (optional with desktop default).
    pub http_client: Arc<dyn HttpClient>,

    /// Preference storage (optional with desktop default).
    pub settings_store: Arc<dyn SettingsStore>,

    /// The host's audio element (required).
    pub audio_output: Arc<dyn AudioOutput>,

    /// Time source (default: system clock).
    pub clock: Arc<dyn Clock>,

    /// Playlist drawn from when no playlist is enabled in the selection.
    pub fallback_playlist: String,

    /// Queue bound used when no stored preference exists.
    pub default_queue_size: usize,

    /// Cap on fuzzy-search result lists.
    pub max_search_results: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("base_url", &self.base_url)
            .field("csrf_token", &"<redacted>")
            .field("http_client", &"HttpClient { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("audio_output", &"AudioOutput { ... }")
            .field("fallback_playlist", &self.fallback_playlist)
            .field("default_queue_size", &self.default_queue_size)
            .field("max_search_results", &self.max_search_results)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("Base URL cannot be empty".to_string()));
        }

        if self.default_queue_size == 0 {
            return Err(Error::Config(
                "Default queue size must be at least 1".to_string(),
            ));
        }

        if self.max_search_results == 0 {
            return Err(Error::Config(
                "Max search results must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for server communication. \
                 Desktop: enable the 'desktop-shims' feature to use the default \
                 reqwest client. Embedded hosts: inject a platform HTTP adapter."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(
    settings_path: Option<&PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::JsonSettingsStore;

    let path = settings_path.ok_or_else(|| Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "The default JSON settings store needs a file location. \
                 Use .settings_path() to set one, or inject a SettingsStore \
                 implementation."
            .to_string(),
    })?;

    let store = JsonSettingsStore::open(path.clone())
        .map_err(|e| Error::Internal(format!("Failed to initialize default SettingsStore: {}", e)))?;

    let store: Arc<dyn SettingsStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(
    _settings_path: Option<&PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    Err(Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required for preference \
                 persistence. Desktop: enable the 'desktop-shims' feature to use \
                 the default JSON file store. Embedded hosts: inject a cookie- or \
                 localStorage-backed store."
            .to_string(),
    })
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then call
/// [`build()`](CoreConfigBuilder::build) to create the final config. The
/// builder validates required dependencies and provides helpful error
/// messages.
#[derive(Default)]
pub struct CoreConfigBuilder {
    base_url: Option<String>,
    csrf_token: Option<String>,
    settings_path: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    audio_output: Option<Arc<dyn AudioOutput>>,
    clock: Option<Arc<dyn Clock>>,
    fallback_playlist: Option<String>,
    default_queue_size: Option<usize>,
    max_search_results: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the music server base URL. A trailing slash is stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Sets the anti-forgery token supplied by the hosting page.
    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Sets the file location used by the default JSON settings store.
    ///
    /// Ignored when a `SettingsStore` is injected explicitly.
    pub fn settings_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the settings store implementation.
    ///
    /// If not provided, the desktop default (JSON file store) will be used
    /// when the `desktop-shims` feature is enabled and a `settings_path` is
    /// configured.
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the audio output implementation (required).
    ///
    /// The audio output is the host's single audio element. There is no
    /// default: every host owns its own playback surface.
    pub fn audio_output(mut self, output: Arc<dyn AudioOutput>) -> Self {
        self.audio_output = Some(output);
        self
    }

    /// Sets the time source. Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the playlist used when the selection has nothing enabled.
    ///
    /// Default: `"default"`.
    pub fn fallback_playlist(mut self, playlist: impl Into<String>) -> Self {
        self.fallback_playlist = Some(playlist.into());
        self
    }

    /// Sets the queue bound used when no stored preference exists.
    ///
    /// Default: 5.
    pub fn default_queue_size(mut self, size: usize) -> Self {
        self.default_queue_size = Some(size);
        self
    }

    /// Sets the cap on fuzzy-search result lists.
    ///
    /// Default: 500.
    pub fn max_search_results(mut self, max: usize) -> Self {
        self.max_search_results = Some(max);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - Required fields are missing (base URL, CSRF token, audio output)
    /// - No HTTP client or settings store is available (injected or default)
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let base_url = self.base_url.ok_or_else(|| {
            Error::Config("Base URL is required. Use .base_url() to set it.".to_string())
        })?;

        let csrf_token = self.csrf_token.ok_or_else(|| {
            Error::Config("CSRF token is required. Use .csrf_token() to set it.".to_string())
        })?;

        let audio_output = self.audio_output.ok_or_else(|| Error::CapabilityMissing {
            capability: "AudioOutput".to_string(),
            message: "No audio output implementation provided. Inject the host's \
                     audio element adapter with .audio_output()."
                .to_string(),
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(self.settings_path.as_ref())?,
        };

        let config = CoreConfig {
            base_url,
            csrf_token,
            http_client,
            settings_store,
            audio_output,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            fallback_playlist: self
                .fallback_playlist
                .unwrap_or_else(|| "default".to_string()),
            default_queue_size: self.default_queue_size.unwrap_or(DEFAULT_QUEUE_SIZE),
            max_search_results: self.max_search_results.unwrap_or(DEFAULT_MAX_SEARCH_RESULTS),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::audio::{AudioSource, AudioState};
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use std::time::Duration;

    // Mock implementations for testing

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse {
                status: 200,
                headers: Default::default(),
                body: Default::default(),
            })
        }

        async fn execute_stream(
            &self,
            _request: HttpRequest,
        ) -> BridgeResult<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
            Ok(Box::new(std::io::Cursor::new(Vec::new())))
        }
    }

    struct MockSettingsStore;

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn set_string(&self, _key: &str, _value: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn get_string(&self, _key: &str) -> BridgeResult<Option<String>> {
            Ok(None)
        }

        async fn delete(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NullAudioOutput;

    #[async_trait]
    impl AudioOutput for NullAudioOutput {
        async fn load(&self, _source: AudioSource) -> BridgeResult<()> {
            Ok(())
        }

        async fn play(&self) -> BridgeResult<()> {
            Ok(())
        }

        async fn pause(&self) -> BridgeResult<()> {
            Ok(())
        }

        async fn seek(&self, _position: Duration) -> BridgeResult<()> {
            Ok(())
        }

        fn state(&self) -> AudioState {
            AudioState::Idle
        }

        fn position(&self) -> Duration {
            Duration::ZERO
        }

        fn duration(&self) -> Option<Duration> {
            None
        }
    }

    fn complete_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .base_url("https://music.example.com")
            .csrf_token("token-123")
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
            .audio_output(Arc::new(NullAudioOutput))
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = CoreConfig::builder()
            .csrf_token("token")
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
            .audio_output(Arc::new(NullAudioOutput))
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Base URL is required"));
    }

    #[test]
    fn test_builder_requires_csrf_token() {
        let result = CoreConfig::builder()
            .base_url("https://music.example.com")
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
            .audio_output(Arc::new(NullAudioOutput))
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("CSRF token is required"));
    }

    #[test]
    fn test_builder_requires_audio_output() {
        let result = CoreConfig::builder()
            .base_url("https://music.example.com")
            .csrf_token("token")
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
            .build();

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("AudioOutput"));
        assert!(err_msg.contains("audio element"));
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let config = complete_builder().build().unwrap();

        assert_eq!(config.base_url, "https://music.example.com");
        assert_eq!(config.default_queue_size, DEFAULT_QUEUE_SIZE);
        assert_eq!(config.max_search_results, DEFAULT_MAX_SEARCH_RESULTS);
        assert_eq!(config.fallback_playlist, "default");
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let config = complete_builder()
            .base_url("https://music.example.com/")
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://music.example.com");
    }

    #[test]
    fn test_validate_rejects_zero_queue_size() {
        let result = complete_builder().default_queue_size(0).build();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least 1"));
    }

    #[test]
    fn test_custom_knobs() {
        let config = complete_builder()
            .fallback_playlist("CB")
            .default_queue_size(8)
            .max_search_results(100)
            .build()
            .unwrap();

        assert_eq!(config.fallback_playlist, "CB");
        assert_eq!(config.default_queue_size, 8);
        assert_eq!(config.max_search_results, 100);
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = complete_builder().build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned.base_url, config.base_url);
        assert_eq!(cloned.default_queue_size, config.default_queue_size);
    }
}
