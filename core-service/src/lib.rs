//! Player service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, settings,
//! audio output, clock) into the player core: the API client, media store,
//! playback queue, controller, and history tracker. Desktop apps typically
//! enable the `desktop-shims` feature (which pulls in `bridge-desktop`
//! defaults through `core-runtime`); embedded hosts inject their own bridges
//! through [`CoreConfig`].

pub mod error;

pub use error::{CoreError, Result};

use bridge_traits::audio::AudioOutput;
use core_api::ApiClient;
use core_history::HistoryTracker;
use core_library::search::{SearchResults, SearchScope, TrackIndex};
use core_playback::{
    ApiTrackSource, FetchMode, MediaStore, PlaybackQueue, PlayerController, QueueConfig,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use core_runtime::settings::{AudioQuality, ClientSettings};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Primary façade exposed to host applications.
///
/// Owns the background tasks (controller run loop, history run loop) and the
/// in-memory track index used by client-side search.
pub struct PlayerService {
    api: Arc<ApiClient>,
    media: Arc<MediaStore>,
    settings: ClientSettings,
    events: EventBus,
    audio: Arc<dyn AudioOutput>,
    queue: Arc<PlaybackQueue>,
    controller: Arc<PlayerController>,
    history: Arc<HistoryTracker>,
    index: RwLock<TrackIndex>,
    max_search_results: usize,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PlayerService {
    /// Assemble the player core from a validated configuration.
    ///
    /// Nothing is fetched and no task runs until [`start`](Self::start).
    pub async fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::default();
        let api = Arc::new(ApiClient::new(
            config.http_client.clone(),
            config.base_url.clone(),
            config.csrf_token.clone(),
        ));
        let media = MediaStore::new();
        let settings = ClientSettings::new(config.settings_store.clone(), config.default_queue_size);

        let queue_size = settings.queue_size().await?;
        let source = ApiTrackSource::new(
            api.clone(),
            media.clone(),
            settings.clone(),
            FetchMode::Cache,
        );
        let queue = PlaybackQueue::new(
            Arc::new(source),
            QueueConfig {
                max_size: queue_size,
                fallback_playlist: config.fallback_playlist.clone(),
                ..QueueConfig::default()
            },
            events.clone(),
        )?;

        let controller = PlayerController::new(config.audio_output.clone(), queue.clone(), events.clone());
        let history = HistoryTracker::new(api.clone(), config.clock.clone(), events.clone());

        Ok(Self {
            api,
            media,
            settings,
            events,
            audio: config.audio_output,
            queue,
            controller,
            history,
            index: RwLock::new(TrackIndex::new()),
            max_search_results: config.max_search_results,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Start the background tasks and kick the first queue refill.
    pub fn start(&self) {
        info!("service: starting player core");

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(
            self.controller.clone().run(self.cancel.child_token()),
        ));
        tasks.push(tokio::spawn(self.history.clone().run(
            self.audio.clone(),
            self.cancel.child_token(),
        )));

        self.queue.request_fill();
    }

    /// Stop background tasks and wind the queue down.
    pub async fn stop(&self) {
        info!("service: stopping player core");

        self.cancel.cancel();
        self.queue.close();

        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "service: background task panicked");
            }
        }
    }

    pub fn api(&self) -> Arc<ApiClient> {
        self.api.clone()
    }

    pub fn media_store(&self) -> Arc<MediaStore> {
        self.media.clone()
    }

    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub fn queue(&self) -> Arc<PlaybackQueue> {
        self.queue.clone()
    }

    pub fn controller(&self) -> Arc<PlayerController> {
        self.controller.clone()
    }

    pub fn history(&self) -> Arc<HistoryTracker> {
        self.history.clone()
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Persist a new queue size and apply it to the live queue.
    pub async fn set_queue_size(&self, size: usize) -> Result<()> {
        self.settings.set_queue_size(size).await?;
        self.queue.set_max_size(size);
        Ok(())
    }

    /// Persist a new audio quality; it applies from the next prefetch.
    pub async fn set_audio_quality(&self, quality: AudioQuality) -> Result<()> {
        self.settings.set_audio_quality(quality).await?;
        Ok(())
    }

    /// Rebuild the search index from the server's playlists and track
    /// listings. Returns the number of indexed tracks.
    pub async fn refresh_track_index(&self) -> Result<usize> {
        let playlists = self.api.playlists().await?;

        let mut fresh = TrackIndex::new();
        for playlist in &playlists {
            let tracks = self.api.tracks(&playlist.name).await?;
            fresh.add_tracks(&tracks);
        }

        let count = fresh.len();
        *self.index.write() = fresh;
        info!(tracks = count, playlists = playlists.len(), "service: track index refreshed");
        Ok(count)
    }

    /// Whether the track index has been loaded yet. Hosts show a
    /// "still loading" notice instead of search results until it has.
    pub fn index_ready(&self) -> bool {
        !self.index.read().is_empty()
    }

    /// Client-side fuzzy search over the loaded track index.
    pub fn search(&self, scope: &SearchScope, query: &str) -> SearchResults {
        self.index
            .read()
            .search(scope, query, self.max_search_results)
    }
}

impl std::fmt::Debug for PlayerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerService")
            .field("queue_len", &self.queue.len())
            .field("index_len", &self.index.read().len())
            .finish()
    }
}
