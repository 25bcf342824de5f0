//! # Player Controller
//!
//! Owns the host's single audio element and the `Idle`/`Loaded` state
//! machine around it. On natural end-of-media (or a manual skip) the
//! controller pulls the next prefetched entry from the queue; when the queue
//! is empty it drops to `Idle` and retries on a fixed cadence until refill
//! catches up.
//!
//! Rendering is expressed as data: every transition emits a
//! `PlayerEvent::TrackChanged`, and [`now_playing`](PlayerController::now_playing)
//! returns the [`NowPlaying`] snapshot (display lines, cover, lyrics) that a
//! host UI draws from. No markup is built here.

use crate::entry::QueueEntry;
use crate::error::Result;
use crate::media::MediaRef;
use crate::queue::PlaybackQueue;
use bridge_traits::audio::{AudioOutput, AudioState};
use core_runtime::events::{CoreEvent, EventBus, PlayerEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How often the run loop checks the audio element while a track is loaded.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Retry cadence while the queue is empty.
const EMPTY_RETRY: Duration = Duration::from_secs(1);

/// Lyrics render data: sanitized markup to show verbatim, or the explicit
/// absence the host turns into its "no lyrics" placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsRender {
    Html {
        html: String,
        source: Option<String>,
    },
    NotFound,
}

/// Render-data snapshot of the current track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub path: String,
    pub playlist: String,
    /// "Now playing" display line.
    pub current: String,
    /// "Previously playing" display line, once a track has been replaced.
    pub previous: Option<String>,
    pub cover: MediaRef,
    pub lyrics: LyricsRender,
    pub duration_secs: u32,
}

struct CurrentTrack {
    entry: QueueEntry,
    display: String,
}

#[derive(Default)]
struct ControllerState {
    current: Option<CurrentTrack>,
    previous_display: Option<String>,
}

/// The `Idle`/`Loaded` playback state machine.
pub struct PlayerController {
    audio: Arc<dyn AudioOutput>,
    queue: Arc<PlaybackQueue>,
    events: EventBus,
    state: Mutex<ControllerState>,
}

impl PlayerController {
    pub fn new(
        audio: Arc<dyn AudioOutput>,
        queue: Arc<PlaybackQueue>,
        events: EventBus,
    ) -> Arc<Self> {
        Arc::new(Self {
            audio,
            queue,
            events,
            state: Mutex::new(ControllerState::default()),
        })
    }

    /// Whether a track is currently bound to the audio element.
    pub fn is_loaded(&self) -> bool {
        self.state.lock().current.is_some()
    }

    /// Render-data snapshot of the current track, if any.
    pub fn now_playing(&self) -> Option<NowPlaying> {
        let state = self.state.lock();
        state.current.as_ref().map(|current| NowPlaying {
            path: current.entry.track.path.clone(),
            playlist: current.entry.track.playlist.clone(),
            current: current.display.clone(),
            previous: state.previous_display.clone(),
            cover: current.entry.cover.media_ref(),
            lyrics: match &current.entry.lyrics {
                Some(lyrics) => LyricsRender::Html {
                    html: lyrics.html.clone(),
                    source: lyrics.source.clone(),
                },
                None => LyricsRender::NotFound,
            },
            duration_secs: current.entry.track.duration,
        })
    }

    /// Pull the next entry from the queue and make it current.
    ///
    /// This is the single transition of the state machine: natural
    /// end-of-media and manual skip both land here. Returns `Ok(true)` when
    /// a track was loaded, `Ok(false)` when the queue was empty (the run
    /// loop retries after a fixed delay).
    ///
    /// The replaced entry is dropped here, which releases its media handles.
    pub async fn advance(&self) -> Result<bool> {
        let Some(entry) = self.queue.consume_head() else {
            debug!("player: queue is empty, trying again later");
            let mut state = self.state.lock();
            if let Some(old) = state.current.take() {
                state.previous_display = Some(old.display);
            }
            drop(state);
            self.events
                .emit(CoreEvent::Player(PlayerEvent::QueueEmpty))
                .ok();
            return Ok(false);
        };

        let display = entry.display_line();
        info!(path = %entry.track.path, "player: loading track");

        // Swap the element's source; autoplay is part of the load contract.
        self.audio.load(entry.audio.audio_source()).await?;

        let event = PlayerEvent::TrackChanged {
            path: entry.track.path.clone(),
            playlist: entry.track.playlist.clone(),
            display: display.clone(),
            duration_secs: entry.track.duration,
        };

        {
            let mut state = self.state.lock();
            if let Some(old) = state.current.take() {
                state.previous_display = Some(old.display);
            }
            state.current = Some(CurrentTrack { entry, display });
        }

        self.events.emit(CoreEvent::Player(event)).ok();
        Ok(true)
    }

    /// Manual skip: forces the same transition end-of-media causes.
    pub async fn skip(&self) -> Result<bool> {
        info!("player: skip");
        self.advance().await
    }

    /// Resume playback. No-op while idle.
    pub async fn play(&self) -> Result<()> {
        if !self.is_loaded() {
            return Ok(());
        }
        self.audio.play().await?;
        self.events
            .emit(CoreEvent::Player(PlayerEvent::Resumed))
            .ok();
        Ok(())
    }

    /// Pause playback. No-op while idle.
    pub async fn pause(&self) -> Result<()> {
        if !self.is_loaded() {
            return Ok(());
        }
        self.audio.pause().await?;
        self.events.emit(CoreEvent::Player(PlayerEvent::Paused)).ok();
        Ok(())
    }

    /// Relative seek by `delta_secs` seconds (negative = backwards).
    ///
    /// The seek is applied only when the resulting position stays inside the
    /// track in the direction of travel: forward seeks must land before the
    /// end, backward seeks after the start. No-op while idle.
    pub async fn seek(&self, delta_secs: i64) -> Result<()> {
        if !self.is_loaded() || delta_secs == 0 {
            return Ok(());
        }

        let position = self.audio.position().as_secs_f64();
        let duration = self.audio.duration();
        let new_position = position + delta_secs as f64;

        let within_bounds = if delta_secs > 0 {
            duration.is_some_and(|d| new_position < d.as_secs_f64())
        } else {
            new_position > 0.0
        };

        if !within_bounds {
            return Ok(());
        }

        self.audio
            .seek(Duration::from_secs_f64(new_position))
            .await?;
        self.events
            .emit(CoreEvent::Player(PlayerEvent::Seeked {
                position_secs: new_position as u64,
            }))
            .ok();
        Ok(())
    }

    /// Drive the state machine until cancelled.
    ///
    /// While loaded, polls the audio element and advances on end-of-media.
    /// While idle, retries [`advance`](Self::advance) on a fixed cadence
    /// until the queue has an entry.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        info!("player: run loop started");

        loop {
            let delay = if self.is_loaded() {
                POLL_INTERVAL
            } else {
                EMPTY_RETRY
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("player: run loop stopped");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    let should_advance = !self.is_loaded()
                        || matches!(self.audio.state(), AudioState::Completed);

                    if should_advance {
                        if let Err(e) = self.advance().await {
                            warn!(error = %e, "player: failed to load next track");
                        }
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
