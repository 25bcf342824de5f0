//! # Playback Queue
//!
//! An ordered, bounded list of ready-to-play entries, refilled asynchronously
//! so playback never waits on the network.
//!
//! ## Refill discipline
//!
//! - At most one refill pipeline runs at a time (single-flight). Concurrent
//!   [`request_fill`](PlaybackQueue::request_fill) calls collapse onto the
//!   pipeline already in flight.
//! - A pipeline fetches one entry through four strictly sequential stages:
//!   choose track, download audio, download cover, download lyrics. A failure
//!   at any stage abandons the entry (releasing whatever was fetched) and
//!   re-arms the refill after the error backoff; success re-arms after the
//!   much shorter success backoff.
//! - The playlist for each fetch rotates round-robin over the enabled
//!   selection, seeded from the tail entry's playlist. A tail playlist that
//!   is no longer enabled falls back to a random enabled one; an empty
//!   selection falls back to the configured fallback playlist.

use crate::config::QueueConfig;
use crate::entry::QueueEntry;
use crate::error::Result;
use crate::media::MediaRef;
use crate::source::TrackSource;
use core_runtime::events::{CoreEvent, EventBus, QueueEvent};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Render-data view of one queued entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTrackView {
    pub path: String,
    pub playlist: String,
    pub display: String,
    pub cover: MediaRef,
}

/// The bounded, asynchronously refilled playback queue.
///
/// Shared as an `Arc`; refill pipelines and re-arm timers hold only weak
/// references, so dropping the last strong reference winds everything down.
pub struct PlaybackQueue {
    source: Arc<dyn TrackSource>,
    events: EventBus,
    backoff_ok: Duration,
    backoff_err: Duration,
    fallback_playlist: String,
    max_size: AtomicUsize,
    entries: Mutex<VecDeque<QueueEntry>>,
    enabled: Mutex<Vec<String>>,
    refilling: AtomicBool,
    closed: AtomicBool,
}

impl PlaybackQueue {
    /// Create a queue. No fetch happens until the first
    /// [`request_fill`](Self::request_fill).
    pub fn new(
        source: Arc<dyn TrackSource>,
        config: QueueConfig,
        events: EventBus,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        Ok(Arc::new(Self {
            source,
            events,
            backoff_ok: config.refill_backoff_ok,
            backoff_err: config.refill_backoff_err,
            fallback_playlist: config.fallback_playlist,
            max_size: AtomicUsize::new(config.max_size),
            entries: Mutex::new(VecDeque::new()),
            enabled: Mutex::new(Vec::new()),
            refilling: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size.load(Ordering::SeqCst)
    }

    /// Adjust the queue bound and check whether the freed or grown capacity
    /// allows another fetch. Shrinking never discards queued entries; it
    /// only gates future fills.
    pub fn set_max_size(self: &Arc<Self>, max_size: usize) {
        self.max_size.store(max_size.max(1), Ordering::SeqCst);
        self.request_fill();
    }

    /// Replace the enabled playlist selection used by refill rotation.
    pub fn set_enabled_playlists(&self, playlists: Vec<String>) {
        *self.enabled.lock() = playlists;
    }

    pub fn enabled_playlists(&self) -> Vec<String> {
        self.enabled.lock().clone()
    }

    /// Render-data snapshot of the queued entries, head first.
    pub fn snapshot(&self) -> Vec<QueuedTrackView> {
        self.entries
            .lock()
            .iter()
            .map(|entry| QueuedTrackView {
                path: entry.track.path.clone(),
                playlist: entry.track.playlist.clone(),
                display: entry.display_line(),
                cover: entry.cover.media_ref(),
            })
            .collect()
    }

    /// Remove and return the head entry. The caller takes over ownership of
    /// the entry's media handles. `None` when the queue is empty; callers
    /// poll again later rather than failing, since background refill is
    /// expected to catch up.
    pub fn consume_head(self: &Arc<Self>) -> Option<QueueEntry> {
        let entry = self.entries.lock().pop_front();
        // Either way there is capacity to fill now
        self.request_fill();
        entry
    }

    /// Discard a queued (not-yet-played) entry by index. Its media handles
    /// are released here; freed capacity may allow another fetch.
    pub fn remove(self: &Arc<Self>, index: usize) -> bool {
        let removed = self.entries.lock().remove(index);
        match removed {
            Some(entry) => {
                info!(path = %entry.track.path, "queue: removed entry");
                self.events
                    .emit(CoreEvent::Queue(QueueEvent::EntryRemoved {
                        path: entry.track.path.clone(),
                    }))
                    .ok();
                drop(entry);
                self.request_fill();
                true
            }
            None => false,
        }
    }

    /// Stop re-arming refills. In-flight fetches finish but schedule nothing
    /// further.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Kick the refill machinery.
    ///
    /// No-op when a refill is already in flight (single-flight) or the queue
    /// is at its bound. Otherwise picks the next playlist and spawns the
    /// fetch pipeline; completion re-invokes this automatically.
    pub fn request_fill(self: &Arc<Self>) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }

        if self
            .refilling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            // A pipeline is already in flight
            return;
        }

        if self.len() >= self.max_size() {
            self.refilling.store(false, Ordering::SeqCst);
            return;
        }

        let playlist = self.next_playlist();
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            queue.run_pipeline(playlist).await;
        });
    }

    fn next_playlist(&self) -> String {
        let enabled = self.enabled.lock().clone();
        let last = self
            .entries
            .lock()
            .back()
            .map(|entry| entry.track.playlist.clone());
        pick_next_playlist(&enabled, last.as_deref(), &self.fallback_playlist)
    }

    async fn run_pipeline(self: Arc<Self>, playlist: String) {
        debug!(playlist = %playlist, "queue: fetching next track");

        let delay = match self.fetch_entry(&playlist).await {
            Ok(entry) => {
                let mut entries = self.entries.lock();
                if entries.len() < self.max_size() {
                    let event = QueueEvent::EntryQueued {
                        path: entry.track.path.clone(),
                        playlist: entry.track.playlist.clone(),
                        queue_len: entries.len() + 1,
                    };
                    info!(path = %entry.track.path, "queue: entry ready");
                    entries.push_back(entry);
                    drop(entries);
                    self.events.emit(CoreEvent::Queue(event)).ok();
                } else {
                    // The bound shrank while we were fetching; abandoning the
                    // entry releases its handles and keeps the invariant.
                    drop(entries);
                    debug!(playlist = %playlist, "queue: discarding fetch, queue already full");
                }
                self.backoff_ok
            }
            Err(e) => {
                warn!(playlist = %playlist, error = %e, "queue: refill failed");
                self.events
                    .emit(CoreEvent::Queue(QueueEvent::RefillFailed {
                        playlist: playlist.clone(),
                        message: e.to_string(),
                    }))
                    .ok();
                self.backoff_err
            }
        };

        self.refilling.store(false, Ordering::SeqCst);
        self.rearm(delay);
    }

    fn rearm(self: &Arc<Self>, delay: Duration) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }

        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(queue) = weak.upgrade() {
                queue.request_fill();
            }
        });
    }

    /// The strictly sequential fetch pipeline for one entry. Any stage error
    /// abandons the remaining stages; handles fetched so far are released by
    /// dropping the locals.
    async fn fetch_entry(&self, playlist: &str) -> Result<QueueEntry> {
        let track = self.source.choose_track(playlist).await?;
        debug!(path = %track.path, "queue: downloading audio");
        let audio = self.source.fetch_audio(&track).await?;
        debug!(path = %track.path, "queue: downloading album cover");
        let cover = self.source.fetch_cover(&track).await?;
        debug!(path = %track.path, "queue: downloading lyrics");
        let lyrics = self.source.fetch_lyrics(&track).await?;

        Ok(QueueEntry {
            track,
            audio,
            cover,
            lyrics,
        })
    }
}

impl std::fmt::Debug for PlaybackQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackQueue")
            .field("len", &self.len())
            .field("max_size", &self.max_size())
            .field("refilling", &self.refilling.load(Ordering::SeqCst))
            .finish()
    }
}

/// Round-robin playlist rotation with fallbacks.
///
/// - Nothing enabled: the configured fallback playlist.
/// - No previous pick: random enabled playlist.
/// - Previous pick still enabled: the next one, wrapping around.
/// - Previous pick no longer enabled: random enabled playlist, since the
///   logical next is unknowable.
fn pick_next_playlist(enabled: &[String], last: Option<&str>, fallback: &str) -> String {
    if enabled.is_empty() {
        return fallback.to_string();
    }

    let random = || {
        enabled
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    };

    match last {
        None => random(),
        Some(last) => match enabled.iter().position(|p| p == last) {
            Some(idx) => enabled[(idx + 1) % enabled.len()].clone(),
            None => random(),
        },
    }
}
