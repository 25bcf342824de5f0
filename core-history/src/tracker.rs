//! # History Tracker
//!
//! One active session per current track: a tick counter gated on actual
//! (unpaused) playback, a required threshold of half the track's duration
//! capped at four minutes, and a has-reported latch so each listen is
//! scrobbled at most once.

use crate::reporter::PlaybackReporter;
use bridge_traits::audio::AudioOutput;
use bridge_traits::time::Clock;
use core_api::{NowPlayingReport, PlayedReport};
use core_runtime::events::{
    CoreEvent, EventBus, EventStream, HistoryEvent, PlayerEvent, RecvError,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// last.fm counts a listen after half the track or four minutes of play,
/// whichever is less.
const MAX_REQUIRED_TICKS: u32 = 4 * 60;

/// last.fm only accepts scrobbles for tracks longer than 30 seconds.
const SCROBBLE_MIN_DURATION_SECS: u32 = 30;

/// Progress-tick period.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Now-playing heartbeat period. The server exposes live listening status
/// on the same cadence.
const HEARTBEAT_PERIOD: Duration = Duration::from_secs(10);

struct Session {
    path: String,
    playlist: String,
    duration_secs: u32,
    start_timestamp: i64,
    elapsed_ticks: u32,
    required_ticks: u32,
    has_reported: bool,
}

/// Tracks playback time of the current track and reports listens.
pub struct HistoryTracker {
    reporter: Arc<dyn PlaybackReporter>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    session: Mutex<Option<Session>>,
}

impl HistoryTracker {
    pub fn new(
        reporter: Arc<dyn PlaybackReporter>,
        clock: Arc<dyn Clock>,
        events: EventBus,
    ) -> Arc<Self> {
        Arc::new(Self {
            reporter,
            clock,
            events,
            session: Mutex::new(None),
        })
    }

    /// Begin a fresh session for a track that just became current. The
    /// previous session, reported or not, is discarded.
    pub fn start_track(&self, path: impl Into<String>, playlist: impl Into<String>, duration_secs: u32) {
        let path = path.into();
        debug!(path = %path, "history: track changed");

        let required_ticks = MAX_REQUIRED_TICKS.min((duration_secs as f64 / 2.0).round() as u32);
        *self.session.lock() = Some(Session {
            path,
            playlist: playlist.into(),
            duration_secs,
            start_timestamp: self.clock.unix_timestamp(),
            elapsed_ticks: 0,
            required_ticks,
            has_reported: false,
        });
    }

    /// Ticks needed before the current track's listen is reported.
    pub fn required_ticks(&self) -> Option<u32> {
        self.session.lock().as_ref().map(|s| s.required_ticks)
    }

    /// Unpaused ticks counted for the current track so far.
    pub fn elapsed_ticks(&self) -> Option<u32> {
        self.session.lock().as_ref().map(|s| s.elapsed_ticks)
    }

    /// One progress tick. Skipped entirely while paused or without a
    /// current track; otherwise counts one second of playback and fires the
    /// one-shot played report once the threshold is crossed.
    pub async fn tick(&self, paused: bool) {
        let report = {
            let mut session = self.session.lock();
            let Some(session) = session.as_mut() else {
                debug!("history: no current track");
                return;
            };

            if paused {
                debug!("history: paused");
                return;
            }

            session.elapsed_ticks += 1;
            debug!(
                elapsed = session.elapsed_ticks,
                required = session.required_ticks,
                "history: playing"
            );

            if !session.has_reported && session.elapsed_ticks > session.required_ticks {
                session.has_reported = true;
                Some(PlayedReport {
                    track: session.path.clone(),
                    playlist: session.playlist.clone(),
                    start_timestamp: session.start_timestamp,
                    lastfm_eligible: session.duration_secs > SCROBBLE_MIN_DURATION_SECS,
                })
            } else {
                None
            }
        };

        if let Some(report) = report {
            info!(path = %report.track, "history: played");
            match self.reporter.report_played(&report).await {
                Ok(()) => {
                    self.events
                        .emit(CoreEvent::History(HistoryEvent::Scrobbled {
                            path: report.track,
                            playlist: report.playlist,
                        }))
                        .ok();
                }
                Err(e) => {
                    warn!(error = %e, "history: played report failed");
                    self.events
                        .emit(CoreEvent::History(HistoryEvent::ReportFailed {
                            message: e.to_string(),
                        }))
                        .ok();
                }
            }
        }
    }

    /// One now-playing heartbeat. Reported whenever a track is current,
    /// paused or not; failures are logged and never propagated.
    pub async fn heartbeat(&self, paused: bool, position: Duration) {
        let report = self.session.lock().as_ref().map(|session| NowPlayingReport {
            track: session.path.clone(),
            paused,
            progress: position.as_secs(),
        });

        let Some(report) = report else {
            return;
        };

        if let Err(e) = self.reporter.report_now_playing(&report).await {
            warn!(error = %e, "history: now-playing report failed");
            self.events
                .emit(CoreEvent::History(HistoryEvent::ReportFailed {
                    message: e.to_string(),
                }))
                .ok();
        }
    }

    /// Drive the tracker until cancelled: follow track changes on the event
    /// bus, tick every second, heartbeat every ten.
    pub async fn run(self: Arc<Self>, audio: Arc<dyn AudioOutput>, cancel: CancellationToken) {
        let mut track_changes = EventStream::new(self.events.subscribe())
            .filter(|event| matches!(event, CoreEvent::Player(PlayerEvent::TrackChanged { .. })));

        let mut tick = interval(TICK_PERIOD);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut heartbeat = interval(HEARTBEAT_PERIOD);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("history: run loop started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("history: run loop stopped");
                    break;
                }
                event = track_changes.recv() => match event {
                    Ok(CoreEvent::Player(PlayerEvent::TrackChanged {
                        path,
                        playlist,
                        duration_secs,
                        ..
                    })) => self.start_track(path, playlist, duration_secs),
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "history: missed track-change events");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = tick.tick() => self.tick(audio.is_paused()).await,
                _ = heartbeat.tick() => {
                    self.heartbeat(audio.is_paused(), audio.position()).await;
                }
            }
        }
    }
}

impl std::fmt::Debug for HistoryTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryTracker")
            .field("has_session", &self.session.lock().is_some())
            .finish()
    }
}
