//! Shared test doubles for the playback integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::audio::{AudioOutput, AudioSource, AudioState};
use bridge_traits::error::Result as BridgeResult;
use bytes::Bytes;
use core_library::models::{Lyrics, Track};
use core_playback::{MediaHandle, MediaStore, PlaybackError, TrackSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Pipeline stage at which [`ScriptedSource`] injects a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailStage {
    Choose,
    Audio,
    Cover,
    Lyrics,
}

/// Scripted [`TrackSource`]: serves unique tracks, counts stage calls, and
/// optionally fails at one stage or stalls each stage for a fixed delay.
pub struct ScriptedSource {
    pub store: Arc<MediaStore>,
    pub choose_calls: AtomicUsize,
    pub audio_calls: AtomicUsize,
    pub cover_calls: AtomicUsize,
    pub lyrics_calls: AtomicUsize,
    fail_stage: Mutex<Option<FailStage>>,
    stage_delay: Duration,
    next_index: AtomicUsize,
    with_lyrics: bool,
}

impl ScriptedSource {
    pub fn new(store: Arc<MediaStore>) -> Arc<Self> {
        Arc::new(Self::new_inner(store))
    }

    pub fn without_lyrics(store: Arc<MediaStore>) -> Arc<Self> {
        let mut source = Self::new_inner(store);
        source.with_lyrics = false;
        Arc::new(source)
    }

    fn new_inner(store: Arc<MediaStore>) -> Self {
        Self {
            store,
            choose_calls: AtomicUsize::new(0),
            audio_calls: AtomicUsize::new(0),
            cover_calls: AtomicUsize::new(0),
            lyrics_calls: AtomicUsize::new(0),
            fail_stage: Mutex::new(None),
            stage_delay: Duration::from_millis(10),
            next_index: AtomicUsize::new(0),
            with_lyrics: true,
        }
    }

    pub fn fail_at(&self, stage: Option<FailStage>) {
        *self.fail_stage.lock().unwrap() = stage;
    }

    fn failing(&self, stage: FailStage) -> bool {
        *self.fail_stage.lock().unwrap() == Some(stage)
    }

    async fn stage(&self, counter: &AtomicUsize, stage: FailStage) -> Result<(), PlaybackError> {
        counter.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.stage_delay).await;
        if self.failing(stage) {
            Err(PlaybackError::Internal("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TrackSource for ScriptedSource {
    async fn choose_track(&self, playlist: &str) -> Result<Track, PlaybackError> {
        self.stage(&self.choose_calls, FailStage::Choose).await?;

        let index = self.next_index.fetch_add(1, Ordering::SeqCst);
        Ok(Track {
            path: format!("{}/track-{}.mp3", playlist, index),
            playlist: playlist.to_string(),
            duration: 180,
            tags: Vec::new(),
            title: Some(format!("Track {}", index)),
            artists: Some(vec!["Artist".to_string()]),
            album: None,
            album_artist: None,
            year: None,
        })
    }

    async fn fetch_audio(&self, _track: &Track) -> Result<MediaHandle, PlaybackError> {
        self.stage(&self.audio_calls, FailStage::Audio).await?;
        Ok(self.store.cache(Bytes::from_static(b"audio-bytes")))
    }

    async fn fetch_cover(&self, _track: &Track) -> Result<MediaHandle, PlaybackError> {
        self.stage(&self.cover_calls, FailStage::Cover).await?;
        Ok(self.store.cache(Bytes::from_static(b"cover-bytes")))
    }

    async fn fetch_lyrics(&self, _track: &Track) -> Result<Option<Lyrics>, PlaybackError> {
        self.stage(&self.lyrics_calls, FailStage::Lyrics).await?;
        Ok(self.with_lyrics.then(|| Lyrics {
            source: Some("https://lyrics.example.com/1".to_string()),
            html: "Line one<br>Line two".to_string(),
        }))
    }
}

/// Fake audio element tracking loads, state, and position.
pub struct FakeAudio {
    state: Mutex<AudioState>,
    position: Mutex<Duration>,
    duration: Mutex<Option<Duration>>,
    pub loads: AtomicUsize,
}

impl FakeAudio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(AudioState::Idle),
            position: Mutex::new(Duration::ZERO),
            duration: Mutex::new(None),
            loads: AtomicUsize::new(0),
        })
    }

    /// Simulate playback progress.
    pub fn set_position(&self, position: Duration) {
        *self.position.lock().unwrap() = position;
    }

    /// Simulate natural end-of-media.
    pub fn finish_track(&self) {
        *self.state.lock().unwrap() = AudioState::Completed;
    }
}

#[async_trait]
impl AudioOutput for FakeAudio {
    async fn load(&self, _source: AudioSource) -> BridgeResult<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = AudioState::Playing;
        *self.position.lock().unwrap() = Duration::ZERO;
        *self.duration.lock().unwrap() = Some(Duration::from_secs(180));
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        *self.state.lock().unwrap() = AudioState::Playing;
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        *self.state.lock().unwrap() = AudioState::Paused;
        Ok(())
    }

    async fn seek(&self, position: Duration) -> BridgeResult<()> {
        *self.position.lock().unwrap() = position;
        Ok(())
    }

    fn state(&self) -> AudioState {
        *self.state.lock().unwrap()
    }

    fn position(&self) -> Duration {
        *self.position.lock().unwrap()
    }

    fn duration(&self) -> Option<Duration> {
        *self.duration.lock().unwrap()
    }
}

/// Poll until `predicate` holds, panicking after a generous timeout.
/// Under `start_paused` runtimes the waiting is virtual.
pub async fn wait_until(mut predicate: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(300), async {
        while !predicate() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
