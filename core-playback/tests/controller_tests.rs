//! Integration tests for the player controller state machine.

mod common;

use bridge_traits::audio::AudioOutput;
use common::{wait_until, FailStage, FakeAudio, ScriptedSource};
use core_playback::{
    LyricsRender, MediaRef, MediaStore, PlaybackQueue, PlayerController, QueueConfig,
};
use core_runtime::events::{CoreEvent, EventBus, EventStream, PlayerEvent};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct Harness {
    store: Arc<MediaStore>,
    source: Arc<ScriptedSource>,
    audio: Arc<FakeAudio>,
    queue: Arc<PlaybackQueue>,
    controller: Arc<PlayerController>,
    events: EventBus,
}

fn harness(max_size: usize) -> Harness {
    let store = MediaStore::new();
    let source = ScriptedSource::new(store.clone());
    let audio = FakeAudio::new();
    let events = EventBus::new(64);
    let queue = PlaybackQueue::new(source.clone(), QueueConfig {
        max_size,
        ..QueueConfig::default()
    }, events.clone())
    .unwrap();
    let controller = PlayerController::new(audio.clone(), queue.clone(), events.clone());

    Harness {
        store,
        source,
        audio,
        queue,
        controller,
        events,
    }
}

#[tokio::test(start_paused = true)]
async fn test_advance_loads_head_and_exposes_render_data() {
    let h = harness(2);
    let mut event_rx = h.events.subscribe();

    h.queue.request_fill();
    wait_until(|| h.queue.len() == 2).await;

    let head_path = h.queue.snapshot()[0].path.clone();
    assert!(h.controller.advance().await.unwrap());
    assert!(h.controller.is_loaded());
    assert_eq!(h.audio.loads.load(Ordering::SeqCst), 1);

    let now_playing = h.controller.now_playing().unwrap();
    assert_eq!(now_playing.path, head_path);
    assert!(now_playing.previous.is_none());
    assert!(matches!(now_playing.cover, MediaRef::Bytes(_)));
    assert!(matches!(now_playing.lyrics, LyricsRender::Html { .. }));
    assert_eq!(now_playing.duration_secs, 180);

    let mut saw_track_changed = false;
    while let Ok(event) = event_rx.try_recv() {
        if let CoreEvent::Player(PlayerEvent::TrackChanged { path, .. }) = event {
            assert_eq!(path, head_path);
            saw_track_changed = true;
        }
    }
    assert!(saw_track_changed);

    h.queue.close();
}

#[tokio::test(start_paused = true)]
async fn test_missing_lyrics_render_as_not_found() {
    let store = MediaStore::new();
    let source = common::ScriptedSource::without_lyrics(store.clone());
    let events = EventBus::new(64);
    let queue = PlaybackQueue::new(source, QueueConfig::default(), events.clone()).unwrap();
    let controller = PlayerController::new(FakeAudio::new(), queue.clone(), events);

    queue.request_fill();
    wait_until(|| !queue.is_empty()).await;
    controller.advance().await.unwrap();

    // The host turns this into its "no lyrics" placeholder.
    assert_eq!(
        controller.now_playing().unwrap().lyrics,
        LyricsRender::NotFound
    );

    queue.close();
}

#[tokio::test(start_paused = true)]
async fn test_advance_with_empty_queue_goes_idle() {
    let h = harness(2);
    h.source.fail_at(Some(FailStage::Choose));
    let mut event_rx = h.events.subscribe();

    assert!(!h.controller.advance().await.unwrap());
    assert!(!h.controller.is_loaded());
    assert!(h.controller.now_playing().is_none());

    let mut saw_queue_empty = false;
    while let Ok(event) = event_rx.try_recv() {
        if matches!(event, CoreEvent::Player(PlayerEvent::QueueEmpty)) {
            saw_queue_empty = true;
        }
    }
    assert!(saw_queue_empty);

    h.queue.close();
}

#[tokio::test(start_paused = true)]
async fn test_skip_replaces_track_and_releases_old_handles() {
    let h = harness(3);

    h.queue.request_fill();
    wait_until(|| h.queue.len() == 3).await;

    assert!(h.controller.advance().await.unwrap());
    let first_display = h.controller.now_playing().unwrap().current;
    let released_before = h.store.released();

    assert!(h.controller.skip().await.unwrap());
    assert_eq!(h.audio.loads.load(Ordering::SeqCst), 2);

    let now_playing = h.controller.now_playing().unwrap();
    assert_eq!(now_playing.previous.as_deref(), Some(first_display.as_str()));

    // The replaced entry's audio and cover handles were released.
    assert_eq!(h.store.released(), released_before + 2);

    h.queue.close();
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_advances_on_natural_end() {
    let h = harness(3);
    h.queue.request_fill();
    wait_until(|| h.queue.len() == 3).await;

    let cancel = CancellationToken::new();
    let run = tokio::spawn(h.controller.clone().run(cancel.clone()));

    // The loop picks up the first track on its own.
    wait_until(|| h.audio.loads.load(Ordering::SeqCst) == 1).await;

    // Natural end-of-media triggers the same transition as a skip.
    h.audio.finish_track();
    wait_until(|| h.audio.loads.load(Ordering::SeqCst) == 2).await;
    assert!(h.controller.now_playing().unwrap().previous.is_some());

    cancel.cancel();
    run.await.unwrap();
    h.queue.close();
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_retries_while_queue_empty() {
    let h = harness(2);
    h.source.fail_at(Some(FailStage::Choose));

    let cancel = CancellationToken::new();
    let run = tokio::spawn(h.controller.clone().run(cancel.clone()));

    // Idle retries keep polling the empty queue without loading anything.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(h.audio.loads.load(Ordering::SeqCst), 0);

    // Once fetches succeed again, the loop recovers by itself.
    h.source.fail_at(None);
    wait_until(|| h.audio.loads.load(Ordering::SeqCst) == 1).await;
    assert!(h.controller.is_loaded());

    cancel.cancel();
    run.await.unwrap();
    h.queue.close();
}

#[tokio::test(start_paused = true)]
async fn test_seek_applies_only_within_bounds() {
    let h = harness(2);
    h.queue.request_fill();
    wait_until(|| h.queue.len() == 2).await;
    h.controller.advance().await.unwrap();

    // Loaded track: duration 180s, position 100s.
    h.audio.set_position(Duration::from_secs(100));

    h.controller.seek(5).await.unwrap();
    assert_eq!(h.audio.position(), Duration::from_secs(105));

    // Forward past the end: rejected.
    h.controller.seek(1000).await.unwrap();
    assert_eq!(h.audio.position(), Duration::from_secs(105));

    // Backward past the start: rejected.
    h.controller.seek(-1000).await.unwrap();
    assert_eq!(h.audio.position(), Duration::from_secs(105));

    h.controller.seek(-30).await.unwrap();
    assert_eq!(h.audio.position(), Duration::from_secs(75));

    h.queue.close();
}

#[tokio::test(start_paused = true)]
async fn test_transport_is_noop_while_idle() {
    let h = harness(2);
    h.source.fail_at(Some(FailStage::Choose));

    // None of these may fail or touch the audio element while idle.
    h.controller.play().await.unwrap();
    h.controller.pause().await.unwrap();
    h.controller.seek(30).await.unwrap();

    assert_eq!(h.audio.loads.load(Ordering::SeqCst), 0);
    assert_eq!(h.audio.position(), Duration::ZERO);

    h.queue.close();
}

#[tokio::test(start_paused = true)]
async fn test_pause_and_resume_emit_events() {
    let h = harness(2);
    h.queue.request_fill();
    wait_until(|| h.queue.len() == 2).await;
    h.controller.advance().await.unwrap();

    // Background refills may interleave queue events; follow player events only.
    let mut player_events = EventStream::new(h.events.subscribe())
        .filter(|event| matches!(event, CoreEvent::Player(_)));

    h.controller.pause().await.unwrap();
    h.controller.play().await.unwrap();

    assert_eq!(
        player_events.recv().await.unwrap(),
        CoreEvent::Player(PlayerEvent::Paused)
    );
    assert_eq!(
        player_events.recv().await.unwrap(),
        CoreEvent::Player(PlayerEvent::Resumed)
    );

    h.queue.close();
}
