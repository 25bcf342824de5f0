//! End-to-end wiring test: a routed fake server, fake audio element, and
//! in-memory settings behind the full service façade.

use async_trait::async_trait;
use bridge_traits::audio::{AudioOutput, AudioSource, AudioState};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::storage::SettingsStore;
use bytes::Bytes;
use core_library::search::SearchScope;
use core_runtime::config::CoreConfig;
use core_service::PlayerService;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ----------------------------------------------------------------------
// Fakes
// ----------------------------------------------------------------------

/// Answers the endpoint surface the service touches with canned JSON.
struct FakeServer {
    chosen: AtomicUsize,
}

impl FakeServer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            chosen: AtomicUsize::new(0),
        })
    }

    fn respond(&self, url: &str) -> (u16, Bytes) {
        let path = url
            .strip_prefix("https://music.example.com")
            .expect("unexpected host");

        if path.starts_with("/playlists/list") {
            return (
                200,
                Bytes::from_static(
                    br#"[{"name":"DK","track_count":2},{"name":"CB","track_count":1}]"#,
                ),
            );
        }

        if path.starts_with("/track/choose") {
            let n = self.chosen.fetch_add(1, Ordering::SeqCst);
            let body = format!(
                r#"{{"path":"default/track-{n}.mp3","playlist":"default","duration":300,
                     "tags":[],"title":"Track {n}","artists":["Artist"],"album":null,
                     "album_artist":null,"year":null}}"#
            );
            return (200, Bytes::from(body));
        }

        if path.starts_with("/track/filter") {
            let body = if path.contains("playlist=DK") {
                r#"{"tracks":[
                    {"path":"DK/song.mp3","playlist":"DK","duration":200,"tags":[],
                     "title":"My Song","artists":null,"album":null,"album_artist":null,"year":null},
                    {"path":"DK/other.mp3","playlist":"DK","duration":100,"tags":[],
                     "title":null,"artists":null,"album":null,"album_artist":null,"year":null}
                ]}"#
            } else {
                r#"{"tracks":[
                    {"path":"CB/tune.mp3","playlist":"CB","duration":150,"tags":[],
                     "title":null,"artists":null,"album":null,"album_artist":null,"year":null}
                ]}"#
            };
            return (200, Bytes::from_static(body.as_bytes()));
        }

        if path.starts_with("/track/audio") {
            return (200, Bytes::from_static(b"AUDIO-BYTES"));
        }

        if path.starts_with("/track/album_cover") {
            return (200, Bytes::from_static(b"COVER-BYTES"));
        }

        if path.starts_with("/track/lyrics") {
            return (200, Bytes::from_static(br#"{"found":false}"#));
        }

        if path.starts_with("/now_playing") || path.starts_with("/history_played") {
            return (200, Bytes::from_static(b"{}"));
        }

        (404, Bytes::new())
    }
}

#[async_trait]
impl HttpClient for FakeServer {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let (status, body) = self.respond(&request.url);
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body,
        })
    }

    async fn execute_stream(
        &self,
        request: HttpRequest,
    ) -> BridgeResult<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
        let (_, body) = self.respond(&request.url);
        Ok(Box::new(std::io::Cursor::new(body.to_vec())))
    }
}

struct FakeAudio {
    state: Mutex<AudioState>,
    pub loads: AtomicUsize,
}

impl FakeAudio {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(AudioState::Idle),
            loads: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AudioOutput for FakeAudio {
    async fn load(&self, _source: AudioSource) -> BridgeResult<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = AudioState::Playing;
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

    async fn seek(&self, _position: Duration) -> BridgeResult<()> {
        Ok(())
    }

    fn state(&self) -> AudioState {
        *self.state.lock().unwrap()
    }

    fn position(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn duration(&self) -> Option<Duration> {
        Some(Duration::from_secs(300))
    }
}

#[derive(Default)]
struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        Ok(self.values.lock().unwrap().keys().cloned().collect())
    }

    async fn clear_all(&self) -> BridgeResult<()> {
        self.values.lock().unwrap().clear();
        Ok(())
    }
}

async fn wait_until(mut predicate: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(300), async {
        while !predicate() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn service_config(audio: Arc<FakeAudio>) -> CoreConfig {
    CoreConfig::builder()
        .base_url("https://music.example.com")
        .csrf_token("csrf-token")
        .http_client(FakeServer::new())
        .settings_store(Arc::new(MemorySettings::default()))
        .audio_output(audio)
        .build()
        .unwrap()
}

// ----------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_service_fills_queue_and_starts_playback() {
    let audio = FakeAudio::new();
    let service = PlayerService::new(service_config(audio.clone()))
        .await
        .unwrap();

    service.start();

    // The queue prefetches to its default bound and the controller picks up
    // the first entry on its own.
    wait_until(|| service.queue().len() == 5).await;
    wait_until(|| audio.loads.load(Ordering::SeqCst) >= 1).await;
    assert!(service.controller().is_loaded());

    // Each queued entry owns an audio and a cover handle, plus the pair
    // held by the current track.
    wait_until(|| service.media_store().active() == 12).await;

    service.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_service_index_refresh_and_search() {
    let audio = FakeAudio::new();
    let service = PlayerService::new(service_config(audio)).await.unwrap();

    assert!(!service.index_ready());
    let count = service.refresh_track_index().await.unwrap();
    assert_eq!(count, 3);
    assert!(service.index_ready());

    let everyone = service.search(&SearchScope::Everyone, "");
    assert_eq!(everyone.matches.len(), 3);

    let hits = service.search(&SearchScope::Everyone, "song");
    assert_eq!(hits.matches[0].key, "song.mp3");

    let scoped = service.search(&SearchScope::Playlist("CB".to_string()), "");
    assert_eq!(scoped.matches.len(), 1);
    assert_eq!(scoped.matches[0].playlist, "CB");
}

#[tokio::test(start_paused = true)]
async fn test_service_queue_size_change_persists_and_applies() {
    let audio = FakeAudio::new();
    let service = PlayerService::new(service_config(audio)).await.unwrap();

    service.set_queue_size(2).await.unwrap();
    assert_eq!(service.queue().max_size(), 2);
    assert_eq!(service.settings().queue_size().await.unwrap(), 2);

    service.stop().await;
}
