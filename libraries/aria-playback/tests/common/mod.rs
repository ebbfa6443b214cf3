//! Shared doubles for the end-to-end player tests

use aria_core::{CoreError, PlayableHandle, StreamResolver, Track};
use aria_playback::types::PlayerConfig;
use aria_playback::{BackendStatus, MediaBackend, PlayerError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// What the scripted backend does when asked to load a given track id
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum LoadBehavior {
    Succeed,
    Fail,
    /// Never resolve; the engine's load timeout has to fire
    Hang,
}

#[derive(Default)]
struct BackendState {
    loaded: Option<String>,
    status: Option<BackendStatus>,
    position: Duration,
    duration: Duration,
    volume: f32,
}

/// In-memory media backend driven by the test script
pub struct ScriptedBackend {
    state: Mutex<BackendState>,
    behaviors: Mutex<HashMap<String, LoadBehavior>>,
    load_counts: Mutex<HashMap<String, usize>>,
    track_duration: Duration,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(BackendState::default()),
            behaviors: Mutex::new(HashMap::new()),
            load_counts: Mutex::new(HashMap::new()),
            track_duration: Duration::from_secs(180),
        })
    }

    pub fn set_behavior(&self, id: &str, behavior: LoadBehavior) {
        self.behaviors.lock().unwrap().insert(id.to_string(), behavior);
    }

    pub fn loaded(&self) -> Option<String> {
        self.state.lock().unwrap().loaded.clone()
    }

    pub fn load_count(&self, id: &str) -> usize {
        self.load_counts.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn last_seek(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    /// Simulate playback progress
    pub fn set_position(&self, position: Duration) {
        self.state.lock().unwrap().position = position;
    }

    /// Simulate the track reaching its natural end
    pub fn finish_current(&self) {
        let mut state = self.state.lock().unwrap();
        state.position = state.duration;
        state.status = Some(BackendStatus::Ended);
    }

    /// Simulate a mid-play resource failure
    pub fn fail_current(&self) {
        self.state.lock().unwrap().status = Some(BackendStatus::Failed);
    }

    fn handle_id(handle: &PlayableHandle) -> String {
        match handle {
            PlayableHandle::Embedded(id) => id.clone(),
            PlayableHandle::Url(url) => url.clone(),
        }
    }
}

#[async_trait]
impl MediaBackend for ScriptedBackend {
    async fn load(&self, handle: &PlayableHandle) -> aria_playback::Result<()> {
        let id = Self::handle_id(handle);
        *self.load_counts.lock().unwrap().entry(id.clone()).or_insert(0) += 1;

        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or(LoadBehavior::Succeed);
        match behavior {
            LoadBehavior::Succeed => {
                let mut state = self.state.lock().unwrap();
                state.loaded = Some(id);
                state.status = Some(BackendStatus::Playing);
                state.position = Duration::ZERO;
                state.duration = self.track_duration;
                Ok(())
            }
            LoadBehavior::Fail => Err(PlayerError::Backend(format!("cannot load {id}"))),
            LoadBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    async fn play(&self) -> aria_playback::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.loaded.is_some() {
            state.status = Some(BackendStatus::Playing);
        }
        Ok(())
    }

    async fn pause(&self) -> aria_playback::Result<()> {
        let mut state = self.state.lock().unwrap();
        if matches!(state.status, Some(BackendStatus::Playing)) {
            state.status = Some(BackendStatus::Paused);
        }
        Ok(())
    }

    async fn seek(&self, position: Duration) -> aria_playback::Result<()> {
        self.state.lock().unwrap().position = position;
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> aria_playback::Result<()> {
        self.state.lock().unwrap().volume = volume;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn duration(&self) -> Duration {
        self.state.lock().unwrap().duration
    }

    fn status(&self) -> BackendStatus {
        self.state.lock().unwrap().status.unwrap_or(BackendStatus::Idle)
    }
}

/// Resolver double with a scripted related-tracks table
pub struct MockResolver {
    related: Mutex<HashMap<String, Vec<Track>>>,
    related_calls: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            related: Mutex::new(HashMap::new()),
            related_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_related(&self, seed_id: &str, tracks: Vec<Track>) {
        self.related.lock().unwrap().insert(seed_id.to_string(), tracks);
    }

    pub fn related_calls(&self) -> usize {
        self.related_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamResolver for MockResolver {
    async fn search_tracks(&self, _query: &str) -> aria_core::Result<Vec<Track>> {
        Ok(Vec::new())
    }

    async fn related_tracks(&self, track_id: &str) -> aria_core::Result<Vec<Track>> {
        self.related_calls.fetch_add(1, Ordering::SeqCst);
        match self.related.lock().unwrap().get(track_id) {
            Some(tracks) => Ok(tracks.clone()),
            None => Err(CoreError::fetch("no related tracks scripted")),
        }
    }

    fn playable_handle(&self, track_id: &str) -> PlayableHandle {
        PlayableHandle::Embedded(track_id.to_string())
    }

    async fn download_audio_url(&self, track_id: &str) -> aria_core::Result<String> {
        Ok(format!("https://audio.example/{track_id}"))
    }
}

/// In-memory preference store
pub struct MemoryPrefs {
    values: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryPrefs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            values: Mutex::new(HashMap::new()),
        })
    }

    pub fn value(&self, key: &str) -> Option<serde_json::Value> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl aria_core::PreferenceStore for MemoryPrefs {
    async fn get(&self, key: &str) -> aria_core::Result<Option<serde_json::Value>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> aria_core::Result<()> {
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

pub fn song(id: &str, title: &str) -> Track {
    Track::new(id, title, "Test Artist", Duration::from_secs(180))
}

/// Configuration with intervals short enough for paused-clock tests
pub fn test_config() -> PlayerConfig {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
    PlayerConfig {
        tick_interval: Duration::from_millis(10),
        load_timeout: Duration::from_millis(200),
        related_cache_ttl: Duration::from_secs(3600),
        ..PlayerConfig::default()
    }
}

/// Poll a condition while the paused clock advances, panicking after a
/// bounded number of rounds
pub async fn wait_until<F: FnMut() -> bool>(what: &str, mut condition: F) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for: {what}");
}
