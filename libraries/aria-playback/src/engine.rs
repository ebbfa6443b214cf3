//! Playback engine
//!
//! Owns the single underlying media resource and translates its
//! observations into published playback state. Loading is bounded by a
//! timeout; a generation counter keeps callbacks from superseded loads
//! (identified by generation, not track id, since repeated plays of the
//! same id must stay distinguishable) from mutating current state.

use crate::backend::{BackendStatus, MediaBackend};
use crate::error::{PlayerError, Result};
use crate::events::PlaybackEvent;
use crate::types::{PlaybackState, PlayerConfig};
use aria_core::{PlayableHandle, Track};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Wraps the media backend and publishes [`PlaybackState`]
///
/// State flows one way: commands go to the backend, the periodic tick
/// polls the backend's confirmations and publishes them. `is_playing`
/// is therefore never flipped optimistically; seeks and volume changes
/// are (they are treated as immediate).
pub struct PlayerEngine {
    backend: Arc<dyn MediaBackend>,
    state_tx: watch::Sender<PlaybackState>,
    events_tx: broadcast::Sender<PlaybackEvent>,
    generation: Arc<AtomicU64>,
    tick_task: Mutex<Option<JoinHandle<()>>>,
    load_timeout: Duration,
    tick_interval: Duration,
}

impl PlayerEngine {
    /// Create an engine around a backend
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        events_tx: broadcast::Sender<PlaybackEvent>,
        config: &PlayerConfig,
    ) -> Self {
        let initial = PlaybackState {
            volume: config.volume.clamp(0.0, 1.0),
            ..PlaybackState::default()
        };
        let (state_tx, _) = watch::channel(initial);
        Self {
            backend,
            state_tx,
            events_tx,
            generation: Arc::new(AtomicU64::new(0)),
            tick_task: Mutex::new(None),
            load_timeout: config.load_timeout,
            tick_interval: config.tick_interval,
        }
    }

    /// Load a track and start playing it
    ///
    /// Tears down any existing media (late callbacks of a superseded load
    /// discard themselves), resets published time/duration, and resolves
    /// once the backend reports playback started. On timeout the resource
    /// is left inert for the caller to retry or skip.
    pub async fn load_track(&self, track: Track, handle: PlayableHandle) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.stop_tick();

        let previous_id = self
            .state_tx
            .borrow()
            .current_track
            .as_ref()
            .map(|t| t.id.clone());
        self.state_tx.send_modify(|state| {
            state.current_track = Some(track.clone());
            state.is_playing = false;
            state.position = Duration::ZERO;
            // Duration stays zero until the backend reports it; track
            // metadata can disagree with the actual media
            state.duration = Duration::ZERO;
        });
        let _ = self.events_tx.send(PlaybackEvent::TrackChanged {
            track_id: track.id.clone(),
            previous_track_id: previous_id,
        });
        debug!(track_id = %track.id, "loading track");

        match tokio::time::timeout(self.load_timeout, self.backend.load(&handle)).await {
            Ok(Ok(())) => {
                if self.generation.load(Ordering::SeqCst) != generation {
                    // Superseded while loading; a newer load owns the state now
                    return Ok(());
                }
                // The backend rebuilds its resource per load, so re-apply
                // the mirrored volume to keep the two in agreement
                let volume = self.state_tx.borrow().volume;
                if let Err(err) = self.backend.set_volume(volume).await {
                    warn!(error = %err, "volume sync after load failed");
                }
                let duration = self.backend.duration();
                let mut flipped = false;
                self.state_tx.send_modify(|state| {
                    flipped = !state.is_playing;
                    state.is_playing = true;
                    if duration > Duration::ZERO {
                        state.duration = duration;
                    }
                });
                if flipped {
                    let _ = self
                        .events_tx
                        .send(PlaybackEvent::StateChanged { playing: true });
                }
                self.spawn_tick(generation);
                Ok(())
            }
            Ok(Err(err)) => {
                if self.generation.load(Ordering::SeqCst) == generation {
                    self.reset_to_empty();
                }
                Err(PlayerError::Load {
                    track_id: track.id,
                    reason: err.to_string(),
                })
            }
            Err(_elapsed) => {
                if self.generation.load(Ordering::SeqCst) == generation {
                    // Inert: track stays shown, nothing plays
                    self.state_tx.send_modify(|state| state.is_playing = false);
                }
                Err(PlayerError::LoadTimeout { track_id: track.id })
            }
        }
    }

    /// Resume playback; no-op without a loaded track
    ///
    /// `is_playing` flips when the tick observes the backend's
    /// confirmation, not here.
    pub async fn play(&self) -> Result<()> {
        if self.state_tx.borrow().current_track.is_none() {
            return Ok(());
        }
        self.backend.play().await?;
        self.ensure_tick();
        Ok(())
    }

    /// Pause playback; no-op without a loaded track
    pub async fn pause(&self) -> Result<()> {
        if self.state_tx.borrow().current_track.is_none() {
            return Ok(());
        }
        self.backend.pause().await
    }

    /// Seek; the published position updates optimistically so the UI
    /// reflects the seek before the next tick
    pub async fn seek(&self, position: Duration) -> Result<()> {
        if self.state_tx.borrow().current_track.is_none() {
            return Ok(());
        }
        self.backend.seek(position).await?;
        self.state_tx.send_modify(|state| state.position = position);
        Ok(())
    }

    /// Set volume in `[0, 1]`; applied to state synchronously
    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        let volume = volume.clamp(0.0, 1.0);
        self.backend.set_volume(volume).await?;
        self.state_tx.send_modify(|state| state.volume = volume);
        let _ = self.events_tx.send(PlaybackEvent::VolumeChanged { volume });
        Ok(())
    }

    /// Settle to a determinate stopped state, keeping the current track
    pub async fn halt(&self) {
        self.stop_tick();
        let _ = self.backend.pause().await;
        let mut flipped = false;
        self.state_tx.send_modify(|state| {
            flipped = state.is_playing;
            state.is_playing = false;
        });
        if flipped {
            let _ = self
                .events_tx
                .send(PlaybackEvent::StateChanged { playing: false });
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> PlaybackState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state snapshots
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    fn reset_to_empty(&self) {
        self.state_tx.send_modify(|state| {
            let volume = state.volume;
            *state = PlaybackState {
                volume,
                ..PlaybackState::default()
            };
        });
    }

    fn stop_tick(&self) {
        let mut slot = self
            .tick_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.abort();
        }
    }

    /// Restart the tick for the current generation if it is not running
    /// (it exits on pause to avoid idle polling)
    fn ensure_tick(&self) {
        let running = self
            .tick_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished());
        if !running {
            self.spawn_tick(self.generation.load(Ordering::SeqCst));
        }
    }

    fn spawn_tick(&self, generation: u64) {
        let backend = Arc::clone(&self.backend);
        let state_tx = self.state_tx.clone();
        let events_tx = self.events_tx.clone();
        let shared_generation = Arc::clone(&self.generation);
        let period = self.tick_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if shared_generation.load(Ordering::SeqCst) != generation {
                    // A newer load owns the state; this tick is stale
                    break;
                }
                match backend.status() {
                    BackendStatus::Playing => {
                        let position = backend.position();
                        let duration = backend.duration();
                        let mut flipped = false;
                        state_tx.send_modify(|state| {
                            flipped = !state.is_playing;
                            state.is_playing = true;
                            state.position = position;
                            if duration > Duration::ZERO {
                                state.duration = duration;
                            }
                        });
                        if flipped {
                            let _ = events_tx.send(PlaybackEvent::StateChanged { playing: true });
                        }
                        let _ = events_tx.send(PlaybackEvent::PositionUpdate {
                            position_ms: position.as_millis() as u64,
                            duration_ms: duration.as_millis() as u64,
                        });
                    }
                    BackendStatus::Paused => {
                        let position = backend.position();
                        let mut flipped = false;
                        state_tx.send_modify(|state| {
                            flipped = state.is_playing;
                            state.is_playing = false;
                            state.position = position;
                        });
                        if flipped {
                            let _ = events_tx.send(PlaybackEvent::StateChanged { playing: false });
                        }
                        // Timer stops while paused; play() restarts it
                        break;
                    }
                    BackendStatus::Ended => {
                        let track_id = state_tx
                            .borrow()
                            .current_track
                            .as_ref()
                            .map(|t| t.id.clone());
                        state_tx.send_modify(|state| {
                            state.is_playing = false;
                            state.position = state.duration;
                        });
                        let _ = events_tx.send(PlaybackEvent::StateChanged { playing: false });
                        if let Some(track_id) = track_id {
                            let _ = events_tx.send(PlaybackEvent::TrackFinished { track_id });
                        }
                        break;
                    }
                    BackendStatus::Failed => {
                        let track_id = state_tx
                            .borrow()
                            .current_track
                            .as_ref()
                            .map(|t| t.id.clone());
                        state_tx.send_modify(|state| {
                            let volume = state.volume;
                            *state = PlaybackState {
                                volume,
                                ..PlaybackState::default()
                            };
                        });
                        let _ = events_tx.send(PlaybackEvent::Error {
                            track_id,
                            message: "playback resource failed".to_string(),
                        });
                        break;
                    }
                    BackendStatus::Idle => break,
                }
            }
        });

        let mut slot = self
            .tick_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = slot.replace(task) {
            old.abort();
        }
    }
}

impl Drop for PlayerEngine {
    fn drop(&mut self) {
        self.stop_tick();
    }
}
