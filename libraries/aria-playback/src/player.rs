//! Player facade
//!
//! The single object a UI layer drives. Commands mutate the session
//! (queue/history/modes) and the engine (backend control); an internal
//! pump task reacts to engine events to advance the queue, auto-skip
//! failed loads, and nudge auto-continuation. State is observed through
//! the engine's `watch` channel and the shared `broadcast` event stream.

use crate::engine::PlayerEngine;
use crate::error::{PlayerError, Result};
use crate::events::PlaybackEvent;
use crate::radio::RadioController;
use crate::session::{AdvanceDecision, PreviousDecision, Session};
use crate::types::{PlaybackState, PlayerConfig, RepeatMode};
use aria_core::{PreferenceStore, StreamResolver, Track};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Preference key the play log is stored under
const PLAY_LOG_KEY: &str = "playback.history";
/// Maximum entries retained in the persisted play log
const PLAY_LOG_CAP: usize = 500;

struct PlayerInner {
    engine: PlayerEngine,
    resolver: Arc<dyn StreamResolver>,
    session: Mutex<Session>,
    radio: RadioController,
    preferences: StdMutex<Option<Arc<dyn PreferenceStore>>>,
    events_tx: broadcast::Sender<PlaybackEvent>,
    config: PlayerConfig,
}

/// Playback facade over engine, session, and auto-continuation
pub struct Player {
    inner: Arc<PlayerInner>,
    pump: StdMutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Build a player over a media backend and a stream resolver
    pub fn new(
        backend: Arc<dyn crate::backend::MediaBackend>,
        resolver: Arc<dyn StreamResolver>,
        config: PlayerConfig,
    ) -> Self {
        let (events_tx, events_rx) = broadcast::channel(128);
        let engine = PlayerEngine::new(backend, events_tx.clone(), &config);
        let radio = RadioController::new(
            Arc::clone(&resolver),
            config.radio_enabled,
            config.refill_batch,
            config.min_song_duration,
            config.max_song_duration,
            config.related_cache_capacity,
            config.related_cache_ttl,
        );
        let inner = Arc::new(PlayerInner {
            engine,
            resolver,
            session: Mutex::new(Session::new(&config)),
            radio,
            preferences: StdMutex::new(None),
            events_tx,
            config,
        });

        let pump = tokio::spawn(Self::pump(Arc::clone(&inner), events_rx));
        Self {
            inner,
            pump: StdMutex::new(Some(pump)),
        }
    }

    /// Attach a preference store the player logs finished plays to
    pub fn attach_preferences(&self, store: Arc<dyn PreferenceStore>) {
        *self
            .inner
            .preferences
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(store);
    }

    // ===== Commands =====

    /// Play a single track immediately, leaving the queue untouched
    pub async fn play_track(&self, track: Track) -> Result<()> {
        {
            let mut session = self.inner.session.lock().await;
            session.play_track(track.clone());
        }
        self.load_with_skip(track).await
    }

    /// Replace the queue with a track list and start at `start_index`
    pub async fn play_all(&self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        let first = {
            let mut session = self.inner.session.lock().await;
            let first = session.play_all(tracks, start_index);
            if first.is_some() {
                self.emit_queue_changed(session.queue_len());
            }
            first
        };
        match first {
            Some(track) => self.load_with_skip(track).await,
            None => Ok(()),
        }
    }

    /// Append a track to the queue; duplicates by id are ignored
    pub async fn add_to_queue(&self, track: Track) {
        let mut session = self.inner.session.lock().await;
        if let Some(len) = session.add_to_queue(track) {
            self.emit_queue_changed(len);
        }
    }

    /// Remove the queued track at `index`; no-op if out of range
    pub async fn remove_from_queue(&self, index: usize) {
        let mut session = self.inner.session.lock().await;
        if session.remove_from_queue(index).is_some() {
            self.emit_queue_changed(session.queue_len());
        }
    }

    /// Drop all queued tracks
    pub async fn clear_queue(&self) {
        let mut session = self.inner.session.lock().await;
        session.clear_queue();
        self.emit_queue_changed(0);
    }

    /// Skip to the next track (manual skip; repeat-one does not apply)
    pub async fn next(&self) -> Result<()> {
        let decision = {
            let mut session = self.inner.session.lock().await;
            let decision = session.advance(false);
            if matches!(decision, AdvanceDecision::Play(_)) {
                self.emit_queue_changed(session.queue_len());
            }
            decision
        };
        match decision {
            AdvanceDecision::Play(track) | AdvanceDecision::Restart(track) => {
                self.load_with_skip(track).await
            }
            AdvanceDecision::Stop => {
                self.inner.engine.halt().await;
                Ok(())
            }
        }
    }

    /// Go back: restart the current track when deep into it, otherwise
    /// play the most recent history entry
    pub async fn previous(&self) -> Result<()> {
        let position = self.inner.engine.state().position;
        let decision = {
            let mut session = self.inner.session.lock().await;
            let decision = session.previous(position);
            if matches!(decision, PreviousDecision::Play(_)) {
                self.emit_queue_changed(session.queue_len());
            }
            decision
        };
        match decision {
            PreviousDecision::RestartCurrent => {
                self.inner.engine.seek(std::time::Duration::ZERO).await?;
                self.inner.engine.play().await
            }
            PreviousDecision::Play(track) => self.load_with_skip(track).await,
            PreviousDecision::Nothing => Ok(()),
        }
    }

    /// Resume playback; no-op with nothing loaded
    pub async fn play(&self) -> Result<()> {
        self.inner.engine.play().await
    }

    /// Pause playback; no-op with nothing loaded
    pub async fn pause(&self) -> Result<()> {
        self.inner.engine.pause().await
    }

    /// Seek within the current track
    pub async fn seek(&self, position: std::time::Duration) -> Result<()> {
        self.inner.engine.seek(position).await
    }

    /// Set the volume; values clamp to `[0, 1]`
    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.inner.engine.set_volume(volume).await
    }

    /// Flip shuffle; effective on the next advance
    pub async fn toggle_shuffle(&self) -> bool {
        self.inner.session.lock().await.toggle_shuffle()
    }

    /// Cycle repeat off → one → all → off
    pub async fn cycle_repeat(&self) -> RepeatMode {
        self.inner.session.lock().await.cycle_repeat()
    }

    /// Turn auto-continuation on or off
    pub fn set_radio_enabled(&self, enabled: bool) {
        self.inner.radio.set_enabled(enabled);
    }

    /// Whether auto-continuation is on
    pub fn radio_enabled(&self) -> bool {
        self.inner.radio.is_enabled()
    }

    /// Current shuffle flag
    pub async fn shuffle(&self) -> bool {
        self.inner.session.lock().await.shuffle()
    }

    /// Current repeat mode
    pub async fn repeat(&self) -> RepeatMode {
        self.inner.session.lock().await.repeat()
    }

    // ===== Observation =====

    /// Snapshot of the published playback state
    pub fn state(&self) -> PlaybackState {
        self.inner.engine.state()
    }

    /// Watch channel of playback state snapshots
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.inner.engine.subscribe()
    }

    /// Broadcast stream of playback events
    pub fn events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Snapshot of the queue in play order
    pub async fn queue(&self) -> Vec<Track> {
        self.inner.session.lock().await.queue_snapshot()
    }

    /// Snapshot of the history, oldest first
    pub async fn history(&self) -> Vec<Track> {
        self.inner.session.lock().await.history_snapshot()
    }

    /// Stop playback and the event pump
    pub async fn shutdown(&self) {
        self.inner.engine.halt().await;
        if let Some(pump) = self
            .pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pump.abort();
        }
    }

    // ===== Internals =====

    fn emit_queue_changed(&self, length: usize) {
        let _ = self
            .inner
            .events_tx
            .send(PlaybackEvent::QueueChanged { length });
    }

    /// Load a track, skipping forward through the queue on load errors
    ///
    /// Bounded by one pass over the queue so a fully-broken queue cannot
    /// loop. When every candidate fails the engine halts and the last
    /// error surfaces as [`PlayerError::NothingPlayable`].
    async fn load_with_skip(&self, track: Track) -> Result<()> {
        PlayerInner::load_with_skip(&self.inner, track).await
    }

    async fn pump(inner: Arc<PlayerInner>, mut events_rx: broadcast::Receiver<PlaybackEvent>) {
        loop {
            let event = match events_rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "event pump lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                PlaybackEvent::TrackChanged { track_id, .. } => {
                    inner.record_play(&track_id).await;
                }
                PlaybackEvent::TrackFinished { .. } => {
                    PlayerInner::handle_track_finished(&inner).await;
                }
                PlaybackEvent::Error { track_id, message } => {
                    PlayerInner::handle_playback_error(&inner, track_id, message).await;
                }
                PlaybackEvent::QueueChanged { .. } | PlaybackEvent::PositionUpdate { .. } => {
                    PlayerInner::radio_nudge(&inner).await;
                }
                _ => {}
            }
        }
    }
}

impl PlayerInner {
    async fn load_with_skip(inner: &Arc<Self>, track: Track) -> Result<()> {
        // One attempt per queued track plus the one in hand
        let mut budget = inner.session.lock().await.queue_len() + 1;
        let mut candidate = track;
        loop {
            let handle = inner.resolver.playable_handle(&candidate.id);
            match inner.engine.load_track(candidate.clone(), handle).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(track_id = %candidate.id, error = %err, "track failed to load, skipping");
                    budget -= 1;
                    if budget == 0 {
                        inner.engine.halt().await;
                        return Err(PlayerError::NothingPlayable);
                    }
                    let next = inner.session.lock().await.skip_after_error();
                    match next {
                        Some(next) => candidate = next,
                        None => {
                            inner.engine.halt().await;
                            return Err(PlayerError::NothingPlayable);
                        }
                    }
                }
            }
        }
    }

    /// A track ended naturally: advance per the repeat/shuffle modes
    async fn handle_track_finished(inner: &Arc<Self>) {
        let decision = {
            let mut session = inner.session.lock().await;
            let decision = session.advance(true);
            if matches!(decision, AdvanceDecision::Play(_)) {
                let _ = inner.events_tx.send(PlaybackEvent::QueueChanged {
                    length: session.queue_len(),
                });
            }
            decision
        };
        match decision {
            AdvanceDecision::Play(track) | AdvanceDecision::Restart(track) => {
                if let Err(err) = Self::load_with_skip(inner, track).await {
                    warn!(error = %err, "advance after track end failed");
                }
            }
            AdvanceDecision::Stop => {
                debug!("queue exhausted, settling to stopped");
                inner.engine.halt().await;
                // Continuation may restart playback from here
                Self::radio_nudge(inner).await;
            }
        }
    }

    /// The resource failed mid-play: try the next queued track once
    async fn handle_playback_error(inner: &Arc<Self>, track_id: Option<String>, message: String) {
        warn!(track_id = ?track_id, message = %message, "playback resource failed");
        let next = inner.session.lock().await.skip_after_error();
        match next {
            Some(track) => {
                if let Err(err) = Self::load_with_skip(inner, track).await {
                    warn!(error = %err, "recovery after playback error failed");
                }
            }
            None => inner.engine.halt().await,
        }
    }

    /// Keep the queue alive: refill when it runs low, or start a fresh
    /// continuation after playback ended with nothing left
    async fn radio_nudge(inner: &Arc<Self>) {
        if !inner.radio.is_enabled() {
            return;
        }

        let (seed, queue_len, exclude) = {
            let session = inner.session.lock().await;
            match session.current_id() {
                Some(seed) => (seed, session.queue_len(), session.exclude_ids()),
                None => return,
            }
        };
        let state = inner.engine.state();

        // Ended continuation first: queue dry, playback settled at the
        // very end of the track
        let at_end = state.duration > std::time::Duration::ZERO
            && state.duration.saturating_sub(state.position) <= inner.config.ended_epsilon
            && state.position.saturating_sub(state.duration) <= inner.config.ended_epsilon;
        if queue_len == 0 && !state.is_playing && at_end {
            if let Some(tracks) = inner.radio.fetch_continuation(&seed, &exclude).await {
                let first = {
                    let mut session = inner.session.lock().await;
                    let first = session.play_all(tracks, 0);
                    let _ = inner.events_tx.send(PlaybackEvent::QueueChanged {
                        length: session.queue_len(),
                    });
                    first
                };
                if let Some(track) = first {
                    debug!(track_id = %track.id, "continuation restarting playback");
                    if let Err(err) = Self::load_with_skip(inner, track).await {
                        warn!(error = %err, "continuation failed to start");
                    }
                }
            }
            return;
        }

        if queue_len >= inner.config.refill_threshold {
            return;
        }
        if let Some(tracks) = inner.radio.fetch_refill(&seed, queue_len, &exclude).await {
            let mut session = inner.session.lock().await;
            let mut added = 0;
            for track in tracks {
                if session.add_to_queue(track).is_some() {
                    added += 1;
                }
            }
            if added > 0 {
                debug!(added, "auto-continuation refilled the queue");
                let _ = inner.events_tx.send(PlaybackEvent::QueueChanged {
                    length: session.queue_len(),
                });
            }
        }
    }

    /// Append a track start to the persisted play log, capped FIFO
    async fn record_play(&self, track_id: &str) {
        let store = {
            let guard = self
                .preferences
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            guard.clone()
        };
        let Some(store) = store else { return };

        let track = {
            let session = self.session.lock().await;
            session
                .history_snapshot()
                .into_iter()
                .chain(session.queue_snapshot())
                .find(|t| t.id == track_id)
        };
        let state_track = self.state_track();
        let track = track.or(state_track);

        let entry = match &track {
            Some(t) => json!({
                "id": t.id,
                "title": t.title,
                "author": t.author,
                "played_at_ms": Utc::now().timestamp_millis(),
            }),
            None => json!({
                "id": track_id,
                "played_at_ms": Utc::now().timestamp_millis(),
            }),
        };

        let mut log = match store.get(PLAY_LOG_KEY).await {
            Ok(Some(Value::Array(entries))) => entries,
            Ok(_) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed to read play log, starting fresh");
                Vec::new()
            }
        };
        log.push(entry);
        if log.len() > PLAY_LOG_CAP {
            let excess = log.len() - PLAY_LOG_CAP;
            log.drain(..excess);
        }
        if let Err(err) = store.set(PLAY_LOG_KEY, Value::Array(log)).await {
            warn!(error = %err, "failed to persist play log");
        }
    }

    fn state_track(&self) -> Option<Track> {
        self.engine.state().current_track
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Some(pump) = self
            .pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pump.abort();
        }
    }
}
