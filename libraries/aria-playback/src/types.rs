//! Core types for playback management

use aria_core::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback state snapshot
///
/// Owned exclusively by the playback engine and mirrored read-only to
/// the rest of the system through a `watch` channel. Reset to zero
/// time/duration whenever a new track is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Track currently loaded (kept after a natural stop so the UI can
    /// keep showing "last played")
    pub current_track: Option<Track>,

    /// Whether the backend has confirmed it is playing
    pub is_playing: bool,

    /// Current playback position
    pub position: Duration,

    /// Duration of the loaded track (zero = unknown)
    pub duration: Duration,

    /// Volume in `[0, 1]`
    pub volume: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: 1.0,
        }
    }
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop when the queue ends
    Off,

    /// Loop the current track only
    One,

    /// Replay history when the queue ends
    All,
}

impl RepeatMode {
    /// Cycle off → one → all → off
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::One,
            RepeatMode::One => RepeatMode::All,
            RepeatMode::All => RepeatMode::Off,
        }
    }
}

/// Configuration for the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Maximum in-memory history size (default: 100)
    pub history_cap: usize,

    /// Initial volume in `[0, 1]` (default: 1.0)
    pub volume: f32,

    /// Initial shuffle flag (default: off)
    pub shuffle: bool,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Whether auto-continuation starts enabled (default: true)
    pub radio_enabled: bool,

    /// Queue length below which auto-continuation refills (default: 5)
    pub refill_threshold: usize,

    /// Maximum tracks appended per refill (default: 10)
    pub refill_batch: usize,

    /// Shortest plausible song accepted by auto-continuation (default: 60s)
    pub min_song_duration: Duration,

    /// Longest plausible song accepted by auto-continuation (default: 600s)
    pub max_song_duration: Duration,

    /// Track load timeout (default: 15s)
    pub load_timeout: Duration,

    /// Period of the engine's time-reporting tick (default: 250ms)
    pub tick_interval: Duration,

    /// How close position must be to duration for a stop to count as a
    /// natural end (default: 250ms)
    pub ended_epsilon: Duration,

    /// Capacity of the related-tracks result cache (default: 16)
    pub related_cache_capacity: usize,

    /// TTL of the related-tracks result cache (default: 300s)
    pub related_cache_ttl: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            history_cap: 100,
            volume: 1.0,
            shuffle: false,
            repeat: RepeatMode::Off,
            radio_enabled: true,
            refill_threshold: 5,
            refill_batch: 10,
            min_song_duration: Duration::from_secs(60),
            max_song_duration: Duration::from_secs(600),
            load_timeout: Duration::from_secs(15),
            tick_interval: Duration::from_millis(250),
            ended_epsilon: Duration::from_millis(250),
            related_cache_capacity: 16,
            related_cache_ttl: Duration::from_secs(300),
        }
    }
}
