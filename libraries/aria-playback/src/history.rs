//! Playback history tracking
//!
//! Maintains a bounded in-memory history of played tracks for "previous"
//! navigation and repeat-all replay. Distinct from the longer-lived play
//! log the UI persists through the preference store.

use aria_core::Track;
use std::collections::VecDeque;

/// Playback history with bounded size
///
/// Most recent entry at the back; when full, the oldest entry is
/// discarded first (FIFO eviction).
#[derive(Debug, Clone)]
pub struct History {
    tracks: VecDeque<Track>,
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Add a track to history, deduplicated by id
    ///
    /// An older entry with the same id is dropped so the track only
    /// appears once, at its most recent position.
    pub fn push(&mut self, track: Track) {
        self.tracks.retain(|t| t.id != track.id);
        if self.tracks.len() >= self.max_size {
            self.tracks.pop_front(); // Remove oldest
        }
        self.tracks.push_back(track);
    }

    /// Pop the most recent track (for "previous")
    pub fn pop(&mut self) -> Option<Track> {
        self.tracks.pop_back()
    }

    /// Drain all entries oldest-first (for repeat-all replay)
    pub fn drain_oldest_first(&mut self) -> Vec<Track> {
        self.tracks.drain(..).collect()
    }

    /// Snapshot of the history, oldest first
    pub fn snapshot(&self) -> Vec<Track> {
        self.tracks.iter().cloned().collect()
    }

    /// Number of tracks in history
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
