//! Pending-track queue
//!
//! Ordered list of tracks waiting to play after the current one.
//! Insertion order is meaningful; the only uniqueness rule is that
//! `push` is idempotent by track id.

use aria_core::Track;
use rand::rngs::StdRng;
use rand::Rng;

/// Ordered pending-track list
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,
}

impl Queue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Append a track unless one with the same id is already queued
    ///
    /// Returns `true` if the queue changed. Duplicates are a silent
    /// no-op, not an error.
    pub fn push(&mut self, track: Track) -> bool {
        if self.contains_id(&track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Put a track at the front of the queue (used when "previous"
    /// displaces the current track)
    pub fn push_front(&mut self, track: Track) {
        self.tracks.retain(|t| t.id != track.id);
        self.tracks.insert(0, track);
    }

    /// Replace the whole queue
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    /// Remove the track at `index`; no-op if out of range
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        Some(self.tracks.remove(index))
    }

    /// Take the next track to play
    ///
    /// Index 0 normally; a uniformly random index when `shuffle` is on
    /// and more than one track is queued.
    pub fn take_next(&mut self, shuffle: bool, rng: &mut StdRng) -> Option<Track> {
        if self.tracks.is_empty() {
            return None;
        }
        let index = if shuffle && self.tracks.len() > 1 {
            rng.gen_range(0..self.tracks.len())
        } else {
            0
        };
        Some(self.tracks.remove(index))
    }

    /// Check whether a track id is already queued
    pub fn contains_id(&self, id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == id)
    }

    /// Append tracks at the back (each idempotent by id)
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) {
        for track in tracks {
            self.push(track);
        }
    }

    /// Number of queued tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the queue is empty
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Snapshot of the queued tracks in order
    pub fn snapshot(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    /// Drop all queued tracks
    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
