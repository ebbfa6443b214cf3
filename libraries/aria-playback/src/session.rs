//! Queue & history manager
//!
//! Decides what plays next given the current mode flags, and maintains
//! the queue/history invariants. Pure state transitions: the facade
//! executes the returned decisions against the engine, so this module
//! never touches the backend and is trivially testable.

use crate::history::History;
use crate::queue::Queue;
use crate::types::{PlayerConfig, RepeatMode};
use aria_core::Track;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::time::Duration;

/// "Previous" within the first seconds goes back; after that it restarts
/// the current track from zero.
const PREVIOUS_RESTART_THRESHOLD: Duration = Duration::from_secs(3);

/// Outcome of an advance decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceDecision {
    /// Reload the same track from time zero (repeat-one)
    Restart(Track),

    /// Load and play this track
    Play(Track),

    /// Nothing left to play; settle to stopped, keep the current track
    Stop,
}

/// Outcome of a "previous" decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousDecision {
    /// Scrub the current track back to time zero
    RestartCurrent,

    /// Load and play this track from history
    Play(Track),

    /// Nothing loaded and no history
    Nothing,
}

/// Queue, history, and mode flags for one playback session
pub struct Session {
    queue: Queue,
    history: History,
    current: Option<Track>,
    shuffle: bool,
    repeat: RepeatMode,
    rng: StdRng,
}

impl Session {
    /// Create a session from the player configuration
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            queue: Queue::new(),
            history: History::new(config.history_cap),
            current: None,
            shuffle: config.shuffle,
            repeat: config.repeat,
            rng: StdRng::from_entropy(),
        }
    }

    #[cfg(test)]
    fn with_seed(config: &PlayerConfig, seed: u64) -> Self {
        let mut session = Self::new(config);
        session.rng = StdRng::seed_from_u64(seed);
        session
    }

    // ===== Commands =====

    /// Make `track` the current track, pushing any prior current track
    /// onto history. The queue is left untouched.
    pub fn play_track(&mut self, track: Track) -> Track {
        if let Some(previous) = self.current.replace(track.clone()) {
            self.history.push(previous);
        }
        track
    }

    /// Replace the queue with `tracks[start_index + 1..]` and return
    /// `tracks[start_index]` as the new current track
    ///
    /// Returns `None` (and leaves everything unchanged) when
    /// `start_index` is out of range.
    pub fn play_all(&mut self, mut tracks: Vec<Track>, start_index: usize) -> Option<Track> {
        if start_index >= tracks.len() {
            return None;
        }
        let rest = tracks.split_off(start_index + 1);
        let first = tracks.swap_remove(start_index);
        self.queue.replace(rest);
        Some(self.play_track(first))
    }

    /// Append to the queue unless the track duplicates the current track
    /// or an already-queued track (by id)
    ///
    /// Returns the new queue length when the queue changed.
    pub fn add_to_queue(&mut self, track: Track) -> Option<usize> {
        if self.current.as_ref().is_some_and(|c| c.id == track.id) {
            return None;
        }
        if self.queue.push(track) {
            Some(self.queue.len())
        } else {
            None
        }
    }

    /// Remove the queued track at `index`; no-op if out of range
    pub fn remove_from_queue(&mut self, index: usize) -> Option<Track> {
        self.queue.remove(index)
    }

    /// Drop all queued tracks
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// Decide what plays after the current track
    ///
    /// `natural` is true when the track ended on its own; repeat-one only
    /// applies then (a manual skip always moves on).
    pub fn advance(&mut self, natural: bool) -> AdvanceDecision {
        if natural && self.repeat == RepeatMode::One {
            if let Some(current) = self.current.clone() {
                return AdvanceDecision::Restart(current);
            }
        }

        if let Some(next) = self.queue.take_next(self.shuffle, &mut self.rng) {
            return AdvanceDecision::Play(self.play_track(next));
        }

        if self.repeat == RepeatMode::All {
            // Replay history oldest-first, then consume normally
            if let Some(current) = self.current.take() {
                self.history.push(current);
            }
            if !self.history.is_empty() {
                self.queue.extend(self.history.drain_oldest_first());
                if let Some(next) = self.queue.take_next(self.shuffle, &mut self.rng) {
                    return AdvanceDecision::Play(self.play_track(next));
                }
            }
        }

        AdvanceDecision::Stop
    }

    /// Decide what "previous" does at the given playback position
    ///
    /// More than a few seconds in, previous restarts the current track
    /// instead of going back. Otherwise the most recent history entry
    /// plays and the displaced current track returns to the queue front.
    pub fn previous(&mut self, position: Duration) -> PreviousDecision {
        if self.current.is_some() && position > PREVIOUS_RESTART_THRESHOLD {
            return PreviousDecision::RestartCurrent;
        }

        if let Some(prior) = self.history.pop() {
            if let Some(displaced) = self.current.replace(prior.clone()) {
                self.queue.push_front(displaced);
            }
            return PreviousDecision::Play(prior);
        }

        if self.current.is_some() {
            PreviousDecision::RestartCurrent
        } else {
            PreviousDecision::Nothing
        }
    }

    /// Replace the failing current track with the next queued one
    ///
    /// The failed track is dropped, not added to history (it never
    /// played).
    pub fn skip_after_error(&mut self) -> Option<Track> {
        let next = self.queue.take_next(self.shuffle, &mut self.rng)?;
        self.current = Some(next.clone());
        Some(next)
    }

    /// Flip the shuffle flag; effective on the next advance
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    /// Cycle the repeat mode off → one → all → off
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    // ===== Accessors =====

    /// Id of the current track, if any
    pub fn current_id(&self) -> Option<String> {
        self.current.as_ref().map(|t| t.id.clone())
    }

    /// Number of queued tracks
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Snapshot of the queue in order
    pub fn queue_snapshot(&self) -> Vec<Track> {
        self.queue.snapshot()
    }

    /// Snapshot of the history, oldest first
    pub fn history_snapshot(&self) -> Vec<Track> {
        self.history.snapshot()
    }

    /// Ids auto-continuation must not fetch again: the current track
    /// plus everything queued
    pub fn exclude_ids(&self) -> HashSet<String> {
        let mut ids: HashSet<String> = self.queue.snapshot().into_iter().map(|t| t.id).collect();
        if let Some(current) = &self.current {
            ids.insert(current.id.clone());
        }
        ids
    }

    /// Current shuffle flag
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Current repeat mode
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }
}
