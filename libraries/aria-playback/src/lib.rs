//! Aria Player - Playback Management
//!
//! Playback/queue engine for a streaming music front end that uses an
//! embedded video player (or a raw stream URL) as its audio engine.
//!
//! This crate provides:
//! - A playback engine wrapping a [`MediaBackend`] (load/play/pause/seek/
//!   volume, periodic time reporting, load timeout, stale-callback guards)
//! - A queue and history manager (idempotent-by-id append, bounded
//!   history, shuffle and repeat modes, "previous" with the 3-second
//!   restart shortcut)
//! - Auto-continuation ("radio"): related-track fetches that refill the
//!   queue near exhaustion or restart playback after a natural end,
//!   behind a single-flight guard
//! - The [`Player`] facade gluing the above into the single object a UI
//!   layer drives
//!
//! # Architecture
//!
//! `aria-playback` is platform-agnostic: all media control goes through
//! the [`MediaBackend`] trait and all network access through
//! `aria_core::StreamResolver`. The UI layer observes playback through a
//! `watch` channel of [`PlaybackState`] snapshots and a `broadcast`
//! stream of [`PlaybackEvent`]s; it never mutates queue or engine state
//! except through [`Player`] commands.

mod backend;
mod engine;
mod error;
mod events;
mod history;
mod player;
mod queue;
mod radio;
mod session;
pub mod types;

pub use backend::{BackendStatus, MediaBackend};
pub use engine::PlayerEngine;
pub use error::{PlayerError, Result};
pub use events::PlaybackEvent;
pub use player::Player;
pub use types::{PlaybackState, PlayerConfig, RepeatMode};
