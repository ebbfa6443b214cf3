//! Platform-agnostic media backend trait
//!
//! Abstracts the underlying playback resource (an embedded video player
//! in the browser build, a media process elsewhere). The backend is
//! exclusively owned by the playback engine; no other component commands
//! it directly.

use crate::error::Result;
use aria_core::PlayableHandle;
use async_trait::async_trait;
use std::time::Duration;

/// Coarse state reported by the playback resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    /// No media loaded
    Idle,

    /// Media is playing
    Playing,

    /// Media is paused mid-track
    Paused,

    /// Media reached its natural end
    Ended,

    /// The resource failed and cannot continue
    Failed,
}

/// Platform-agnostic playback resource
///
/// Commands are asynchronous; observations (`status`/`position`/
/// `duration`) are cheap synchronous reads the engine polls on its tick.
/// `is_playing` in the published state only flips when a poll observes
/// the backend's confirmation, never optimistically.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Load media for a playable handle, tearing down any prior media
    ///
    /// Resolves once the resource is ready and playback has started.
    ///
    /// # Errors
    /// Returns an error if the resource reports a failure; the engine
    /// bounds the wait with its own load timeout.
    async fn load(&self, handle: &PlayableHandle) -> Result<()>;

    /// Resume or start playback of the loaded media
    async fn play(&self) -> Result<()>;

    /// Pause the loaded media
    async fn pause(&self) -> Result<()>;

    /// Seek to a position in the loaded media
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Set volume; `volume` is in `[0, 1]`, the backend converts to its
    /// native scale
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Current playback position
    fn position(&self) -> Duration;

    /// Duration of the loaded media (zero = unknown)
    fn duration(&self) -> Duration;

    /// Current resource state
    fn status(&self) -> BackendStatus;
}
