//! Error types for playback management

use thiserror::Error;

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The playback resource failed to initialize or start for a track
    #[error("Track {track_id} failed to load: {reason}")]
    Load {
        /// Id of the track that failed
        track_id: String,
        /// Backend-reported cause
        reason: String,
    },

    /// Track loading did not complete within the timeout window
    #[error("Track {track_id} load timed out")]
    LoadTimeout {
        /// Id of the track that timed out
        track_id: String,
    },

    /// A backend command (play/pause/seek/volume) failed
    #[error("Media backend error: {0}")]
    Backend(String),

    /// Every candidate track failed to load; playback settled to stopped
    #[error("Nothing playable: queue exhausted")]
    NothingPlayable,
}
