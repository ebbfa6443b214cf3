//! Playback Events
//!
//! Event-based communication for UI synchronization during playback.
//! Events are emitted at key points:
//! - State changes (playing/paused confirmations from the backend)
//! - Track changes (on every load)
//! - Natural track end
//! - Position updates (periodic, while playing)
//! - Queue mutations

use serde::{Deserialize, Serialize};

/// Events emitted by the playback system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// The backend confirmed a play/pause transition
    StateChanged {
        /// Whether playback is now running
        playing: bool,
    },

    /// A new track was loaded
    TrackChanged {
        /// Id of the new (current) track
        track_id: String,
        /// Id of the previous track (if any)
        previous_track_id: Option<String>,
    },

    /// The current track finished playing naturally (reached end)
    TrackFinished {
        /// Id of the finished track
        track_id: String,
    },

    /// Position update (periodic, while playing)
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration
        duration_ms: u64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume in `[0, 1]`
        volume: f32,
    },

    /// Queue changed (tracks added/removed/replaced)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// The playback resource failed mid-play
    Error {
        /// Id of the failing track (if known)
        track_id: Option<String>,
        /// Backend-reported cause
        message: String,
    },
}
