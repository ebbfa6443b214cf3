//! Persisted metadata record for cached audio

use aria_core::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metadata index record, stored alongside the audio blob
///
/// Kept deliberately flat and JSON-encoded so the index can be listed
/// without touching the (much larger) blob table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Track id (same key as the blob record)
    pub id: String,

    /// Track title
    pub title: String,

    /// Channel / artist display name
    pub author: String,

    /// Artwork URL (optional)
    pub thumbnail_url: Option<String>,

    /// Track duration in whole seconds (0 = unknown)
    pub duration_secs: u64,

    /// When the entry was cached, epoch milliseconds
    pub cached_at_ms: i64,
}

impl CacheMetadata {
    /// Build a record from a track, stamped with the current time
    pub fn from_track(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            author: track.author.clone(),
            thumbnail_url: track.thumbnail_url.clone(),
            duration_secs: track.duration.as_secs(),
            cached_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Reconstruct a lightweight track for library listing
    pub fn to_track(&self) -> Track {
        let mut track = Track::new(
            self.id.clone(),
            self.title.clone(),
            self.author.clone(),
            Duration::from_secs(self.duration_secs),
        );
        track.thumbnail_url = self.thumbnail_url.clone();
        track
    }
}
