//! The `Track` value type
//!
//! Tracks are supplied by the stream resolver and flow through the queue,
//! history, playback engine, and offline cache unchanged.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// A playable audio/video unit
///
/// Identity is the `id` alone: two tracks with the same id are the same
/// track for dedup and ownership purposes, regardless of metadata drift
/// between API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Opaque, stable identifier from the upstream API
    pub id: String,

    /// Display title
    pub title: String,

    /// Channel / artist display name
    pub author: String,

    /// Track duration (zero = unknown)
    pub duration: Duration,

    /// Artwork URL (optional)
    pub thumbnail_url: Option<String>,

    /// Upstream view count (optional)
    pub view_count: Option<u64>,
}

impl Track {
    /// Create a track with the required fields
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            duration,
            thumbnail_url: None,
            view_count: None,
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A playable media reference for a track id
///
/// The concrete transport (embedded player vs. raw stream URL) is an
/// implementation detail of the resolver; the playback engine only needs
/// *a* reference it can hand to its backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayableHandle {
    /// Video id for an embedded player backend
    Embedded(String),

    /// Direct audio stream URL
    Url(String),
}
