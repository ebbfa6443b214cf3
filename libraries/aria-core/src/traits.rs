//! Collaborator traits
//!
//! The core never talks to the network or browser storage directly; the
//! embedding layer supplies these implementations.

use crate::error::Result;
use crate::track::{PlayableHandle, Track};
use async_trait::async_trait;

/// External search / related-tracks / stream-URL provider
///
/// Implemented by the UI layer's API client. All network access in the
/// system goes through this trait.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Search tracks by free text
    ///
    /// # Errors
    /// Returns [`CoreError::Fetch`](crate::CoreError::Fetch) on network or
    /// parse failure
    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>>;

    /// Fetch tracks related to a seed track id
    ///
    /// Used by auto-continuation to keep the queue filled.
    ///
    /// # Errors
    /// Returns [`CoreError::Fetch`](crate::CoreError::Fetch) on network or
    /// parse failure
    async fn related_tracks(&self, track_id: &str) -> Result<Vec<Track>>;

    /// Resolve a playable media reference for a track id
    ///
    /// For embedded-player transports the handle is derived from the id
    /// itself, so this is synchronous.
    fn playable_handle(&self, track_id: &str) -> PlayableHandle;

    /// Resolve a raw audio download URL for a track id
    ///
    /// Used by the offline cache's save flow to obtain audio bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Fetch`](crate::CoreError::Fetch) on network or
    /// parse failure
    async fn download_audio_url(&self, track_id: &str) -> Result<String>;
}

/// Persistent key-value preference storage
///
/// Backs the longer-lived play log, favorites, and settings. Values are
/// JSON so the store stays schema-free.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read a value, `None` if the key has never been written
    ///
    /// # Errors
    /// Returns [`CoreError::Preference`](crate::CoreError::Preference) if
    /// the store rejects the read
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    /// Returns [`CoreError::Preference`](crate::CoreError::Preference) if
    /// the store rejects the write
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()>;
}
