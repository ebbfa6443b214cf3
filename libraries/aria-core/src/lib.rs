//! Aria Player - Core Types
//!
//! Shared vocabulary for the Aria Player libraries:
//! - `Track`: the playable unit every component passes around
//! - `StreamResolver`: the external search / related-tracks / stream-URL
//!   collaborator (implemented by the UI layer's API client)
//! - `PreferenceStore`: persistent key-value storage for the longer-lived
//!   play log and user settings
//! - `TtlCache`: an explicit, bounded, injectable cache for fetch results
//!
//! This crate is platform-agnostic and has no I/O of its own; all network
//! and storage access lives behind the traits defined here.

mod cache;
mod error;
mod track;
mod traits;

pub use cache::TtlCache;
pub use error::{CoreError, Result};
pub use track::{PlayableHandle, Track};
pub use traits::{PreferenceStore, StreamResolver};
