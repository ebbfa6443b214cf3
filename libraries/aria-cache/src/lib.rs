//! Aria Player - Offline Audio Cache
//!
//! Durable, offline-capable local storage of downloaded audio bytes plus
//! a queryable metadata index, independent of the live queue.
//!
//! Storage layout: one redb database with two tables keyed by track id —
//! `audio` (the raw bytes) and `meta` (a JSON metadata record). The two
//! are always written and deleted inside a single write transaction, so
//! neither table can hold an orphaned entry relative to the other.
//!
//! Failure contract: cache operations return `false` / `None` / empty
//! instead of propagating errors, so UI call sites can show a transient
//! "cache failed" notice without crashing playback. Failures are logged
//! through `tracing`.

mod error;
mod metadata;
mod store;

pub use error::{CacheError, Result};
pub use metadata::CacheMetadata;
pub use store::AudioCache;
