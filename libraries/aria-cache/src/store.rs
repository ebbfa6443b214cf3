//! The audio cache store
//!
//! Blob and metadata tables live in one redb database; every mutation
//! spans both tables inside a single write transaction.

use crate::error::{CacheError, Result};
use crate::metadata::CacheMetadata;
use aria_core::Track;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Audio bytes keyed by track id
const AUDIO_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("audio");

/// JSON metadata records keyed by track id
const META_TABLE: TableDefinition<&str, &str> = TableDefinition::new("meta");

/// Content-addressed offline store for downloaded audio
///
/// Cheap to clone; all clones share one database handle. Open the store
/// once per process and reuse it.
///
/// Entries are only ever created by explicit save operations and removed
/// by explicit removal or a full clear — there is no automatic eviction.
#[derive(Debug, Clone)]
pub struct AudioCache {
    db: Arc<Database>,
}

impl AudioCache {
    /// Open (or create) the cache database at `path`
    ///
    /// # Errors
    /// Returns an error if the database cannot be created or the tables
    /// cannot be initialized
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path)?;

        // Create both tables up front so reads never race table creation
        let txn = db.begin_write()?;
        txn.open_table(AUDIO_TABLE)?;
        txn.open_table(META_TABLE)?;
        txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Store audio bytes and metadata for a track as one atomic unit
    ///
    /// Returns `false` (never errors) if the write fails, so callers can
    /// surface a non-fatal "cache failed" notice. Overwrites any existing
    /// entry for the same id.
    pub async fn put(&self, track: &Track, bytes: Vec<u8>) -> bool {
        let meta = CacheMetadata::from_track(track);
        let track_id = track.id.clone();
        match self
            .run_blocking(move |db| put_blocking(db, &meta, &bytes))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(track_id = %track_id, error = %err, "audio cache write failed");
                false
            }
        }
    }

    /// Fetch the cached audio bytes for a track, `None` if absent
    pub async fn get(&self, track_id: &str) -> Option<Vec<u8>> {
        let id = track_id.to_string();
        match self.run_blocking(move |db| get_blocking(db, &id)).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(track_id = %track_id, error = %err, "audio cache read failed");
                None
            }
        }
    }

    /// Check whether a track is cached (metadata index only, no blob read)
    pub async fn has(&self, track_id: &str) -> bool {
        let id = track_id.to_string();
        match self.run_blocking(move |db| has_blocking(db, &id)).await {
            Ok(present) => present,
            Err(err) => {
                warn!(track_id = %track_id, error = %err, "audio cache lookup failed");
                false
            }
        }
    }

    /// List all cached tracks from the metadata index
    ///
    /// Reconstructs lightweight `Track` values without touching the blob
    /// table. Unreadable records are skipped, not fatal.
    pub async fn list_metadata(&self) -> Vec<Track> {
        match self.run_blocking(list_blocking).await {
            Ok(tracks) => tracks,
            Err(err) => {
                warn!(error = %err, "audio cache listing failed");
                Vec::new()
            }
        }
    }

    /// Delete a track's audio bytes and metadata as one atomic unit
    ///
    /// Returns `true` if an entry existed and was removed.
    pub async fn remove(&self, track_id: &str) -> bool {
        let id = track_id.to_string();
        match self.run_blocking(move |db| remove_blocking(db, &id)).await {
            Ok(existed) => existed,
            Err(err) => {
                warn!(track_id = %track_id, error = %err, "audio cache removal failed");
                false
            }
        }
    }

    /// Total size of all cached audio blobs, in bytes
    pub async fn total_size(&self) -> u64 {
        match self.run_blocking(size_blocking).await {
            Ok(total) => total,
            Err(err) => {
                warn!(error = %err, "audio cache size accounting failed");
                0
            }
        }
    }

    /// Delete every cached entry
    ///
    /// Returns `false` if the clear could not be committed.
    pub async fn clear(&self) -> bool {
        match self.run_blocking(clear_blocking).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "audio cache clear failed");
                false
            }
        }
    }

    /// Run a storage closure off the async thread
    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|err| CacheError::Task(err.to_string()))?
    }

    /// Write the blob but abandon the transaction before the metadata
    /// commit, simulating a crash mid-write
    #[cfg(test)]
    fn simulate_interrupted_put(&self, track: &Track, bytes: &[u8]) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut audio = txn.open_table(AUDIO_TABLE)?;
            audio.insert(track.id.as_str(), bytes)?;
        }
        // Dropped without commit: the whole transaction rolls back
        drop(txn);
        Ok(())
    }
}

fn put_blocking(db: &Database, meta: &CacheMetadata, bytes: &[u8]) -> Result<()> {
    let encoded = serde_json::to_string(meta)?;
    let txn = db.begin_write()?;
    {
        let mut audio = txn.open_table(AUDIO_TABLE)?;
        let mut index = txn.open_table(META_TABLE)?;
        audio.insert(meta.id.as_str(), bytes)?;
        index.insert(meta.id.as_str(), encoded.as_str())?;
    }
    txn.commit()?;
    Ok(())
}

fn get_blocking(db: &Database, track_id: &str) -> Result<Option<Vec<u8>>> {
    let txn = db.begin_read()?;
    let audio = txn.open_table(AUDIO_TABLE)?;
    Ok(audio.get(track_id)?.map(|guard| guard.value().to_vec()))
}

fn has_blocking(db: &Database, track_id: &str) -> Result<bool> {
    let txn = db.begin_read()?;
    let index = txn.open_table(META_TABLE)?;
    Ok(index.get(track_id)?.is_some())
}

fn list_blocking(db: &Database) -> Result<Vec<Track>> {
    let txn = db.begin_read()?;
    let index = txn.open_table(META_TABLE)?;

    let mut tracks = Vec::new();
    for entry in index.iter()? {
        let (id, value) = entry?;
        match serde_json::from_str::<CacheMetadata>(value.value()) {
            Ok(meta) => tracks.push(meta.to_track()),
            Err(err) => {
                warn!(track_id = %id.value(), error = %err, "skipping unreadable cache record");
            }
        }
    }
    Ok(tracks)
}

fn remove_blocking(db: &Database, track_id: &str) -> Result<bool> {
    let txn = db.begin_write()?;
    let existed = {
        let mut audio = txn.open_table(AUDIO_TABLE)?;
        let mut index = txn.open_table(META_TABLE)?;
        let had_blob = audio.remove(track_id)?.is_some();
        let had_meta = index.remove(track_id)?.is_some();
        had_blob || had_meta
    };
    txn.commit()?;
    Ok(existed)
}

fn size_blocking(db: &Database) -> Result<u64> {
    let txn = db.begin_read()?;
    let audio = txn.open_table(AUDIO_TABLE)?;

    let mut total = 0u64;
    for entry in audio.iter()? {
        let (_, value) = entry?;
        total += value.value().len() as u64;
    }
    Ok(total)
}

fn clear_blocking(db: &Database) -> Result<()> {
    let txn = db.begin_write()?;
    txn.delete_table(AUDIO_TABLE)?;
    txn.delete_table(META_TABLE)?;
    // Recreate empty tables so later reads still find them
    txn.open_table(AUDIO_TABLE)?;
    txn.open_table(META_TABLE)?;
    txn.commit()?;
    Ok(())
}
