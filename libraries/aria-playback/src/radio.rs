//! Auto-continuation ("radio")
//!
//! Keeps the queue non-empty by fetching related tracks: a low-queue
//! refill while something plays, and an end-of-playback continuation
//! when the queue ran dry. Both triggers share one single-flight guard
//! so at most one fetch is in flight at any instant, and a coalescing
//! key suppresses re-fetching while nothing has changed since the last
//! attempt. Fetch errors never reach the playback path.

use aria_core::{StreamResolver, Track, TtlCache};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Releases the single-flight lock on every exit path
struct FlightGuard(Arc<AtomicBool>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Related-track fetcher with single-flight and request coalescing
pub struct RadioController {
    resolver: Arc<dyn StreamResolver>,
    enabled: AtomicBool,
    in_flight: Arc<AtomicBool>,
    last_key: Mutex<Option<String>>,
    related_cache: Mutex<TtlCache<String, Vec<Track>>>,
    batch: usize,
    min_duration: Duration,
    max_duration: Duration,
}

impl RadioController {
    /// Create a controller over a resolver
    pub fn new(
        resolver: Arc<dyn StreamResolver>,
        enabled: bool,
        batch: usize,
        min_duration: Duration,
        max_duration: Duration,
        cache_capacity: usize,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            resolver,
            enabled: AtomicBool::new(enabled),
            in_flight: Arc::new(AtomicBool::new(false)),
            last_key: Mutex::new(None),
            related_cache: Mutex::new(TtlCache::new(cache_capacity, cache_ttl)),
            batch,
            min_duration,
            max_duration,
        }
    }

    /// Whether auto-continuation is currently on
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turn auto-continuation on or off
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Fetch refill candidates for a low queue
    ///
    /// The coalescing key binds the attempt to the (track, queue-length)
    /// situation so the same situation is not fetched twice.
    pub async fn fetch_refill(
        &self,
        seed_id: &str,
        queue_len: usize,
        exclude: &HashSet<String>,
    ) -> Option<Vec<Track>> {
        self.guarded_fetch(format!("{seed_id}:{queue_len}"), seed_id, exclude)
            .await
    }

    /// Fetch a fresh queue after playback ended with nothing left
    pub async fn fetch_continuation(
        &self,
        seed_id: &str,
        exclude: &HashSet<String>,
    ) -> Option<Vec<Track>> {
        self.guarded_fetch(format!("{seed_id}:end"), seed_id, exclude)
            .await
    }

    async fn guarded_fetch(
        &self,
        key: String,
        seed_id: &str,
        exclude: &HashSet<String>,
    ) -> Option<Vec<Track>> {
        {
            let last = self.last_key.lock().unwrap_or_else(PoisonError::into_inner);
            if last.as_deref() == Some(key.as_str()) {
                // Nothing has changed since the last attempt
                return None;
            }
        }

        // Check-and-set before the asynchronous work starts
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        let _guard = FlightGuard(Arc::clone(&self.in_flight));

        *self.last_key.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);

        let cached = self
            .related_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&seed_id.to_string());
        let related = match cached {
            Some(tracks) => tracks,
            None => match self.resolver.related_tracks(seed_id).await {
                Ok(tracks) => {
                    self.related_cache
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(seed_id.to_string(), tracks.clone());
                    tracks
                }
                Err(err) => {
                    // Swallowed: auto-continuation must never interrupt playback
                    warn!(seed_id = %seed_id, error = %err, "related-tracks fetch failed");
                    return None;
                }
            },
        };

        let picked = self.filter_candidates(related, exclude);
        debug!(seed_id = %seed_id, count = picked.len(), "radio candidates selected");
        if picked.is_empty() {
            None
        } else {
            Some(picked)
        }
    }

    /// Drop duplicates and implausible song lengths, keep up to `batch`
    fn filter_candidates(&self, candidates: Vec<Track>, exclude: &HashSet<String>) -> Vec<Track> {
        let mut seen = exclude.clone();
        let mut picked = Vec::new();
        for track in candidates {
            if picked.len() >= self.batch {
                break;
            }
            if seen.contains(&track.id) {
                continue;
            }
            if track.duration < self.min_duration || track.duration > self.max_duration {
                continue;
            }
            seen.insert(track.id.clone());
            picked.push(track);
        }
        picked
    }
}
