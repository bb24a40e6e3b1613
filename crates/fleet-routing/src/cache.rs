//! Time-bounded response caches.
//!
//! # Eviction model
//!
//! Entries carry their insertion time; a lookup that finds an entry older
//! than the TTL removes it and reports a miss.  There is no background
//! sweeper — the caches are read-mostly and stale entries cost nothing until
//! the next lookup for their key.
//!
//! # Concurrency
//!
//! Backed by `DashMap`, so reads and writes are atomic per key: a concurrent
//! reader observes either a complete prior write or none.  The client shares
//! one instance process-wide across the tick loop and operator calls.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use fleet_core::Point;
use serde::Serialize;

/// A cached payload with its insertion timestamp.
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    payload: T,
    inserted: Instant,
}

/// A string-keyed cache whose entries expire `ttl` after insertion.
pub struct TtlCache<T: Clone> {
    entries: DashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: DashMap::new(), ttl }
    }

    /// Look up `key`, treating entries older than the TTL as absent
    /// (and removing them).
    pub fn get(&self, key: &str) -> Option<T> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => {
                if entry.inserted.elapsed() < self.ttl {
                    return Some(entry.payload.clone());
                }
                true
            }
        };
        // Guard dropped above; lazily evict the stale entry.
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: String, payload: T) {
        self.entries.insert(key, CacheEntry { payload, inserted: Instant::now() });
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Total entries, including ones past the TTL that no read has evicted yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries still younger than the TTL.
    pub fn valid_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.inserted.elapsed() < self.ttl)
            .count()
    }
}

/// Cache usage counters reported by `RoutingClient::cache_stats`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub matrix_entries: usize,
    pub matrix_valid: usize,
    pub geometry_entries: usize,
    pub geometry_valid: usize,
    pub ttl_secs: u64,
}

// ── Cache keys ────────────────────────────────────────────────────────────────

/// Fingerprint a point set for the distance-matrix cache.
///
/// Coordinates are rounded to 4 decimals (~11 m) so nearby re-queries of the
/// same stops hit the cache.
pub(crate) fn matrix_fingerprint(points: &[Point]) -> String {
    let mut key = String::with_capacity(points.len() * 20);
    for p in points {
        key.push_str(&format!("{:.4},{:.4};", p.position.lat, p.position.lon));
    }
    key
}

/// Key for the geometry cache: the full ordered coordinate path at 6-decimal
/// precision (geometry is direction- and order-sensitive).
pub(crate) fn geometry_fingerprint(points: &[&Point]) -> String {
    let mut key = String::with_capacity(points.len() * 24 + 6);
    key.push_str("route:");
    for p in points {
        key.push_str(&format!("{:.6},{:.6};", p.position.lat, p.position.lon));
    }
    key
}
