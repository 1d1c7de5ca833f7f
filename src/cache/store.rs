//! Cache Store Module
//!
//! Keyed TTL storage. One entry per key, no size bound; entries leave the
//! store when they expire or are cleared.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock, DEFAULT_TTL_SECS};

// == Cache Store ==
/// In-memory key/value store with per-entry expiry.
///
/// The store itself is not synchronized; share it behind a lock.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Usage counters
    stats: CacheStats,
    /// TTL in seconds applied when `set` is called without one
    default_ttl: u64,
    /// Time source for expiry checks
    clock: Arc<dyn Clock>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store reading wall time from the system clock.
    pub fn new(default_ttl: u64) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates an empty store driven by the given clock.
    pub fn with_clock(default_ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
            clock,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing whatever was there.
    ///
    /// The entry lives `ttl` seconds, or the default TTL when `ttl` is `None`.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);

        trace!(key = %key, ttl, "cache set");
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let value = self.lookup(key);
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    /// Same as [`get`](Self::get) but leaves the hit/miss counters alone.
    pub fn peek(&mut self, key: &str) -> Option<V> {
        self.lookup(key)
    }

    fn lookup(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                self.stats.record_expirations(1);
                self.stats.set_total_entries(self.entries.len());
                trace!(key, "cache entry expired");
                None
            }
            None => None,
        }
    }

    // == Clear ==
    /// Removes one entry when `key` is given, otherwise every entry.
    ///
    /// Returns how many entries were removed; a missing key removes nothing.
    pub fn clear(&mut self, key: Option<&str>) -> usize {
        let removed = match key {
            Some(key) => usize::from(self.entries.remove(key).is_some()),
            None => {
                let count = self.entries.len();
                self.entries.clear();
                count
            }
        };

        self.stats.record_invalidations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Default TTL ==
    /// Changes the TTL used by future `set` calls that omit one.
    ///
    /// Entries already stored keep their expiry.
    pub fn set_default_ttl(&mut self, seconds: u64) {
        self.default_ttl = seconds;
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the usage counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns the number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reports whether `key` is stored, without touching counters or expiry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECS)
    }
}
