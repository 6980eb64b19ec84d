//! Tuple Map Module
//!
//! Main cache engine combining tuple hashing with LRU eviction and
//! timeout expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, LruTracker, TimerQueue};
use crate::config::Config;
use crate::hashing::{HashedKey, HashingEngine, TupleKey};

// == Tuple Map ==
/// Memoization cache keyed by argument tuples.
///
/// Both policies are optional:
/// - `limit` bounds the entry count; the least recently used entry is
///   evicted when a `set` exceeds it.
/// - `timeout` expires each entry that long after its last `set`.
///
/// Due timers fire at the start of every public operation, and can be
/// fired explicitly with [`expire_due`](TupleMap::expire_due).
#[derive(Debug)]
pub struct TupleMap<V> {
    /// Canonical hash -> entry
    entries: HashMap<String, CacheEntry<V>>,
    /// Recency order, tracked only when a limit is set
    lru: Option<LruTracker>,
    limit: Option<usize>,
    /// Pending cleanups, present only with a non-zero timeout
    timers: Option<TimerQueue>,
    engine: HashingEngine,
    stats: CacheStats,
}

impl<V> TupleMap<V> {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `timeout` - Lifetime of each entry; `None` or zero disables expiration
    /// * `limit` - Maximum number of entries; `None` means unbounded
    pub fn new(timeout: Option<Duration>, limit: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: limit.map(|_| LruTracker::new()),
            limit,
            timers: timeout
                .filter(|timeout| !timeout.is_zero())
                .map(TimerQueue::new),
            engine: HashingEngine::new(),
            stats: CacheStats::new(),
        }
    }

    /// Creates an empty cache from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.timeout, config.limit)
    }

    // == Has ==
    /// Returns true if a value is cached for `key`.
    ///
    /// Does not refresh recency or timers.
    pub fn has<K>(&mut self, key: &K) -> bool
    where
        K: TupleKey + ?Sized,
    {
        self.expire_due();
        self.engine
            .lookup_hash(key)
            .map_or(false, |hash| self.entries.contains_key(&hash))
    }

    // == Get ==
    /// Returns the value cached for `key`, or `default` on a miss.
    ///
    /// With a limit configured, a hit also makes the entry the most
    /// recently used. A miss changes nothing besides the statistics.
    pub fn get<K>(&mut self, key: &K, default: V) -> V
    where
        K: TupleKey + ?Sized,
        V: Clone,
    {
        self.expire_due();
        let hit = match self.engine.lookup_hash(key) {
            Some(hash) => self.lookup(&hash),
            None => None,
        };
        match hit {
            Some(value) => value,
            None => {
                self.stats.record_miss();
                default
            }
        }
    }

    // == Get Or Insert With ==
    /// Returns the cached value for `key`, computing and caching it on a miss.
    pub fn get_or_insert_with<K, F>(&mut self, key: &K, compute: F) -> V
    where
        K: TupleKey + ?Sized,
        V: Clone,
        F: FnOnce() -> V,
    {
        self.expire_due();
        let hashed = self.engine.hash_key(key);
        if let Some(value) = self.lookup(&hashed.hash) {
            return value;
        }

        self.stats.record_miss();
        let value = compute();
        self.insert(hashed, value.clone());
        value
    }

    // == Set ==
    /// Caches `value` for `key`, returning the cache for chaining.
    ///
    /// Re-setting a cached key refreshes its recency and restarts its
    /// timeout; the previous timer is cancelled.
    pub fn set<K>(&mut self, key: &K, value: V) -> &mut Self
    where
        K: TupleKey + ?Sized,
    {
        self.expire_due();
        let hashed = self.engine.hash_key(key);
        self.insert(hashed, value);
        self
    }

    // == Remove ==
    /// Removes the value cached for `key`, returning it.
    pub fn remove<K>(&mut self, key: &K) -> Option<V>
    where
        K: TupleKey + ?Sized,
    {
        self.expire_due();
        let hash = self.engine.lookup_hash(key)?;
        self.discard(&hash).map(|entry| entry.value)
    }

    // == Count ==
    /// Returns the number of cached entries.
    pub fn count(&mut self) -> usize {
        self.expire_due();
        self.entries.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.count() == 0
    }

    // == Clear ==
    /// Drops every entry, identity, pending timer and the last-seen shortcut.
    ///
    /// Surrogate ids restart at `#0`. Statistics counters are kept.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        if let Some(lru) = &mut self.lru {
            lru.clear();
        }
        if let Some(timers) = &mut self.timers {
            timers.clear();
        }
        self.engine.clear();
        self.stats.set_total_entries(0);
        debug!(dropped, "Cache cleared");
    }

    // == Expire Due ==
    /// Fires every timer whose deadline has passed, oldest first.
    ///
    /// Returns the number of entries that expired.
    pub fn expire_due(&mut self) -> usize {
        let now = Instant::now();
        let mut expired = 0;

        while let Some(hash) = self.timers.as_mut().and_then(|timers| timers.pop_due(now)) {
            if self.discard(&hash).is_some() {
                self.stats.record_expiration();
                expired += 1;
                debug!(hash = %hash, "Entry expired");
            }
        }

        if expired > 0 {
            self.engine.prune();
        }
        expired
    }

    /// Deadline of the next pending timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.as_ref().and_then(TimerQueue::next_deadline)
    }

    // == Accessors ==
    pub fn timeout(&self) -> Option<Duration> {
        self.timers.as_ref().map(TimerQueue::timeout)
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Number of reference-like arguments currently holding a surrogate id.
    pub fn identity_count(&self) -> usize {
        self.engine.identity_count()
    }

    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Internals ==
    /// Reads a hit, refreshing recency when bounded.
    fn lookup(&mut self, hash: &str) -> Option<V>
    where
        V: Clone,
    {
        let value = self.entries.get(hash)?.value.clone();
        if let Some(lru) = &mut self.lru {
            lru.touch(hash);
        }
        self.stats.record_hit();
        Some(value)
    }

    fn insert(&mut self, hashed: HashedKey, value: V) {
        let HashedKey { hash, identities } = hashed;

        match self.entries.get_mut(&hash) {
            Some(entry) => {
                entry.replace(value);
            }
            None => {
                self.engine.acquire(&identities);
                self.entries
                    .insert(hash.clone(), CacheEntry::new(value, identities));
            }
        }

        if let Some(lru) = &mut self.lru {
            lru.touch(&hash);
        }
        if let Some(timers) = &mut self.timers {
            if timers.schedule(&hash, Instant::now()).is_none() {
                trace!(hash = %hash, "Timeout out of range, entry never expires");
            }
        }

        self.enforce_limit();
        self.stats.set_total_entries(self.entries.len());
    }

    /// Evicts least recently used entries until the limit holds.
    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };

        while self.entries.len() > limit {
            let Some(oldest) = self.lru.as_mut().and_then(LruTracker::pop_oldest) else {
                break;
            };
            if self.discard(&oldest).is_some() {
                self.stats.record_eviction();
                debug!(hash = %oldest, limit, "Evicted least recently used entry");
            }
        }
    }

    /// Removes `hash` from every table. Safe to call for absent hashes.
    fn discard(&mut self, hash: &str) -> Option<CacheEntry<V>> {
        if self.engine.last_hash() == Some(hash) {
            self.engine.forget_last_seen();
        }
        if let Some(lru) = &mut self.lru {
            lru.remove(hash);
        }
        if let Some(timers) = &mut self.timers {
            timers.cancel(hash);
        }

        let entry = self.entries.remove(hash)?;
        self.engine.release(&entry.identities);
        self.stats.set_total_entries(self.entries.len());
        Some(entry)
    }
}

impl<V> Default for TupleMap<V> {
    fn default() -> Self {
        Self::new(None, None)
    }
}
