//! The bounded, expiring key-value store.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::error::CacheResult;
use crate::stats::CacheStats;
use crate::sweeper::Sweeper;

/// Thread-safe cache bounded by entry count and per-entry lifetime.
///
/// When an insert of a new key finds the cache full, the entry inserted
/// longest ago is evicted. Reads do not refresh an entry's position, so
/// eviction follows insertion order rather than access order. Overwriting
/// a key re-stamps it as the newest entry.
///
/// Expired entries read as absent. They are physically removed on lookup,
/// by [`purge_expired`](Self::purge_expired), and by the background sweeper
/// when `sweep_interval` is set. The sweeper thread is owned by the cache
/// and joined when the cache is dropped.
///
/// [`get_or_compute`](Self::get_or_compute) runs the producer outside any
/// lock. Concurrent misses on the same key each run it and the last write
/// wins.
pub struct ExpiringCache<K, V> {
    // Dropped first: the sweeper thread is joined before the state goes.
    _sweeper: Option<Sweeper>,
    shared: Arc<Shared<K, V>>,
}

struct Shared<K, V> {
    name: String,
    config: CacheConfig,
    state: RwLock<State<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

struct State<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Insertion sequence -> key; the first item is the oldest entry.
    order: BTreeMap<u64, K>,
    next_seq: u64,
}

impl<K: Eq + Hash, V> State<K, V> {
    fn remove<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        Some(entry)
    }

    fn expired_seqs(&self, now: Instant) -> Vec<u64> {
        self.entries
            .values()
            .filter(|e| e.is_expired(now))
            .map(|e| e.seq)
            .collect()
    }

    fn remove_seq(&mut self, seq: u64) -> bool {
        match self.order.remove(&seq) {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash,
{
    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.write().expect("cache lock poisoned");
        let expired = state.expired_seqs(now);
        let removed = expired
            .into_iter()
            .filter(|seq| state.remove_seq(*seq))
            .count();
        drop(state);

        if removed > 0 {
            self.expirations.fetch_add(removed as u64, Ordering::Relaxed);
            debug!(cache = %self.name, removed, "purged expired entries");
        }
        removed
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Build a cache, starting its sweeper if `sweep_interval` is set.
    pub fn new(name: impl Into<String>, config: CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        let shared = Arc::new(Shared {
            name: name.into(),
            state: RwLock::new(State {
                entries: HashMap::with_capacity(config.capacity.min(1024)),
                order: BTreeMap::new(),
                next_seq: 0,
            }),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        });

        let sweeper = match shared.config.sweep_interval {
            Some(interval) => {
                let weak: Weak<Shared<K, V>> = Arc::downgrade(&shared);
                Some(Sweeper::spawn(&shared.name, interval, move || {
                    match weak.upgrade() {
                        Some(shared) => {
                            shared.purge_expired();
                            true
                        }
                        None => false,
                    }
                })?)
            }
            None => None,
        };

        Ok(Self {
            _sweeper: sweeper,
            shared,
        })
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn config(&self) -> &CacheConfig {
        &self.shared.config
    }

    /// Look up a live entry, counting a hit or a miss.
    pub fn try_get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let value = self.peek(key);
        self.record(value.is_some());
        value
    }

    /// Look up a live entry without touching the counters.
    pub(crate) fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = Instant::now();
        {
            let state = self.shared.state.read().expect("cache lock poisoned");
            match state.entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value().clone()),
                Some(_) => {}
            }
        }

        let mut state = self.shared.state.write().expect("cache lock poisoned");
        if state.entries.get(key).is_some_and(|e| e.is_expired(now)) {
            state.remove(key);
            self.shared.expirations.fetch_add(1, Ordering::Relaxed);
        }
        None
    }

    pub(crate) fn record(&self, hit: bool) {
        let counter = if hit {
            &self.shared.hits
        } else {
            &self.shared.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Insert with the configured default TTL.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.shared.config.default_ttl);
    }

    /// Insert with an explicit TTL, evicting the oldest entry if the cache
    /// is full and `key` is new.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let mut state = self.shared.state.write().expect("cache lock poisoned");
        let seq = state.next_seq;
        state.next_seq += 1;

        if state.remove(&key).is_none() && state.entries.len() >= self.shared.config.capacity {
            if let Some((_, oldest)) = state.order.pop_first() {
                state.entries.remove(&oldest);
                self.shared.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.shared.name, "evicted oldest entry");
            }
        }

        state.order.insert(seq, key.clone());
        state.entries.insert(key, CacheEntry::new(value, ttl, seq));
    }

    /// Remove one entry. Returns `true` if it was present.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.shared
            .state
            .write()
            .expect("cache lock poisoned")
            .remove(key)
            .is_some()
    }

    /// Remove every entry whose key matches `predicate`.
    pub fn invalidate_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut state = self.shared.state.write().expect("cache lock poisoned");
        let doomed: Vec<u64> = state
            .entries
            .iter()
            .filter(|(k, _)| predicate(*k))
            .map(|(_, e)| e.seq)
            .collect();
        doomed.into_iter().filter(|seq| state.remove_seq(*seq)).count()
    }

    /// Remove every entry and zero the counters.
    pub fn clear(&self) {
        let mut state = self.shared.state.write().expect("cache lock poisoned");
        let dropped = state.entries.len();
        state.entries.clear();
        state.order.clear();
        self.reset_stats();
        debug!(cache = %self.shared.name, dropped, "cache cleared");
    }

    /// Return the cached value or compute, store and return it.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.get_or_compute_with_ttl(key, self.shared.config.default_ttl, compute)
    }

    pub fn get_or_compute_with_ttl<F>(&self, key: K, ttl: Duration, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.try_get(&key) {
            return value;
        }
        let value = compute();
        self.set_with_ttl(key, value.clone(), ttl);
        value
    }

    /// Like [`get_or_compute`](Self::get_or_compute) for fallible producers.
    /// Errors are returned as-is and nothing is cached.
    pub fn try_get_or_compute<F, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.try_get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Remove all expired entries now. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.shared.purge_expired()
    }

    /// Number of entries held, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.shared.state.read().expect("cache lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.shared.hits.load(Ordering::Relaxed),
            misses: self.shared.misses.load(Ordering::Relaxed),
            evictions: self.shared.evictions.load(Ordering::Relaxed),
            expirations: self.shared.expirations.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.shared.config.capacity,
        }
    }

    pub fn reset_stats(&self) {
        self.shared.hits.store(0, Ordering::Relaxed);
        self.shared.misses.store(0, Ordering::Relaxed);
        self.shared.evictions.store(0, Ordering::Relaxed);
        self.shared.expirations.store(0, Ordering::Relaxed);
    }
}

impl<K, V> std::fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("name", &self.shared.name)
            .field("config", &self.shared.config)
            .finish()
    }
}
