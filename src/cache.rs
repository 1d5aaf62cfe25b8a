//! In-memory TTL cache with single-flight deduplication.
//!
//! Entries expire a fixed time after creation and are dropped lazily: a read past expiry
//! is a miss, and when the map grows past its size bound every expired entry is swept in
//! one pass. If the bound is still exceeded, the oldest live entries are evicted down to
//! 90% of the bound, so a full cache sweeps once per batch of inserts rather than on each.
//!
//! Concurrent callers missing on the same key share one computation: the first becomes
//! the leader, the others block until the leader publishes its value. A leader that
//! fails or panics releases its waiters, and one of them takes over the computation.
//!
//! The cache never surfaces its own failures. A poisoned lock is recovered, since every
//! write is a whole-entry insert or removal and cannot leave a torn value behind.

use crate::GeoPoint;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Key for cached position, verdict and sun-times values.
///
/// Coordinates are rounded to a fixed number of decimals and the instant is floored to
/// a time bucket, so near-duplicate requests land in the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat: i64,
    lon: i64,
    bucket: i64,
    salt: u64,
}

impl CacheKey {
    /// Key for a point at an instant, floored to `bucket_seconds`.
    #[must_use]
    pub fn for_instant(
        point: &GeoPoint,
        instant: DateTime<Utc>,
        decimals: u32,
        bucket_seconds: u32,
        salt: u64,
    ) -> Self {
        Self {
            lat: round_coordinate(point.latitude(), decimals),
            lon: round_coordinate(point.longitude(), decimals),
            bucket: crate::time::time_bucket(instant, bucket_seconds),
            salt,
        }
    }

    /// Key for a point on a calendar date.
    #[must_use]
    pub fn for_date(point: &GeoPoint, date: NaiveDate, decimals: u32) -> Self {
        Self {
            lat: round_coordinate(point.latitude(), decimals),
            lon: round_coordinate(point.longitude(), decimals),
            bucket: i64::from(date.num_days_from_ce()),
            salt: 0,
        }
    }
}

fn round_coordinate(value: f64, decimals: u32) -> i64 {
    let scale = 10f64.powi(decimals.min(9) as i32);
    (value * scale).round() as i64
}

/// Hit/miss counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered from a live entry.
    pub hits: u64,
    /// Reads that ran the computation.
    pub misses: u64,
    /// Reads that attached to another caller's in-flight computation.
    pub coalesced: u64,
    /// Size-bound sweeps run so far.
    pub sweeps: u64,
    /// Entries currently stored, including not yet swept expired ones.
    pub entries: usize,
}

struct CacheEntry<V> {
    value: V,
    // insertion order, oldest first
    seq: u64,
    expires_at: Instant,
}

enum FlightState<V> {
    Pending,
    Ready(V),
    Abandoned,
}

struct Flight<V> {
    state: Mutex<FlightState<V>>,
    done: Condvar,
}

impl<V: Clone> Flight<V> {
    fn new() -> Self {
        Self {
            state: Mutex::new(FlightState::Pending),
            done: Condvar::new(),
        }
    }

    fn finish(&self, outcome: FlightState<V>) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
        self.done.notify_all();
    }

    fn wait(&self) -> Option<V> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match &*state {
                FlightState::Pending => {
                    state = self
                        .done
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                FlightState::Ready(value) => return Some(value.clone()),
                FlightState::Abandoned => return None,
            }
        }
    }
}

struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    in_flight: HashMap<K, Arc<Flight<V>>>,
    next_seq: u64,
}

/// Thread-safe memoizing cache with per-entry time-to-live.
///
/// # Example
/// ```
/// use sun_exposure::cache::TtlCache;
/// use std::time::Duration;
///
/// let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60), 100);
/// let first: Result<u32, ()> = cache.get_or_compute("answer", || Ok(42));
/// let second: Result<u32, ()> = cache.get_or_compute("answer", || Ok(0));
/// assert_eq!(first, Ok(42));
/// assert_eq!(second, Ok(42));
/// assert_eq!(cache.stats().misses, 1);
/// ```
pub struct TtlCache<K, V> {
    ttl: Duration,
    max_entries: usize,
    state: Mutex<CacheState<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    sweeps: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Creates an empty cache; entries live for `ttl` and a sweep runs past `max_entries`.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                next_seq: 0,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the live value for `key`, if any. Expired entries are removed.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.lock();
        let now = Instant::now();
        match state.entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                state.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Returns the cached value for `key`, or runs `compute` and caches its result.
    ///
    /// `compute` runs at most once per key while a live entry exists, and at most once
    /// across concurrent callers that miss together. Errors are returned to the caller
    /// and never cached.
    ///
    /// # Errors
    /// Returns whatever error `compute` returns.
    pub fn get_or_compute<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let flight = loop {
            let mut state = self.lock();
            let now = Instant::now();
            match state.entries.get(&key) {
                Some(entry) if now < entry.expires_at => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(entry.value.clone());
                }
                Some(_) => {
                    state.entries.remove(&key);
                }
                None => {}
            }

            let Some(flight) = state.in_flight.get(&key).cloned() else {
                let flight = Arc::new(Flight::new());
                state.in_flight.insert(key.clone(), Arc::clone(&flight));
                break flight;
            };
            drop(state);

            tracing::debug!(?key, "joining in-flight computation");
            if let Some(value) = flight.wait() {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                return Ok(value);
            }
            // leader gave up; race for leadership again
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        let mut guard = LeaderGuard {
            cache: self,
            key: Some(key),
            flight,
        };
        let value = compute()?;
        guard.publish(value.clone());
        Ok(value)
    }

    fn store(&self, state: &mut CacheState<K, V>, key: K, value: V) {
        let now = Instant::now();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CacheEntry {
                value,
                seq,
                expires_at: now + self.ttl,
            },
        );
        if state.entries.len() > self.max_entries {
            self.sweep(state, now);
        }
    }

    /// Entry count a sweep trims a still-full cache down to.
    fn low_water_mark(&self) -> usize {
        (self.max_entries * 9 / 10).max(1)
    }

    fn sweep(&self, state: &mut CacheState<K, V>, now: Instant) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        let before = state.entries.len();
        state.entries.retain(|_, entry| now < entry.expires_at);
        let expired = before - state.entries.len();

        let mut evicted = 0;
        if state.entries.len() > self.max_entries {
            let excess = state.entries.len() - self.low_water_mark();
            let mut by_age: Vec<(u64, K)> = state
                .entries
                .iter()
                .map(|(k, entry)| (entry.seq, k.clone()))
                .collect();
            by_age.select_nth_unstable_by_key(excess - 1, |(seq, _)| *seq);
            for (_, key) in by_age.into_iter().take(excess) {
                state.entries.remove(&key);
                evicted += 1;
            }
        }
        tracing::debug!(expired, evicted, remaining = state.entries.len(), "cache sweep");
    }

    /// Removes every expired entry now.
    pub fn purge_expired(&self) {
        let mut state = self.lock();
        let now = Instant::now();
        state.entries.retain(|_, entry| now < entry.expires_at);
    }

    /// Drops all entries. In-flight computations still complete and are stored.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

/// Releases a leader's flight on every exit path, including errors and panics.
struct LeaderGuard<'a, K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    cache: &'a TtlCache<K, V>,
    key: Option<K>,
    flight: Arc<Flight<V>>,
}

impl<K, V> LeaderGuard<'_, K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    fn publish(&mut self, value: V) {
        if let Some(key) = self.key.take() {
            let mut state = self.cache.lock();
            state.in_flight.remove(&key);
            self.cache.store(&mut state, key, value.clone());
        }
        self.flight.finish(FlightState::Ready(value));
    }
}

impl<K, V> Drop for LeaderGuard<'_, K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.cache.lock().in_flight.remove(&key);
            self.flight.finish(FlightState::Abandoned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn cache(ttl_ms: u64, max: usize) -> TtlCache<u32, String> {
        TtlCache::new(Duration::from_millis(ttl_ms), max)
    }

    #[test]
    fn test_computes_once_while_live() {
        let cache = cache(60_000, 10);
        let calls = AtomicUsize::new(0);
        let compute = || -> Result<String, ()> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("value".to_string())
        };

        assert_eq!(cache.get_or_compute(1, compute).unwrap(), "value");
        assert_eq!(cache.get_or_compute(1, compute).unwrap(), "value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_expired_entry_is_recomputed() {
        let cache = cache(5, 10);
        let first: Result<String, ()> = cache.get_or_compute(7, || Ok("old".into()));
        assert_eq!(first.unwrap(), "old");

        thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&7), None);

        let second: Result<String, ()> = cache.get_or_compute(7, || Ok("new".into()));
        assert_eq!(second.unwrap(), "new");
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = cache(60_000, 10);
        let failed: Result<String, &str> = cache.get_or_compute(3, || Err("nope"));
        assert_eq!(failed, Err("nope"));
        assert!(cache.is_empty());

        let ok: Result<String, &str> = cache.get_or_compute(3, || Ok("yes".into()));
        assert_eq!(ok.unwrap(), "yes");
    }

    #[test]
    fn test_sweep_drops_expired_entries_past_threshold() {
        let cache = cache(5, 3);
        for key in 0..3 {
            let _: Result<String, ()> = cache.get_or_compute(key, || Ok(key.to_string()));
        }
        assert_eq!(cache.len(), 3);

        thread::sleep(Duration::from_millis(20));
        let _: Result<String, ()> = cache.get_or_compute(99, || Ok("fresh".into()));
        // the three stale entries went in one pass
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&99).as_deref(), Some("fresh"));
    }

    #[test]
    fn test_size_bound_evicts_oldest_live_entries() {
        let cache = cache(60_000, 2);
        for key in 0..4 {
            let _: Result<String, ()> = cache.get_or_compute(key, || Ok(key.to_string()));
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&0), None);
        assert_eq!(cache.get(&3).as_deref(), Some("3"));
    }

    #[test]
    fn test_full_cache_sweeps_once_per_batch() {
        let cache = cache(60_000, 100);
        for key in 0..100 {
            let _: Result<String, ()> = cache.get_or_compute(key, || Ok(key.to_string()));
        }
        assert_eq!(cache.stats().sweeps, 0);

        for key in 100..150 {
            let _: Result<String, ()> = cache.get_or_compute(key, || Ok(key.to_string()));
        }
        // each sweep trims to 90 entries, leaving room for the next 10 inserts
        let stats = cache.stats();
        assert_eq!(stats.sweeps, 5);
        assert_eq!(stats.entries, 95);

        for key in 0..55 {
            assert_eq!(cache.get(&key), None, "key {key} should be evicted");
        }
        for key in 55..150 {
            assert_eq!(cache.get(&key), Some(key.to_string()));
        }
    }

    #[test]
    fn test_concurrent_callers_share_one_computation() {
        let cache = cache(60_000, 10);
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(8);

        let results: Vec<String> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        cache
                            .get_or_compute(42, || -> Result<String, ()> {
                                calls.fetch_add(1, Ordering::SeqCst);
                                thread::sleep(Duration::from_millis(50));
                                Ok("shared".to_string())
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|r| r == "shared"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits + stats.coalesced, 7);
    }

    #[test]
    fn test_waiter_takes_over_from_failed_leader() {
        let cache = cache(60_000, 10);
        let barrier = Barrier::new(2);

        thread::scope(|s| {
            let leader = s.spawn(|| {
                cache.get_or_compute(5, || -> Result<String, &str> {
                    barrier.wait();
                    thread::sleep(Duration::from_millis(30));
                    Err("leader failed")
                })
            });
            let follower = s.spawn(|| {
                barrier.wait();
                thread::sleep(Duration::from_millis(5));
                cache.get_or_compute(5, || -> Result<String, &str> { Ok("own".into()) })
            });

            assert_eq!(leader.join().unwrap(), Err("leader failed"));
            assert_eq!(follower.join().unwrap(), Ok("own".to_string()));
        });
        assert_eq!(cache.get(&5).as_deref(), Some("own"));
    }

    #[test]
    fn test_cache_key_rounding() {
        let a = GeoPoint::new(57.70891, 11.97462).unwrap();
        let b = GeoPoint::new(57.70894, 11.97458).unwrap();
        let c = GeoPoint::new(57.7102, 11.9746).unwrap();
        let t0 = DateTime::from_timestamp(1_718_971_200, 0).unwrap();
        let t1 = DateTime::from_timestamp(1_718_971_259, 0).unwrap();
        let t2 = DateTime::from_timestamp(1_718_971_260, 0).unwrap();

        assert_eq!(
            CacheKey::for_instant(&a, t0, 3, 60, 0),
            CacheKey::for_instant(&b, t1, 3, 60, 0)
        );
        assert_ne!(
            CacheKey::for_instant(&a, t0, 3, 60, 0),
            CacheKey::for_instant(&c, t0, 3, 60, 0)
        );
        assert_ne!(
            CacheKey::for_instant(&a, t0, 3, 60, 0),
            CacheKey::for_instant(&a, t2, 3, 60, 0)
        );
        assert_ne!(
            CacheKey::for_instant(&a, t0, 3, 60, 0),
            CacheKey::for_instant(&a, t0, 3, 60, 1)
        );

        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        assert_eq!(CacheKey::for_date(&a, date, 3), CacheKey::for_date(&b, date, 3));
        assert_ne!(
            CacheKey::for_date(&a, date, 3),
            CacheKey::for_date(&a, date.succ_opt().unwrap(), 3)
        );
    }
}
