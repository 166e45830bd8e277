//! Process-wide query cache storage.

use super::key::QueryKey;
use crate::{Error, Result};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};

/// An in-flight fetch, shared by every reader of the same key.
pub type SharedFetch = Shared<BoxFuture<'static, Result<Value>>>;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheEventKind {
    /// New data was written (fetch settled or local patch).
    Updated,
    Invalidated,
    Removed,
    /// Every entry was dropped. Delivered to all subscribers.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: QueryKey,
    pub kind: CacheEventKind,
}

/// Observable snapshot of one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub data: Option<Value>,
    pub updated_at: Option<Instant>,
    pub is_stale: bool,
    pub is_fetching: bool,
    pub error: Option<Error>,
    pub failure_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub deduplicated: u64,
    pub discarded: u64,
    pub failures: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    deduplicated: AtomicU64,
    discarded: AtomicU64,
    failures: AtomicU64,
}

impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            deduplicated: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            deduplicated: self.deduplicated.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

struct Entry {
    data: Option<Value>,
    updated_at: Option<Instant>,
    /// Explicitly invalidated since the last write.
    stale: bool,
    error: Option<Error>,
    failure_count: u32,
    /// Staleness window of the most recent read.
    stale_time: Option<Duration>,
    /// Fetches numbered below this are discarded when they settle.
    floor_seq: u64,
    inflight: Option<(u64, SharedFetch)>,
}

impl Entry {
    fn new(floor_seq: u64) -> Self {
        Self {
            data: None,
            updated_at: None,
            stale: false,
            error: None,
            failure_count: 0,
            stale_time: None,
            floor_seq,
            inflight: None,
        }
    }

    fn is_stale(&self, now: Instant) -> bool {
        if self.stale {
            return true;
        }
        match (self.updated_at, self.stale_time) {
            (None, _) => true,
            (Some(at), Some(window)) => now.duration_since(at) >= window,
            (Some(_), None) => false,
        }
    }

    fn write(&mut self, value: Value, seq: u64, now: Instant) {
        self.data = Some(value);
        self.updated_at = Some(now);
        self.stale = false;
        self.error = None;
        self.failure_count = 0;
        self.floor_seq = seq;
    }

    fn state(&self, now: Instant) -> QueryState {
        QueryState {
            data: self.data.clone(),
            updated_at: self.updated_at,
            is_stale: self.is_stale(now),
            is_fetching: self.inflight.is_some(),
            error: self.error.clone(),
            failure_count: self.failure_count,
        }
    }
}

struct Inner {
    entries: HashMap<QueryKey, Entry>,
    next_seq: u64,
}

impl Inner {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Outcome of [`QueryCache::lookup_or_begin`].
pub(crate) enum Lookup {
    /// Cached and within its staleness window.
    Fresh(Value),
    /// Missing or stale; `data` is whatever is cached, `fetch` the refresh.
    /// `invalidated` is set when the entry was explicitly invalidated rather
    /// than merely aged past its window.
    Pending {
        data: Option<Value>,
        fetch: SharedFetch,
        invalidated: bool,
    },
}

/// Keyed store of JSON snapshots with sequence-numbered writes.
///
/// Every mutation of an entry happens under one lock, so readers never
/// observe partial writes. Each fetch start and each direct write draws a
/// number from one monotonic counter; a fetch that settles with a number below
/// its entry's floor was superseded and its result is dropped.
pub struct QueryCache {
    inner: Mutex<Inner>,
    events: broadcast::Sender<CacheEvent>,
    stats: AtomicStats,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
            events,
            stats: AtomicStats::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, key: QueryKey, kind: CacheEventKind) {
        // No receivers is fine.
        let _ = self.events.send(CacheEvent { key, kind });
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = self.lock().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.lock().entries.get(key).and_then(|e| e.data.clone())
    }

    pub fn state(&self, key: &QueryKey) -> Option<QueryState> {
        let now = Instant::now();
        self.lock().entries.get(key).map(|e| e.state(now))
    }

    /// Return fresh data, join the running fetch, or start one with `start`.
    ///
    /// `start` receives the fetch's sequence number and must produce a future
    /// that reports back through [`QueryCache::settle`].
    pub(crate) fn lookup_or_begin<F>(&self, key: &QueryKey, stale_time: Duration, start: F) -> Lookup
    where
        F: FnOnce(u64) -> BoxFuture<'static, Result<Value>>,
    {
        let now = Instant::now();
        let mut inner = self.lock();
        // Fetches issued before this entry existed belong to a removed one.
        let floor = inner.next_seq + 1;
        let entry = inner
            .entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(floor));
        entry.stale_time = Some(stale_time);

        if !entry.is_stale(now) {
            if let Some(data) = entry.data.clone() {
                AtomicStats::bump(&self.stats.hits);
                return Lookup::Fresh(data);
            }
        }
        AtomicStats::bump(&self.stats.misses);

        let invalidated = entry.stale;
        if let Some((_, fetch)) = &entry.inflight {
            AtomicStats::bump(&self.stats.deduplicated);
            return Lookup::Pending {
                data: entry.data.clone(),
                fetch: fetch.clone(),
                invalidated,
            };
        }

        let data = entry.data.clone();
        let seq = inner.next_seq();
        let fetch = start(seq).shared();
        if let Some(entry) = inner.entries.get_mut(key) {
            entry.inflight = Some((seq, fetch.clone()));
        }
        AtomicStats::bump(&self.stats.fetches);
        debug!(key = %key, seq, invalidated, "query fetch started");
        Lookup::Pending {
            data,
            fetch,
            invalidated,
        }
    }

    /// Record the outcome of fetch `seq`. Returns whether it was applied.
    pub(crate) fn settle(&self, key: &QueryKey, seq: u64, result: &Result<Value>, failures: u32) -> bool {
        let now = Instant::now();
        let mut inner = self.lock();
        let Some(entry) = inner.entries.get_mut(key) else {
            AtomicStats::bump(&self.stats.discarded);
            debug!(key = %key, seq, "fetch settled after entry was removed");
            return false;
        };
        if matches!(entry.inflight, Some((s, _)) if s == seq) {
            entry.inflight = None;
        }
        if seq < entry.floor_seq {
            AtomicStats::bump(&self.stats.discarded);
            debug!(key = %key, seq, floor = entry.floor_seq, "discarding superseded fetch result");
            return false;
        }
        match result {
            Ok(value) => {
                entry.write(value.clone(), seq, now);
                drop(inner);
                self.emit(key.clone(), CacheEventKind::Updated);
            }
            Err(err) => {
                // The previous value stays readable.
                entry.error = Some(err.clone());
                entry.failure_count = failures;
                AtomicStats::bump(&self.stats.failures);
            }
        }
        true
    }

    /// Replace the value at `key`, marking it fresh.
    pub fn set(&self, key: &QueryKey, value: Value) {
        let now = Instant::now();
        {
            let mut inner = self.lock();
            let seq = inner.next_seq();
            let entry = inner
                .entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(seq));
            entry.write(value, seq, now);
            entry.inflight = None;
        }
        self.emit(key.clone(), CacheEventKind::Updated);
    }

    /// Patch the value at `key` in place. `f` sees the current value (if any)
    /// and returns the replacement, or `None` to leave the entry untouched.
    pub fn update<F>(&self, key: &QueryKey, f: F) -> bool
    where
        F: FnOnce(Option<&Value>) -> Option<Value>,
    {
        let now = Instant::now();
        {
            let mut inner = self.lock();
            let current = inner.entries.get(key).and_then(|e| e.data.as_ref());
            let Some(next) = f(current) else {
                return false;
            };
            let seq = inner.next_seq();
            let entry = inner
                .entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(seq));
            entry.write(next, seq, now);
            entry.inflight = None;
        }
        self.emit(key.clone(), CacheEventKind::Updated);
        true
    }

    /// Patch every cached value under `prefix`. Returns how many changed.
    pub fn update_matching<F>(&self, prefix: &QueryKey, mut f: F) -> usize
    where
        F: FnMut(&QueryKey, &Value) -> Option<Value>,
    {
        let now = Instant::now();
        let mut touched = Vec::new();
        {
            let mut inner = self.lock();
            let mut patches = Vec::new();
            for (key, entry) in inner.entries.iter() {
                if !key.starts_with(prefix) {
                    continue;
                }
                if let Some(next) = entry.data.as_ref().and_then(|data| f(key, data)) {
                    patches.push((key.clone(), next));
                }
            }
            for (key, next) in patches {
                let seq = inner.next_seq();
                if let Some(entry) = inner.entries.get_mut(&key) {
                    entry.write(next, seq, now);
                    entry.inflight = None;
                    touched.push(key);
                }
            }
        }
        let count = touched.len();
        for key in touched {
            self.emit(key, CacheEventKind::Updated);
        }
        count
    }

    /// Mark every entry under `prefix` stale and detach running fetches so
    /// the next read issues a new request.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut touched = Vec::new();
        {
            let mut inner = self.lock();
            let seq = inner.next_seq();
            for (key, entry) in inner.entries.iter_mut() {
                if key.starts_with(prefix) {
                    entry.stale = true;
                    entry.floor_seq = seq;
                    entry.inflight = None;
                    touched.push(key.clone());
                }
            }
        }
        debug!(prefix = %prefix, count = touched.len(), "queries invalidated");
        let count = touched.len();
        for key in touched {
            self.emit(key, CacheEventKind::Invalidated);
        }
        count
    }

    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let removed: Vec<QueryKey> = {
            let mut inner = self.lock();
            let keys: Vec<QueryKey> = inner
                .entries
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect();
            for key in &keys {
                inner.entries.remove(key);
            }
            keys
        };
        let count = removed.len();
        for key in removed {
            self.emit(key, CacheEventKind::Removed);
        }
        count
    }

    pub fn clear(&self) {
        let count = {
            let mut inner = self.lock();
            let count = inner.entries.len();
            inner.entries.clear();
            count
        };
        if count > 0 {
            warn!(count, "query cache cleared");
        }
        self.emit(QueryKey::new(), CacheEventKind::Cleared);
    }

    pub(crate) fn events(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ready(value: Value) -> impl FnOnce(u64) -> BoxFuture<'static, Result<Value>> {
        move |_| async move { Ok::<_, Error>(value) }.boxed()
    }

    #[tokio::test]
    async fn superseded_fetch_is_discarded() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["practice", "stats"]);

        let mut first = 0;
        let lookup = cache.lookup_or_begin(&key, Duration::from_secs(60), |seq| {
            first = seq;
            async { Ok::<_, Error>(json!(1)) }.boxed()
        });
        assert!(matches!(lookup, Lookup::Pending { data: None, .. }));

        cache.set(&key, json!(2));
        assert!(!cache.settle(&key, first, &Ok(json!(1)), 0));
        assert_eq!(cache.get(&key), Some(json!(2)));
        assert_eq!(cache.stats().discarded, 1);
    }

    #[tokio::test]
    async fn fetch_settling_after_clear_is_discarded() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["auth", "user"]);
        let mut seq = 0;
        let _ = cache.lookup_or_begin(&key, Duration::from_secs(60), |s| {
            seq = s;
            async { Ok::<_, Error>(json!("ada")) }.boxed()
        });
        cache.clear();
        assert!(!cache.settle(&key, seq, &Ok(json!("ada")), 0));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn invalidation_detaches_inflight() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["practice", "goals"]);
        let _ = cache.lookup_or_begin(&key, Duration::from_secs(60), ready(json!([])));
        assert!(cache.state(&key).unwrap().is_fetching);

        assert_eq!(cache.invalidate(&QueryKey::from(["practice"])), 1);
        let state = cache.state(&key).unwrap();
        assert!(!state.is_fetching);
        assert!(state.is_stale);

        let mut started = false;
        let _ = cache.lookup_or_begin(&key, Duration::from_secs(60), |_| {
            started = true;
            async { Ok::<_, Error>(json!([])) }.boxed()
        });
        assert!(started);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_tells_invalidated_from_aged() {
        let cache = QueryCache::new();
        let window = Duration::from_secs(30);
        let aged = QueryKey::from(["practice", "stats"]);
        let invalidated = QueryKey::from(["practice", "goals"]);
        cache.set(&aged, json!(1));
        cache.set(&invalidated, json!(2));
        cache.invalidate(&invalidated);
        tokio::time::advance(Duration::from_secs(31)).await;

        let lookup = cache.lookup_or_begin(&aged, window, ready(json!(3)));
        assert!(matches!(
            lookup,
            Lookup::Pending { data: Some(_), invalidated: false, .. }
        ));
        let lookup = cache.lookup_or_begin(&invalidated, window, ready(json!(4)));
        assert!(matches!(
            lookup,
            Lookup::Pending { data: Some(_), invalidated: true, .. }
        ));
    }

    #[tokio::test]
    async fn failure_keeps_previous_value() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["vocabulary", "tags"]);
        cache.set(&key, json!(["th"]));
        cache.invalidate(&key);
        let mut seq = 0;
        let _ = cache.lookup_or_begin(&key, Duration::from_secs(60), |s| {
            seq = s;
            async { Ok::<_, Error>(json!(null)) }.boxed()
        });
        let err = Error::Api(crate::transport::ApiError::new("down").with_status(503));
        assert!(cache.settle(&key, seq, &Err(err.clone()), 4));

        let state = cache.state(&key).unwrap();
        assert_eq!(state.data, Some(json!(["th"])));
        assert_eq!(state.error, Some(err));
        assert_eq!(state.failure_count, 4);
        assert!(state.is_stale);
    }

    #[tokio::test]
    async fn update_matching_only_touches_prefix() {
        let cache = QueryCache::new();
        cache.set(&QueryKey::from(["vocabulary", "words", "a"]), json!(1));
        cache.set(&QueryKey::from(["vocabulary", "words", "b"]), json!(2));
        cache.set(&QueryKey::from(["vocabulary", "word", "a"]), json!(3));

        let n = cache.update_matching(&QueryKey::from(["vocabulary", "words"]), |_, v| {
            v.as_i64().map(|n| json!(n * 10))
        });
        assert_eq!(n, 2);
        assert_eq!(cache.get(&QueryKey::from(["vocabulary", "words", "b"])), Some(json!(20)));
        assert_eq!(cache.get(&QueryKey::from(["vocabulary", "word", "a"])), Some(json!(3)));
    }

    #[tokio::test]
    async fn events_are_broadcast() {
        let cache = QueryCache::new();
        let mut rx = cache.events();
        let key = QueryKey::from(["practice", "stats"]);
        cache.set(&key, json!({}));
        cache.remove(&QueryKey::from(["practice"]));
        assert_eq!(
            rx.recv().await.unwrap(),
            CacheEvent {
                key: key.clone(),
                kind: CacheEventKind::Updated
            }
        );
        assert_eq!(rx.recv().await.unwrap().kind, CacheEventKind::Removed);
    }
}
