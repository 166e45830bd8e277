//! Query client: fetch, read, patch and invalidate cached reads.

use super::backend::{CacheEvent, CacheEventKind, CacheStats, Lookup, QueryCache, QueryState};
use super::key::QueryKey;
use super::options::{QueryOptions, RetryPolicy};
use crate::{Error, Result};
use futures::FutureExt;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Shared handle on the process-wide cache. Cloning is cheap.
#[derive(Clone)]
pub struct QueryClient {
    cache: Arc<QueryCache>,
    defaults: QueryOptions,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryOptions::default())
    }
}

impl QueryClient {
    pub fn new(defaults: QueryOptions) -> Self {
        Self {
            cache: Arc::new(QueryCache::new()),
            defaults,
        }
    }

    pub fn defaults(&self) -> &QueryOptions {
        &self.defaults
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Return cached data while fresh; otherwise wait for a fetch, joining
    /// one already running for this key. A failed fetch is returned as is.
    pub async fn fetch_query<T, F, Fut>(&self, key: QueryKey, options: &QueryOptions, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        match self.lookup(&key, options, fetcher) {
            Lookup::Fresh(value) => decode(&key, value),
            Lookup::Pending { fetch, .. } => decode(&key, fetch.await?),
        }
    }

    /// Stale-while-revalidate read.
    ///
    /// Data past its staleness window is returned at once and refreshed in a
    /// background task. A cold key, or one that was explicitly invalidated,
    /// waits for the refresh. When that refresh fails and a previous value is
    /// cached, the previous value is returned and the error is recorded in
    /// [`QueryState`]; 401/403 failures are always returned.
    pub async fn read<T, F, Fut>(&self, key: QueryKey, options: &QueryOptions, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        match self.lookup(&key, options, fetcher) {
            Lookup::Fresh(value) => decode(&key, value),
            Lookup::Pending {
                data: Some(value),
                fetch,
                invalidated: false,
            } => {
                tokio::spawn(fetch.map(|_| ()));
                decode(&key, value)
            }
            Lookup::Pending { data, fetch, .. } => match (fetch.await, data) {
                (Ok(value), _) => decode(&key, value),
                (Err(err), Some(previous)) if !is_auth_failure(&err) => {
                    debug!(key = %key, error = %err, "refresh failed; serving cached value");
                    decode(&key, previous)
                }
                (Err(err), _) => Err(err),
            },
        }
    }

    fn lookup<T, F, Fut>(&self, key: &QueryKey, options: &QueryOptions, fetcher: F) -> Lookup
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        let retry = options.retry.clone();
        let owned_key = key.clone();
        self.cache.lookup_or_begin(key, options.stale_time, move |seq| {
            async move {
                let (result, failures) = fetch_with_retry(&owned_key, &retry, &fetcher).await;
                cache.settle(&owned_key, seq, &result, failures);
                result
            }
            .boxed()
        })
    }

    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.cache.get(key)?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key = %key, error = %e, "cached value does not match requested type");
                None
            }
        }
    }

    pub fn set_query_data<T: Serialize + ?Sized>(&self, key: &QueryKey, data: &T) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.cache.set(key, value);
        Ok(())
    }

    /// Patch the cached value at `key`, if present and of type `T`. Returns
    /// whether anything was written.
    pub fn update_query_data<T, F>(&self, key: &QueryKey, f: F) -> bool
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        self.cache.update(key, |current| {
            let current: T = serde_json::from_value(current?.clone()).ok()?;
            serde_json::to_value(f(current)).ok()
        })
    }

    /// Like [`update_query_data`](Self::update_query_data), but `f` also runs
    /// when nothing usable is cached and its result is always written.
    pub fn upsert_query_data<T, F>(&self, key: &QueryKey, f: F) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> T,
    {
        let mut failure = None;
        self.cache.update(key, |current| {
            let current = current.and_then(|v| serde_json::from_value(v.clone()).ok());
            match serde_json::to_value(f(current)) {
                Ok(value) => Some(value),
                Err(e) => {
                    failure = Some(e);
                    None
                }
            }
        });
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Patch every cached value under `prefix` that decodes as `T`. `f`
    /// returns `None` to leave an entry untouched.
    pub fn update_queries_data<T, F>(&self, prefix: &QueryKey, mut f: F) -> usize
    where
        T: Serialize + DeserializeOwned,
        F: FnMut(&QueryKey, T) -> Option<T>,
    {
        self.cache.update_matching(prefix, |key, value| {
            let current: T = serde_json::from_value(value.clone()).ok()?;
            serde_json::to_value(f(key, current)?).ok()
        })
    }

    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        self.cache.invalidate(prefix)
    }

    pub fn remove_queries(&self, prefix: &QueryKey) -> usize {
        self.cache.remove(prefix)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn query_state(&self, key: &QueryKey) -> Option<QueryState> {
        self.cache.state(key)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.query_state(key).map(|s| s.is_fetching).unwrap_or(false)
    }

    /// Events for keys under `prefix`, plus every `Cleared`.
    pub fn subscribe(&self, prefix: impl Into<QueryKey>) -> QuerySubscription {
        QuerySubscription {
            prefix: prefix.into(),
            rx: self.cache.events(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Receiver half of [`QueryClient::subscribe`]. Dropping it unsubscribes.
pub struct QuerySubscription {
    prefix: QueryKey,
    rx: broadcast::Receiver<CacheEvent>,
}

impl QuerySubscription {
    pub fn prefix(&self) -> &QueryKey {
        &self.prefix
    }

    /// Next matching event, or `None` once the cache is gone.
    pub async fn recv(&mut self) -> Option<CacheEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(prefix = %self.prefix, skipped, "cache subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<CacheEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    fn matches(&self, event: &CacheEvent) -> bool {
        event.kind == CacheEventKind::Cleared || event.key.starts_with(&self.prefix)
    }
}

async fn fetch_with_retry<T, F, Fut>(key: &QueryKey, policy: &RetryPolicy, fetcher: &F) -> (Result<Value>, u32)
where
    T: Serialize,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut failures = 0u32;
    loop {
        let attempt = fetcher()
            .await
            .and_then(|data| serde_json::to_value(data).map_err(Error::from));
        match attempt {
            Ok(value) => return (Ok(value), failures),
            Err(err) => {
                failures += 1;
                if !policy.should_retry(failures, &err) {
                    warn!(key = %key, failures, error = %err, "query failed");
                    return (Err(err), failures);
                }
                let delay = policy.delay(failures - 1);
                debug!(key = %key, failures, delay_ms = delay.as_millis() as u64, "retrying query");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn is_auth_failure(err: &Error) -> bool {
    err.api().is_some_and(|api| api.is_auth_failure())
}

fn decode<T: DeserializeOwned>(key: &QueryKey, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        warn!(key = %key, error = %e, "failed to decode cached value");
        Error::from(e)
    })
}
