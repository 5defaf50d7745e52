//! Request-deduplicating response cache keyed by endpoint path.
//!
//! Every card resolves its own slice of data. Routing those reads through one
//! [`QueryCache`] means a page that shows the balance in three places still
//! issues a single `GET /api/finance/summary`, and concurrent renders share
//! the same in-flight request.
//!
//! Failures are never cached. Mutations call [`QueryCache::invalidate_prefix`]
//! so the next read goes back to the network.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;

use crate::error::FetchError;

type FetchResult = Result<Value, FetchError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

enum Slot {
    InFlight { generation: u64, fetch: SharedFetch },
    Ready { value: Value, fetched_at: Instant },
}

#[derive(Default)]
struct Inner {
    slots: HashMap<String, Slot>,
    next_generation: u64,
}

/// Shared cache of decoded JSON responses.
pub struct QueryCache {
    ttl: Duration,
    enabled: bool,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("ttl", &self.ttl)
            .field("enabled", &self.enabled)
            .field("entries", &self.lock().slots.len())
            .finish()
    }
}

impl QueryCache {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            ttl,
            enabled,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// A cache that always goes to the network.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, false)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached value for `key`, join an in-flight request for it,
    /// or start `fetch`.
    pub async fn get_or_fetch<F>(&self, key: &str, fetch: F) -> FetchResult
    where
        F: FnOnce() -> BoxFuture<'static, FetchResult> + Send,
    {
        if !self.enabled {
            return fetch().await;
        }

        let (generation, shared) = {
            let mut inner = self.lock();
            let existing = match inner.slots.get(key) {
                Some(Slot::Ready { value, fetched_at }) if fetched_at.elapsed() < self.ttl => {
                    tracing::trace!(key, "query cache hit");
                    return Ok(value.clone());
                }
                Some(Slot::InFlight { generation, fetch }) => {
                    tracing::trace!(key, "joining in-flight request");
                    Some((*generation, fetch.clone()))
                }
                _ => None,
            };

            if let Some(existing) = existing {
                existing
            } else {
                inner.next_generation += 1;
                let generation = inner.next_generation;
                let shared = fetch().shared();
                inner.slots.insert(
                    key.to_string(),
                    Slot::InFlight {
                        generation,
                        fetch: shared.clone(),
                    },
                );
                (generation, shared)
            }
        };

        let result = shared.await;

        let mut inner = self.lock();
        let still_current = matches!(
            inner.slots.get(key),
            Some(Slot::InFlight { generation: g, .. }) if *g == generation
        );
        if still_current {
            match &result {
                Ok(value) => {
                    inner.slots.insert(
                        key.to_string(),
                        Slot::Ready {
                            value: value.clone(),
                            fetched_at: Instant::now(),
                        },
                    );
                }
                Err(_) => {
                    inner.slots.remove(key);
                }
            }
        }
        result
    }

    /// Drop the entry for `key`.
    pub fn invalidate(&self, key: &str) {
        self.lock().slots.remove(key);
    }

    /// Drop every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) {
        let mut inner = self.lock();
        let before = inner.slots.len();
        inner.slots.retain(|k, _| !k.starts_with(prefix));
        tracing::debug!(
            prefix,
            dropped = before - inner.slots.len(),
            "query cache invalidated"
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        result: FetchResult,
    ) -> impl FnOnce() -> BoxFuture<'static, FetchResult> + Send + use<> {
        let calls = Arc::clone(calls);
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                result
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn fresh_entries_are_served_from_cache() {
        let cache = QueryCache::new(Duration::from_secs(60), true);
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_or_fetch("/a", counting_fetch(&calls, Ok(json!(1))))
            .await
            .unwrap();
        let second = cache
            .get_or_fetch("/a", counting_fetch(&calls, Ok(json!(2))))
            .await
            .unwrap();

        assert_eq!(first, json!(1));
        assert_eq!(second, json!(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_request() {
        let cache = QueryCache::new(Duration::from_secs(60), true);
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b, c) = tokio::join!(
            cache.get_or_fetch("/summary", counting_fetch(&calls, Ok(json!("x")))),
            cache.get_or_fetch("/summary", counting_fetch(&calls, Ok(json!("y")))),
            cache.get_or_fetch("/summary", counting_fetch(&calls, Ok(json!("z")))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), json!("x"));
        assert_eq!(b.unwrap(), json!("x"));
        assert_eq!(c.unwrap(), json!("x"));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60), true);
        let calls = Arc::new(AtomicUsize::new(0));

        let err = cache
            .get_or_fetch("/a", counting_fetch(&calls, Err(FetchError::Timeout)))
            .await;
        assert_eq!(err, Err(FetchError::Timeout));
        assert!(cache.is_empty());

        let ok = cache
            .get_or_fetch("/a", counting_fetch(&calls, Ok(json!(true))))
            .await;
        assert_eq!(ok, Ok(json!(true)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_prefix_forces_refetch() {
        let cache = QueryCache::new(Duration::from_secs(60), true);
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .get_or_fetch("/api/finance/budgets", counting_fetch(&calls, Ok(json!(1))))
            .await
            .unwrap();
        cache
            .get_or_fetch("/api/finance/summary", counting_fetch(&calls, Ok(json!(1))))
            .await
            .unwrap();
        cache.invalidate_prefix("/api/finance/budgets");
        assert_eq!(cache.len(), 1);

        let fresh = cache
            .get_or_fetch("/api/finance/budgets", counting_fetch(&calls, Ok(json!(2))))
            .await
            .unwrap();
        assert_eq!(fresh, json!(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn result_finishing_after_invalidation_is_discarded() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60), true));
        let calls = Arc::new(AtomicUsize::new(0));

        let reader = {
            let cache = Arc::clone(&cache);
            let fetch = counting_fetch(&calls, Ok(json!("stale")));
            tokio::spawn(async move { cache.get_or_fetch("/k", fetch).await })
        };
        tokio::time::sleep(Duration::from_millis(2)).await;
        cache.invalidate("/k");

        assert_eq!(reader.await.unwrap(), Ok(json!("stale")));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn disabled_cache_always_fetches() {
        let cache = QueryCache::disabled();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            cache
                .get_or_fetch("/a", counting_fetch(&calls, Ok(json!(0))))
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
