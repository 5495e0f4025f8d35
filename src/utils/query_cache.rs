use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use moka::future::Cache;

use crate::error::AppError;

/// Read-through cache keyed by logical query identity.
///
/// Writers call [`QueryCache::invalidate`] after a successful mutation so the next read goes back
/// to the store. Concurrent misses on one key share a single fetch. Failed fetches are never cached.
#[derive(Clone)]
pub struct QueryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    inner: Cache<K, V>,
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, max_capacity: u64, ttl: Duration) -> Self {
        Self {
            name,
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AppError>>,
    {
        let name = self.name;
        tracing::debug!(cache = name, ?key, "Cache lookup");
        self.inner
            .try_get_with(key, async move {
                tracing::debug!(cache = name, "Cache miss");
                fetch().await
            })
            .await
            .map_err(AppError::from)
    }

    pub async fn invalidate(&self, key: &K) {
        tracing::debug!(cache = self.name, ?key, "Cache invalidated");
        self.inner.invalidate(key).await;
    }
}
