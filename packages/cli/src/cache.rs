use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// In-memory response cache with a fixed TTL and stale-if-error reads.
pub struct ResponseCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> ResponseCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The cached value if it was stored less than `ttl` ago.
    pub async fn get_fresh(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries.lock().await.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn invalidate_all(&self) {
        self.entries.lock().await.clear();
    }

    /// Serve a fresh entry, otherwise run `fetch`. When `fetch` fails and an
    /// expired entry exists, the expired entry is returned instead.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        if let Some(value) = self.get_fresh(&key).await {
            tracing::debug!(?key, "Cache hit");
            return Ok(value);
        }

        match fetch().await {
            Ok(value) => {
                self.insert(key, value.clone()).await;
                Ok(value)
            }
            Err(e) => {
                let entries = self.entries.lock().await;
                match entries.get(&key) {
                    Some(stale) => {
                        tracing::warn!(?key, error = %e, "Fetch failed, serving stale entry");
                        Ok(stale.value.clone())
                    }
                    None => Err(e),
                }
            }
        }
    }
}
