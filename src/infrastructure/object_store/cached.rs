//! CachedObjectStore (component G) — layers a writable cache in front of a
//! read-only (or read-write) upstream, favoring stale cached data over a
//! missing result whenever the upstream is unavailable.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::repositories::ObjectStore;
use crate::domain::value_objects::{Persisted, PersistedStat};
use crate::shared::error::StoreError;

pub struct CachedObjectStore {
    upstream: Arc<dyn ObjectStore>,
    cache: Arc<dyn ObjectStore>,
    ttu: i64,
    lock: Mutex<()>,
}

impl CachedObjectStore {
    pub fn new(upstream: Arc<dyn ObjectStore>, cache: Arc<dyn ObjectStore>, ttu: i64) -> Self {
        CachedObjectStore {
            upstream,
            cache,
            ttu,
            lock: Mutex::new(()),
        }
    }

    fn is_fresh(stat: &PersistedStat, ttu: i64, now: i64) -> bool {
        now < stat.last_fetched + ttu
    }
}

#[async_trait]
impl ObjectStore for CachedObjectStore {
    async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
        let _guard = self.lock.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Ok(cached) = self.cache.stat(name).await {
            if Self::is_fresh(&cached, self.ttu, now) {
                return Ok(cached.clamp_ttl(self.ttu));
            }
        }

        if let Ok(fresh) = self.upstream.stat(name).await {
            return Ok(fresh.clamp_ttl(self.ttu));
        }

        if let Ok(stale) = self.cache.stat(name).await {
            return Ok(stale.clamp_ttl(self.ttu));
        }

        Err(StoreError::not_found(name, "no cache entry and upstream unavailable"))
    }

    async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
        let _guard = self.lock.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Ok(cached) = self.cache.get(name).await {
            if Self::is_fresh(&cached.stat(), self.ttu, now) {
                return Ok(cached.clamp_ttl(self.ttu));
            }
        }

        if let Ok(fresh) = self.upstream.get(name).await {
            // A transient write failure to the cache must not fail the read:
            // the freshly fetched value is still returned to the caller.
            let _ = self.cache.put(name, fresh.clone()).await;
            return Ok(fresh.clamp_ttl(self.ttu));
        }

        if let Ok(stale) = self.cache.get(name).await {
            return Ok(stale.clamp_ttl(self.ttu));
        }

        Err(StoreError::not_found(name, "no cache entry and upstream unavailable"))
    }

    async fn put(&self, name: &str, obj: Persisted) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.upstream.put(name, obj.clone()).await?;
        let _ = self.cache.put(name, obj).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::object_store::null::NullObjectStore;
    use std::sync::Mutex as StdMutex;

    struct StaticStore {
        value: Option<Persisted>,
    }

    #[async_trait]
    impl ObjectStore for StaticStore {
        async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
            self.value.clone().map(|p| p.stat()).ok_or_else(|| StoreError::not_found(name, "empty"))
        }
        async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
            self.value.clone().ok_or_else(|| StoreError::not_found(name, "empty"))
        }
        async fn put(&self, _name: &str, _obj: Persisted) -> Result<(), StoreError> {
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
            Err(StoreError::not_found(name, "down"))
        }
        async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
            Err(StoreError::not_found(name, "down"))
        }
        async fn put(&self, name: &str, _obj: Persisted) -> Result<(), StoreError> {
            Err(StoreError::not_found(name, "down"))
        }
    }

    struct RecordingCache {
        inner: StdMutex<Option<Persisted>>,
    }

    #[async_trait]
    impl ObjectStore for RecordingCache {
        async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
            self.inner.lock().unwrap().clone().map(|p| p.stat()).ok_or_else(|| StoreError::not_found(name, "empty"))
        }
        async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
            self.inner.lock().unwrap().clone().ok_or_else(|| StoreError::not_found(name, "empty"))
        }
        async fn put(&self, _name: &str, obj: Persisted) -> Result<(), StoreError> {
            *self.inner.lock().unwrap() = Some(obj);
            Ok(())
        }
    }

    fn stale_object() -> Persisted {
        Persisted::new("text/xml", "stale").with_timestamps(0, 0)
    }

    #[tokio::test]
    async fn falls_back_to_stale_cache_when_upstream_fails() {
        let cache = Arc::new(StaticStore { value: Some(stale_object()) });
        let upstream = Arc::new(FailingStore);
        let store = CachedObjectStore::new(upstream, cache, 10);

        let got = store.get("x").await.unwrap();
        assert_eq!(got.data.as_ref(), b"stale");
    }

    #[tokio::test]
    async fn returns_not_found_when_both_layers_miss() {
        let cache = Arc::new(NullObjectStore);
        let upstream = Arc::new(FailingStore);
        let store = CachedObjectStore::new(upstream, cache, 10);

        assert!(store.get("x").await.is_err());
    }

    #[tokio::test]
    async fn write_through_only_happens_after_upstream_accepts() {
        let cache = Arc::new(RecordingCache { inner: StdMutex::new(None) });
        let upstream = Arc::new(FailingStore);
        let store = CachedObjectStore::new(upstream, cache.clone(), 10);

        let obj = Persisted::new("text/xml", "data");
        assert!(store.put("x", obj).await.is_err());
        assert!(cache.inner.lock().unwrap().is_none());
    }
}
