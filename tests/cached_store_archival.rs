//! Integration coverage for the cached object store's read policy: a fresh
//! cache hit avoids upstream entirely, a failing upstream falls back to a
//! stale cached copy rather than surfacing an error, and a name with no
//! cached copy still reports not-found.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use amc2::domain::repositories::ObjectStore;
use amc2::domain::value_objects::{Persisted, PersistedStat};
use amc2::infrastructure::object_store::{CachedObjectStore, FilesystemObjectStore};
use amc2::shared::error::StoreError;
use async_trait::async_trait;

struct FlakyUpstream {
    calls: AtomicUsize,
    fail: std::sync::atomic::AtomicBool,
    body: &'static [u8],
}

#[async_trait]
impl ObjectStore for FlakyUpstream {
    async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
        self.get(name).await.map(|p| p.stat())
    }

    async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) || name != "k" {
            return Err(StoreError::not_found(name, "upstream unavailable"));
        }
        let now = chrono::Utc::now().timestamp();
        Ok(Persisted::new("text/plain", self.body).with_timestamps(now, now))
    }

    async fn put(&self, name: &str, _obj: Persisted) -> Result<(), StoreError> {
        Err(StoreError::write_not_supported(name))
    }
}

#[tokio::test]
async fn fresh_cache_entry_avoids_a_second_upstream_call() {
    let tempdir = tempfile::tempdir().unwrap();
    let cache: Arc<dyn ObjectStore> = Arc::new(FilesystemObjectStore::new(tempdir.path()));
    let upstream = Arc::new(FlakyUpstream {
        calls: AtomicUsize::new(0),
        fail: std::sync::atomic::AtomicBool::new(false),
        body: b"X",
    });
    let store = CachedObjectStore::new(upstream.clone(), cache, 600);

    let first = store.get("k").await.unwrap();
    assert_eq!(first.data.as_ref(), b"X");
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);

    let second = store.get("k").await.unwrap();
    assert_eq!(second.data.as_ref(), b"X");
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 1, "a fresh cache entry must not re-hit upstream");
}

#[tokio::test]
async fn falls_back_to_stale_cache_once_upstream_starts_failing() {
    let tempdir = tempfile::tempdir().unwrap();
    let cache: Arc<dyn ObjectStore> = Arc::new(FilesystemObjectStore::new(tempdir.path()));
    let upstream = Arc::new(FlakyUpstream {
        calls: AtomicUsize::new(0),
        fail: std::sync::atomic::AtomicBool::new(false),
        body: b"X",
    });
    // ttu=0: the cached entry is never considered fresh again once written,
    // forcing every later read through the archival branch.
    let store = CachedObjectStore::new(upstream.clone(), cache, 0);

    let got = store.get("k").await.unwrap();
    assert_eq!(got.data.as_ref(), b"X");

    upstream.fail.store(true, Ordering::SeqCst);

    let got = store.get("k").await.unwrap();
    assert_eq!(got.data.as_ref(), b"X", "a failing upstream must fall back to the stale cached copy");

    // A name that was never cached has nothing to fall back to.
    let err = store.get("k2").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn n_concurrent_misses_call_upstream_exactly_once() {
    let tempdir = tempfile::tempdir().unwrap();
    let cache: Arc<dyn ObjectStore> = Arc::new(FilesystemObjectStore::new(tempdir.path()));
    let upstream = Arc::new(FlakyUpstream {
        calls: AtomicUsize::new(0),
        fail: std::sync::atomic::AtomicBool::new(false),
        body: b"shared-body",
    });
    let store = Arc::new(CachedObjectStore::new(upstream.clone(), cache, 600));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.get("k").await.unwrap() }));
    }

    let mut bodies = Vec::new();
    for handle in handles {
        bodies.push(handle.await.unwrap().data);
    }

    assert!(bodies.iter().all(|b| b.as_ref() == b"shared-body"));
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
}
