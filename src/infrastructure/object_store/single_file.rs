//! SingleFileObjectStore — wraps an inner store but ignores the requested
//! name, always targeting one fixed file (used for the anidb titles dump,
//! which has no natural per-object key of its own).
//!
//! `stat` always reports a fresh `text/xml` result without touching the
//! backing file or the inner store's own metadata (this is deliberate, not a
//! placeholder — see the resolved Open Question on this in `DESIGN.md`).

use async_trait::async_trait;

use crate::domain::repositories::ObjectStore;
use crate::domain::value_objects::{Persisted, PersistedStat};
use crate::shared::error::StoreError;

pub struct SingleFileObjectStore {
    inner: Box<dyn ObjectStore>,
    fixed_name: String,
}

impl SingleFileObjectStore {
    pub fn new(inner: Box<dyn ObjectStore>, fixed_name: impl Into<String>) -> Self {
        SingleFileObjectStore {
            inner,
            fixed_name: fixed_name.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for SingleFileObjectStore {
    async fn stat(&self, _name: &str) -> Result<PersistedStat, StoreError> {
        Ok(PersistedStat {
            content_type: "text/xml".to_string(),
            last_modified: chrono::Utc::now().timestamp(),
            last_fetched: chrono::Utc::now().timestamp(),
            ttl: -1,
            size: 0,
        })
    }

    async fn get(&self, _name: &str) -> Result<Persisted, StoreError> {
        self.inner.get(&self.fixed_name).await
    }

    async fn put(&self, _name: &str, obj: Persisted) -> Result<(), StoreError> {
        self.inner.put(&self.fixed_name, obj).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::object_store::null::NullObjectStore;

    #[tokio::test]
    async fn stat_is_always_fresh_regardless_of_requested_name() {
        let store = SingleFileObjectStore::new(Box::new(NullObjectStore), "anime-titles.xml");
        let stat = store.stat("anything-at-all").await.unwrap();
        assert_eq!(stat.content_type, "text/xml");
        assert_eq!(stat.ttl, -1);
    }

    #[tokio::test]
    async fn get_ignores_requested_name_and_uses_fixed_name() {
        struct CapturingStore;

        #[async_trait]
        impl ObjectStore for CapturingStore {
            async fn stat(&self, _name: &str) -> Result<PersistedStat, StoreError> {
                unreachable!()
            }
            async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
                assert_eq!(name, "anime-titles.xml");
                Ok(Persisted::new("text/xml", "<animetitles/>"))
            }
            async fn put(&self, _name: &str, _obj: Persisted) -> Result<(), StoreError> {
                unreachable!()
            }
        }

        let store = SingleFileObjectStore::new(Box::new(CapturingStore), "anime-titles.xml");
        let got = store.get("whatever.xml").await.unwrap();
        assert_eq!(got.data.as_ref(), b"<animetitles/>");
    }
}
