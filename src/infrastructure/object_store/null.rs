//! NullObjectStore — discards every write, reports every read as absent.

use async_trait::async_trait;

use crate::domain::repositories::ObjectStore;
use crate::domain::value_objects::{Persisted, PersistedStat};
use crate::shared::error::StoreError;

pub struct NullObjectStore;

#[async_trait]
impl ObjectStore for NullObjectStore {
    async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
        Err(StoreError::not_found(name, "null store"))
    }

    async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
        Err(StoreError::not_found(name, "null store"))
    }

    async fn put(&self, _name: &str, _obj: Persisted) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_always_miss() {
        let store = NullObjectStore;
        assert!(store.get("anything").await.is_err());
        assert!(store.stat("anything").await.is_err());
    }

    #[tokio::test]
    async fn writes_are_discarded_silently() {
        let store = NullObjectStore;
        let obj = Persisted::new("text/plain", "x");
        assert!(store.put("anything", obj).await.is_ok());
    }
}
