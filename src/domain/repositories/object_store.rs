//! The object store trait (component C): `stat`, `get`, `put` on opaque
//! string names. Concrete stores live under `infrastructure::object_store`;
//! this trait is the seam everything else (cached store, HTTP fetcher,
//! title/anime repositories) programs against.

use async_trait::async_trait;

use crate::domain::value_objects::{Persisted, PersistedStat};
use crate::shared::error::StoreError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError>;
    async fn get(&self, name: &str) -> Result<Persisted, StoreError>;
    async fn put(&self, name: &str, obj: Persisted) -> Result<(), StoreError>;
}
