//! Document anime-mapping repository (component L): the authoritative copy
//! lives as one JSON array on an object store; an in-memory relational cache
//! is loaded lazily and rewritten in full on every mutation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::entities::AnimeMapping;
use crate::domain::repositories::{AnimeMappingRepository, ObjectStore};
use crate::domain::value_objects::Persisted;
use crate::shared::error::RepositoryError;

const DOCUMENT_NAME: &str = "anime-mapping.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MappingRow {
    anidb: String,
    tmdb: String,
}

impl From<&AnimeMapping> for MappingRow {
    fn from(m: &AnimeMapping) -> Self {
        MappingRow {
            anidb: m.anidb.clone(),
            tmdb: m.tmdb.clone(),
        }
    }
}

impl From<MappingRow> for AnimeMapping {
    fn from(r: MappingRow) -> Self {
        AnimeMapping::new(r.anidb, r.tmdb)
    }
}

struct Cache {
    loaded: bool,
    rows: Vec<AnimeMapping>,
}

pub struct DocumentAnimeMappingRepository {
    store: Arc<dyn ObjectStore>,
    cache: Mutex<Cache>,
}

impl DocumentAnimeMappingRepository {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        DocumentAnimeMappingRepository {
            store,
            cache: Mutex::new(Cache {
                loaded: false,
                rows: Vec::new(),
            }),
        }
    }

    /// Loads the document on first access. A missing object is success with
    /// an empty cache; a decode failure is logged and treated the same way
    /// rather than surfaced, since the document is this repository's own
    /// write-back format and a corrupt copy should not block new writes.
    async fn ensure_loaded(&self, cache: &mut Cache) {
        if cache.loaded {
            return;
        }
        match self.store.get(DOCUMENT_NAME).await {
            Ok(obj) => match serde_json::from_slice::<Vec<MappingRow>>(&obj.data) {
                Ok(rows) => cache.rows = rows.into_iter().map(AnimeMapping::from).collect(),
                Err(e) => {
                    warn!(error = %e, "anime mapping document failed to decode, starting empty");
                    cache.rows = Vec::new();
                }
            },
            Err(e) if e.is_not_found() => cache.rows = Vec::new(),
            Err(e) => {
                warn!(error = %e, "anime mapping document failed to load, starting empty");
                cache.rows = Vec::new();
            }
        }
        cache.loaded = true;
    }

    async fn persist(&self, cache: &Cache) -> Result<(), RepositoryError> {
        let rows: Vec<MappingRow> = cache.rows.iter().map(MappingRow::from).collect();
        let json = serde_json::to_vec_pretty(&rows).expect("mapping rows always serialize");
        self.store
            .put(DOCUMENT_NAME, Persisted::new("application/json", json))
            .await
            .map_err(RepositoryError::from)
    }
}

#[async_trait]
impl AnimeMappingRepository for DocumentAnimeMappingRepository {
    async fn resolve_tmdb(&self, query: &AnimeMapping) -> Result<Vec<AnimeMapping>, RepositoryError> {
        if query.anidb.is_empty() {
            return Err(RepositoryError::InvalidId("resolve_tmdb requires anidb".into()));
        }
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;
        Ok(cache.rows.iter().filter(|r| r.anidb == query.anidb).cloned().collect())
    }

    async fn resolve_anidb(&self, query: &AnimeMapping) -> Result<Vec<AnimeMapping>, RepositoryError> {
        if query.tmdb.is_empty() {
            return Err(RepositoryError::InvalidId("resolve_anidb requires tmdb".into()));
        }
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;
        Ok(cache.rows.iter().filter(|r| r.tmdb == query.tmdb).cloned().collect())
    }

    async fn load(&self, query: &AnimeMapping) -> Result<Option<AnimeMapping>, RepositoryError> {
        if query.anidb.is_empty() || query.tmdb.is_empty() {
            return Err(RepositoryError::InvalidId("load requires both anidb and tmdb".into()));
        }
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;
        Ok(cache
            .rows
            .iter()
            .find(|r| r.anidb == query.anidb && r.tmdb == query.tmdb)
            .cloned())
    }

    async fn store(&self, values: &[AnimeMapping], replace: bool) -> Result<(), RepositoryError> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;

        for value in values {
            if replace {
                cache.rows.retain(|r| r.anidb != value.anidb && r.tmdb != value.tmdb);
            }
            if !cache.rows.contains(value) {
                cache.rows.push(value.clone());
            }
        }
        self.persist(&cache).await
    }

    async fn remove(&self, value: &AnimeMapping) -> Result<(), RepositoryError> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;

        cache.rows.retain(|r| {
            let anidb_matches = value.anidb.is_empty() || r.anidb == value.anidb;
            let tmdb_matches = value.tmdb.is_empty() || r.tmdb == value.tmdb;
            !(anidb_matches && tmdb_matches)
        });
        self.persist(&cache).await
    }

    async fn dump(&self) -> Result<Vec<AnimeMapping>, RepositoryError> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;
        Ok(cache.rows.clone())
    }

    async fn purge(&self) -> Result<(), RepositoryError> {
        let mut cache = self.cache.lock().await;
        cache.loaded = true;
        cache.rows.clear();
        self.persist(&cache).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::object_store::filesystem::FilesystemObjectStore;
    use tempfile::TempDir;

    fn repo(dir: &TempDir) -> DocumentAnimeMappingRepository {
        let store = Arc::new(FilesystemObjectStore::new(dir.path()));
        DocumentAnimeMappingRepository::new(store)
    }

    #[tokio::test]
    async fn missing_document_loads_as_empty() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        assert!(repo.dump().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_then_load_roundtrips_through_the_file() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.store(&[AnimeMapping::new("1", "T10S1")], false).await.unwrap();

        let store2 = Arc::new(FilesystemObjectStore::new(dir.path()));
        let repo2 = DocumentAnimeMappingRepository::new(store2);
        let rows = repo2.dump().await.unwrap();
        assert_eq!(rows, vec![AnimeMapping::new("1", "T10S1")]);
    }

    #[tokio::test]
    async fn corrupt_document_is_tolerated_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DOCUMENT_NAME), b"not json").unwrap();
        let repo = repo(&dir);
        assert!(repo.dump().await.unwrap().is_empty());
    }
}
