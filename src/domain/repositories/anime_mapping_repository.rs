//! AnimeMappingRepository trait (component L): persists confirmed
//! `(anidb, tmdb-season)` pairs. Two backends share this interface: a
//! relational one (rows held in-process via sqlite) and a document one
//! (a single JSON file on an object store, lazily loaded into a relational
//! cache).

use async_trait::async_trait;

use crate::domain::entities::AnimeMapping;
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait AnimeMappingRepository: Send + Sync {
    /// Find the tmdb ids mapped to the given anidb id. `query.anidb` must
    /// be set.
    async fn resolve_tmdb(&self, query: &AnimeMapping) -> Result<Vec<AnimeMapping>, RepositoryError>;

    /// Find the anidb ids mapped to the given tmdb id. `query.tmdb` must
    /// be set.
    async fn resolve_anidb(&self, query: &AnimeMapping) -> Result<Vec<AnimeMapping>, RepositoryError>;

    /// Both fields of `query` must be set.
    async fn load(&self, query: &AnimeMapping) -> Result<Option<AnimeMapping>, RepositoryError>;

    /// When `replace` is true, any existing row matching `anidb OR tmdb`
    /// for each incoming value is deleted before the inserts, enforcing
    /// that a confirmed anidb id maps to at most one tmdb-season and vice
    /// versa.
    async fn store(&self, values: &[AnimeMapping], replace: bool) -> Result<(), RepositoryError>;

    /// Deletes every row matching the non-empty fields of `value`.
    async fn remove(&self, value: &AnimeMapping) -> Result<(), RepositoryError>;

    async fn dump(&self) -> Result<Vec<AnimeMapping>, RepositoryError>;

    async fn purge(&self) -> Result<(), RepositoryError>;
}
