//! Relational anime-mapping repository (component L): confirmed
//! `(anidb, tmdb)` pairs held in a sqlite table, primary keyed on the pair.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::entities::AnimeMapping;
use crate::domain::repositories::AnimeMappingRepository;
use crate::shared::error::RepositoryError;

#[derive(sqlx::FromRow)]
struct MappingRow {
    anidb_id: String,
    tmdb_id: String,
}

impl From<MappingRow> for AnimeMapping {
    fn from(row: MappingRow) -> Self {
        AnimeMapping::new(row.anidb_id, row.tmdb_id)
    }
}

pub struct SqliteAnimeMappingRepository {
    pool: SqlitePool,
}

impl SqliteAnimeMappingRepository {
    pub async fn connect(url: &str) -> Result<Self, RepositoryError> {
        let pool = SqlitePool::connect(url).await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS anime_mapping (
                anidb_id TEXT NOT NULL,
                tmdb_id TEXT NOT NULL,
                PRIMARY KEY (anidb_id, tmdb_id)
            )",
        )
        .execute(&pool)
        .await?;
        Ok(SqliteAnimeMappingRepository { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        SqliteAnimeMappingRepository { pool }
    }
}

#[async_trait]
impl AnimeMappingRepository for SqliteAnimeMappingRepository {
    async fn resolve_tmdb(&self, query: &AnimeMapping) -> Result<Vec<AnimeMapping>, RepositoryError> {
        if query.anidb.is_empty() {
            return Err(RepositoryError::InvalidId("resolve_tmdb requires anidb".into()));
        }
        let rows: Vec<MappingRow> = sqlx::query_as(
            "SELECT anidb_id, tmdb_id FROM anime_mapping WHERE anidb_id = ?",
        )
        .bind(&query.anidb)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AnimeMapping::from).collect())
    }

    async fn resolve_anidb(&self, query: &AnimeMapping) -> Result<Vec<AnimeMapping>, RepositoryError> {
        if query.tmdb.is_empty() {
            return Err(RepositoryError::InvalidId("resolve_anidb requires tmdb".into()));
        }
        let rows: Vec<MappingRow> = sqlx::query_as(
            "SELECT anidb_id, tmdb_id FROM anime_mapping WHERE tmdb_id = ?",
        )
        .bind(&query.tmdb)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AnimeMapping::from).collect())
    }

    async fn load(&self, query: &AnimeMapping) -> Result<Option<AnimeMapping>, RepositoryError> {
        if query.anidb.is_empty() || query.tmdb.is_empty() {
            return Err(RepositoryError::InvalidId("load requires both anidb and tmdb".into()));
        }
        let row: Option<MappingRow> = sqlx::query_as(
            "SELECT anidb_id, tmdb_id FROM anime_mapping WHERE anidb_id = ? AND tmdb_id = ?",
        )
        .bind(&query.anidb)
        .bind(&query.tmdb)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(AnimeMapping::from))
    }

    async fn store(&self, values: &[AnimeMapping], replace: bool) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        for value in values {
            if replace {
                sqlx::query("DELETE FROM anime_mapping WHERE anidb_id = ? OR tmdb_id = ?")
                    .bind(&value.anidb)
                    .bind(&value.tmdb)
                    .execute(&mut *tx)
                    .await?;
            }
            sqlx::query(
                "INSERT INTO anime_mapping (anidb_id, tmdb_id) VALUES (?, ?)
                 ON CONFLICT(anidb_id, tmdb_id) DO NOTHING",
            )
            .bind(&value.anidb)
            .bind(&value.tmdb)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, value: &AnimeMapping) -> Result<(), RepositoryError> {
        match (value.anidb.is_empty(), value.tmdb.is_empty()) {
            (false, false) => {
                sqlx::query("DELETE FROM anime_mapping WHERE anidb_id = ? AND tmdb_id = ?")
                    .bind(&value.anidb)
                    .bind(&value.tmdb)
                    .execute(&self.pool)
                    .await?;
            }
            (false, true) => {
                sqlx::query("DELETE FROM anime_mapping WHERE anidb_id = ?")
                    .bind(&value.anidb)
                    .execute(&self.pool)
                    .await?;
            }
            (true, false) => {
                sqlx::query("DELETE FROM anime_mapping WHERE tmdb_id = ?")
                    .bind(&value.tmdb)
                    .execute(&self.pool)
                    .await?;
            }
            (true, true) => {}
        }
        Ok(())
    }

    async fn dump(&self) -> Result<Vec<AnimeMapping>, RepositoryError> {
        let rows: Vec<MappingRow> = sqlx::query_as("SELECT anidb_id, tmdb_id FROM anime_mapping")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(AnimeMapping::from).collect())
    }

    async fn purge(&self) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM anime_mapping").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteAnimeMappingRepository {
        SqliteAnimeMappingRepository::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn replace_deletes_rows_matching_either_side_first() {
        let repo = repo().await;
        repo.store(&[AnimeMapping::new("1", "T10S1")], true).await.unwrap();
        repo.store(&[AnimeMapping::new("1", "T20S1")], true).await.unwrap();

        let rows = repo.resolve_tmdb(&AnimeMapping::anidb_only("1")).await.unwrap();
        assert_eq!(rows, vec![AnimeMapping::new("1", "T20S1")]);
    }

    #[tokio::test]
    async fn remove_with_only_anidb_deletes_all_matching_rows() {
        let repo = repo().await;
        repo.store(&[AnimeMapping::new("1", "T10S1"), AnimeMapping::new("1", "T10S2")], false)
            .await
            .unwrap();
        repo.remove(&AnimeMapping::anidb_only("1")).await.unwrap();
        assert!(repo.resolve_tmdb(&AnimeMapping::anidb_only("1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_requires_both_fields() {
        let repo = repo().await;
        assert!(repo.load(&AnimeMapping::anidb_only("1")).await.is_err());
    }
}
