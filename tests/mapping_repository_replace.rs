//! Integration coverage for the anime-mapping repository's replace-on-conflict
//! guarantee across both backends: storing `(a, t)` with `replace=true` must
//! evict any row sharing either side before inserting.

use amc2::domain::entities::AnimeMapping;
use amc2::domain::repositories::AnimeMappingRepository;
use amc2::infrastructure::mapping::{DocumentAnimeMappingRepository, SqliteAnimeMappingRepository};
use amc2::infrastructure::object_store::FilesystemObjectStore;

#[tokio::test]
async fn sqlite_backend_evicts_conflicting_rows_on_replace() {
    let repo = SqliteAnimeMappingRepository::connect("sqlite::memory:").await.unwrap();

    repo.store(&[AnimeMapping::new("42", "T1111S1")], true).await.unwrap();
    repo.store(&[AnimeMapping::new("99", "T1234S1")], true).await.unwrap();

    repo.store(&[AnimeMapping::new("42", "T1234S1")], true).await.unwrap();

    assert_eq!(repo.resolve_tmdb(&AnimeMapping::anidb_only("42")).await.unwrap(), vec![AnimeMapping::new("42", "T1234S1")]);
    assert!(repo.resolve_tmdb(&AnimeMapping::anidb_only("99")).await.unwrap().is_empty());
    assert!(repo.resolve_anidb(&AnimeMapping::tmdb_only("T1111S1")).await.unwrap().is_empty());
}

#[tokio::test]
async fn document_backend_evicts_conflicting_rows_on_replace_and_persists() {
    let tempdir = tempfile::tempdir().unwrap();
    let store = std::sync::Arc::new(FilesystemObjectStore::new(tempdir.path()));
    let repo = DocumentAnimeMappingRepository::new(store.clone());

    repo.store(&[AnimeMapping::new("42", "T1111S1")], true).await.unwrap();
    repo.store(&[AnimeMapping::new("42", "T1234S1")], true).await.unwrap();

    assert_eq!(repo.dump().await.unwrap(), vec![AnimeMapping::new("42", "T1234S1")]);

    // A fresh repository over the same backing store must observe the
    // persisted replacement, not an in-memory artifact of the first handle.
    let reloaded = DocumentAnimeMappingRepository::new(store);
    assert_eq!(reloaded.dump().await.unwrap(), vec![AnimeMapping::new("42", "T1234S1")]);
}
