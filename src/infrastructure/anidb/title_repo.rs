//! Title repository backends (components H/I): an in-process relational
//! table, an overlay composing a read-only base with a writable upper layer,
//! and a refresh-timer wrapper that keeps a base in sync with the anidb
//! titles dump.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::entities::{Title, TitleEntry};
use crate::domain::repositories::{ObjectStore, TitleRepository};
use crate::shared::error::RepositoryError;

use super::titles_xml::parse_titles_xml;

/// An in-memory relational title table. Used both as the writable "extras"
/// upper layer and, in tests, as a standalone repository.
pub struct InMemoryTitleRepository {
    rows: Mutex<Vec<TitleEntry>>,
}

impl InMemoryTitleRepository {
    pub fn new() -> Self {
        InMemoryTitleRepository { rows: Mutex::new(Vec::new()) }
    }
}

impl Default for InMemoryTitleRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_query(entry: &TitleEntry, query: &Title) -> bool {
    let t = &entry.title;
    (query.aid.is_empty() || query.aid == t.aid)
        && (query.lang.is_empty() || query.lang == t.lang)
        && (query.r#type.is_empty() || query.r#type == t.r#type)
        && (query.value.is_empty() || query.value == t.value)
}

#[async_trait]
impl TitleRepository for InMemoryTitleRepository {
    async fn find(&self, title: &Title) -> Result<Vec<TitleEntry>, RepositoryError> {
        if title.is_empty_query() {
            return Ok(Vec::new());
        }
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|e| matches_query(e, title)).cloned().collect())
    }

    async fn store(&self, entry: TitleEntry) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().await;
        rows.retain(|e| {
            !(e.title.aid == entry.title.aid
                && e.title.r#type == entry.title.r#type
                && e.title.lang == entry.title.lang
                && e.title.value == entry.title.value)
        });
        rows.push(entry);
        Ok(())
    }

    async fn purge(&self) -> Result<(), RepositoryError> {
        self.rows.lock().await.clear();
        Ok(())
    }

    async fn remove(&self, title: &Title) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().await;
        rows.retain(|e| !matches_query(e, title));
        Ok(())
    }
}

/// Composes a read-only `base` with a writable `upper`: reads union both,
/// writes and removes target `upper` only.
pub struct OverlayTitleRepository {
    base: Arc<dyn TitleRepository>,
    upper: Arc<dyn TitleRepository>,
}

impl OverlayTitleRepository {
    pub fn new(base: Arc<dyn TitleRepository>, upper: Arc<dyn TitleRepository>) -> Self {
        OverlayTitleRepository { base, upper }
    }
}

#[async_trait]
impl TitleRepository for OverlayTitleRepository {
    async fn find(&self, title: &Title) -> Result<Vec<TitleEntry>, RepositoryError> {
        if title.is_empty_query() {
            return Ok(Vec::new());
        }
        let mut rows = self.base.find(title).await?;
        rows.extend(self.upper.find(title).await?);
        Ok(rows)
    }

    async fn store(&self, entry: TitleEntry) -> Result<(), RepositoryError> {
        self.upper.store(entry).await
    }

    async fn purge(&self) -> Result<(), RepositoryError> {
        self.upper.purge().await
    }

    async fn remove(&self, title: &Title) -> Result<(), RepositoryError> {
        self.upper.remove(title).await
    }
}

struct RefreshState {
    valid_until: i64,
}

/// Wraps an in-memory title table with a wall-clock refresh timer: when the
/// "valid-until" deadline has passed, the table is purged and reloaded from
/// `anime-titles.xml` through the given object store before the read
/// proceeds. `purge()` on this wrapper itself is a no-op — purging only
/// happens as part of the reload cycle.
pub struct XmlIndexTitleRepository {
    table: InMemoryTitleRepository,
    store: Arc<dyn ObjectStore>,
    object_name: String,
    state: Mutex<RefreshState>,
}

impl XmlIndexTitleRepository {
    pub fn new(store: Arc<dyn ObjectStore>, object_name: impl Into<String>) -> Self {
        XmlIndexTitleRepository {
            table: InMemoryTitleRepository::new(),
            store,
            object_name: object_name.into(),
            state: Mutex::new(RefreshState { valid_until: 0 }),
        }
    }

    async fn refresh_if_stale(&self) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let now = Utc::now().timestamp();
        if now < state.valid_until {
            return Ok(());
        }

        let obj = self.store.get(&self.object_name).await?;
        let entries = parse_titles_xml(&obj.data).map_err(|e| RepositoryError::InvalidId(e.to_string()))?;

        self.table.purge().await?;
        let now_dt = Utc::now();
        let count = entries.len();
        for title in entries {
            self.table.store(TitleEntry::new(title).with_age(now_dt)).await?;
        }

        let stat = obj.stat();
        state.valid_until = stat.expiry_time();
        info!(aid_count = count, "anidb title index refreshed");
        Ok(())
    }
}

#[async_trait]
impl TitleRepository for XmlIndexTitleRepository {
    async fn find(&self, title: &Title) -> Result<Vec<TitleEntry>, RepositoryError> {
        if title.is_empty_query() {
            return Ok(Vec::new());
        }
        self.refresh_if_stale().await?;
        self.table.find(title).await
    }

    async fn store(&self, entry: TitleEntry) -> Result<(), RepositoryError> {
        self.table.store(entry).await
    }

    async fn purge(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn remove(&self, title: &Title) -> Result<(), RepositoryError> {
        self.table.remove(title).await
    }
}
