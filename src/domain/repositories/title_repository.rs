//! TitleRepository trait (component H): a durable map keyed by
//! `(aid, type, lang, value)` with replace-on-conflict semantics.

use async_trait::async_trait;

use crate::domain::entities::{Title, TitleEntry};
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait TitleRepository: Send + Sync {
    /// An empty field in `title` means "no restriction on that field". A
    /// query where every field is empty must return `[]` without touching
    /// storage — listing the world is not allowed.
    async fn find(&self, title: &Title) -> Result<Vec<TitleEntry>, RepositoryError>;

    async fn store(&self, entry: TitleEntry) -> Result<(), RepositoryError>;

    async fn purge(&self) -> Result<(), RepositoryError>;

    async fn remove(&self, title: &Title) -> Result<(), RepositoryError>;
}
