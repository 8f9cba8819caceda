//! Picks a mapping repository backend from the `ANIME_MAPPING_URL`
//! configuration value: `sqlite://…` selects the relational variant,
//! anything else is handed to the object store factory for the document
//! variant.

use std::sync::Arc;

use crate::domain::repositories::AnimeMappingRepository;
use crate::infrastructure::object_store::object_store_factory;

use super::document::DocumentAnimeMappingRepository;
use super::relational::SqliteAnimeMappingRepository;

#[derive(Debug, thiserror::Error)]
pub enum MappingFactoryError {
    #[error(transparent)]
    Repository(#[from] crate::shared::error::RepositoryError),

    #[error(transparent)]
    Store(#[from] crate::infrastructure::object_store::FactoryError),
}

pub async fn anime_mapping_repo(url: &str) -> Result<Arc<dyn AnimeMappingRepository>, MappingFactoryError> {
    if url.starts_with("sqlite:") {
        let repo = SqliteAnimeMappingRepository::connect(url).await?;
        return Ok(Arc::new(repo));
    }

    let store = object_store_factory(url)?;
    Ok(Arc::new(DocumentAnimeMappingRepository::new(store)))
}
