//! AnimeRepository trait: the thin seam the anidb and tmdb anime
//! orchestration layers (components J/S and K) expose to the merger.

use async_trait::async_trait;

use crate::domain::entities::AnimeEntry;
use crate::shared::error::AppError;

#[async_trait]
pub trait AnimeRepository: Send + Sync {
    async fn get(&self, aid: &str) -> Result<Option<AnimeEntry>, AppError>;
}
