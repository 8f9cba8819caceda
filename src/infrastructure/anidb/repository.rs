//! Anidb anime repository orchestration (component S): ties the anime
//! object store, the XML→Anime parser, and the title repository together.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use crate::domain::entities::{AnimeEntry, Title};
use crate::domain::repositories::{AnimeRepository, ObjectStore, TitleRepository};
use crate::infrastructure::throttle::Throttler;
use crate::shared::error::{AppError, ParseError, StoreError};

use super::error_xml::{classify_error_document, AnidbErrorKind};
use super::parser::parse_anime_xml;

pub struct AnidbAnimeRepository {
    store: Arc<dyn ObjectStore>,
    title_repo: Arc<dyn TitleRepository>,
    /// Dedicated to anidb's semantic `<error>` root, distinct from the
    /// HTTP-status-level error throttler the underlying store already owns.
    error_throttler: Throttler,
}

impl AnidbAnimeRepository {
    pub fn new(store: Arc<dyn ObjectStore>, title_repo: Arc<dyn TitleRepository>, error_backoff: std::time::Duration) -> Self {
        AnidbAnimeRepository {
            store,
            title_repo,
            error_throttler: Throttler::new(error_backoff),
        }
    }

    async fn has_indexed_title(&self, aid: &str) -> Result<bool, AppError> {
        let rows = self.title_repo.find(&Title::default().with_aid(aid)).await?;
        Ok(rows.iter().any(|e| e.title.r#type != "extra"))
    }

    async fn extra_titles(&self, aid: &str) -> Result<Vec<Title>, AppError> {
        let rows = self
            .title_repo
            .find(&Title::default().with_aid(aid).with_type("extra"))
            .await?;
        Ok(rows.into_iter().map(|e| e.title).collect())
    }
}

#[async_trait]
impl AnimeRepository for AnidbAnimeRepository {
    async fn get(&self, aid: &str) -> Result<Option<AnimeEntry>, AppError> {
        if !self.has_indexed_title(aid).await? {
            return Ok(None);
        }

        if !self.error_throttler.check().await {
            return Err(AppError::Store(StoreError::not_found(aid, "too many requests after last anidb error")));
        }

        let object_name = format!("{aid}.xml");
        let obj = match self.store.get(&object_name).await {
            Ok(obj) => obj,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(AppError::Store(e)),
        };

        if !obj.content_type.contains("xml") {
            return Err(AppError::Parse(ParseError::Semantic {
                name: object_name,
                reason: format!("unexpected content type '{}'", obj.content_type),
            }));
        }

        match classify_error_document(&obj.data) {
            Some(AnidbErrorKind::NotFound) => Ok(None),
            Some(AnidbErrorKind::Banned) => {
                self.error_throttler.mark().await;
                Err(AppError::Store(StoreError::not_found(aid, "anidb reports this client banned")))
            }
            Some(AnidbErrorKind::Unknown(reason)) => {
                self.error_throttler.mark().await;
                warn!(aid, reason, "anidb returned an unrecognized error document");
                Err(AppError::Parse(ParseError::Semantic { name: object_name, reason }))
            }
            None => {
                self.error_throttler.reset().await;
                let mut anime = parse_anime_xml(&obj.data)?;

                let extras = self.extra_titles(aid).await?;
                for title in extras {
                    let already_present = anime
                        .titles
                        .iter()
                        .any(|t| t.value == title.value && t.lang == title.lang && t.r#type == title.r#type);
                    if !already_present {
                        anime.titles.push(title);
                    }
                }

                Ok(Some(AnimeEntry {
                    anime,
                    age: chrono::DateTime::<Utc>::from_timestamp(obj.last_fetched, 0).unwrap_or_else(Utc::now),
                }))
            }
        }
    }
}
