//! Service context (component V): everything a caller of the title matcher
//! or anime merger needs, built once from [`Config`] and held behind `Arc`s.
//! There is no global/lazily-initialized business state; `once_cell` is
//! only used elsewhere for compiling static regexes.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::repositories::{AnimeMappingRepository, AnimeRepository, ObjectStore, TitleRepository};
use crate::infrastructure::anidb::http_store::{AnidbAnimeSpec, AnidbImageSpec, AnidbTitlesSpec};
use crate::infrastructure::anidb::{AnidbAnimeRepository, InMemoryTitleRepository, OverlayTitleRepository, XmlIndexTitleRepository};
use crate::infrastructure::mapping::factory::anime_mapping_repo;
use crate::infrastructure::object_store::{object_store_factory, CachedObjectStore, SingleFileObjectStore};
use crate::infrastructure::object_store::http::HttpObjectStore;
use crate::infrastructure::tmdb::{TmdbImageStore, TmdbShowStore, TmdbTitleSearch};
use crate::shared::config::Config;
use crate::shared::error::ConfigError;

const ANIDB_REQUEST_INTERVAL: Duration = Duration::from_secs(4);
const ANIDB_ERROR_BACKOFF: Duration = Duration::from_secs(30 * 60);
const TMDB_REQUEST_INTERVAL: Duration = Duration::from_millis(250);
const TMDB_ERROR_BACKOFF: Duration = Duration::from_secs(15 * 60);
const TMDB_IMAGE_ERROR_BACKOFF: Duration = Duration::from_secs(30 * 60);

const ANIDB_TITLES_OBJECT_NAME: &str = "anime-titles.xml";

#[derive(Clone)]
pub struct ServiceContext {
    pub anidb_titles: Arc<dyn TitleRepository>,
    pub anidb_anime: Arc<dyn AnimeRepository>,
    pub tmdb_titles: Arc<dyn TitleRepository>,
    pub tmdb_anime: Arc<dyn AnimeRepository>,
    pub anime_mapping: Arc<dyn AnimeMappingRepository>,
    pub anidb_images: Arc<dyn ObjectStore>,
    pub tmdb_images: Arc<dyn ObjectStore>,
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] crate::infrastructure::object_store::FactoryError),

    #[error(transparent)]
    Mapping(#[from] crate::infrastructure::mapping::factory::MappingFactoryError),
}

/// A tmdb anime repository: fetches by stripping the `T`/`S` wrapping off
/// the identifier and delegating to the tmdb show store.
struct TmdbAnimeRepository {
    store: Arc<dyn ObjectStore>,
}

#[async_trait::async_trait]
impl AnimeRepository for TmdbAnimeRepository {
    async fn get(&self, aid: &str) -> Result<Option<crate::domain::entities::AnimeEntry>, crate::shared::error::AppError> {
        let show_id = aid.trim_start_matches('T').split('S').next().unwrap_or(aid);
        let object_name = format!("en/{show_id}.json");
        match self.store.get(&object_name).await {
            Ok(obj) => {
                let anime = crate::infrastructure::tmdb::parse_tmdb_show(show_id, &obj.data)?;
                Ok(Some(crate::domain::entities::AnimeEntry {
                    anime,
                    age: chrono::Utc::now(),
                }))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(crate::shared::error::AppError::Store(e)),
        }
    }
}

impl ServiceContext {
    pub async fn build(config: &Config) -> Result<Self, ContextError> {
        let anidb_titles_upstream: Arc<dyn ObjectStore> = Arc::new(SingleFileObjectStore::new(
            Box::new(HttpObjectStore::new(
                Box::new(AnidbTitlesSpec::new(config.anidb_titles_url.clone())),
                ANIDB_REQUEST_INTERVAL,
                ANIDB_ERROR_BACKOFF,
            )),
            ANIDB_TITLES_OBJECT_NAME,
        ));
        let anidb_titles_cache = object_store_factory_url(&config.anidb_titles_cache_url)?;
        let anidb_titles_store: Arc<dyn ObjectStore> = Arc::new(CachedObjectStore::new(
            anidb_titles_upstream,
            anidb_titles_cache,
            config.anidb_titles_cache_time.as_secs() as i64,
        ));

        // The xml index is the read-through base layer; a plain in-memory
        // table sits on top to hold manually stored "extra" titles that
        // augment (never replace) what the index parses from the dump.
        let manual_titles = Arc::new(InMemoryTitleRepository::new());
        let xml_index = Arc::new(XmlIndexTitleRepository::new(anidb_titles_store, ANIDB_TITLES_OBJECT_NAME));
        let anidb_titles: Arc<dyn TitleRepository> = Arc::new(OverlayTitleRepository::new(xml_index, manual_titles));

        let anidb_anime_upstream: Arc<dyn ObjectStore> = Arc::new(HttpObjectStore::new(
            Box::new(AnidbAnimeSpec::new(config.anidb_api_url.clone())),
            ANIDB_REQUEST_INTERVAL,
            ANIDB_ERROR_BACKOFF,
        ));
        let anidb_anime_cache = object_store_factory_url(&config.anidb_api_cache_url)?;
        let anidb_anime_store: Arc<dyn ObjectStore> = Arc::new(CachedObjectStore::new(
            anidb_anime_upstream,
            anidb_anime_cache,
            config.anidb_api_cache_time.as_secs() as i64,
        ));
        let anidb_anime: Arc<dyn AnimeRepository> = Arc::new(AnidbAnimeRepository::new(
            anidb_anime_store,
            anidb_titles.clone(),
            ANIDB_ERROR_BACKOFF,
        ));

        let anidb_image_upstream: Arc<dyn ObjectStore> = Arc::new(HttpObjectStore::new(
            Box::new(AnidbImageSpec::new(config.anidb_image_url.clone())),
            ANIDB_REQUEST_INTERVAL,
            ANIDB_ERROR_BACKOFF,
        ));
        let anidb_image_cache = object_store_factory_url(&config.anidb_image_cache_url)?;
        let anidb_images: Arc<dyn ObjectStore> = Arc::new(CachedObjectStore::new(
            anidb_image_upstream,
            anidb_image_cache,
            config.anidb_image_cache_time.as_secs() as i64,
        ));

        let tmdb_show_upstream: Arc<dyn ObjectStore> = Arc::new(TmdbShowStore::new(
            tmdb_api_base(),
            config.tmdb_api_key.clone(),
            TMDB_REQUEST_INTERVAL,
            TMDB_ERROR_BACKOFF,
        ));
        let tmdb_api_cache = object_store_factory_url(&config.tmdb_api_cache_url)?;
        let tmdb_show_store: Arc<dyn ObjectStore> = Arc::new(CachedObjectStore::new(
            tmdb_show_upstream,
            tmdb_api_cache,
            config.tmdb_api_cache_time.as_secs() as i64,
        ));
        let tmdb_anime: Arc<dyn AnimeRepository> = Arc::new(TmdbAnimeRepository { store: tmdb_show_store });

        let tmdb_titles: Arc<dyn TitleRepository> = Arc::new(TmdbTitleSearch::new(
            tmdb_api_base(),
            config.tmdb_api_key.clone(),
            TMDB_REQUEST_INTERVAL,
            TMDB_ERROR_BACKOFF,
        ));

        let tmdb_image_upstream: Arc<dyn ObjectStore> = Arc::new(TmdbImageStore::new(
            tmdb_api_base(),
            config.tmdb_api_key.clone(),
            TMDB_REQUEST_INTERVAL,
            TMDB_IMAGE_ERROR_BACKOFF,
        ));
        let tmdb_image_cache = object_store_factory_url(&config.tmdb_image_cache_url)?;
        let tmdb_images: Arc<dyn ObjectStore> = Arc::new(CachedObjectStore::new(
            tmdb_image_upstream,
            tmdb_image_cache,
            config.tmdb_image_cache_time.as_secs() as i64,
        ));

        let anime_mapping = anime_mapping_repo(config.anime_mapping_url.as_str()).await?;

        Ok(ServiceContext {
            anidb_titles,
            anidb_anime,
            tmdb_titles,
            tmdb_anime,
            anime_mapping,
            anidb_images,
            tmdb_images,
        })
    }
}

fn object_store_factory_url(url: &crate::infrastructure::url::Url) -> Result<Arc<dyn ObjectStore>, crate::infrastructure::object_store::FactoryError> {
    object_store_factory(url.as_str())
}

fn tmdb_api_base() -> crate::infrastructure::url::Url {
    crate::infrastructure::url::Url::parse("https://api.themoviedb.org/3").expect("static tmdb api base always parses")
}
