//! Tmdb show store (component K): composes one logical "show" JSON blob
//! from many endpoints under the configured API base. Every leaf GET shares
//! one rate-limited fetcher; `stat` never touches the network since a tmdb
//! response is always treated as current by definition.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::repositories::ObjectStore;
use crate::domain::value_objects::{Persisted, PersistedStat};
use crate::infrastructure::throttle::Throttler;
use crate::infrastructure::url::Url;
use crate::shared::error::StoreError;

pub struct TmdbShowStore {
    base: Url,
    api_key: String,
    client: reqwest::Client,
    req_throttler: Throttler,
    err_throttler: Throttler,
}

impl TmdbShowStore {
    pub fn new(base: Url, api_key: impl Into<String>, req_interval: std::time::Duration, err_interval: std::time::Duration) -> Self {
        TmdbShowStore {
            base,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            req_throttler: Throttler::new(req_interval),
            err_throttler: Throttler::new(err_interval),
        }
    }

    fn with_key(&self, url: &Url) -> Url {
        url.with_qs(&[("api_key", &self.api_key)])
    }

    /// One throttled leaf GET returning parsed JSON. 404s surface as `None`;
    /// anything else that is not 2xx marks the error throttler.
    async fn fetch_json(&self, url: Url) -> Result<Option<Value>, StoreError> {
        if !self.err_throttler.check().await {
            return Err(StoreError::not_found(url.as_str(), "too many requests after last tmdb error"));
        }
        self.req_throttler.wait().await;

        let resp = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(StoreError::from)?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            self.err_throttler.mark().await;
            return Err(StoreError::not_found(url.as_str(), format!("tmdb status {}", resp.status())));
        }

        self.err_throttler.reset().await;
        resp.json::<Value>().await.map(Some).map_err(StoreError::from)
    }

    async fn fetch_show(&self, id: &str, lang: &str) -> Result<Value, StoreError> {
        let mut url = self.base.joinpath(&["tv", id]);
        if lang != "en" && !lang.is_empty() {
            url = url.with_qs(&[("language", lang)]);
        }
        let mut root = self
            .fetch_json(self.with_key(&url))
            .await?
            .ok_or_else(|| StoreError::not_found(id, "tmdb show not found"))?;

        let images_url = self.base.joinpath(&["tv", id, "images"]).with_qs(&[("include_image_language", "en,null,ja")]);
        if let Some(images) = self.fetch_json(self.with_key(&images_url)).await? {
            root["images"] = images;
        }

        let alt_titles_url = self.base.joinpath(&["tv", id, "alternative_titles"]);
        if let Some(alt) = self.fetch_json(self.with_key(&alt_titles_url)).await? {
            root["alternative_titles"] = alt;
        }

        let seasons = root["seasons"].as_array().cloned().unwrap_or_default();
        let mut composed_seasons = Vec::new();
        for stub in seasons {
            let Some(n) = stub.get("season_number").and_then(Value::as_u64) else {
                composed_seasons.push(stub);
                continue;
            };
            composed_seasons.push(self.fetch_season(id, n).await?);
        }
        root["seasons"] = Value::Array(composed_seasons);

        Ok(root)
    }

    async fn fetch_season(&self, show_id: &str, n: u64) -> Result<Value, StoreError> {
        let season_path = format!("season/{n}");
        let season_url = self.base.joinpath(&["tv", show_id, season_path.as_str()]);
        let mut season = self
            .fetch_json(self.with_key(&season_url))
            .await?
            .unwrap_or_else(|| json!({ "season_number": n }));
        season["season_number"] = json!(n);

        let images_url = self.base.joinpath(&["tv", show_id, season_path.as_str(), "images"]);
        if let Some(images) = self.fetch_json(self.with_key(&images_url)).await? {
            season["images"] = images;
        }

        let credits_url = self.base.joinpath(&["tv", show_id, season_path.as_str(), "aggregate_credits"]);
        if let Some(credits) = self.fetch_json(self.with_key(&credits_url)).await? {
            season["credits"] = credits;
        }

        let episodes = season["episodes"].as_array().cloned().unwrap_or_default();
        let mut composed_episodes = Vec::new();
        for stub in episodes {
            let Some(e) = stub.get("episode_number").and_then(Value::as_u64) else {
                composed_episodes.push(stub);
                continue;
            };
            composed_episodes.push(self.fetch_episode(show_id, n, e).await?);
        }
        season["episodes"] = Value::Array(composed_episodes);

        Ok(season)
    }

    async fn fetch_episode(&self, show_id: &str, season: u64, episode: u64) -> Result<Value, StoreError> {
        let path = format!("season/{season}/episode/{episode}");
        let episode_url = self.base.joinpath(&["tv", show_id, path.as_str()]);
        let mut ep = self
            .fetch_json(self.with_key(&episode_url))
            .await?
            .unwrap_or_else(|| json!({ "episode_number": episode }));

        let images_url = self.base.joinpath(&["tv", show_id, path.as_str(), "images"]);
        if let Some(images) = self.fetch_json(self.with_key(&images_url)).await? {
            ep["images"] = images;
        }

        Ok(ep)
    }
}

#[async_trait]
impl ObjectStore for TmdbShowStore {
    async fn stat(&self, _name: &str) -> Result<PersistedStat, StoreError> {
        let now = chrono::Utc::now().timestamp();
        Ok(PersistedStat {
            content_type: "text/json".to_string(),
            last_modified: now,
            last_fetched: now,
            ttl: -1,
            size: 0,
        })
    }

    async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
        let (lang, id) = name
            .split_once('/')
            .map(|(lang, rest)| (lang, rest.trim_end_matches(".json")))
            .ok_or_else(|| StoreError::not_found(name, "expected '<lang>/<id>.json'"))?;

        let composed = self.fetch_show(id, lang).await?;
        let body = serde_json::to_vec(&composed).expect("composed tmdb json always serializes");
        let now = chrono::Utc::now().timestamp();
        Ok(Persisted {
            content_type: "text/json".to_string(),
            last_modified: now,
            last_fetched: now,
            ttl: -1,
            data: body.into(),
        })
    }

    async fn put(&self, name: &str, _obj: Persisted) -> Result<(), StoreError> {
        Err(StoreError::write_not_supported(name))
    }
}
