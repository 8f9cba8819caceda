//! Tmdb image store (component 4.K.2): rate-limited like the show store,
//! but image bytes live under a different host than the API, learned from
//! `GET /configuration`. That lookup is refreshed at most once every two
//! days and throttled independently of the image fetches themselves.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::repositories::ObjectStore;
use crate::domain::value_objects::{Persisted, PersistedStat};
use crate::infrastructure::throttle::Throttler;
use crate::infrastructure::url::Url;
use crate::shared::error::StoreError;

const CONFIGURATION_REFRESH: Duration = Duration::from_secs(2 * 24 * 60 * 60);

struct ConfigurationCache {
    secure_base_url: Option<String>,
    fetched_at: Option<std::time::Instant>,
}

pub struct TmdbImageStore {
    api_base: Url,
    api_key: String,
    client: reqwest::Client,
    req_throttler: Throttler,
    err_throttler: Throttler,
    configuration: Mutex<ConfigurationCache>,
}

impl TmdbImageStore {
    pub fn new(api_base: Url, api_key: impl Into<String>, req_interval: Duration, err_interval: Duration) -> Self {
        TmdbImageStore {
            api_base,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            req_throttler: Throttler::new(req_interval),
            err_throttler: Throttler::new(err_interval),
            configuration: Mutex::new(ConfigurationCache {
                secure_base_url: None,
                fetched_at: None,
            }),
        }
    }

    /// Resolves `images.secure_base_url`, serving it from an in-process
    /// cache good for two days rather than pacing the lookup itself — the
    /// cache ttl, not a throttler, is what bounds the refresh cadence here.
    async fn secure_base_url(&self) -> Result<String, StoreError> {
        let mut cache = self.configuration.lock().await;
        let stale = match cache.fetched_at {
            Some(at) => at.elapsed() >= CONFIGURATION_REFRESH,
            None => true,
        };
        if !stale {
            if let Some(base) = &cache.secure_base_url {
                return Ok(base.clone());
            }
        }

        let url = self.api_base.joinpath(&["configuration"]).with_qs(&[("api_key", &self.api_key)]);
        let resp = self.client.get(url.as_str()).send().await.map_err(StoreError::from)?;
        if !resp.status().is_success() {
            return Err(StoreError::not_found(url.as_str(), format!("tmdb configuration status {}", resp.status())));
        }
        let body: serde_json::Value = resp.json().await.map_err(StoreError::from)?;
        let base = body
            .get("images")
            .and_then(|i| i.get("secure_base_url"))
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| StoreError::not_found(url.as_str(), "configuration response missing images.secure_base_url"))?
            .to_string();

        cache.secure_base_url = Some(base.clone());
        cache.fetched_at = Some(std::time::Instant::now());
        Ok(base)
    }

    async fn fetch(&self, name: &str) -> Result<reqwest::Response, StoreError> {
        let base = self.secure_base_url().await?;

        if !self.err_throttler.check().await {
            return Err(StoreError::not_found(name, "too many requests after last tmdb image error"));
        }
        self.req_throttler.wait().await;

        let url = format!("{}original/{}", base, name.trim_start_matches('/'));
        let resp = self.client.get(&url).send().await.map_err(StoreError::from)?;

        match resp.status() {
            s if s.is_success() => {
                self.err_throttler.reset().await;
                Ok(resp)
            }
            reqwest::StatusCode::NOT_FOUND => Err(StoreError::not_found(name, "404 not found")),
            other => {
                self.err_throttler.mark().await;
                Err(StoreError::not_found(name, format!("tmdb image status {other}")))
            }
        }
    }

    fn content_type(resp: &reqwest::Response) -> String {
        resp.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string()
    }
}

#[async_trait]
impl ObjectStore for TmdbImageStore {
    async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
        let resp = self.fetch(name).await?;
        Ok(PersistedStat {
            content_type: Self::content_type(&resp),
            last_modified: chrono::Utc::now().timestamp(),
            last_fetched: chrono::Utc::now().timestamp(),
            ttl: -1,
            size: resp.content_length().unwrap_or(0),
        })
    }

    async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
        let resp = self.fetch(name).await?;
        let content_type = Self::content_type(&resp);
        let now = chrono::Utc::now().timestamp();
        let data = resp.bytes().await.map_err(StoreError::from)?;
        Ok(Persisted {
            content_type,
            last_modified: now,
            last_fetched: now,
            ttl: -1,
            data,
        })
    }

    async fn put(&self, name: &str, _obj: Persisted) -> Result<(), StoreError> {
        Err(StoreError::write_not_supported(name))
    }
}
