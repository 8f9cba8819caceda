//! Tmdb title search (component 4.K.1): a read-only [`TitleRepository`]
//! backed by `search/tv` plus a per-candidate `tv/<id>` fetch, used by the
//! title matcher to find tmdb candidates for a free-text query. Has
//! nothing to persist locally, so every mutating method is unsupported.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::entities::{Title, TitleEntry};
use crate::domain::repositories::TitleRepository;
use crate::infrastructure::throttle::Throttler;
use crate::infrastructure::url::Url;
use crate::shared::error::{RepositoryError, StoreError};

static SEASON_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^season\s+(\d+)$").unwrap());

pub struct TmdbTitleSearch {
    base: Url,
    api_key: String,
    client: reqwest::Client,
    req_throttler: Throttler,
    err_throttler: Throttler,
}

impl TmdbTitleSearch {
    pub fn new(base: Url, api_key: impl Into<String>, req_interval: std::time::Duration, err_interval: std::time::Duration) -> Self {
        TmdbTitleSearch {
            base,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            req_throttler: Throttler::new(req_interval),
            err_throttler: Throttler::new(err_interval),
        }
    }

    fn with_key(&self, url: Url) -> Url {
        url.with_qs(&[("api_key", &self.api_key)])
    }

    async fn fetch_json(&self, url: Url) -> Result<Option<Value>, StoreError> {
        if !self.err_throttler.check().await {
            return Err(StoreError::not_found(url.as_str(), "too many requests after last tmdb error"));
        }
        self.req_throttler.wait().await;

        let resp = self.client.get(url.as_str()).send().await.map_err(StoreError::from)?;
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

    async fn candidates(&self, query: &str) -> Result<Vec<String>, StoreError> {
        let url = self.with_key(self.base.joinpath(&["search", "tv"]).with_qs(&[("query", query)]));
        let Some(results) = self.fetch_json(url).await? else {
            return Ok(Vec::new());
        };
        Ok(results
            .get("results")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r.get("id").and_then(Value::as_u64))
                    .map(|id| id.to_string())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn season_title(show_name: &str, season: &Value) -> Option<(i64, String)> {
        let n = season.get("season_number").and_then(Value::as_i64)?;
        let name = season.get("name").and_then(Value::as_str).unwrap_or_default();
        if name.eq_ignore_ascii_case("specials") {
            return None;
        }
        if let Some(captures) = SEASON_NAME_RE.captures(name) {
            let captured: i64 = captures[1].parse().ok()?;
            if captured == n && n == 1 {
                return Some((n, show_name.to_string()));
            }
            return Some((n, format!("{show_name} {name}")));
        }
        Some((n, name.to_string()))
    }

    async fn titles_for_show(&self, show_id: &str) -> Result<Vec<Title>, StoreError> {
        let url = self.with_key(self.base.joinpath(&["tv", show_id]));
        let Some(show) = self.fetch_json(url).await? else {
            return Ok(Vec::new());
        };
        let show_name = show.get("name").and_then(Value::as_str).unwrap_or_default();
        let seasons = show.get("seasons").and_then(Value::as_array).cloned().unwrap_or_default();

        Ok(seasons
            .iter()
            .filter_map(|s| Self::season_title(show_name, s))
            .map(|(n, title)| Title::new(title).with_aid(format!("T{show_id}S{n}")).with_lang("en").with_type("main"))
            .collect())
    }
}

#[async_trait]
impl TitleRepository for TmdbTitleSearch {
    async fn find(&self, title: &Title) -> Result<Vec<TitleEntry>, RepositoryError> {
        if title.is_empty_query() || title.value.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.candidates(&title.value).await.map_err(RepositoryError::Store)?;
        let mut out = Vec::new();
        for show_id in candidates {
            let titles = self.titles_for_show(&show_id).await.map_err(RepositoryError::Store)?;
            out.extend(titles.into_iter().map(|t| TitleEntry::new(t).with_age(chrono::Utc::now())));
        }
        Ok(out)
    }

    async fn store(&self, _entry: TitleEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Store(StoreError::write_not_supported("tmdb title search")))
    }

    async fn purge(&self) -> Result<(), RepositoryError> {
        Err(RepositoryError::Store(StoreError::write_not_supported("tmdb title search")))
    }

    async fn remove(&self, _title: &Title) -> Result<(), RepositoryError> {
        Err(RepositoryError::Store(StoreError::write_not_supported("tmdb title search")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specials_season_is_skipped() {
        let season = serde_json::json!({"season_number": 0, "name": "Specials"});
        assert_eq!(TmdbTitleSearch::season_title("Show", &season), None);
    }

    #[test]
    fn generic_season_one_name_is_replaced_with_show_name() {
        let season = serde_json::json!({"season_number": 1, "name": "Season 1"});
        assert_eq!(TmdbTitleSearch::season_title("Show", &season), Some((1, "Show".to_string())));
    }

    #[test]
    fn generic_name_for_other_season_numbers_is_synthesized() {
        let season = serde_json::json!({"season_number": 2, "name": "Season 2"});
        assert_eq!(TmdbTitleSearch::season_title("Show", &season), Some((2, "Show Season 2".to_string())));
    }

    #[test]
    fn named_season_is_used_verbatim() {
        let season = serde_json::json!({"season_number": 3, "name": "The Final Arc"});
        assert_eq!(TmdbTitleSearch::season_title("Show", &season), Some((3, "The Final Arc".to_string())));
    }
}
