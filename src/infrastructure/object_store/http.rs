//! HTTPObjectStore (component F) — a read-only store backed by a single
//! upstream HTTP(S) API. Concrete anidb/tmdb stores plug in how a name
//! becomes a request by implementing [`HttpObjectStoreSpec`]; this module
//! owns the shared request policy: error backoff, request pacing, redirect
//! following, and status-code handling.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDateTime;

use crate::domain::repositories::ObjectStore;
use crate::domain::value_objects::{Persisted, PersistedStat};
use crate::infrastructure::throttle::Throttler;
use crate::shared::error::StoreError;

/// What distinguishes one upstream HTTP store from another: how a logical
/// object name becomes a request. Everything else (throttling, status
/// handling, metadata extraction) is common and lives on [`HttpObjectStore`].
pub trait HttpObjectStoreSpec: Send + Sync {
    fn make_url(&self, name: &str) -> Result<String, StoreError>;

    fn make_headers(&self, _name: &str) -> Vec<(String, String)> {
        Vec::new()
    }
}

pub struct HttpObjectStore {
    spec: Box<dyn HttpObjectStoreSpec>,
    client: reqwest::Client,
    req_throttler: Throttler,
    err_throttler: Throttler,
}

impl HttpObjectStore {
    pub fn new(spec: Box<dyn HttpObjectStoreSpec>, req_interval: Duration, err_interval: Duration) -> Self {
        HttpObjectStore {
            spec,
            client: reqwest::Client::new(),
            req_throttler: Throttler::new(req_interval),
            err_throttler: Throttler::new(err_interval),
        }
    }

    /// Runs the shared pre-call policy (§4.F) and returns the response for
    /// the caller to interpret further.
    async fn fetch(&self, name: &str) -> Result<reqwest::Response, StoreError> {
        if !self.err_throttler.check().await {
            return Err(StoreError::not_found(name, "too many requests after last error"));
        }

        self.req_throttler.wait().await;

        let url = self.spec.make_url(name)?;
        let mut req = self.client.get(&url);
        for (key, value) in self.spec.make_headers(name) {
            req = req.header(key, value);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                self.err_throttler.mark().await;
                return Err(StoreError::not_found(name, e.to_string()));
            }
        };

        match resp.status() {
            s if s.is_success() => {
                self.err_throttler.reset().await;
                Ok(resp)
            }
            reqwest::StatusCode::NOT_FOUND => Err(StoreError::not_found(name, "404 not found")),
            other => {
                self.err_throttler.mark().await;
                Err(StoreError::not_found(name, format!("upstream status {other}")))
            }
        }
    }

    fn parse_last_modified(resp: &reqwest::Response) -> i64 {
        resp.headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%a, %d %b %Y %H:%M:%S GMT").ok())
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0)
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
impl ObjectStore for HttpObjectStore {
    async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
        let resp = self.fetch(name).await?;
        let content_type = Self::content_type(&resp);
        let last_modified = Self::parse_last_modified(&resp);
        let size = resp.content_length().unwrap_or(0);
        Ok(PersistedStat {
            content_type,
            last_modified,
            last_fetched: last_modified,
            ttl: -1,
            size,
        })
    }

    async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
        let resp = self.fetch(name).await?;
        let content_type = Self::content_type(&resp);
        let last_modified = Self::parse_last_modified(&resp);
        let data: Bytes = resp.bytes().await.map_err(|e| StoreError::not_found(name, e.to_string()))?;

        Ok(Persisted {
            content_type,
            last_modified,
            last_fetched: last_modified,
            ttl: -1,
            data,
        })
    }

    async fn put(&self, name: &str, _obj: Persisted) -> Result<(), StoreError> {
        Err(StoreError::write_not_supported(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedUrlSpec(String);

    impl HttpObjectStoreSpec for FixedUrlSpec {
        fn make_url(&self, _name: &str) -> Result<String, StoreError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn not_found_status_does_not_mark_error_throttler() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let spec = FixedUrlSpec(format!("{}/missing", server.uri()));
        let store = HttpObjectStore::new(Box::new(spec), Duration::ZERO, Duration::from_secs(60));

        assert!(store.get("missing").await.is_err());
        assert!(store.err_throttler.check().await);
    }

    #[tokio::test]
    async fn other_failure_marks_error_throttler() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let spec = FixedUrlSpec(format!("{}/broken", server.uri()));
        let store = HttpObjectStore::new(Box::new(spec), Duration::ZERO, Duration::from_secs(60));

        assert!(store.get("broken").await.is_err());
        assert!(!store.err_throttler.check().await);
    }

    #[tokio::test]
    async fn successful_response_resets_error_throttler() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("payload"))
            .mount(&server)
            .await;

        let spec = FixedUrlSpec(format!("{}/ok", server.uri()));
        let store = HttpObjectStore::new(Box::new(spec), Duration::ZERO, Duration::from_secs(60));
        store.err_throttler.mark().await;

        let got = store.get("ok").await.unwrap();
        assert_eq!(got.data.as_ref(), b"payload");
        assert!(store.err_throttler.check().await);
    }

    #[tokio::test]
    async fn put_is_never_supported() {
        let spec = FixedUrlSpec("http://example.invalid".to_string());
        let store = HttpObjectStore::new(Box::new(spec), Duration::ZERO, Duration::ZERO);
        let err = store.put("x", Persisted::new("text/plain", "x")).await.unwrap_err();
        assert!(matches!(err, StoreError::WriteNotSupported { .. }));
    }
}
