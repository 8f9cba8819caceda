//! S3ObjectStore — an S3-compatible backend (component E) addressed by
//! `s3://host[:port]/bucket/prefix` or `s3s://…` (TLS) store-location URLs.
//!
//! Metadata rides in `Content-Type` and the `x-amz-meta-last-modified` /
//! `x-amz-meta-last-fetched` headers. A zero-byte object is this backend's
//! convention for a hole left by a failed write, so it is reported as
//! `ObjectNotFound` rather than an empty blob.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use rusty_s3::{actions::S3Action, Bucket, Credentials, UrlStyle};

use crate::domain::repositories::ObjectStore;
use crate::domain::value_objects::{Persisted, PersistedStat};
use crate::infrastructure::url::Url as StoreUrl;
use crate::shared::error::StoreError;

const PRESIGN_TTL: StdDuration = StdDuration::from_secs(60);
const HEADER_LAST_MODIFIED: &str = "x-amz-meta-last-modified";
const HEADER_LAST_FETCHED: &str = "x-amz-meta-last-fetched";

pub struct S3ObjectStore {
    bucket: Bucket,
    credentials: Credentials,
    prefix: String,
    client: reqwest::Client,
}

impl S3ObjectStore {
    /// Builds a store from a `s3://`/`s3s://` store-location URL: the first
    /// path segment names the bucket, the remainder becomes a key prefix.
    /// Credentials come from `S3_ACCESS_KEY`/`S3_SECRET_KEY` since the
    /// store-location URL itself carries no secret material.
    pub fn from_url(url: &StoreUrl, tls: bool) -> Self {
        let host = url.host().unwrap_or("localhost");
        let endpoint = match url.port() {
            Some(port) => format!("{}://{host}:{port}", if tls { "https" } else { "http" }),
            None => format!("{}://{host}", if tls { "https" } else { "http" }),
        };
        let endpoint = url::Url::parse(&endpoint).expect("host/scheme always form a valid url");

        let mut parts = url.path_parts().into_iter();
        let bucket_name = parts.next().unwrap_or_default();
        let prefix = parts.collect::<Vec<_>>().join("/");

        let bucket = Bucket::new(endpoint, UrlStyle::Path, bucket_name, "us-east-1")
            .expect("valid s3 endpoint and bucket name");

        let credentials = Credentials::new(
            std::env::var("S3_ACCESS_KEY").unwrap_or_default(),
            std::env::var("S3_SECRET_KEY").unwrap_or_default(),
        );

        S3ObjectStore {
            bucket,
            credentials,
            prefix,
            client: reqwest::Client::new(),
        }
    }

    fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.trim_start_matches('/').to_string()
        } else {
            format!("{}/{}", self.prefix, name.trim_start_matches('/'))
        }
    }

    async fn fetch(&self, name: &str) -> Result<reqwest::Response, StoreError> {
        let key = self.key(name);
        let action = self.bucket.get_object(Some(&self.credentials), &key);
        let url = action.sign(PRESIGN_TTL);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::not_found(name, e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(name, "no such key"));
        }
        if !resp.status().is_success() {
            return Err(StoreError::not_found(name, format!("status {}", resp.status())));
        }
        Ok(resp)
    }

    fn parse_header_i64(resp: &reqwest::Response, header: &str) -> i64 {
        resp.headers()
            .get(header)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn stat(&self, name: &str) -> Result<PersistedStat, StoreError> {
        let resp = self.fetch(name).await?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let last_modified = Self::parse_header_i64(&resp, HEADER_LAST_MODIFIED);
        let last_fetched = Self::parse_header_i64(&resp, HEADER_LAST_FETCHED);
        let size = resp.content_length().unwrap_or(0);

        if size == 0 {
            return Err(StoreError::not_found(name, "zero-byte object treated as absent"));
        }

        Ok(PersistedStat {
            content_type,
            last_modified,
            last_fetched,
            ttl: -1,
            size,
        })
    }

    async fn get(&self, name: &str) -> Result<Persisted, StoreError> {
        let resp = self.fetch(name).await?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let last_modified = Self::parse_header_i64(&resp, HEADER_LAST_MODIFIED);
        let last_fetched = Self::parse_header_i64(&resp, HEADER_LAST_FETCHED);

        let data = resp.bytes().await.map_err(|e| StoreError::not_found(name, e.to_string()))?;
        if data.is_empty() {
            return Err(StoreError::not_found(name, "zero-byte object treated as absent"));
        }

        Ok(Persisted {
            content_type,
            last_modified,
            last_fetched,
            ttl: -1,
            data,
        })
    }

    async fn put(&self, name: &str, obj: Persisted) -> Result<(), StoreError> {
        let key = self.key(name);
        let action = self.bucket.put_object(Some(&self.credentials), &key);
        let url = action.sign(PRESIGN_TTL);

        let resp = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, &obj.content_type)
            .header(HEADER_LAST_MODIFIED, obj.last_modified.to_string())
            .header(HEADER_LAST_FETCHED, obj.last_fetched.to_string())
            .body(obj.data)
            .send()
            .await
            .map_err(|e| StoreError::not_found(name, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(StoreError::not_found(name, format!("status {}", resp.status())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joins_prefix_and_name() {
        let url = StoreUrl::parse("s3://minio:9000/bucket/prefix").unwrap();
        let store = S3ObjectStore::from_url(&url, false);
        assert_eq!(store.key("anime/42.xml"), "prefix/anime/42.xml");
    }

    #[test]
    fn key_without_prefix_uses_name_verbatim() {
        let url = StoreUrl::parse("s3://minio:9000/bucket").unwrap();
        let store = S3ObjectStore::from_url(&url, false);
        assert_eq!(store.key("anime/42.xml"), "anime/42.xml");
    }
}
