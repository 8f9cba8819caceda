//! Object store backends (components C/D/E/F/G) and the URL-scheme factory
//! that picks one.

pub mod cached;
pub mod filesystem;
pub mod http;
pub mod null;
pub mod s3;
pub mod single_file;

pub use cached::CachedObjectStore;
pub use filesystem::FilesystemObjectStore;
pub use null::NullObjectStore;
pub use s3::S3ObjectStore;
pub use single_file::SingleFileObjectStore;

use std::sync::Arc;

use crate::domain::repositories::ObjectStore;
use crate::infrastructure::url::Url;

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error(transparent)]
    Url(#[from] crate::infrastructure::url::UrlParseError),

    #[error("scheme '{0}' is an upstream HTTP store and must be constructed by its owning module")]
    HttpSchemeNotHandled(String),
}

/// Builds a concrete store from a URL's scheme: `file://`/bare path →
/// filesystem, `s3://`/`s3s://` → S3, `null://` → discard-everything.
/// HTTP(S) schemes are not handled here since every HTTP store needs
/// request-shape knowledge that is specific to the upstream (anidb titles,
/// anidb anime, anidb images, tmdb show, tmdb images) — those are
/// constructed directly by their owning module.
pub fn object_store_factory(location: &str) -> Result<Arc<dyn ObjectStore>, FactoryError> {
    if location.starts_with('/') {
        return Ok(Arc::new(FilesystemObjectStore::new(location)));
    }

    let url = Url::parse(location)?;
    match url.scheme() {
        "file" => Ok(Arc::new(FilesystemObjectStore::new(
            url.as_str().trim_start_matches("file://"),
        ))),
        "s3" => Ok(Arc::new(S3ObjectStore::from_url(&url, false))),
        "s3s" => Ok(Arc::new(S3ObjectStore::from_url(&url, true))),
        "null" => Ok(Arc::new(NullObjectStore)),
        other => Err(FactoryError::HttpSchemeNotHandled(other.to_string())),
    }
}
