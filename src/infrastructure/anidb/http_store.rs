//! HTTP store specs for the three anidb upstreams: per-anime XML detail,
//! images, and the titles dump. Each is a thin [`HttpObjectStoreSpec`] that
//! plugs into the shared [`HttpObjectStore`] request policy.

use crate::infrastructure::object_store::http::HttpObjectStoreSpec;
use crate::infrastructure::url::Url;
use crate::shared::error::StoreError;

pub struct AnidbAnimeSpec {
    base: Url,
}

impl AnidbAnimeSpec {
    pub fn new(base: Url) -> Self {
        AnidbAnimeSpec { base }
    }
}

impl HttpObjectStoreSpec for AnidbAnimeSpec {
    fn make_url(&self, name: &str) -> Result<String, StoreError> {
        let aid = name.trim_end_matches(".xml");
        Ok(self.base.with_qs(&[("request", "anime"), ("aid", aid)]).as_str().to_string())
    }
}

pub struct AnidbImageSpec {
    base: Url,
}

impl AnidbImageSpec {
    pub fn new(base: Url) -> Self {
        AnidbImageSpec { base }
    }
}

impl HttpObjectStoreSpec for AnidbImageSpec {
    fn make_url(&self, name: &str) -> Result<String, StoreError> {
        Ok(self.base.joinpath(&[name]).as_str().to_string())
    }
}

/// Always targets the fixed titles dump path regardless of the name it is
/// asked for; meant to sit under a `SingleFileObjectStore`.
pub struct AnidbTitlesSpec {
    base: Url,
}

impl AnidbTitlesSpec {
    pub fn new(base: Url) -> Self {
        AnidbTitlesSpec { base }
    }
}

impl HttpObjectStoreSpec for AnidbTitlesSpec {
    fn make_url(&self, _name: &str) -> Result<String, StoreError> {
        Ok(self.base.as_str().to_string())
    }
}
