//! Structured store-location URL with path-join and query-merge helpers.
//!
//! Wraps the `url` crate rather than reimplementing percent-encoding and
//! parsing, but exposes the small, mutation-friendly surface the rest of the
//! codebase actually needs: appending path segments and merging query
//! parameters, both returning a new value instead of mutating in place.

use std::fmt;
use url::Url as InnerUrl;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url(InnerUrl);

#[derive(Debug, thiserror::Error)]
pub enum UrlParseError {
    #[error("unsupported scheme '{0}', expected one of http, https, s3, s3s, file, null")]
    UnsupportedScheme(String),

    #[error("invalid url: {0}")]
    Invalid(#[from] url::ParseError),
}

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "s3", "s3s", "file", "null"];

impl Url {
    pub fn parse(value: &str) -> Result<Self, UrlParseError> {
        let url = InnerUrl::parse(value)?;
        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(UrlParseError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(Url(url))
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn path_parts(&self) -> Vec<String> {
        self.0
            .path_segments()
            .map(|segs| segs.filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Returns a new `Url` with the given segments appended to the path.
    pub fn joinpath(&self, parts: &[&str]) -> Self {
        let mut out = self.0.clone();
        {
            let mut segs = out
                .path_segments_mut()
                .expect("base urls always support path segments");
            for part in parts {
                for piece in part.split('/').filter(|p| !p.is_empty()) {
                    segs.push(piece);
                }
            }
        }
        Url(out)
    }

    /// Returns a new `Url` with the given query parameters merged in,
    /// overwriting any existing parameter of the same name.
    pub fn with_qs(&self, pairs: &[(&str, &str)]) -> Self {
        let mut existing: Vec<(String, String)> = self
            .0
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        for (key, value) in pairs {
            existing.retain(|(k, _)| k != key);
            existing.push((key.to_string(), value.to_string()));
        }

        let mut out = self.0.clone();
        out.query_pairs_mut()
            .clear()
            .extend_pairs(existing.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Url(out)
    }

    pub fn query_value(&self, key: &str) -> Option<String> {
        self.0
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    pub fn port(&self) -> Option<u16> {
        self.0.port()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Url {
    type Err = UrlParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s)
    }
}
