//! Crate-wide error types.
//!
//! One `thiserror` enum per concern, mirroring the boundaries in the domain:
//! object stores erase most failures to `ObjectNotFound`/`WriteNotSupported`
//! (see [`StoreError`]), parsing keeps its own distinct kind so corruption is
//! never mistaken for absence, and everything funnels into [`AppError`] at
//! the crate's public entry points.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {name} ({reason})")]
    ObjectNotFound { name: String, reason: String },

    #[error("store does not support writes: {name}")]
    WriteNotSupported { name: String },
}

impl StoreError {
    pub fn not_found(name: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::ObjectNotFound {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn write_not_supported(name: impl Into<String>) -> Self {
        StoreError::WriteNotSupported { name: name.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::ObjectNotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed xml in '{name}': {source}")]
    Xml {
        name: String,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("malformed json in '{name}': {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected content in '{name}': {reason}")]
    Semantic { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no suitable main title in group for aid '{aid}'")]
    NoMainTitle { aid: String },

    #[error("title query must set at least one field")]
    EmptyQuery,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing or invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::ObjectNotFound {
            name: e.url().map(|u| u.to_string()).unwrap_or_default(),
            reason: e.to_string(),
        }
    }
}
