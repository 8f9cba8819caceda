//! AnimeMapping — a confirmed `(anidb, tmdb-season)` pair, and the
//! intermediate TitleMappingResult the title matcher produces on the way
//! to one.

use super::title::Title;

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct AnimeMapping {
    pub anidb: String,
    pub tmdb: String,
}

impl AnimeMapping {
    pub fn new(anidb: impl Into<String>, tmdb: impl Into<String>) -> Self {
        AnimeMapping {
            anidb: anidb.into(),
            tmdb: tmdb.into(),
        }
    }

    pub fn anidb_only(anidb: impl Into<String>) -> Self {
        AnimeMapping {
            anidb: anidb.into(),
            tmdb: String::new(),
        }
    }

    pub fn tmdb_only(tmdb: impl Into<String>) -> Self {
        AnimeMapping {
            anidb: String::new(),
            tmdb: tmdb.into(),
        }
    }
}

/// One candidate cross-catalog pairing surfaced by the title matcher
/// (component M). `is_from_match` marks a strict title-equality hit;
/// `is_from_storage` marks a result read straight from the mapping
/// repository. Both are advisory to the caller, who should persist a
/// `is_from_match` result via the mapping repository.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TitleMappingResult {
    pub anidb: Title,
    pub tmdb: Title,
    pub is_from_match: bool,
    pub is_from_storage: bool,
}

impl TitleMappingResult {
    pub fn new(anidb: Title, tmdb: Title) -> Self {
        TitleMappingResult {
            anidb,
            tmdb,
            is_from_match: false,
            is_from_storage: false,
        }
    }

    pub fn matched(mut self) -> Self {
        self.is_from_match = true;
        self
    }

    pub fn from_storage(mut self) -> Self {
        self.is_from_storage = true;
        self
    }
}
