//! Anime — the top-level normalized record, keyed by one of the four
//! identifier shapes (component O) depending on which catalog produced it.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::image::{CastRole, Credit, Image, Rating};
use super::season::Season;
use super::title::Title;

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Anime {
    pub id: String,
    #[serde(default)]
    pub uniqueids: HashMap<String, String>,
    #[serde(default)]
    pub titles: Vec<Title>,

    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub airdate: Option<NaiveDate>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub ratings: Vec<Rating>,

    #[serde(default)]
    pub cast: Vec<CastRole>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub credits: Vec<Credit>,
}

impl Anime {
    pub fn new(id: impl Into<String>) -> Self {
        Anime {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn sort_seasons(&mut self) {
        self.seasons.sort_by_key(|s| s.number);
    }

    pub fn find_season_by_number(&self, number: i64) -> Option<&Season> {
        self.seasons.iter().find(|s| s.number == number)
    }
}

/// An Anime as fetched from a repository, carrying the age of the cached
/// data it was built from (the underlying object's `last_modified`).
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeEntry {
    pub anime: Anime,
    pub age: DateTime<Utc>,
}
