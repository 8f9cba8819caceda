//! Season — a numbered grouping of episodes within an Anime.
//!
//! Shares every field with [`super::anime::Anime`] except that it carries
//! `episodes` where Anime carries `seasons`; the two are kept as separate
//! structs rather than one generic type because the parsers build them at
//! different points (a Season is always produced from or merged into
//! exactly one Anime) and sharing a type would blur that.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::episode::Episode;
use super::image::{CastRole, Credit, Image, Rating};
use super::title::Title;

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Season {
    pub id: String,
    pub number: i64,
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
    pub episodes: Vec<Episode>,
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

impl Season {
    pub fn new(id: impl Into<String>, number: i64) -> Self {
        Season {
            id: id.into(),
            number,
            ..Default::default()
        }
    }

    /// Sorts `episodes` ascending by number; the source enforces this as a
    /// validator on every assignment, so every mutator here re-sorts rather
    /// than trusting callers to insert in order.
    pub fn sort_episodes(&mut self) {
        self.episodes.sort_by_key(|e| e.number);
    }

    pub fn find_episode_by_number(&self, number: i64) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.number == number)
    }
}
