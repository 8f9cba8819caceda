//! Episode — a single installment within a season.

use chrono::NaiveDate;

use super::image::{Image, Rating};
use super::title::Title;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Episode {
    pub number: i64,
    pub length: i64,
    pub airdate: NaiveDate,
    pub titles: Vec<Title>,
    pub summary: String,
    pub images: Vec<Image>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

impl Episode {
    pub fn new(number: i64, airdate: NaiveDate) -> Self {
        Episode {
            number,
            length: 0,
            airdate,
            titles: Vec::new(),
            summary: String::new(),
            images: Vec::new(),
            ratings: Vec::new(),
        }
    }
}
