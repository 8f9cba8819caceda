//! AnidbTitleMatcher — the resolver algorithm (component M).
//!
//! Uses anidb as the primary source to find anime matching a free-text
//! title, then matches each candidate to a tmdb counterpart. The title can
//! point to multiple anidb entries, and each anidb entry can map to
//! multiple tmdb entries (seasons); disambiguation among the results is
//! left to the caller.
//!
//! The mapping repository is queried before the tmdb titles repository: if
//! every candidate anidb id already has a confirmed mapping, tmdb is never
//! consulted.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{AnimeMapping, Title, TitleEntry, TitleMappingResult};
use crate::domain::repositories::{AnimeMappingRepository, TitleRepository};
use crate::shared::error::MatchError;

pub struct AnidbTitleMatcher {
    anidb_repo: Arc<dyn TitleRepository>,
    tmdb_repo: Arc<dyn TitleRepository>,
    mapping_repo: Arc<dyn AnimeMappingRepository>,
}

impl AnidbTitleMatcher {
    pub fn new(
        anidb_repo: Arc<dyn TitleRepository>,
        tmdb_repo: Arc<dyn TitleRepository>,
        mapping_repo: Arc<dyn AnimeMappingRepository>,
    ) -> Self {
        AnidbTitleMatcher {
            anidb_repo,
            tmdb_repo,
            mapping_repo,
        }
    }

    /// `title.value` must be set. `title.aid`, if known, narrows the anidb
    /// search to that id. `title.lang` is used for both the anidb query and
    /// every tmdb search issued on its behalf.
    pub async fn match_title(
        &self,
        title: &Title,
    ) -> Result<Vec<TitleMappingResult>, crate::shared::error::AppError> {
        let lang = title.lang.clone();

        let anidb_titles = self.anidb_repo.find(title).await?;
        let mut by_aid = index_by_aid(anidb_titles);

        let mut result = Vec::new();

        // Eliminate groups that already have a persisted mapping.
        let mut resolved_aids = Vec::new();
        for (aid, titles) in by_aid.iter() {
            let main_title = match main_title(titles) {
                Ok(t) => t,
                Err(_) => continue,
            };
            let stored = self.find_stored_match(main_title).await?;
            if !stored.is_empty() {
                result.extend(stored);
                resolved_aids.push(aid.clone());
            }
        }
        for aid in &resolved_aids {
            by_aid.remove(aid);
        }

        // Avoid hitting the tmdb API if the work is already done.
        if by_aid.is_empty() {
            return Ok(result);
        }

        for aid in by_aid.keys() {
            let anidb_titles = self
                .anidb_repo
                .find(&Title::new("").with_aid(aid.clone()))
                .await?;
            result.extend(self.find_tmdb_match(&anidb_titles, &lang).await?);
        }

        Ok(result)
    }

    async fn find_stored_match(
        &self,
        entry: &TitleEntry,
    ) -> Result<Vec<TitleMappingResult>, crate::shared::error::AppError> {
        let query = AnimeMapping::anidb_only(entry.title.aid.clone());
        let pairs = self.mapping_repo.resolve_tmdb(&query).await?;
        Ok(pairs
            .into_iter()
            .map(|m| {
                TitleMappingResult::new(entry.title.clone(), Title::new("").with_aid(m.tmdb))
                    .from_storage()
            })
            .collect())
    }

    async fn find_tmdb_match(
        &self,
        anidb_titles: &[TitleEntry],
        lang: &str,
    ) -> Result<Vec<TitleMappingResult>, crate::shared::error::AppError> {
        let mut result = Vec::new();

        for anidb_title in mapping_title_candidates(anidb_titles) {
            let tmdb_query = Title::new(anidb_title.title.value.clone()).with_lang(lang.to_string());
            let tmdb_titles = self.tmdb_repo.find(&tmdb_query).await?;

            if let Some(perfect) = find_perfect_match(anidb_titles, &tmdb_titles) {
                // The other candidates can never be valid once we have a
                // strict match; stop this aid's iteration entirely.
                return Ok(vec![perfect]);
            }

            for tmdb_title in &tmdb_titles {
                result.push(TitleMappingResult::new(
                    anidb_title.title.clone(),
                    tmdb_title.title.clone(),
                ));
            }
        }

        Ok(result)
    }
}

fn index_by_aid(titles: Vec<TitleEntry>) -> HashMap<String, Vec<TitleEntry>> {
    let mut map: HashMap<String, Vec<TitleEntry>> = HashMap::new();
    for entry in titles {
        map.entry(entry.title.aid.clone()).or_default().push(entry);
    }
    map
}

fn main_title(titles: &[TitleEntry]) -> Result<&TitleEntry, MatchError> {
    if let Some(t) = titles.iter().find(|e| e.title.r#type == "main") {
        return Ok(t);
    }
    if let Some(t) = titles
        .iter()
        .find(|e| e.title.r#type == "official" && e.title.lang == "en")
    {
        return Ok(t);
    }
    if let Some(t) = titles
        .iter()
        .find(|e| e.title.r#type == "official" && e.title.lang == "ja")
    {
        return Ok(t);
    }
    titles.first().ok_or_else(|| MatchError::NoMainTitle {
        aid: String::new(),
    })
}

/// The ordered list of titles to try against tmdb: official/en, then main
/// (any language), then official/ja.
fn mapping_title_candidates(titles: &[TitleEntry]) -> Vec<&TitleEntry> {
    let mut out = Vec::new();
    out.extend(
        titles
            .iter()
            .filter(|t| t.title.r#type == "official" && t.title.lang == "en"),
    );
    out.extend(titles.iter().filter(|t| t.title.r#type == "main"));
    out.extend(
        titles
            .iter()
            .filter(|t| t.title.r#type == "official" && t.title.lang == "ja"),
    );
    out
}

/// Searches the cartesian product of `anidb_titles` and `tmdb_titles` for a
/// strict (trimmed, lower-cased, non-empty) value match, aborting early.
fn find_perfect_match(
    anidb_titles: &[TitleEntry],
    tmdb_titles: &[TitleEntry],
) -> Option<TitleMappingResult> {
    for anidb_title in anidb_titles {
        let t1 = anidb_title.title.value.trim().to_lowercase();
        if t1.is_empty() {
            continue;
        }
        for tmdb_title in tmdb_titles {
            let t2 = tmdb_title.title.value.trim().to_lowercase();
            if t1 == t2 {
                return Some(
                    TitleMappingResult::new(anidb_title.title.clone(), tmdb_title.title.clone())
                        .matched(),
                );
            }
        }
    }
    None
}
