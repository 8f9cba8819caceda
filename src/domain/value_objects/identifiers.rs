//! The four canonical identifier shapes (component O).
//!
//! Parsing tries the most specific shape first: `AnimeMappingId`, then
//! `TmdbSeasonId`, then `AnidbId`, then `TmdbId`. All numeric parts are
//! strict decimal, non-empty, unsigned.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static ANIDB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^A(\d+)$").unwrap());
static TMDB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^T(\d+)$").unwrap());
static TMDB_SEASON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^T(\d+)S(\d+)$").unwrap());
static MAPPING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^A(\d+)-T(\d+)S(\d+)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnidbId(pub u64);

impl fmt::Display for AnidbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

impl AnidbId {
    pub fn parse(value: &str) -> Option<Self> {
        ANIDB_RE
            .captures(value)
            .and_then(|c| c[1].parse().ok())
            .map(AnidbId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TmdbId(pub u64);

impl fmt::Display for TmdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

impl TmdbId {
    pub fn parse(value: &str) -> Option<Self> {
        TMDB_RE.captures(value).and_then(|c| c[1].parse().ok()).map(TmdbId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TmdbSeasonId {
    pub tvshow: u64,
    pub season: u64,
}

impl fmt::Display for TmdbSeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}S{}", self.tvshow, self.season)
    }
}

impl TmdbSeasonId {
    pub fn new(tvshow: u64, season: u64) -> Self {
        TmdbSeasonId { tvshow, season }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let c = TMDB_SEASON_RE.captures(value)?;
        Some(TmdbSeasonId {
            tvshow: c[1].parse().ok()?,
            season: c[2].parse().ok()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimeMappingId {
    pub anidb: AnidbId,
    pub tmdb: TmdbSeasonId,
}

impl AnimeMappingId {
    pub fn anidb_show(&self) -> u64 {
        self.anidb.0
    }

    pub fn tmdb_show(&self) -> u64 {
        self.tmdb.tvshow
    }

    pub fn tmdb_season(&self) -> u64 {
        self.tmdb.season
    }

    pub fn parse(value: &str) -> Option<Self> {
        let c = MAPPING_RE.captures(value)?;
        Some(AnimeMappingId {
            anidb: AnidbId(c[1].parse().ok()?),
            tmdb: TmdbSeasonId {
                tvshow: c[2].parse().ok()?,
                season: c[3].parse().ok()?,
            },
        })
    }
}

impl fmt::Display for AnimeMappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.anidb, self.tmdb)
    }
}

/// A parsed identifier of unknown shape, resolved in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimeId {
    Anidb(AnidbId),
    Tmdb(TmdbId),
    TmdbSeason(TmdbSeasonId),
    Mapping(AnimeMappingId),
}

impl fmt::Display for AnimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimeId::Anidb(id) => write!(f, "{id}"),
            AnimeId::Tmdb(id) => write!(f, "{id}"),
            AnimeId::TmdbSeason(id) => write!(f, "{id}"),
            AnimeId::Mapping(id) => write!(f, "{id}"),
        }
    }
}

/// Parses an identifier string, trying the most specific shape first.
pub fn parse_anime_id(value: &str) -> Option<AnimeId> {
    if let Some(id) = AnimeMappingId::parse(value) {
        return Some(AnimeId::Mapping(id));
    }
    if let Some(id) = TmdbSeasonId::parse(value) {
        return Some(AnimeId::TmdbSeason(id));
    }
    if let Some(id) = AnidbId::parse(value) {
        return Some(AnimeId::Anidb(id));
    }
    if let Some(id) = TmdbId::parse(value) {
        return Some(AnimeId::Tmdb(id));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_anidb() {
        assert_eq!(AnidbId::parse("A42").unwrap().to_string(), "A42");
    }

    #[test]
    fn roundtrip_tmdb() {
        assert_eq!(TmdbId::parse("T1234").unwrap().to_string(), "T1234");
    }

    #[test]
    fn roundtrip_tmdb_season() {
        assert_eq!(
            TmdbSeasonId::parse("T1234S2").unwrap().to_string(),
            "T1234S2"
        );
    }

    #[test]
    fn roundtrip_mapping() {
        assert_eq!(
            AnimeMappingId::parse("A42-T1234S2").unwrap().to_string(),
            "A42-T1234S2"
        );
    }

    #[test]
    fn priority_picks_most_specific() {
        assert!(matches!(
            parse_anime_id("A42-T1234S2"),
            Some(AnimeId::Mapping(_))
        ));
        assert!(matches!(
            parse_anime_id("T1234S2"),
            Some(AnimeId::TmdbSeason(_))
        ));
        assert!(matches!(parse_anime_id("A42"), Some(AnimeId::Anidb(_))));
        assert!(matches!(parse_anime_id("T1234"), Some(AnimeId::Tmdb(_))));
    }

    #[test]
    fn rejects_non_decimal_and_empty() {
        assert!(AnidbId::parse("A").is_none());
        assert!(AnidbId::parse("A-1").is_none());
        assert!(AnidbId::parse("a42").is_none());
        assert!(parse_anime_id("").is_none());
        assert!(parse_anime_id("garbage").is_none());
    }
}
