//! combine_anime — fuses one anidb Anime with one tmdb season into a single
//! normalized record (component N).
//!
//! Episodes are never aligned between catalogs: anidb episodes remain
//! authoritative because a single anidb anime can span multiple tmdb
//! seasons, and episode order need not match.

use crate::domain::entities::Anime;
use crate::domain::value_objects::{AnidbId, AnimeMappingId, TmdbId, TmdbSeasonId};

pub fn combine_anime(anidb_anime: &Anime, tmdb_anime: &Anime, tmdb_season_number: u64) -> Option<Anime> {
    let anidb_id = AnidbId::parse(&anidb_anime.id)?;
    let tmdb_show = TmdbId::parse(&tmdb_anime.id)?;
    let tmdb_id = TmdbSeasonId::new(tmdb_show.0, tmdb_season_number);

    let mut anime = anidb_anime.clone();
    anime.id = AnimeMappingId {
        anidb: anidb_id,
        tmdb: tmdb_id,
    }
    .to_string();

    for (key, value) in &tmdb_anime.uniqueids {
        anime.uniqueids.insert(key.clone(), value.clone());
    }

    anime.images.extend(tmdb_anime.images.iter().cloned());
    anime.ratings.extend(tmdb_anime.ratings.iter().cloned());

    // anidb carries no genre information.
    anime.genres = tmdb_anime.genres.clone();

    let season_map = [(0i64, 0u64), (1, tmdb_season_number)];
    let mut new_seasons = Vec::new();
    for (anidb_sid, tmdb_sid) in season_map {
        let anidb_season = anime.find_season_by_number(anidb_sid);
        let tmdb_season = tmdb_anime.find_season_by_number(tmdb_sid as i64);
        if let (Some(a), Some(t)) = (anidb_season, tmdb_season) {
            let mut merged = a.clone();
            merged.images.extend(t.images.iter().cloned());
            merged.ratings.extend(t.ratings.iter().cloned());
            new_seasons.push(merged);
        }
    }
    anime.seasons = new_seasons;

    Some(anime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Image, ImageType, Season};

    fn season(number: i64, images: Vec<Image>) -> Season {
        Season {
            images,
            ..Season::new(format!("S{number}"), number)
        }
    }

    #[test]
    fn merges_matching_season_pairs_and_rewrites_id() {
        let mut anidb = Anime::new("A42");
        anidb.seasons = vec![season(0, vec![]), season(1, vec![])];

        let mut tmdb = Anime::new("T1234");
        tmdb.genres = vec!["Comedy".to_string()];
        tmdb.seasons = vec![
            season(0, vec![]),
            season(1, vec![]),
            season(
                2,
                vec![Image::new("tmdb", "s2.jpg", ImageType::Poster)],
            ),
        ];

        let merged = combine_anime(&anidb, &tmdb, 2).unwrap();

        assert_eq!(merged.id, "A42-T1234S2");
        assert_eq!(merged.seasons.len(), 2);
        assert_eq!(merged.seasons[1].number, 1);
        assert_eq!(merged.seasons[1].images.len(), 1);
        assert_eq!(merged.genres, vec!["Comedy".to_string()]);
    }

    #[test]
    fn drops_season_pairs_missing_on_either_side() {
        let mut anidb = Anime::new("A42");
        anidb.seasons = vec![season(0, vec![])];

        let mut tmdb = Anime::new("T1234");
        tmdb.seasons = vec![season(0, vec![]), season(2, vec![])];

        let merged = combine_anime(&anidb, &tmdb, 2).unwrap();

        // anidb has no season 1, so the (1, 2) pair is dropped entirely.
        assert_eq!(merged.seasons.len(), 1);
        assert_eq!(merged.seasons[0].number, 0);
    }
}
