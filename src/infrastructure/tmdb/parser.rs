//! Tmdb show JSON → Anime parser (component K). Consumes the composed blob
//! produced by [`super::show_store::TmdbShowStore`]; unlike the anidb
//! per-anime parser this walks a generic `serde_json::Value` tree rather
//! than typed structs, since the tmdb payload shape is wide and mostly
//! passthrough.

use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::entities::{Anime, CastRole, Credit, Episode, Image, ImageType, Rating, Season, Title};
use crate::shared::error::ParseError;

fn as_str(v: &Value, key: &str) -> String {
    v.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn as_date(v: &Value, key: &str) -> Option<NaiveDate> {
    v.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn image_category(kind: &str) -> ImageType {
    match kind {
        "posters" => ImageType::Poster,
        "backdrops" => ImageType::Backdrop,
        "stills" => ImageType::Thumb,
        _ => ImageType::Unknown,
    }
}

fn parse_images(node: &Value) -> Vec<Image> {
    let Some(images) = node.get("images") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for kind in ["posters", "backdrops", "stills"] {
        let Some(arr) = images.get(kind).and_then(Value::as_array) else {
            continue;
        };
        for entry in arr {
            let Some(path) = entry.get("file_path").and_then(Value::as_str) else {
                continue;
            };
            out.push(Image::new("tmdb", path, image_category(kind)));
        }
    }
    out
}

fn parse_ratings(node: &Value) -> Vec<Rating> {
    let average = node.get("vote_average").and_then(Value::as_f64);
    let votes = node.get("vote_count").and_then(Value::as_u64);
    match (average, votes) {
        (Some(average), Some(votes)) => vec![Rating::new("tmdb", average, votes)],
        _ => Vec::new(),
    }
}

fn parse_credits(node: &Value) -> Vec<Credit> {
    let Some(crew) = node.get("credits").and_then(|c| c.get("crew")).and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for member in crew {
        let name = as_str(member, "name");
        let department = as_str(member, "department");
        if name.is_empty() || department.is_empty() {
            continue;
        }
        let category = member
            .get("known_for_department")
            .and_then(Value::as_str)
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        let Some(jobs) = member.get("jobs").and_then(Value::as_array) else {
            continue;
        };
        for job in jobs {
            let job_name = as_str(job, "job");
            if job_name.is_empty() {
                continue;
            }
            out.push(Credit {
                name: name.clone(),
                job: job_name,
                department: department.clone(),
                category: category.clone(),
            });
        }
    }
    out
}

fn cast_character(member: &Value) -> String {
    let direct = as_str(member, "character");
    if !direct.is_empty() {
        return direct;
    }
    member
        .get("roles")
        .and_then(Value::as_array)
        .and_then(|roles| roles.first())
        .and_then(|r| r.get("character"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_cast(node: &Value) -> Vec<CastRole> {
    let Some(cast) = node.get("credits").and_then(|c| c.get("cast")).and_then(Value::as_array) else {
        return Vec::new();
    };
    cast.iter()
        .filter_map(|member| {
            let character = cast_character(member);
            let actor = as_str(member, "name");
            if character.is_empty() || actor.is_empty() {
                return None;
            }
            Some(CastRole {
                character,
                actor,
                character_image: None,
                actor_image: member
                    .get("profile_path")
                    .and_then(Value::as_str)
                    .map(|p| Image::new("tmdb", p, ImageType::Thumb)),
            })
        })
        .collect()
}

fn parse_episode(show_id: &str, season_n: u64, node: &Value) -> Episode {
    let number = node.get("episode_number").and_then(Value::as_i64).unwrap_or(0);
    let airdate = as_date(node, "air_date").unwrap_or_default();
    let title = as_str(node, "name");
    let summary = as_str(node, "overview");

    let mut titles = Vec::new();
    if !title.is_empty() {
        titles.push(Title::new(title).with_aid(format!("T{show_id}S{season_n}E{number}")).with_lang("en").with_type("main"));
    }

    Episode {
        number,
        length: node.get("runtime").and_then(Value::as_i64).unwrap_or(0),
        airdate,
        titles,
        summary,
        images: parse_images(node),
        ratings: parse_ratings(node),
    }
}

fn parse_season(show_id: &str, node: &Value) -> Season {
    let n = node.get("season_number").and_then(Value::as_u64).unwrap_or(0) as i64;
    let name = as_str(node, "name");
    let mut uniqueids = std::collections::HashMap::new();
    uniqueids.insert("tmdb".to_string(), show_id.to_string());
    uniqueids.insert("tmdb_season".to_string(), n.to_string());

    let mut titles = Vec::new();
    if !name.is_empty() {
        titles.push(Title::new(name).with_aid(format!("T{show_id}S{n}")).with_lang("en").with_type("main"));
    }

    let episodes = node
        .get("episodes")
        .and_then(Value::as_array)
        .map(|eps| eps.iter().map(|e| parse_episode(show_id, n as u64, e)).collect())
        .unwrap_or_default();

    Season {
        id: format!("T{show_id}S{n}"),
        number: n,
        uniqueids,
        titles,
        description: as_str(node, "overview"),
        genres: Vec::new(),
        tags: Vec::new(),
        airdate: as_date(node, "air_date"),
        episodes,
        images: parse_images(node),
        ratings: parse_ratings(node),
        cast: parse_cast(node),
        directors: Vec::new(),
        credits: parse_credits(node),
    }
}

/// Parses a composed tmdb show JSON blob into an [`Anime`]. `show_id` is
/// the tmdb numeric id as a string, carried separately from the JSON body
/// since the body itself may omit or mis-type `id`.
pub fn parse_tmdb_show(show_id: &str, data: &[u8]) -> Result<Anime, ParseError> {
    let root: Value = serde_json::from_slice(data).map_err(|e| ParseError::Json {
        name: format!("{show_id}.json"),
        source: e,
    })?;

    let mut uniqueids = std::collections::HashMap::new();
    uniqueids.insert("tmdb".to_string(), show_id.to_string());

    let name = as_str(&root, "name");
    let mut titles = Vec::new();
    if !name.is_empty() {
        titles.push(Title::new(name).with_aid(format!("T{show_id}")).with_lang("en").with_type("main"));
    }
    if let Some(alt) = root.get("alternative_titles").and_then(|a| a.get("results")).and_then(Value::as_array) {
        for entry in alt {
            let title = as_str(entry, "title");
            if title.is_empty() {
                continue;
            }
            titles.push(
                Title::new(title)
                    .with_aid(format!("T{show_id}"))
                    .with_lang(as_str(entry, "iso_3166_1").to_lowercase())
                    .with_type("synonym"),
            );
        }
    }

    let genres = root
        .get("genres")
        .and_then(Value::as_array)
        .map(|gs| gs.iter().filter_map(|g| g.get("name").and_then(Value::as_str)).map(str::to_string).collect())
        .unwrap_or_default();

    let mut seasons: Vec<Season> = root
        .get("seasons")
        .and_then(Value::as_array)
        .map(|ss| ss.iter().map(|s| parse_season(show_id, s)).collect())
        .unwrap_or_default();

    // Backdrops attach to every season in addition to the show itself.
    let show_backdrops: Vec<Image> = parse_images(&root).into_iter().filter(|i| i.r#type == ImageType::Backdrop).collect();
    for season in &mut seasons {
        for backdrop in &show_backdrops {
            if !season.images.iter().any(|i| i.name == backdrop.name) {
                season.images.push(backdrop.clone());
            }
        }
    }

    let season_one = seasons.iter().find(|s| s.number == 1);
    let cast = if root.get("credits").is_none() {
        season_one.map(|s| s.cast.clone()).unwrap_or_default()
    } else {
        parse_cast(&root)
    };
    let credits = if root.get("credits").is_none() {
        season_one.map(|s| s.credits.clone()).unwrap_or_default()
    } else {
        parse_credits(&root)
    };
    let airdate = as_date(&root, "first_air_date").or_else(|| season_one.and_then(|s| s.airdate));

    Ok(Anime {
        id: format!("T{show_id}"),
        uniqueids,
        titles,
        description: as_str(&root, "overview"),
        genres,
        tags: Vec::new(),
        airdate,
        seasons,
        images: parse_images(&root),
        ratings: parse_ratings(&root),
        cast,
        directors: Vec::new(),
        credits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        serde_json::json!({
            "name": "Sample Show",
            "overview": "a show",
            "first_air_date": "2020-01-02",
            "genres": [{"name": "Drama"}],
            "alternative_titles": {"results": [{"title": "Alt Name", "iso_3166_1": "US"}]},
            "images": {"backdrops": [{"file_path": "/back.jpg"}], "posters": [{"file_path": "/poster.jpg"}]},
            "vote_average": 7.5,
            "vote_count": 120,
            "seasons": [
                {
                    "season_number": 1,
                    "name": "Season 1",
                    "air_date": "2020-01-02",
                    "images": {"stills": [{"file_path": "/still.jpg"}]},
                    "credits": {
                        "cast": [{"name": "Jane Actor", "character": "Hero", "profile_path": "/jane.jpg"}],
                        "crew": [{"name": "Jane Director", "department": "Directing", "known_for_department": "Directing", "jobs": [{"job": "Director"}]}]
                    },
                    "episodes": [
                        {"episode_number": 1, "name": "Pilot", "overview": "first", "air_date": "2020-01-02", "runtime": 24}
                    ]
                }
            ]
        })
    }

    #[test]
    fn parses_core_fields_and_ids() {
        let data = serde_json::to_vec(&sample()).unwrap();
        let anime = parse_tmdb_show("42", &data).unwrap();
        assert_eq!(anime.id, "T42");
        assert_eq!(anime.uniqueids.get("tmdb"), Some(&"42".to_string()));
        assert!(anime.titles.iter().any(|t| t.value == "Sample Show" && t.r#type == "main"));
        assert!(anime.titles.iter().any(|t| t.value == "Alt Name" && t.r#type == "synonym"));
    }

    #[test]
    fn season_carries_tmdb_season_uniqueid() {
        let data = serde_json::to_vec(&sample()).unwrap();
        let anime = parse_tmdb_show("42", &data).unwrap();
        let season = anime.find_season_by_number(1).unwrap();
        assert_eq!(season.id, "T42S1");
        assert_eq!(season.uniqueids.get("tmdb_season"), Some(&"1".to_string()));
        assert_eq!(season.uniqueids.get("tmdb"), Some(&"42".to_string()));
    }

    #[test]
    fn show_backdrops_propagate_into_seasons() {
        let data = serde_json::to_vec(&sample()).unwrap();
        let anime = parse_tmdb_show("42", &data).unwrap();
        let season = anime.find_season_by_number(1).unwrap();
        assert!(season.images.iter().any(|i| i.name == "/back.jpg" && i.r#type == ImageType::Backdrop));
    }

    #[test]
    fn season_one_cast_and_airdate_are_duplicated_to_anime_level_when_show_omits_them() {
        let data = serde_json::to_vec(&sample()).unwrap();
        let anime = parse_tmdb_show("42", &data).unwrap();
        assert_eq!(anime.airdate, Some(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()));
        assert!(anime.cast.iter().any(|c| c.actor == "Jane Actor"));
        assert!(anime
            .credits
            .iter()
            .any(|c| c.name == "Jane Director" && c.job == "Director" && c.department == "Directing" && c.category == "directing"));
    }

    #[test]
    fn crew_missing_a_name_or_department_are_dropped() {
        let mut raw = sample();
        let seasons = raw["seasons"].as_array_mut().unwrap();
        seasons[0]["credits"]["crew"] = serde_json::json!([
            {"name": "No Department", "known_for_department": "Writing", "jobs": [{"job": "Writer"}]},
            {"department": "Editing", "known_for_department": "Editing", "jobs": [{"job": "Editor"}]},
        ]);
        let data = serde_json::to_vec(&raw).unwrap();
        let anime = parse_tmdb_show("42", &data).unwrap();
        assert!(anime.credits.is_empty());
    }

    #[test]
    fn cast_missing_a_character_or_actor_name_is_dropped() {
        let mut raw = sample();
        let seasons = raw["seasons"].as_array_mut().unwrap();
        seasons[0]["credits"]["cast"] = serde_json::json!([
            {"name": "No Character"},
            {"character": "No Actor"},
        ]);
        let data = serde_json::to_vec(&raw).unwrap();
        let anime = parse_tmdb_show("42", &data).unwrap();
        assert!(anime.cast.is_empty());
    }

    #[test]
    fn ratings_are_omitted_when_either_field_is_missing() {
        let mut raw = sample();
        raw.as_object_mut().unwrap().remove("vote_count");
        let data = serde_json::to_vec(&raw).unwrap();
        let anime = parse_tmdb_show("42", &data).unwrap();
        assert!(anime.ratings.is_empty());
    }
}
