//! Per-anime anidb XML parser (component J): turns one `<anime id=…>`
//! document into an `Anime` with two synthetic seasons.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::entities::{Anime, CastRole, Credit, Episode, Image, ImageType, Rating, Season, Title};
use crate::shared::error::ParseError;

#[derive(Debug, Deserialize)]
struct RawAnime {
    #[serde(rename = "@id")]
    id: String,
    titles: RawTitles,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    picture: Vec<String>,
    #[serde(default)]
    ratings: Option<RawRatings>,
    #[serde(default)]
    tags: Option<RawTags>,
    #[serde(default)]
    episodes: Option<RawEpisodes>,
    #[serde(default)]
    characters: Option<RawCharacters>,
    #[serde(default)]
    creators: Option<RawCreators>,
}

#[derive(Debug, Deserialize)]
struct RawTitles {
    #[serde(default, rename = "title")]
    title: Vec<RawTitle>,
}

#[derive(Debug, Deserialize, Clone)]
struct RawTitle {
    #[serde(rename = "@type", default)]
    r#type: String,
    #[serde(rename = "@xml:lang", default)]
    lang: String,
    #[serde(rename = "$text", default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawRatings {
    #[serde(default)]
    permanent: Option<RawCountedRating>,
}

#[derive(Debug, Deserialize)]
struct RawCountedRating {
    #[serde(rename = "@count", default)]
    count: u64,
    #[serde(rename = "$text", default)]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct RawTags {
    #[serde(default, rename = "tag")]
    tag: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@parentid", default)]
    parentid: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawEpisodes {
    #[serde(default, rename = "episode")]
    episode: Vec<RawEpisode>,
}

#[derive(Debug, Deserialize)]
struct RawEpisode {
    epno: RawEpno,
    #[serde(default)]
    length: i64,
    #[serde(default)]
    airdate: Option<NaiveDate>,
    #[serde(default, rename = "title")]
    titles: Vec<RawTitle>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    rating: Option<RawVotedRating>,
}

#[derive(Debug, Deserialize)]
struct RawEpno {
    #[serde(rename = "@type")]
    r#type: u8,
    #[serde(rename = "$text")]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawVotedRating {
    #[serde(rename = "@votes", default)]
    votes: u64,
    #[serde(rename = "$text", default)]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct RawCharacters {
    #[serde(default, rename = "character")]
    character: Vec<RawCharacter>,
}

#[derive(Debug, Deserialize)]
struct RawCharacter {
    name: String,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    seiyuu: Option<RawSeiyuu>,
}

#[derive(Debug, Deserialize)]
struct RawSeiyuu {
    #[serde(rename = "@picture", default)]
    picture: String,
    #[serde(rename = "$text", default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawCreators {
    #[serde(default, rename = "name")]
    name: Vec<RawCreator>,
}

#[derive(Debug, Deserialize)]
struct RawCreator {
    #[serde(rename = "@type", default)]
    r#type: String,
    #[serde(rename = "$text", default)]
    text: String,
}

/// job → (department, category), per the fixed table the source credits
/// table uses. Jobs not in this table produce no Credit entry.
fn credit_job_table(job: &str) -> Option<(&'static str, &'static str)> {
    match job {
        "Direction" => Some(("Directing", "directing")),
        "Chief Animation Direction" => Some(("Directing", "directing")),
        "Character Design" => Some(("Art", "visual effects")),
        "Animation Character Design" => Some(("Art", "visual effects")),
        "Animation Work" => Some(("Art", "visual effects")),
        "Original Work" => Some(("Writing", "writing")),
        "Series Composition" => Some(("Writing", "writing")),
        "Music" => Some(("Sound", "sound")),
        _ => None,
    }
}

fn strip_leading_slash(value: &str) -> String {
    value.trim_start_matches('/').to_string()
}

fn title_from_raw(raw: &RawTitle, aid: &str) -> Title {
    let r#type = if raw.r#type == "syn" { "synonym".to_string() } else { raw.r#type.clone() };
    Title::new(raw.text.clone()).with_aid(aid).with_lang(raw.lang.clone()).with_type(r#type)
}

/// Regular episodes carry their number verbatim; every other kind's text
/// begins with one prefix character that must be stripped (e.g. `S1`, `C1`).
fn episode_number(raw: &RawEpno) -> Option<i64> {
    if raw.r#type == 1 {
        raw.text.parse().ok()
    } else {
        raw.text.get(1..).and_then(|s| s.parse().ok())
    }
}

/// Retains only leaf tags (ids that never appear as another tag's parentid)
/// and discards any whose ancestor chain names "maintenance tags".
fn leaf_tags(tags: &[RawTag]) -> Vec<String> {
    let parent_ids: HashSet<&str> = tags.iter().filter(|t| !t.parentid.is_empty()).map(|t| t.parentid.as_str()).collect();
    let by_id: HashMap<&str, &RawTag> = tags.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut out = Vec::new();
    for tag in tags {
        if parent_ids.contains(tag.id.as_str()) {
            continue;
        }

        let mut path_has_maintenance = false;
        let mut cursor = Some(tag);
        let mut seen = HashSet::new();
        while let Some(t) = cursor {
            if !seen.insert(t.id.clone()) {
                break;
            }
            if t.name.to_lowercase().contains("maintenance tags") {
                path_has_maintenance = true;
                break;
            }
            cursor = (!t.parentid.is_empty()).then(|| by_id.get(t.parentid.as_str())).flatten().copied();
        }

        if !path_has_maintenance {
            out.push(tag.name.clone());
        }
    }
    out
}

fn parse_episode(raw: &RawEpisode, aid: &str) -> Option<(i64, Episode)> {
    let number = episode_number(&raw.epno)?;
    let airdate = raw.airdate.unwrap_or_default();
    let mut episode = Episode::new(number, airdate);
    episode.length = raw.length;
    episode.summary = raw.summary.clone();
    episode.titles = raw.titles.iter().map(|t| title_from_raw(t, aid)).collect();
    if let Some(rating) = &raw.rating {
        if rating.value > 0.0 {
            episode.ratings.push(Rating::new("anidb", rating.value, rating.votes));
        }
    }
    Some((number, episode))
}

/// Parses one anidb anime XML document into an `Anime` carrying two
/// synthetic seasons: season 0 (specials, lean metadata) and season 1
/// (regular episodes, full metadata inherited from the anime).
pub fn parse_anime_xml(data: &[u8]) -> Result<Anime, ParseError> {
    let raw: RawAnime = quick_xml::de::from_reader(data).map_err(|e| ParseError::Xml {
        name: "anime.xml".to_string(),
        source: e,
    })?;

    let aid = raw.id.clone();
    let mut anime = Anime::new(format!("A{aid}"));
    anime.uniqueids.insert("anidb".to_string(), aid.clone());
    anime.titles = raw.titles.title.iter().map(|t| title_from_raw(t, &aid)).collect();
    anime.description = raw.description.unwrap_or_default();
    anime.images = raw
        .picture
        .iter()
        .map(|p| Image::new("anidb", strip_leading_slash(p), ImageType::Poster))
        .collect();

    if let Some(ratings) = &raw.ratings {
        if let Some(permanent) = &ratings.permanent {
            if permanent.value > 0.0 {
                anime.ratings.push(Rating::new("anidb", permanent.value, permanent.count));
            }
        }
    }

    if let Some(tags) = &raw.tags {
        anime.tags = leaf_tags(&tags.tag);
    }

    if let Some(creators) = &raw.creators {
        anime.directors = creators
            .name
            .iter()
            .filter(|c| c.r#type == "Direction")
            .map(|c| c.text.clone())
            .collect();
        anime.credits = creators
            .name
            .iter()
            .filter_map(|c| {
                credit_job_table(&c.r#type).map(|(department, category)| Credit {
                    name: c.text.clone(),
                    job: c.r#type.clone(),
                    department: department.to_string(),
                    category: category.to_string(),
                })
            })
            .collect();
    }

    if let Some(characters) = &raw.characters {
        anime.cast = characters
            .character
            .iter()
            .filter_map(|c| {
                let seiyuu = c.seiyuu.as_ref()?;
                Some(CastRole {
                    character: c.name.clone(),
                    actor: seiyuu.name.clone(),
                    character_image: c
                        .picture
                        .as_ref()
                        .map(|p| Image::new("anidb", strip_leading_slash(p), ImageType::Thumb)),
                    actor_image: (!seiyuu.picture.is_empty())
                        .then(|| Image::new("anidb", strip_leading_slash(&seiyuu.picture), ImageType::Thumb)),
                })
            })
            .collect();
    }

    let raw_episodes = raw.episodes.map(|e| e.episode).unwrap_or_default();

    let mut season0 = Season::new(format!("A{aid}"), 0);
    season0.uniqueids = anime.uniqueids.clone();
    season0.titles = vec![Title::new("Specials").with_lang("en").with_type("main")];
    season0.episodes = raw_episodes
        .iter()
        .filter(|e| e.epno.r#type == 2)
        .filter_map(|e| parse_episode(e, &aid).map(|(_, ep)| ep))
        .collect();
    season0.sort_episodes();

    let mut season1 = Season::new(format!("A{aid}"), 1);
    season1.uniqueids = anime.uniqueids.clone();
    season1.titles = anime.titles.clone();
    season1.description = anime.description.clone();
    season1.genres = anime.genres.clone();
    season1.tags = anime.tags.clone();
    season1.airdate = anime.airdate;
    season1.images = anime.images.clone();
    season1.ratings = anime.ratings.clone();
    season1.cast = anime.cast.clone();
    season1.directors = anime.directors.clone();
    season1.credits = anime.credits.clone();
    season1.episodes = raw_episodes
        .iter()
        .filter(|e| e.epno.r#type == 1)
        .filter_map(|e| parse_episode(e, &aid).map(|(_, ep)| ep))
        .collect();
    season1.sort_episodes();

    anime.seasons = vec![season0, season1];
    Ok(anime)
}
