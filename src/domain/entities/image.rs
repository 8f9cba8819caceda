//! Image, CastRole, Credit, Rating — the shared descriptive value types
//! attached to episodes, seasons, and animes.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Poster,
    Backdrop,
    Banner,
    Thumb,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Image {
    pub source: String,
    pub name: String,
    pub r#type: ImageType,
}

impl Image {
    pub fn new(source: impl Into<String>, name: impl Into<String>, r#type: ImageType) -> Self {
        Image {
            source: source.into(),
            name: name.into(),
            r#type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct CastRole {
    pub character: String,
    pub actor: String,
    #[serde(default)]
    pub character_image: Option<Image>,
    #[serde(default)]
    pub actor_image: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Credit {
    pub name: String,
    pub job: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rating {
    pub source: String,
    pub average: f64,
    #[serde(default)]
    pub votes: u64,
}

impl Rating {
    pub fn new(source: impl Into<String>, average: f64, votes: u64) -> Self {
        Rating {
            source: source.into(),
            average,
            votes,
        }
    }
}
