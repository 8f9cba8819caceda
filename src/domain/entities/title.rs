//! Title and TitleEntry — the rows the title repositories key on.

use chrono::{DateTime, Utc};

/// `type` is left as a plain string rather than an enum: the upstream
/// catalogs and the overlay/extras layer each mint their own values
/// (`main`, `official`, `synonym`, `short`, `extra`, …) and new ones should
/// not require a code change here.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Title {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub aid: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub r#type: String,
}

impl Title {
    pub fn new(value: impl Into<String>) -> Self {
        Title {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_aid(mut self, aid: impl Into<String>) -> Self {
        self.aid = aid.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.r#type = ty.into();
        self
    }

    /// A query is "fully wildcard" if every field is empty; such a query
    /// must never match anything (listing the world is not allowed).
    pub fn is_empty_query(&self) -> bool {
        self.value.is_empty() && self.aid.is_empty() && self.lang.is_empty() && self.r#type.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleEntry {
    pub title: Title,
    pub age: Option<DateTime<Utc>>,
}

impl TitleEntry {
    pub fn new(title: Title) -> Self {
        TitleEntry { title, age: None }
    }

    pub fn with_age(mut self, age: DateTime<Utc>) -> Self {
        self.age = Some(age);
        self
    }
}
