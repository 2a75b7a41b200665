//! Library-side types shared by media-server backends.

use serde::{Deserialize, Serialize};

/// An identifier for a title in some external database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId {
    /// Lowercase provider name ("imdb", "tmdb", "tvdb").
    pub provider: String,
    pub value: String,
}

impl ExternalId {
    pub fn new(provider: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            provider: provider.into().to_lowercase(),
            value: value.into(),
        }
    }

    /// Parse a Plex-style guid such as `imdb://tt0111161`.
    pub fn parse_guid(guid: &str) -> Option<Self> {
        let (provider, value) = guid.split_once("://")?;
        let value = value.trim().trim_end_matches('/');
        if provider.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self::new(provider, value))
    }

    pub fn is_imdb(&self) -> bool {
        self.provider == "imdb"
    }
}

/// A library section (Plex "library").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySection {
    pub key: String,
    pub title: String,
    /// Section type as reported by the server ("movie", "show", "artist", ...).
    pub kind: String,
}

impl LibrarySection {
    pub fn is_movie(&self) -> bool {
        self.kind == "movie"
    }
}

/// A movie in the media-server library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    /// Server-side ID (Plex rating key).
    pub id: String,
    /// Key of the section the item belongs to.
    pub section_key: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub external_ids: Vec<ExternalId>,
    #[serde(default)]
    pub summary: String,
}

impl LibraryItem {
    pub fn with_external_id(mut self, id: ExternalId) -> Self {
        self.external_ids.push(id);
        self
    }

    /// "Title (Year)" for log lines.
    pub fn display_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}
