//! Plex Media Server client.
//!
//! Uses the JSON flavour of the Plex HTTP API (`Accept: application/json`)
//! and authenticates with the `X-Plex-Token` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{ExternalId, LibraryItem, LibrarySection};
use super::{MediaServer, MediaServerError};

/// Plex item type for movies, used when editing fields.
const PLEX_MOVIE_TYPE: &str = "1";

/// Plex connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    /// Plex server URL (e.g., "http://localhost:32400")
    pub url: String,
    /// Plex auth token
    pub token: String,
    /// Movie libraries to process by name (empty = every movie library)
    #[serde(default)]
    pub libraries: Vec<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

/// Plex client implementation.
pub struct PlexClient {
    client: Client,
    base_url: String,
}

impl PlexClient {
    /// Create a new Plex client.
    pub fn new(config: &PlexConfig) -> Result<Self, MediaServerError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let token = HeaderValue::from_str(config.token.trim()).map_err(|_| {
            MediaServerError::Unauthorized("Plex token contains invalid characters".to_string())
        })?;
        headers.insert("X-Plex-Token", token);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_container(&self, endpoint: &str) -> Result<PlexContainer, MediaServerError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response, endpoint).await?;

        let body: PlexResponse = response.json().await.map_err(|e| {
            MediaServerError::ParseError(format!("Failed to parse {} response: {}", endpoint, e))
        })?;

        Ok(body.media_container)
    }
}

#[async_trait]
impl MediaServer for PlexClient {
    async fn sections(&self) -> Result<Vec<LibrarySection>, MediaServerError> {
        debug!("Plex list sections");
        let container = self.get_container("/library/sections").await?;
        Ok(container.directory.into_iter().map(Into::into).collect())
    }

    async fn items(&self, section: &LibrarySection) -> Result<Vec<LibraryItem>, MediaServerError> {
        debug!("Plex list items: section={}", section.key);
        let endpoint = format!("/library/sections/{}/all?includeGuids=1", section.key);
        let container = self.get_container(&endpoint).await?;

        Ok(container
            .metadata
            .into_iter()
            .map(|m| m.into_item(&section.key))
            .collect())
    }

    async fn update_summary(
        &self,
        item: &LibraryItem,
        summary: &str,
    ) -> Result<(), MediaServerError> {
        let endpoint = format!("/library/sections/{}/all", item.section_key);
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Plex update summary: item={}", item.id);

        let response = self
            .client
            .put(&url)
            .query(&[
                ("type", PLEX_MOVIE_TYPE),
                ("id", item.id.as_str()),
                ("summary.value", summary),
                ("summary.locked", "1"),
            ])
            .send()
            .await?;
        check_status(response, &endpoint).await?;

        Ok(())
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response, MediaServerError> {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MediaServerError::Unauthorized(
            "Invalid Plex token".to_string(),
        )),
        StatusCode::NOT_FOUND => Err(MediaServerError::NotFound(what.to_string())),
        s if !s.is_success() => {
            let body = response.text().await.unwrap_or_default();
            Err(MediaServerError::ApiError {
                status: s.as_u16(),
                message: body,
            })
        }
        _ => Ok(response),
    }
}

// ============================================================================
// Plex API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct PlexResponse {
    #[serde(rename = "MediaContainer")]
    media_container: PlexContainer,
}

#[derive(Debug, Default, Deserialize)]
struct PlexContainer {
    #[serde(rename = "Directory", default)]
    directory: Vec<PlexDirectory>,
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlexMetadata>,
}

#[derive(Debug, Deserialize)]
struct PlexDirectory {
    key: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    kind: String,
}

impl From<PlexDirectory> for LibrarySection {
    fn from(dir: PlexDirectory) -> Self {
        Self {
            key: dir.key,
            title: dir.title,
            kind: dir.kind,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlexMetadata {
    rating_key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(rename = "Guid", default)]
    guids: Vec<PlexGuid>,
}

#[derive(Debug, Deserialize)]
struct PlexGuid {
    id: String,
}

impl PlexMetadata {
    fn into_item(self, section_key: &str) -> LibraryItem {
        LibraryItem {
            id: self.rating_key,
            section_key: section_key.to_string(),
            title: self.title,
            year: self.year,
            external_ids: self
                .guids
                .iter()
                .filter_map(|g| ExternalId::parse_guid(&g.id))
                .collect(),
            summary: self.summary.unwrap_or_default(),
        }
    }
}
