//! DoesTheDogDie.com API client.
//!
//! Every request carries the API key in the `X-API-KEY` header and asks for
//! JSON. The service asks clients to keep request rates modest; pacing is
//! enforced by the lookup layer, not here.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::types::{ExternalRecord, SearchHit, TopicVotes};
use super::{RatingService, RatingServiceError};

const DEFAULT_BASE_URL: &str = "https://www.doesthedogdie.com";

/// DTDD API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DtddConfig {
    /// DTDD API key. Only required when lookups are performed.
    #[serde(default)]
    pub api_key: String,
    /// Base URL (default: https://www.doesthedogdie.com).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Minimum delay between consecutive API calls (default: 1.0)
    #[serde(default = "default_api_delay")]
    pub api_delay_secs: f64,
}

impl Default for DtddConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            timeout_secs: default_timeout(),
            api_delay_secs: default_api_delay(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_api_delay() -> f64 {
    1.0
}

/// DTDD API client.
pub struct DtddClient {
    client: Client,
    base_url: String,
}

impl DtddClient {
    /// Create a new DTDD client.
    pub fn new(config: &DtddConfig) -> Result<Self, RatingServiceError> {
        if config.api_key.trim().is_empty() {
            return Err(RatingServiceError::NotConfigured(
                "DTDD API key is required".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(config.api_key.trim()).map_err(|_| {
            RatingServiceError::NotConfigured("DTDD API key contains invalid characters".into())
        })?;
        headers.insert("X-API-KEY", key);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self { client, base_url })
    }

    async fn search_with(&self, param: &str, value: &str) -> Result<Vec<SearchHit>, RatingServiceError> {
        let url = format!("{}/dddsearch", self.base_url);

        let response = self.client.get(&url).query(&[(param, value)]).send().await?;
        let response = check_status(response, || format!("search {}={}", param, value)).await?;

        let body: DtddSearchResponse = response.json().await.map_err(|e| {
            RatingServiceError::ParseError(format!("Failed to parse search response: {}", e))
        })?;

        Ok(body.items.into_iter().map(Into::into).collect())
    }
}

#[async_trait::async_trait]
impl RatingService for DtddClient {
    async fn search_by_imdb(&self, imdb_id: &str) -> Result<Vec<SearchHit>, RatingServiceError> {
        debug!("DTDD search: imdb='{}'", imdb_id);
        self.search_with("imdb", imdb_id).await
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RatingServiceError> {
        debug!("DTDD search: query='{}'", query);
        self.search_with("q", query).await
    }

    async fn media(&self, id: u64) -> Result<ExternalRecord, RatingServiceError> {
        let url = format!("{}/media/{}", self.base_url, id);

        debug!("DTDD get media: id={}", id);

        let response = self.client.get(&url).send().await?;
        let response = check_status(response, || format!("Media ID {}", id)).await?;

        let media: DtddMediaResponse = response.json().await.map_err(|e| {
            RatingServiceError::ParseError(format!("Failed to parse media response: {}", e))
        })?;

        Ok(media.into_record(id))
    }
}

async fn check_status(
    response: Response,
    what: impl FnOnce() -> String,
) -> Result<Response, RatingServiceError> {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RatingServiceError::Unauthorized(
            "Invalid DTDD API key".to_string(),
        )),
        StatusCode::TOO_MANY_REQUESTS => Err(RatingServiceError::RateLimitExceeded),
        StatusCode::NOT_FOUND => Err(RatingServiceError::NotFound(what())),
        s if !s.is_success() => {
            let body = response.text().await.unwrap_or_default();
            Err(RatingServiceError::ApiError {
                status: s.as_u16(),
                message: body,
            })
        }
        _ => Ok(response),
    }
}

// ============================================================================
// DTDD API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct DtddSearchResponse {
    #[serde(default)]
    items: Vec<DtddItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DtddItem {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "lenient_year")]
    release_year: Option<i32>,
    #[serde(default)]
    item_type: Option<DtddItemType>,
}

#[derive(Debug, Deserialize)]
struct DtddItemType {
    #[serde(default)]
    name: String,
}

impl From<DtddItem> for SearchHit {
    fn from(item: DtddItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            release_year: item.release_year,
            item_type: item
                .item_type
                .map(|t| t.name)
                .filter(|name| !name.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DtddMediaResponse {
    #[serde(default)]
    item: Option<DtddItem>,
    #[serde(default)]
    topic_item_stats: Vec<DtddTopicStat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DtddTopicStat {
    #[serde(default)]
    topic: DtddTopic,
    #[serde(default)]
    yes_sum: u32,
    #[serde(default)]
    no_sum: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DtddTopic {
    #[serde(default)]
    name: String,
    #[serde(default)]
    not_name: Option<String>,
}

impl DtddMediaResponse {
    fn into_record(self, id: u64) -> ExternalRecord {
        let mut topics: BTreeMap<String, TopicVotes> = BTreeMap::new();
        for stat in self.topic_item_stats {
            let name = stat.topic.name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            let entry = topics.entry(name).or_default();
            entry.yes_votes = entry.yes_votes.saturating_add(stat.yes_sum);
            entry.no_votes = entry.no_votes.saturating_add(stat.no_sum);
            if entry.negated_label.is_none() {
                entry.negated_label = stat
                    .topic
                    .not_name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty());
            }
        }

        let (name, release_year) = match self.item {
            Some(item) => (item.name, item.release_year),
            None => (String::new(), None),
        };

        ExternalRecord {
            id,
            name,
            release_year,
            topics,
        }
    }
}

/// DTDD sends `releaseYear` as a string, a number, or nothing.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Some(serde_json::Value::String(s)) => s.trim().get(..4).and_then(|y| y.parse().ok()),
        _ => None,
    })
}
