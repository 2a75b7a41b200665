//! Mock rating service for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::lookup::normalize_title;
use crate::rating::{ExternalRecord, RatingService, RatingServiceError, SearchHit};

/// A recorded rating-service call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRatingCall {
    SearchByImdb { imdb_id: String },
    Search { query: String },
    Media { id: u64 },
}

/// Mock implementation of the RatingService trait.
///
/// - Records are searchable by any part of their normalized name
/// - IMDb IDs resolve only when linked with [`MockRatingService::link_imdb`]
/// - Every call is recorded, including calls that fail
#[derive(Debug, Default)]
pub struct MockRatingService {
    /// Records and their search hits, in insertion order.
    records: Arc<RwLock<Vec<(SearchHit, ExternalRecord)>>>,
    /// IMDb ID -> record ID.
    imdb_links: Arc<RwLock<HashMap<String, u64>>>,
    calls: Arc<RwLock<Vec<RecordedRatingCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<RatingServiceError>>>,
}

impl MockRatingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a searchable movie record.
    pub async fn add_record(&self, record: ExternalRecord, year: Option<i32>) {
        let hit = SearchHit {
            id: record.id,
            name: record.name.clone(),
            release_year: year,
            item_type: Some("Movie".to_string()),
        };
        self.records.write().await.push((hit, record));
    }

    /// Make `imdb_id` resolve to the record with `record_id`.
    pub async fn link_imdb(&self, imdb_id: &str, record_id: u64) {
        self.imdb_links
            .write()
            .await
            .insert(imdb_id.to_string(), record_id);
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: RatingServiceError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedRatingCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    async fn record_call(&self, call: RecordedRatingCall) -> Result<(), RatingServiceError> {
        self.calls.write().await.push(call);
        match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RatingService for MockRatingService {
    async fn search_by_imdb(&self, imdb_id: &str) -> Result<Vec<SearchHit>, RatingServiceError> {
        self.record_call(RecordedRatingCall::SearchByImdb {
            imdb_id: imdb_id.to_string(),
        })
        .await?;

        let Some(id) = self.imdb_links.read().await.get(imdb_id).copied() else {
            return Ok(Vec::new());
        };

        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|(hit, _)| hit.id == id)
            .map(|(hit, _)| hit.clone())
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RatingServiceError> {
        self.record_call(RecordedRatingCall::Search {
            query: query.to_string(),
        })
        .await?;

        let wanted = normalize_title(query);
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|(hit, _)| normalize_title(&hit.name).contains(&wanted))
            .map(|(hit, _)| hit.clone())
            .collect())
    }

    async fn media(&self, id: u64) -> Result<ExternalRecord, RatingServiceError> {
        self.record_call(RecordedRatingCall::Media { id }).await?;

        self.records
            .read()
            .await
            .iter()
            .find(|(_, record)| record.id == id)
            .map(|(_, record)| record.clone())
            .ok_or_else(|| RatingServiceError::NotFound(format!("Media ID {}", id)))
    }
}
