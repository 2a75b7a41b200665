//! Rating-service integration (DoesTheDogDie.com).
//!
//! The [`RatingService`] trait is the raw network surface. Caching, pacing and
//! candidate selection live in [`crate::lookup`].

mod dtdd;
mod types;

pub use dtdd::{DtddClient, DtddConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the rating service.
#[derive(Debug, Error)]
pub enum RatingServiceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API key was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Raw rating-service operations.
#[async_trait]
pub trait RatingService: Send + Sync {
    /// Search by IMDb ID (e.g. `tt1234567`).
    async fn search_by_imdb(&self, imdb_id: &str) -> Result<Vec<SearchHit>, RatingServiceError>;

    /// Search by free-text title.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RatingServiceError>;

    /// Fetch the per-topic votes for a media ID.
    ///
    /// Returns [`RatingServiceError::NotFound`] when the ID does not exist.
    async fn media(&self, id: u64) -> Result<ExternalRecord, RatingServiceError>;
}
