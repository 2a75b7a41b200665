//! Media-server integration.
//!
//! The orchestrator only needs three operations from the server: list the
//! library sections, list a section's items, and write an item's summary.

mod plex;
mod types;

pub use plex::{PlexClient, PlexConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the media server.
#[derive(Debug, Error)]
pub enum MediaServerError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The token was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Item or section does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Trait for media-server backends.
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// List every library section on the server.
    async fn sections(&self) -> Result<Vec<LibrarySection>, MediaServerError>;

    /// List all items of a section.
    async fn items(&self, section: &LibrarySection) -> Result<Vec<LibraryItem>, MediaServerError>;

    /// Replace an item's summary text.
    async fn update_summary(
        &self,
        item: &LibraryItem,
        summary: &str,
    ) -> Result<(), MediaServerError>;
}
