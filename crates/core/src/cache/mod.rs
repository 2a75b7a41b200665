//! External record cache - remembers rating-service lookups between runs.
//!
//! Both positive results and "no match" answers are stored, so unmatched
//! titles are not searched again until their entry expires.

mod sqlite;

pub use sqlite::SqliteRecordCache;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rating::ExternalRecord;

/// What a lookup produced, as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "record", rename_all = "snake_case")]
pub enum CachedPayload {
    Found(ExternalRecord),
    NotFound,
}

/// Result of reading a cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Fresh positive entry.
    Hit(ExternalRecord),
    /// Fresh negative entry: the service answered with no match.
    NotFound,
    /// No entry, or the entry has expired.
    Miss,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for record cache storage.
pub trait RecordCache: Send + Sync {
    /// Read a key. Expired entries are reported as [`CacheLookup::Miss`].
    fn get(&self, key: &str) -> Result<CacheLookup, CacheError>;

    /// Store a result, replacing any previous entry for the key.
    fn put(&self, key: &str, payload: &CachedPayload) -> Result<(), CacheError>;

    /// Remove every entry. Returns the number of entries removed.
    fn clear(&self) -> Result<usize, CacheError>;

    /// Number of stored entries, expired ones included.
    fn len(&self) -> Result<usize, CacheError>;
}

/// Cache key for an identifier lookup, e.g. `id:imdb:tt0111161`.
pub fn id_key(provider: &str, value: &str) -> String {
    format!("id:{}:{}", provider.to_lowercase(), value.trim())
}

/// Cache key for a title search. `normalized_title` must already be normalized.
pub fn search_key(normalized_title: &str, year: Option<i32>) -> String {
    match year {
        Some(y) => format!("search:{}:{}", normalized_title, y),
        None => format!("search:{}:any", normalized_title),
    }
}

/// Cache key for a media detail fetch, shared by both lookup strategies.
pub fn media_key(id: u64) -> String {
    format!("media:{}", id)
}
