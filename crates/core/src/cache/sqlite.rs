//! SQLite-backed record cache implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use super::{CacheError, CacheLookup, CachedPayload, RecordCache};

/// SQLite-backed record cache.
///
/// Each `put` is a single `INSERT OR REPLACE`, so a reader never sees a
/// half-written entry even if the process dies mid-write.
pub struct SqliteRecordCache {
    conn: Mutex<Connection>,
    ttl: chrono::Duration,
}

impl SqliteRecordCache {
    /// Open (or create) the cache database at `path`.
    pub fn new(path: &Path, ttl: Duration) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Self::with_connection(conn, ttl)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory(ttl: Duration) -> Result<Self, CacheError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Self::with_connection(conn, ttl)
    }

    fn with_connection(conn: Connection, ttl: Duration) -> Result<Self, CacheError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CacheError::Internal(format!("TTL out of range: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            ttl,
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS record_cache (
                key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Internal("cache connection lock poisoned".to_string()))
    }

    /// Read `key` as if the current time were `now`.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Result<CacheLookup, CacheError> {
        let conn = self.lock()?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT payload, fetched_at FROM record_cache WHERE key = ?",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| CacheError::Database(e.to_string()))?;

        let Some((payload, fetched_at)) = row else {
            return Ok(CacheLookup::Miss);
        };

        let fetched_at = match DateTime::parse_from_rfc3339(&fetched_at) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                warn!("Cache entry '{}' has a bad timestamp ({}), ignoring", key, e);
                return Ok(CacheLookup::Miss);
            }
        };

        if now.signed_duration_since(fetched_at) >= self.ttl {
            return Ok(CacheLookup::Miss);
        }

        match serde_json::from_str::<CachedPayload>(&payload) {
            Ok(CachedPayload::Found(record)) => Ok(CacheLookup::Hit(record)),
            Ok(CachedPayload::NotFound) => Ok(CacheLookup::NotFound),
            Err(e) => {
                warn!("Cache entry '{}' is unreadable ({}), ignoring", key, e);
                Ok(CacheLookup::Miss)
            }
        }
    }

    /// Store `payload` under `key` with an explicit fetch time.
    pub fn put_at(
        &self,
        key: &str,
        payload: &CachedPayload,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let json =
            serde_json::to_string(payload).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO record_cache (key, payload, fetched_at) VALUES (?, ?, ?)",
            params![key, json, fetched_at.to_rfc3339()],
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }
}

impl RecordCache for SqliteRecordCache {
    fn get(&self, key: &str) -> Result<CacheLookup, CacheError> {
        self.get_at(key, Utc::now())
    }

    fn put(&self, key: &str, payload: &CachedPayload) -> Result<(), CacheError> {
        self.put_at(key, payload, Utc::now())
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM record_cache", [])
            .map_err(|e| CacheError::Database(e.to_string()))
    }

    fn len(&self) -> Result<usize, CacheError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM record_cache", [], |row| row.get(0))
            .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{ExternalRecord, TopicVotes};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const TTL: Duration = Duration::from_secs(3600);

    fn record() -> ExternalRecord {
        let mut topics = BTreeMap::new();
        topics.insert("animal death".to_string(), TopicVotes::new(10, 1));
        ExternalRecord {
            id: 7,
            name: "Test Movie".to_string(),
            release_year: Some(2001),
            topics,
        }
    }

    #[test]
    fn test_missing_key_is_miss() {
        let cache = SqliteRecordCache::in_memory(TTL).unwrap();
        assert_eq!(cache.get("id:imdb:tt1").unwrap(), CacheLookup::Miss);
    }

    #[test]
    fn test_put_then_get_hit() {
        let cache = SqliteRecordCache::in_memory(TTL).unwrap();
        cache
            .put("id:imdb:tt1", &CachedPayload::Found(record()))
            .unwrap();

        assert_eq!(
            cache.get("id:imdb:tt1").unwrap(),
            CacheLookup::Hit(record())
        );
    }

    #[test]
    fn test_negative_entry() {
        let cache = SqliteRecordCache::in_memory(TTL).unwrap();
        cache
            .put("search:nothing:any", &CachedPayload::NotFound)
            .unwrap();

        assert_eq!(
            cache.get("search:nothing:any").unwrap(),
            CacheLookup::NotFound
        );
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let cache = SqliteRecordCache::in_memory(TTL).unwrap();
        let fetched = Utc::now();
        cache
            .put_at("media:7", &CachedPayload::Found(record()), fetched)
            .unwrap();

        let ttl = chrono::Duration::from_std(TTL).unwrap();
        let just_before = fetched + ttl - chrono::Duration::seconds(1);
        assert!(matches!(
            cache.get_at("media:7", just_before).unwrap(),
            CacheLookup::Hit(_)
        ));
        assert_eq!(
            cache.get_at("media:7", fetched + ttl).unwrap(),
            CacheLookup::Miss
        );
        assert_eq!(
            cache
                .get_at("media:7", fetched + ttl + chrono::Duration::days(1))
                .unwrap(),
            CacheLookup::Miss
        );
    }

    #[test]
    fn test_put_replaces_entry() {
        let cache = SqliteRecordCache::in_memory(TTL).unwrap();
        cache.put("k", &CachedPayload::NotFound).unwrap();
        cache.put("k", &CachedPayload::Found(record())).unwrap();

        assert_eq!(cache.get("k").unwrap(), CacheLookup::Hit(record()));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_refresh_after_expiry() {
        let cache = SqliteRecordCache::in_memory(TTL).unwrap();
        let old = Utc::now() - chrono::Duration::days(30);
        cache.put_at("k", &CachedPayload::NotFound, old).unwrap();
        assert_eq!(cache.get("k").unwrap(), CacheLookup::Miss);

        cache.put("k", &CachedPayload::Found(record())).unwrap();
        assert_eq!(cache.get("k").unwrap(), CacheLookup::Hit(record()));
    }

    #[test]
    fn test_clear_removes_everything() {
        let cache = SqliteRecordCache::in_memory(TTL).unwrap();
        cache.put("a", &CachedPayload::NotFound).unwrap();
        cache.put("b", &CachedPayload::Found(record())).unwrap();
        assert_eq!(cache.len().unwrap(), 2);

        assert_eq!(cache.clear().unwrap(), 2);
        assert_eq!(cache.len().unwrap(), 0);
        assert_eq!(cache.get("a").unwrap(), CacheLookup::Miss);
    }

    #[test]
    fn test_corrupt_payload_is_miss() {
        let cache = SqliteRecordCache::in_memory(TTL).unwrap();
        {
            let conn = cache.lock().unwrap();
            conn.execute(
                "INSERT INTO record_cache (key, payload, fetched_at) VALUES (?, ?, ?)",
                params!["bad", "{\"status\":", Utc::now().to_rfc3339()],
            )
            .unwrap();
        }

        assert_eq!(cache.get("bad").unwrap(), CacheLookup::Miss);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.db");

        {
            let cache = SqliteRecordCache::new(&path, TTL).unwrap();
            cache
                .put("id:imdb:tt1", &CachedPayload::Found(record()))
                .unwrap();
        }

        let reopened = SqliteRecordCache::new(&path, TTL).unwrap();
        assert_eq!(
            reopened.get("id:imdb:tt1").unwrap(),
            CacheLookup::Hit(record())
        );
    }
}
