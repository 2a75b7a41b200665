//! Rate-limited, cached access to the rating service.
//!
//! Every lookup checks the [`RecordCache`] first. Only a miss reaches the
//! network, and every network call goes through the shared [`Pacer`].
//! "No match" answers are cached; transport failures are not.

mod pacer;
mod title;

pub use pacer::Pacer;
pub use title::{normalize_title, select_candidate, YEAR_TOLERANCE};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{id_key, media_key, search_key, CacheLookup, CachedPayload, RecordCache};
use crate::media_server::ExternalId;
use crate::rating::{ExternalRecord, RatingService, RatingServiceError};

/// Outcome of a lookup that got an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ExternalRecord),
    /// The service answered and had no match.
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    fn to_cached(&self) -> CachedPayload {
        match self {
            Lookup::Found(record) => CachedPayload::Found(record.clone()),
            Lookup::NotFound => CachedPayload::NotFound,
        }
    }
}

/// A lookup that could not determine an answer.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("rating service unavailable: {0}")]
    Transport(#[from] RatingServiceError),
}

/// Counters for one client's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    pub cache_hits: u64,
    pub network_calls: u64,
}

/// Cached, paced front for a [`RatingService`].
pub struct LookupClient {
    service: Arc<dyn RatingService>,
    cache: Arc<dyn RecordCache>,
    pacer: Pacer,
    cache_hits: AtomicU64,
    network_calls: AtomicU64,
}

impl LookupClient {
    pub fn new(service: Arc<dyn RatingService>, cache: Arc<dyn RecordCache>, pacer: Pacer) -> Self {
        Self {
            service,
            cache,
            pacer,
            cache_hits: AtomicU64::new(0),
            network_calls: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> LookupStats {
        LookupStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            network_calls: self.network_calls.load(Ordering::Relaxed),
        }
    }

    /// Resolve a record by external identifier.
    ///
    /// Identifiers the rating service does not index answer `NotFound`
    /// without touching cache or network.
    pub async fn lookup_by_id(&self, id: &ExternalId) -> Result<Lookup, LookupError> {
        if !id.is_imdb() {
            return Ok(Lookup::NotFound);
        }

        let key = id_key(&id.provider, &id.value);
        if let Some(cached) = self.cached(&key) {
            return Ok(cached);
        }

        self.pace().await;
        let hits = self.service.search_by_imdb(&id.value).await?;

        let best = hits.iter().find(|h| h.is_movie()).or_else(|| hits.first());
        let result = match best {
            Some(hit) => self.fetch_media(hit.id).await?,
            None => Lookup::NotFound,
        };

        self.store(&key, &result);
        Ok(result)
    }

    /// Resolve a record by title search, using `year` to disambiguate.
    pub async fn lookup_by_title(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Lookup, LookupError> {
        let normalized = normalize_title(title);
        if normalized.is_empty() {
            return Ok(Lookup::NotFound);
        }

        let key = search_key(&normalized, year);
        if let Some(cached) = self.cached(&key) {
            return Ok(cached);
        }

        self.pace().await;
        let hits = self.service.search(title.trim()).await?;

        let result = match select_candidate(&hits, title, year) {
            Some(hit) => self.fetch_media(hit.id).await?,
            None => {
                debug!(
                    "No unambiguous match for '{}' ({:?}) among {} result(s)",
                    title,
                    year,
                    hits.len()
                );
                Lookup::NotFound
            }
        };

        self.store(&key, &result);
        Ok(result)
    }

    async fn fetch_media(&self, id: u64) -> Result<Lookup, LookupError> {
        let key = media_key(id);
        if let Some(cached) = self.cached(&key) {
            return Ok(cached);
        }

        self.pace().await;
        let result = match self.service.media(id).await {
            Ok(record) => Lookup::Found(record),
            Err(RatingServiceError::NotFound(_)) => Lookup::NotFound,
            Err(e) => return Err(e.into()),
        };

        self.store(&key, &result);
        Ok(result)
    }

    /// Fresh cache entry, if any. Read failures count as a miss.
    fn cached(&self, key: &str) -> Option<Lookup> {
        let found = match self.cache.get(key) {
            Ok(CacheLookup::Hit(record)) => Lookup::Found(record),
            Ok(CacheLookup::NotFound) => Lookup::NotFound,
            Ok(CacheLookup::Miss) => return None,
            Err(e) => {
                warn!("Cache read failed for '{}', treating as miss: {}", key, e);
                return None;
            }
        };

        debug!("Cache hit: {}", key);
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        Some(found)
    }

    fn store(&self, key: &str, result: &Lookup) {
        if let Err(e) = self.cache.put(key, &result.to_cached()) {
            warn!("Cache write failed for '{}': {}", key, e);
        }
    }

    async fn pace(&self) {
        self.pacer.wait().await;
        self.network_calls.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, SqliteRecordCache};
    use crate::testing::{fixtures, MockRatingService, RecordedRatingCall};
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(3600);

    struct Harness {
        service: Arc<MockRatingService>,
        cache: Arc<SqliteRecordCache>,
        client: LookupClient,
    }

    fn harness() -> Harness {
        let service = Arc::new(MockRatingService::new());
        let cache = Arc::new(SqliteRecordCache::in_memory(TTL).unwrap());
        let client = LookupClient::new(
            service.clone(),
            cache.clone(),
            Pacer::new(Duration::ZERO),
        );
        Harness {
            service,
            cache,
            client,
        }
    }

    fn imdb(value: &str) -> ExternalId {
        ExternalId::new("imdb", value)
    }

    #[tokio::test]
    async fn test_lookup_by_id_found() {
        let h = harness();
        let record = fixtures::record(100, "Old Yeller", &[("a dog dies", 50, 2)]);
        h.service.add_record(record.clone(), Some(1957)).await;
        h.service.link_imdb("tt0050798", 100).await;

        let result = h.client.lookup_by_id(&imdb("tt0050798")).await.unwrap();
        assert_eq!(result, Lookup::Found(record));
        assert_eq!(h.client.stats().network_calls, 2);
    }

    #[tokio::test]
    async fn test_lookup_by_id_second_call_uses_cache() {
        let h = harness();
        h.service
            .add_record(fixtures::record(1, "Movie", &[]), None)
            .await;
        h.service.link_imdb("tt1", 1).await;

        h.client.lookup_by_id(&imdb("tt1")).await.unwrap();
        let calls_before = h.service.call_count().await;
        h.client.lookup_by_id(&imdb("tt1")).await.unwrap();

        assert_eq!(h.service.call_count().await, calls_before);
        assert_eq!(h.client.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_negative_result_is_cached() {
        let h = harness();

        let first = h.client.lookup_by_id(&imdb("tt404")).await.unwrap();
        assert_eq!(first, Lookup::NotFound);
        assert_eq!(h.service.call_count().await, 1);

        let second = h.client.lookup_by_id(&imdb("tt404")).await.unwrap();
        assert_eq!(second, Lookup::NotFound);
        assert_eq!(h.service.call_count().await, 1);
        assert_eq!(
            h.cache.get("id:imdb:tt404").unwrap(),
            CacheLookup::NotFound
        );
    }

    #[tokio::test]
    async fn test_unrecognized_provider_skips_network() {
        let h = harness();
        let result = h
            .client
            .lookup_by_id(&ExternalId::new("tmdb", "603"))
            .await
            .unwrap();

        assert_eq!(result, Lookup::NotFound);
        assert_eq!(h.service.call_count().await, 0);
        assert_eq!(h.cache.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_not_cached() {
        let h = harness();
        h.service
            .set_next_error(RatingServiceError::ApiError {
                status: 500,
                message: "boom".to_string(),
            })
            .await;

        let err = h.client.lookup_by_id(&imdb("tt1")).await.unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)));
        assert_eq!(h.cache.len().unwrap(), 0);

        // Next attempt reaches the network again.
        h.client.lookup_by_id(&imdb("tt1")).await.unwrap();
        assert_eq!(h.service.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_lookup_by_title_uses_year() {
        let h = harness();
        let old = fixtures::record(1, "Dune", &[("sexual assault", 1, 20)]);
        let new = fixtures::record(2, "Dune", &[("a dog dies", 0, 30)]);
        h.service.add_record(old, Some(1984)).await;
        h.service.add_record(new.clone(), Some(2021)).await;

        let result = h.client.lookup_by_title("Dune", Some(2021)).await.unwrap();
        assert_eq!(result, Lookup::Found(new));
        assert!(h
            .cache
            .get("search:dune:2021")
            .map(|l| matches!(l, CacheLookup::Hit(_)))
            .unwrap());
    }

    #[tokio::test]
    async fn test_lookup_by_title_ambiguous_is_not_found_and_cached() {
        let h = harness();
        h.service
            .add_record(fixtures::record(1, "Dune", &[]), Some(1984))
            .await;
        h.service
            .add_record(fixtures::record(2, "Dune", &[]), Some(2021))
            .await;

        let result = h.client.lookup_by_title("Dune", Some(1999)).await.unwrap();
        assert_eq!(result, Lookup::NotFound);
        assert_eq!(h.cache.get("search:dune:1999").unwrap(), CacheLookup::NotFound);

        let calls = h.service.call_count().await;
        h.client.lookup_by_title("DUNE", Some(1999)).await.unwrap();
        assert_eq!(h.service.call_count().await, calls);
    }

    #[tokio::test]
    async fn test_media_fetch_shared_between_strategies() {
        let h = harness();
        h.service
            .add_record(fixtures::record(9, "Heat", &[]), Some(1995))
            .await;
        h.service.link_imdb("tt0113277", 9).await;

        h.client.lookup_by_id(&imdb("tt0113277")).await.unwrap();
        h.client.lookup_by_title("Heat", Some(1995)).await.unwrap();

        let media_calls = h
            .service
            .recorded_calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, RecordedRatingCall::Media { .. }))
            .count();
        assert_eq!(media_calls, 1);
    }

    #[tokio::test]
    async fn test_blank_title_is_not_found_without_network() {
        let h = harness();
        let result = h.client.lookup_by_title(" -- ", None).await.unwrap();
        assert_eq!(result, Lookup::NotFound);
        assert_eq!(h.service.call_count().await, 0);
    }

    struct BrokenCache;

    impl RecordCache for BrokenCache {
        fn get(&self, _key: &str) -> Result<CacheLookup, CacheError> {
            Err(CacheError::Database("disk on fire".to_string()))
        }
        fn put(&self, _key: &str, _payload: &CachedPayload) -> Result<(), CacheError> {
            Err(CacheError::Database("disk on fire".to_string()))
        }
        fn clear(&self) -> Result<usize, CacheError> {
            Ok(0)
        }
        fn len(&self) -> Result<usize, CacheError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_cache_failures_degrade_to_network() {
        let service = Arc::new(MockRatingService::new());
        service
            .add_record(fixtures::record(3, "Jaws", &[]), Some(1975))
            .await;
        let client = LookupClient::new(
            service.clone(),
            Arc::new(BrokenCache),
            Pacer::new(Duration::ZERO),
        );

        let result = client.lookup_by_title("Jaws", Some(1975)).await.unwrap();
        assert!(result.is_found());
        assert_eq!(client.stats().cache_hits, 0);
    }

    #[tokio::test]
    async fn test_network_calls_are_paced() {
        let service = Arc::new(MockRatingService::new());
        service
            .add_record(fixtures::record(3, "Jaws", &[]), Some(1975))
            .await;
        let cache = Arc::new(SqliteRecordCache::in_memory(TTL).unwrap());
        let client = LookupClient::new(
            service,
            cache,
            Pacer::new(Duration::from_millis(40)),
        );

        let start = tokio::time::Instant::now();
        // search + media = two network calls, one pacing gap
        client.lookup_by_title("Jaws", Some(1975)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
