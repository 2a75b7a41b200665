pub mod cache;
pub mod config;
pub mod lookup;
pub mod matcher;
pub mod media_server;
pub mod orchestrator;
pub mod rating;
pub mod summary;
pub mod testing;
pub mod warnings;

pub use cache::{CacheError, CacheLookup, CachedPayload, RecordCache, SqliteRecordCache};
pub use config::{
    load_config, load_config_from_str, validate_config, CacheConfig, Config, ConfigError,
    SanitizedConfig, SyncConfig,
};
pub use lookup::{Lookup, LookupClient, LookupError, LookupStats, Pacer};
pub use matcher::Matcher;
pub use media_server::{
    ExternalId, LibraryItem, LibrarySection, MediaServer, MediaServerError, PlexClient, PlexConfig,
};
pub use orchestrator::{OrchestratorError, RunMode, RunOptions, RunReport, SyncOrchestrator};
pub use rating::{
    DtddClient, DtddConfig, ExternalRecord, RatingService, RatingServiceError, SearchHit,
    TopicVotes,
};
pub use summary::{SyncOutcome, Synchronizer, DEFAULT_SEPARATOR};
pub use warnings::{filter, format_block, FilterConfig, WarningSet};
