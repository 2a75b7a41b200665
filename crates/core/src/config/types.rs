use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::media_server::PlexConfig;
use crate::rating::DtddConfig;
use crate::summary::DEFAULT_SEPARATOR;
use crate::warnings::FilterConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub plex: PlexConfig,
    #[serde(default)]
    pub dtdd: DtddConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Record cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    /// Seconds before a cached lookup is considered stale (default: one week)
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_secs: default_ttl(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("dogwatch-cache.db")
}

fn default_ttl() -> u64 {
    604_800
}

/// Summary synchronization behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Compute and log changes without writing them to the media server
    #[serde(default)]
    pub dry_run: bool,
    /// Override for the line that starts the warning block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    /// Re-run the whole library every N seconds instead of exiting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

impl SyncConfig {
    pub fn separator(&self) -> &str {
        self.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR)
    }
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub plex_url: String,
    pub plex_token_configured: bool,
    pub libraries: Vec<String>,
    pub dtdd_api_key_configured: bool,
    pub dtdd_base_url: Option<String>,
    pub api_delay_secs: f64,
    pub filter: FilterConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            plex_url: config.plex.url.clone(),
            plex_token_configured: !config.plex.token.is_empty(),
            libraries: config.plex.libraries.clone(),
            dtdd_api_key_configured: !config.dtdd.api_key.is_empty(),
            dtdd_base_url: config.dtdd.base_url.clone(),
            api_delay_secs: config.dtdd.api_delay_secs,
            filter: config.filter.clone(),
            cache: config.cache.clone(),
            sync: config.sync.clone(),
        }
    }
}
