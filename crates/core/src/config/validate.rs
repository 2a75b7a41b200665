use super::{types::Config, ConfigError};
use crate::lookup::Pacer;

/// Validate configuration
/// Currently validates:
/// - Plex url and token are present
/// - Vote ratios are within 0.0..=1.0
/// - Pacing (at most one day), TTL and timeout values are usable
/// - A custom separator has visible characters
///
/// The DTDD API key is checked when the rating client is built, since
/// clear modes never talk to the rating service.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.plex.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "plex.url cannot be empty".to_string(),
        ));
    }
    if config.plex.token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "plex.token cannot be empty".to_string(),
        ));
    }

    check_ratio("filter.min_yes_ratio", config.filter.min_yes_ratio)?;
    if let Some(ratio) = config.filter.safe_min_ratio {
        check_ratio("filter.safe_min_ratio", ratio)?;
    }

    let delay = config.dtdd.api_delay_secs;
    if !delay.is_finite() || delay < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "dtdd.api_delay_secs must be a non-negative number, got {}",
            delay
        )));
    }
    let max_delay = Pacer::MAX_INTERVAL.as_secs_f64();
    if delay > max_delay {
        return Err(ConfigError::ValidationError(format!(
            "dtdd.api_delay_secs cannot exceed {} seconds, got {}",
            max_delay, delay
        )));
    }
    if config.dtdd.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "dtdd.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.cache.ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cache.ttl_secs cannot be 0".to_string(),
        ));
    }

    if config.sync.interval_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "sync.interval_secs cannot be 0".to_string(),
        ));
    }
    if config.sync.separator().trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "sync.separator must contain visible characters".to_string(),
        ));
    }

    Ok(())
}

fn check_ratio(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be between 0.0 and 1.0, got {}",
            name, value
        )));
    }
    Ok(())
}
