//! Types for the sync orchestrator.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that stop a run before any item is processed.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The media server could not list its libraries.
    #[error("media server error: {0}")]
    MediaServer(#[from] crate::media_server::MediaServerError),

    /// No movie library is in scope.
    #[error("no movie libraries to process")]
    NoLibraries,

    /// Single-item mode named a title no library contains.
    #[error("no library item titled '{0}'")]
    ItemNotFound(String),

    /// Sync mode was requested without a matcher.
    #[error("sync mode requires a rating-service matcher")]
    MatcherUnavailable,
}

/// What a run does to each summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Look up warnings and write them into summaries.
    #[default]
    Sync,
    /// Strip warning blocks. Needs no rating service.
    Clear,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Sync => write!(f, "sync"),
            RunMode::Clear => write!(f, "clear"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: RunMode,
    /// Log intended writes instead of performing them.
    pub dry_run: bool,
    /// Restrict the run to items with this title (case-insensitive).
    pub only_title: Option<String>,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Items examined.
    pub processed: usize,
    /// Items the matcher resolved. Always 0 in clear mode.
    pub matched: usize,
    pub unmatched: usize,
    /// Summaries written, or that would have been in a dry run.
    pub updated: usize,
    pub unchanged: usize,
    /// Items left alone because the rating service could not be reached.
    pub skipped: usize,
    /// Items whose summary write failed.
    pub failed: usize,
    /// Sections whose item listing failed.
    pub failed_sections: Vec<String>,
    pub dry_run: bool,
}

impl RunReport {
    /// True when every item was handled and every write succeeded.
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.failed == 0 && self.failed_sections.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} matched={} unmatched={} {}={} unchanged={} skipped={} failed={}",
            self.processed,
            self.matched,
            self.unmatched,
            if self.dry_run { "would_update" } else { "updated" },
            self.updated,
            self.unchanged,
            self.skipped,
            self.failed
        )?;
        if !self.failed_sections.is_empty() {
            write!(f, " failed_sections={}", self.failed_sections.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = RunReport {
            processed: 4,
            matched: 2,
            unmatched: 2,
            updated: 1,
            unchanged: 3,
            ..Default::default()
        };
        assert_eq!(
            report.to_string(),
            "processed=4 matched=2 unmatched=2 updated=1 unchanged=3 skipped=0 failed=0"
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_report_display_dry_run_and_failed_sections() {
        let report = RunReport {
            updated: 2,
            failed_sections: vec!["Movies".to_string()],
            dry_run: true,
            ..Default::default()
        };
        let line = report.to_string();
        assert!(line.contains("would_update=2"));
        assert!(line.ends_with("failed_sections=Movies"));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_run_mode_default_is_sync() {
        assert_eq!(RunOptions::default().mode, RunMode::Sync);
        assert_eq!(RunMode::Clear.to_string(), "clear");
    }
}
