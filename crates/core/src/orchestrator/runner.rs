//! Sync orchestrator implementation.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::lookup::Lookup;
use crate::matcher::Matcher;
use crate::media_server::{LibraryItem, LibrarySection, MediaServer};
use crate::summary::Synchronizer;
use crate::warnings::{filter, format_block, FilterConfig};

use super::types::{OrchestratorError, RunMode, RunOptions, RunReport};

/// Drives library items through match, filter, format and write-back.
pub struct SyncOrchestrator {
    media: Arc<dyn MediaServer>,
    /// Library names in scope. Empty means every movie library.
    libraries: Vec<String>,
    filter: FilterConfig,
    synchronizer: Synchronizer,
    matcher: Option<Matcher>,
}

impl SyncOrchestrator {
    /// Create an orchestrator that can run in clear mode.
    ///
    /// Sync mode also needs [`SyncOrchestrator::with_matcher`].
    pub fn new(
        media: Arc<dyn MediaServer>,
        libraries: Vec<String>,
        filter: FilterConfig,
        synchronizer: Synchronizer,
    ) -> Self {
        Self {
            media,
            libraries,
            filter,
            synchronizer,
            matcher: None,
        }
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Process every item in scope once.
    pub async fn run(&self, options: &RunOptions) -> Result<RunReport, OrchestratorError> {
        if options.mode == RunMode::Sync && self.matcher.is_none() {
            return Err(OrchestratorError::MatcherUnavailable);
        }

        let sections = self.sections_in_scope().await?;
        info!(
            "Starting {} run over {} librar{}{}",
            options.mode,
            sections.len(),
            if sections.len() == 1 { "y" } else { "ies" },
            if options.dry_run { " (dry run)" } else { "" }
        );

        let mut report = RunReport {
            dry_run: options.dry_run,
            ..Default::default()
        };

        for section in &sections {
            let items = match self.media.items(section).await {
                Ok(items) => items,
                Err(e) => {
                    error!("Failed to list items in library '{}': {}", section.title, e);
                    report.failed_sections.push(section.title.clone());
                    continue;
                }
            };
            debug!("Library '{}' has {} item(s)", section.title, items.len());

            for item in items.iter().filter(|item| in_scope(item, options)) {
                report.processed += 1;
                self.process_item(item, options, &mut report).await;
            }
        }

        if let Some(title) = &options.only_title {
            if report.processed == 0 {
                return Err(OrchestratorError::ItemNotFound(title.clone()));
            }
        }

        if let Some(matcher) = &self.matcher {
            let stats = matcher.lookup().stats();
            debug!(
                "Lookups: {} cache hit(s), {} network call(s)",
                stats.cache_hits, stats.network_calls
            );
        }
        info!("Run complete: {}", report);

        Ok(report)
    }

    /// Configured libraries that exist and hold movies, or every movie
    /// library when none are configured.
    async fn sections_in_scope(&self) -> Result<Vec<LibrarySection>, OrchestratorError> {
        let all = self.media.sections().await?;

        let sections: Vec<LibrarySection> = if self.libraries.is_empty() {
            all.into_iter().filter(|s| s.is_movie()).collect()
        } else {
            let mut selected = Vec::new();
            for name in &self.libraries {
                match all.iter().find(|s| s.title.eq_ignore_ascii_case(name)) {
                    Some(section) if section.is_movie() => selected.push(section.clone()),
                    Some(section) => {
                        warn!(
                            "Library '{}' is a {} library, skipping",
                            section.title, section.kind
                        );
                    }
                    None => warn!("Library '{}' not found, skipping", name),
                }
            }
            selected
        };

        if sections.is_empty() {
            return Err(OrchestratorError::NoLibraries);
        }
        Ok(sections)
    }

    async fn process_item(&self, item: &LibraryItem, options: &RunOptions, report: &mut RunReport) {
        let block = match (options.mode, &self.matcher) {
            (RunMode::Sync, Some(matcher)) => match matcher.resolve(item).await {
                Ok(Lookup::Found(record)) => {
                    report.matched += 1;
                    let warnings = filter(&record, &self.filter);
                    info!(
                        "{}: matched '{}' ({} flagged, {} safe)",
                        item.display_name(),
                        record.name,
                        warnings.flagged.len(),
                        warnings.safe.len()
                    );
                    format_block(
                        &warnings,
                        self.filter.show_safe_topics,
                        self.synchronizer.separator(),
                    )
                }
                Ok(Lookup::NotFound) => {
                    report.unmatched += 1;
                    info!("{}: unmatched", item.display_name());
                    None
                }
                Err(e) => {
                    warn!("{}: skipped: {}", item.display_name(), e);
                    report.skipped += 1;
                    return;
                }
            },
            _ => None,
        };

        let outcome = self.synchronizer.sync(&item.summary, block.as_deref());
        if !outcome.changed {
            info!("{}: unchanged", item.display_name());
            report.unchanged += 1;
            return;
        }

        if options.dry_run {
            info!("{}: would update summary", item.display_name());
            debug!("{}: new summary: {:?}", item.display_name(), outcome.updated);
            report.updated += 1;
            return;
        }

        match self.media.update_summary(item, &outcome.updated).await {
            Ok(()) => {
                info!("{}: updated", item.display_name());
                report.updated += 1;
            }
            Err(e) => {
                error!("{}: failed: {}", item.display_name(), e);
                report.failed += 1;
            }
        }
    }
}

fn in_scope(item: &LibraryItem, options: &RunOptions) -> bool {
    match &options.only_title {
        Some(title) => item.title.trim().to_lowercase() == title.trim().to_lowercase(),
        None => true,
    }
}
