//! Testing utilities and mock implementations.
//!
//! Mocks for the two network collaborators let the whole pipeline run
//! without a Plex server or DTDD API key.
//!
//! # Example
//!
//! ```rust,ignore
//! use dogwatch_core::testing::{fixtures, MockMediaServer, MockRatingService};
//!
//! let rating = MockRatingService::new();
//! rating.add_record(fixtures::record(1, "Old Yeller", &[("a dog dies", 50, 2)]), Some(1957)).await;
//!
//! let plex = MockMediaServer::new();
//! plex.add_section(fixtures::movie_section("1", "Movies")).await;
//! plex.add_item(fixtures::library_item("100", "Old Yeller", Some(1957))).await;
//! ```

mod mock_media_server;
mod mock_rating_service;

pub use mock_media_server::{MockMediaServer, RecordedUpdate};
pub use mock_rating_service::{MockRatingService, RecordedRatingCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::media_server::{LibraryItem, LibrarySection};
    use crate::rating::{ExternalRecord, TopicVotes};

    /// Create a record with `(topic, yes, no)` tallies.
    pub fn record(id: u64, name: &str, topics: &[(&str, u32, u32)]) -> ExternalRecord {
        let topics: BTreeMap<String, TopicVotes> = topics
            .iter()
            .map(|(topic, yes, no)| (topic.to_string(), TopicVotes::new(*yes, *no)))
            .collect();
        ExternalRecord {
            id,
            name: name.to_string(),
            release_year: None,
            topics,
        }
    }

    /// Create a movie section.
    pub fn movie_section(key: &str, title: &str) -> LibrarySection {
        LibrarySection {
            key: key.to_string(),
            title: title.to_string(),
            kind: "movie".to_string(),
        }
    }

    /// Create a library item in section "1" with a short plot summary.
    pub fn library_item(id: &str, title: &str, year: Option<i32>) -> LibraryItem {
        LibraryItem {
            id: id.to_string(),
            section_key: "1".to_string(),
            title: title.to_string(),
            year,
            external_ids: Vec::new(),
            summary: format!("A film called {}.", title),
        }
    }
}
