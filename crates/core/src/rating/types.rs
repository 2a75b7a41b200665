//! Types for rating-service records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Community vote tallies for one topic of a title.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicVotes {
    /// Votes saying the topic occurs.
    pub yes_votes: u32,
    /// Votes saying the topic does not occur.
    pub no_votes: u32,
    /// Negated phrasing of the topic ("a dog does not die").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negated_label: Option<String>,
}

impl TopicVotes {
    pub fn new(yes_votes: u32, no_votes: u32) -> Self {
        Self {
            yes_votes,
            no_votes,
            negated_label: None,
        }
    }

    pub fn total(&self) -> u32 {
        self.yes_votes.saturating_add(self.no_votes)
    }
}

/// A title resolved on the rating service, with its per-topic votes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalRecord {
    /// Rating-service media ID.
    pub id: u64,
    /// Display name on the rating service.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    /// Topic name -> votes. Ordered so serialized records are stable.
    #[serde(default)]
    pub topics: BTreeMap<String, TopicVotes>,
}

/// One row of a rating-service search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    /// Item type reported by the service ("Movie", "TV Show", "Book", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
}

impl SearchHit {
    /// Hits without a type are kept, since the service does not always send one.
    pub fn is_movie(&self) -> bool {
        self.item_type
            .as_deref()
            .map_or(true, |t| t.eq_ignore_ascii_case("movie"))
    }
}
