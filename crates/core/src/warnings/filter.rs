//! Turns per-topic vote tallies into flagged and safe topic lists.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::rating::ExternalRecord;

/// Vote thresholds for deciding what the community agrees on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Minimum yes-votes before a topic is flagged.
    #[serde(default = "default_min_yes_votes")]
    pub min_yes_votes: u32,
    /// Minimum share of yes-votes before a topic is flagged.
    #[serde(default = "default_min_yes_ratio")]
    pub min_yes_ratio: f64,
    /// Also list topics the community agrees do not occur.
    #[serde(default)]
    pub show_safe_topics: bool,
    /// Minimum total votes for a safe topic (default: `min_yes_votes`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_min_votes: Option<u32>,
    /// Minimum share of no-votes for a safe topic (default: `min_yes_ratio`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_min_ratio: Option<f64>,
}

fn default_min_yes_votes() -> u32 {
    3
}

fn default_min_yes_ratio() -> f64 {
    0.6
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_yes_votes: default_min_yes_votes(),
            min_yes_ratio: default_min_yes_ratio(),
            show_safe_topics: false,
            safe_min_votes: None,
            safe_min_ratio: None,
        }
    }
}

impl FilterConfig {
    pub fn new(min_yes_votes: u32, min_yes_ratio: f64) -> Self {
        Self {
            min_yes_votes,
            min_yes_ratio,
            ..Default::default()
        }
    }

    pub fn safe_min_votes(&self) -> u32 {
        self.safe_min_votes.unwrap_or(self.min_yes_votes)
    }

    pub fn safe_min_ratio(&self) -> f64 {
        self.safe_min_ratio.unwrap_or(self.min_yes_ratio)
    }
}

/// Topic labels the community agrees on, strongest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningSet {
    pub flagged: Vec<String>,
    pub safe: Vec<String>,
}

impl WarningSet {
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty() && self.safe.is_empty()
    }
}

/// Classify every topic of `record`.
///
/// A topic is flagged when `yes >= min_yes_votes` and `yes / total >= min_yes_ratio`.
/// It is safe when `total >= safe_min_votes` and `no / total >= safe_min_ratio`,
/// which with the default thresholds mirrors the flag rule. The safe ratio is
/// taken from the no-votes directly, not as `1 - yes / total`, so an exact
/// boundary such as 8 of 25 at 0.32 counts as safe. Topics without
/// votes are neither. A topic passing both tests is only flagged.
///
/// Flagged topics are ordered by yes-votes, safe topics by no-votes, both
/// descending with the label as tiebreak.
pub fn filter(record: &ExternalRecord, config: &FilterConfig) -> WarningSet {
    let mut flagged: Vec<(u32, &str)> = Vec::new();
    let mut safe: Vec<(u32, &str)> = Vec::new();

    for (name, votes) in &record.topics {
        let total = votes.total();
        if total == 0 || name.trim().is_empty() {
            continue;
        }

        let yes_ratio = f64::from(votes.yes_votes) / f64::from(total);
        let no_ratio = f64::from(votes.no_votes) / f64::from(total);

        if votes.yes_votes >= config.min_yes_votes && yes_ratio >= config.min_yes_ratio {
            flagged.push((votes.yes_votes, name.as_str()));
        } else if total >= config.safe_min_votes() && no_ratio >= config.safe_min_ratio() {
            let label = votes
                .negated_label
                .as_deref()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or(name.as_str());
            safe.push((votes.no_votes, label));
        }
    }

    WarningSet {
        flagged: ordered(flagged),
        safe: ordered(safe),
    }
}

fn ordered(mut topics: Vec<(u32, &str)>) -> Vec<String> {
    topics.sort_by_key(|&(count, label)| (Reverse(count), label));
    topics.into_iter().map(|(_, label)| label.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::TopicVotes;
    use std::collections::BTreeMap;

    fn record(topics: &[(&str, u32, u32)]) -> ExternalRecord {
        let topics: BTreeMap<String, TopicVotes> = topics
            .iter()
            .map(|(name, yes, no)| (name.to_string(), TopicVotes::new(*yes, *no)))
            .collect();
        ExternalRecord {
            id: 1,
            name: "Test".to_string(),
            release_year: None,
            topics,
        }
    }

    #[test]
    fn test_flag_boundary() {
        let config = FilterConfig::new(5, 0.7);

        let set = filter(&record(&[("spiders", 5, 0)]), &config);
        assert_eq!(set.flagged, vec!["spiders"]);

        let set = filter(&record(&[("spiders", 4, 0)]), &config);
        assert!(set.flagged.is_empty());
    }

    #[test]
    fn test_ratio_boundary_is_inclusive() {
        let config = FilterConfig::new(1, 0.7);
        let set = filter(&record(&[("gore", 7, 3)]), &config);
        assert_eq!(set.flagged, vec!["gore"]);

        let set = filter(&record(&[("gore", 69, 31)]), &config);
        assert!(set.flagged.is_empty());
    }

    #[test]
    fn test_zero_votes_excluded_from_both_lists() {
        let mut config = FilterConfig::new(0, 0.0);
        config.show_safe_topics = true;
        let set = filter(&record(&[("nothing known", 0, 0)]), &config);
        assert!(set.is_empty());
    }

    #[test]
    fn test_safe_mirrors_flag_rule() {
        let config = FilterConfig::new(5, 0.7);

        // 0 yes out of 5: ratio 0.0 <= 0.3
        let set = filter(&record(&[("a dog dies", 0, 5)]), &config);
        assert_eq!(set.safe, vec!["a dog dies"]);

        // not enough total votes
        let set = filter(&record(&[("a dog dies", 0, 4)]), &config);
        assert!(set.safe.is_empty());

        // 3 yes out of 10: ratio 0.3, exactly at the mirrored boundary
        let set = filter(&record(&[("a cat dies", 3, 7)]), &config);
        assert_eq!(set.safe, vec!["a cat dies"]);

        // 4 yes out of 10: contested, neither list
        let set = filter(&record(&[("a horse dies", 4, 6)]), &config);
        assert!(set.is_empty());
    }

    #[test]
    fn test_safe_thresholds_independently_configurable() {
        let mut config = FilterConfig::new(5, 0.7);
        config.safe_min_votes = Some(20);
        config.safe_min_ratio = Some(0.95);

        let set = filter(&record(&[("clowns", 0, 10)]), &config);
        assert!(set.safe.is_empty());

        let set = filter(&record(&[("clowns", 1, 19)]), &config);
        assert_eq!(set.safe, vec!["clowns"]);

        let set = filter(&record(&[("clowns", 2, 18)]), &config);
        assert!(set.safe.is_empty());
    }

    #[test]
    fn test_safe_ratio_boundary_uses_no_votes() {
        let mut config = FilterConfig::new(100, 0.9);
        config.safe_min_votes = Some(1);
        config.safe_min_ratio = Some(0.32);

        // 1.0 - 0.32 rounds below 17/25, so the complement form would miss this.
        assert!(17.0 / 25.0 > 1.0 - 0.32);

        let set = filter(&record(&[("x", 17, 8)]), &config);
        assert!(set.flagged.is_empty());
        assert_eq!(set.safe, vec!["x"]);
    }

    #[test]
    fn test_safe_uses_negated_label() {
        let mut rec = record(&[]);
        rec.topics.insert(
            "a dog dies".to_string(),
            TopicVotes {
                yes_votes: 0,
                no_votes: 30,
                negated_label: Some("a dog does not die".to_string()),
            },
        );
        let set = filter(&rec, &FilterConfig::new(3, 0.6));
        assert_eq!(set.safe, vec!["a dog does not die"]);
    }

    #[test]
    fn test_low_ratio_threshold_prefers_flagged() {
        let config = FilterConfig::new(1, 0.5);
        let set = filter(&record(&[("vomit", 5, 5)]), &config);
        assert_eq!(set.flagged, vec!["vomit"]);
        assert!(set.safe.is_empty());
    }

    #[test]
    fn test_ordering_by_votes_then_label() {
        let config = FilterConfig::new(1, 0.5);
        let set = filter(
            &record(&[
                ("b topic", 10, 0),
                ("a topic", 10, 0),
                ("c topic", 30, 2),
                ("d topic", 2, 0),
                ("safe x", 0, 8),
                ("safe y", 0, 12),
                ("safe w", 0, 8),
            ]),
            &config,
        );

        assert_eq!(set.flagged, vec!["c topic", "a topic", "b topic", "d topic"]);
        assert_eq!(set.safe, vec!["safe y", "safe w", "safe x"]);
    }

    #[test]
    fn test_filter_is_deterministic() {
        let config = FilterConfig::new(2, 0.6);
        let rec = record(&[("x", 9, 1), ("y", 9, 1), ("z", 0, 9)]);
        assert_eq!(filter(&rec, &config), filter(&rec, &config));
    }
}
