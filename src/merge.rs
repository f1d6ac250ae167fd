//! Merge computation between the remote term set and incoming terms.
//!
//! [`merge`] is pure: it never touches the network and only reads its
//! inputs. Statistics follow the phrase-key contract, so a matched phrase
//! counts as updated even when its definition did not change.

use crate::terms::TermSet;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How incoming terms combine with the remote set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Union with override: incoming definitions replace matching phrases,
    /// unmatched remote terms are kept.
    #[default]
    Merge,
    /// Full replacement: the result is exactly the incoming set.
    Overwrite,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Merge => "merge",
            MergeStrategy::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid merge strategy '{0}' (expected 'merge' or 'overwrite')")]
pub struct InvalidStrategy(pub String);

impl FromStr for MergeStrategy {
    type Err = InvalidStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(MergeStrategy::Merge),
            "overwrite" => Ok(MergeStrategy::Overwrite),
            _ => Err(InvalidStrategy(s.to_string())),
        }
    }
}

/// Change statistics for one merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub strategy: MergeStrategy,
    pub terms_before: usize,
    pub terms_after: usize,
    pub terms_added: usize,
    pub terms_updated: usize,
    pub terms_removed: usize,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

impl MergeStats {
    fn new(strategy: MergeStrategy, at: DateTime<Utc>) -> Self {
        Self {
            strategy,
            terms_before: 0,
            terms_after: 0,
            terms_added: 0,
            terms_updated: 0,
            terms_removed: 0,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Same counts, ignoring when the merge ran.
    pub fn same_counts(&self, other: &MergeStats) -> bool {
        self.strategy == other.strategy
            && self.terms_before == other.terms_before
            && self.terms_after == other.terms_after
            && self.terms_added == other.terms_added
            && self.terms_updated == other.terms_updated
            && self.terms_removed == other.terms_removed
    }
}

/// Combine `current` with `incoming` under `strategy`.
pub fn merge(current: &TermSet, incoming: &TermSet, strategy: MergeStrategy) -> (TermSet, MergeStats) {
    merge_at(current, incoming, strategy, Utc::now())
}

/// [`merge`] with an explicit timestamp.
pub fn merge_at(
    current: &TermSet,
    incoming: &TermSet,
    strategy: MergeStrategy,
    at: DateTime<Utc>,
) -> (TermSet, MergeStats) {
    let mut stats = MergeStats::new(strategy, at);
    stats.terms_before = current.len();

    let result = match strategy {
        MergeStrategy::Merge => {
            let mut result = current.clone();
            // Incoming keys are unique, so a replaced entry came from `current`
            for term in incoming {
                if result.upsert(term.clone()).is_some() {
                    stats.terms_updated += 1;
                }
            }
            stats.terms_added = result.len() - current.len();
            result
        }
        MergeStrategy::Overwrite => {
            for term in incoming {
                if current.contains(term.phrase()) {
                    stats.terms_updated += 1;
                } else {
                    stats.terms_added += 1;
                }
            }
            stats.terms_removed = current
                .iter()
                .filter(|term| !incoming.contains(term.phrase()))
                .count();
            incoming.clone()
        }
    };

    stats.terms_after = result.len();
    tracing::debug!(
        strategy = %strategy,
        before = stats.terms_before,
        after = stats.terms_after,
        added = stats.terms_added,
        updated = stats.terms_updated,
        removed = stats.terms_removed,
        "Computed merge"
    );
    (result, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::term;

    fn set(pairs: &[(&str, &str)]) -> TermSet {
        pairs.iter().map(|(p, d)| term(p, d)).collect()
    }

    fn current() -> TermSet {
        set(&[
            ("API", "Application Programming Interface"),
            ("REST", "Representational State Transfer"),
            ("JSON", "JavaScript Object Notation"),
        ])
    }

    fn incoming() -> TermSet {
        set(&[
            ("GraphQL", "Query language for APIs"),
            ("rest", "REST architectural style (updated)"),
            ("SOAP", "Simple Object Access Protocol"),
        ])
    }

    fn assert_balanced(stats: &MergeStats) {
        assert_eq!(
            stats.terms_after,
            stats.terms_before + stats.terms_added - stats.terms_removed
        );
    }

    #[test]
    fn merge_strategy_adds_and_overrides() {
        let (result, stats) = merge(&current(), &incoming(), MergeStrategy::Merge);
        assert_eq!(result.len(), 5);
        assert_eq!(stats.terms_before, 3);
        assert_eq!(stats.terms_after, 5);
        assert_eq!(stats.terms_added, 2);
        assert_eq!(stats.terms_updated, 1);
        assert_eq!(stats.terms_removed, 0);
        assert_eq!(
            result.get("REST").unwrap().definition(),
            "REST architectural style (updated)"
        );
        assert!(result.contains("api"));
        assert_balanced(&stats);
    }

    #[test]
    fn overwrite_strategy_replaces_everything() {
        let (result, stats) = merge(&current(), &incoming(), MergeStrategy::Overwrite);
        assert_eq!(result, incoming());
        assert_eq!(stats.terms_added, 2);
        assert_eq!(stats.terms_updated, 1);
        assert_eq!(stats.terms_removed, 2);
        assert_eq!(stats.terms_after, 3);
        assert!(!result.contains("API"));
        assert_balanced(&stats);
    }

    #[test]
    fn merging_nothing_is_identity() {
        let (result, stats) = merge(&current(), &TermSet::new(), MergeStrategy::Merge);
        assert_eq!(result, current());
        assert_eq!(stats.terms_added, 0);
        assert_eq!(stats.terms_updated, 0);
        assert_balanced(&stats);
    }

    #[test]
    fn overwrite_with_nothing_empties_the_set() {
        let (result, stats) = merge(&current(), &TermSet::new(), MergeStrategy::Overwrite);
        assert!(result.is_empty());
        assert_eq!(stats.terms_removed, 3);
        assert_balanced(&stats);
    }

    #[test]
    fn identical_resubmission_counts_as_updates() {
        let (result, stats) = merge(&current(), &current(), MergeStrategy::Merge);
        assert_eq!(result, current());
        assert_eq!(stats.terms_updated, 3);
        assert_eq!(stats.terms_added, 0);
    }

    #[test]
    fn merge_into_empty_remote() {
        let (result, stats) = merge(&TermSet::new(), &incoming(), MergeStrategy::Merge);
        assert_eq!(result.len(), 3);
        assert_eq!(stats.terms_before, 0);
        assert_eq!(stats.terms_added, 3);
        assert_balanced(&stats);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let c = current();
        let i = incoming();
        let _ = merge(&c, &i, MergeStrategy::Merge);
        assert_eq!(c, current());
        assert_eq!(i, incoming());
    }

    #[test]
    fn balance_holds_across_overlaps() {
        let cases: Vec<(TermSet, TermSet)> = vec![
            (set(&[]), set(&[])),
            (set(&[("a", "1")]), set(&[("A", "2")])),
            (set(&[("a", "1"), ("b", "2")]), set(&[("c", "3")])),
            (set(&[("a", "1"), ("b", "2"), ("c", "3")]), set(&[("b", "x"), ("d", "y")])),
        ];
        for (c, i) in cases {
            for strategy in [MergeStrategy::Merge, MergeStrategy::Overwrite] {
                let (result, stats) = merge(&c, &i, strategy);
                assert_balanced(&stats);
                assert_eq!(result.len(), stats.terms_after);
            }
        }
    }

    #[test]
    fn strategy_parsing() {
        assert_eq!("merge".parse::<MergeStrategy>(), Ok(MergeStrategy::Merge));
        assert_eq!(" Overwrite ".parse::<MergeStrategy>(), Ok(MergeStrategy::Overwrite));
        let err = "replace".parse::<MergeStrategy>().unwrap_err();
        assert_eq!(err, InvalidStrategy("replace".to_string()));
    }

    #[test]
    fn stats_serialize_with_lowercase_strategy() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let (_, stats) = merge_at(&current(), &incoming(), MergeStrategy::Overwrite, at);
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["strategy"], "overwrite");
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00Z");
        assert!(stats.same_counts(&merge(&current(), &incoming(), MergeStrategy::Overwrite).1));
    }
}
