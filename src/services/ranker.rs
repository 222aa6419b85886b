//! Recency-weighted recommendation ranking.
//!
//! Candidates are ordered by a composite score against the current focus and
//! the navigation history:
//!
//! ```text
//! composite(c) = score(focus, c) + sum_i score(history[n-1-i], c) * decay(i)
//! decay(i)     = 1 / (i + offset)        (offset = 2 by default)
//! ```
//!
//! `i = 0` is the most recently visited history entry. Excluded candidates and
//! the focus itself are dropped. Zero-scored candidates are kept.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{ContentItem, ItemId};

use super::similarity::ScoringWeights;

/// Decay applied to older history entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayPolicy {
    /// Added to the recency index before taking the reciprocal; must be >= 1
    pub offset: f64,
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self { offset: 2.0 }
    }
}

impl DecayPolicy {
    /// Weight of the history entry `recency` steps back (0 = most recent).
    #[must_use]
    pub fn weight(&self, recency: usize) -> f64 {
        1.0 / (recency as f64 + self.offset)
    }
}

/// Ranks candidates against a focus item and a navigation history.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    weights: ScoringWeights,
    decay: DecayPolicy,
}

impl Ranker {
    #[must_use]
    pub const fn new(weights: ScoringWeights, decay: DecayPolicy) -> Self {
        Self { weights, decay }
    }

    /// Composite score of `candidate`, or `None` when it must not be shown.
    #[must_use]
    pub fn composite_score(
        &self,
        focus: &ContentItem,
        history: &[ContentItem],
        candidate: &ContentItem,
        exclude: &HashSet<ItemId>,
    ) -> Option<f64> {
        if candidate.id() == focus.id() || exclude.contains(candidate.id()) {
            return None;
        }

        let from_history: f64 = history
            .iter()
            .rev()
            .enumerate()
            .map(|(recency, visited)| {
                self.weights.score(visited, candidate) * self.decay.weight(recency)
            })
            .sum();

        Some(self.weights.score(focus, candidate) + from_history)
    }

    /// Orders `candidates` by descending composite score.
    ///
    /// Ties keep their order from `candidates`. An empty candidate list
    /// yields an empty result, which callers answer by fetching a fresh
    /// batch.
    #[must_use]
    pub fn rank(
        &self,
        focus: &ContentItem,
        history: &[ContentItem],
        candidates: Vec<ContentItem>,
        exclude: &HashSet<ItemId>,
    ) -> Vec<ContentItem> {
        let mut scored: Vec<(f64, ContentItem)> = candidates
            .into_iter()
            .filter_map(|candidate| {
                self.composite_score(focus, history, &candidate, exclude)
                    .map(|score| (score, candidate))
            })
            .collect();

        // sort_by is stable, so equal scores keep candidate order
        scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

        scored.into_iter().map(|(_, candidate)| candidate).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentAttributes, MediaRef};

    fn item(id: &str, categories: &[&str], tags: &[&str]) -> ContentItem {
        ContentItem::new(
            ItemId::new(id),
            MediaRef::new(id),
            ContentAttributes::from_parts(categories, tags, &[], &[]),
        )
    }

    fn ids(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.id().as_str()).collect()
    }

    #[test]
    fn test_decay_weights() {
        let decay = DecayPolicy::default();
        assert_eq!(decay.weight(0), 0.5);
        assert!((decay.weight(1) - 1.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(decay.weight(2), 0.25);
    }

    #[test]
    fn test_scifi_scenario() {
        let x = item("X", &["sci-fi"], &[]);
        let y = item("Y", &["sci-fi"], &[]);
        let z = item("Z", &["drama"], &[]);

        let ranked = Ranker::default().rank(&x, &[], vec![y, z], &HashSet::new());
        assert_eq!(ids(&ranked), vec!["Y", "Z"]);
    }

    #[test]
    fn test_zero_scores_are_kept_in_candidate_order() {
        let focus = item("F", &["art"], &[]);
        let candidates = vec![item("a", &[], &[]), item("b", &[], &[]), item("c", &[], &[])];

        let ranked = Ranker::default().rank(&focus, &[], candidates, &HashSet::new());
        assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_excluded_and_focus_are_dropped() {
        let focus = item("F", &["art"], &[]);
        let candidates = vec![
            item("F", &["art"], &[]),
            item("seen", &["art"], &[]),
            item("fresh", &[], &[]),
        ];
        let exclude: HashSet<ItemId> = [ItemId::new("seen")].into_iter().collect();

        let ranked = Ranker::default().rank(&focus, &[], candidates, &exclude);
        assert_eq!(ids(&ranked), vec!["fresh"]);
    }

    #[test]
    fn test_empty_candidates() {
        let focus = item("F", &["art"], &[]);
        let ranked = Ranker::default().rank(&focus, &[], vec![], &HashSet::new());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_history_contributes_with_decay() {
        let ranker = Ranker::default();
        let focus = item("F", &[], &[]);
        let visited = item("H", &["film"], &[]);
        let candidate = item("c", &["film"], &[]);

        let score = ranker
            .composite_score(&focus, &[visited], &candidate, &HashSet::new())
            .unwrap();
        // category overlap (2.0) at half weight
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_recent_match_outweighs_older_match() {
        let ranker = Ranker::default();
        let focus = item("F", &[], &[]);
        let matching = item("M", &["film"], &[]);
        let other = item("O", &["music"], &[]);
        let candidate = item("c", &["film"], &[]);
        let none = HashSet::new();

        let recent = ranker
            .composite_score(&focus, &[other.clone(), matching.clone()], &candidate, &none)
            .unwrap();
        let older = ranker
            .composite_score(&focus, &[matching, other], &candidate, &none)
            .unwrap();

        assert!(recent > older);
    }

    #[test]
    fn test_history_breaks_focus_ties() {
        let focus = item("F", &["art"], &[]);
        let previous = item("P", &[], &["neon"]);
        let plain = item("plain", &["art"], &[]);
        let neon = item("neon", &["art"], &["neon"]);

        let ranked = Ranker::default().rank(
            &focus,
            &[previous],
            vec![plain, neon],
            &HashSet::new(),
        );
        assert_eq!(ids(&ranked), vec!["neon", "plain"]);
    }
}
