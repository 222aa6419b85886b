//! Weighted attribute-overlap similarity between two content items.
//!
//! ```text
//! score(a, b) = w_cat   * |categories(a) ∩ categories(b)|
//!             + w_tag   * |tags(a) ∩ tags(b)|
//!             + w_mood  * |moods(a) ∩ moods(b)|
//!             + w_color * |colors(a) ∩ colors(b)|
//! ```
//!
//! The score is symmetric and never negative. Items with nothing in common
//! score zero.

use std::collections::BTreeSet;

use crate::models::{ContentAttributes, ContentItem};

/// Per-attribute weights for the similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub category: f64,
    pub tag: f64,
    pub mood: f64,
    pub color: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category: 2.0,
            tag: 1.0,
            mood: 1.5,
            color: 1.0,
        }
    }
}

impl ScoringWeights {
    /// Scores two items with these weights.
    #[must_use]
    pub fn score(&self, a: &ContentItem, b: &ContentItem) -> f64 {
        self.score_attributes(&a.attributes, &b.attributes)
    }

    #[must_use]
    pub fn score_attributes(&self, a: &ContentAttributes, b: &ContentAttributes) -> f64 {
        self.category * overlap(&a.categories, &b.categories)
            + self.tag * overlap(&a.tags, &b.tags)
            + self.mood * overlap(&a.moods, &b.moods)
            + self.color * overlap(&a.colors, &b.colors)
    }
}

/// Scores two items with the default weights.
#[must_use]
pub fn score(a: &ContentItem, b: &ContentItem) -> f64 {
    ScoringWeights::default().score(a, b)
}

fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    a.intersection(b).count() as f64
}
