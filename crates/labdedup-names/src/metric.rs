//! String similarity metrics normalized to [0, 1]

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use strsim::sorensen_dice;

/// A symmetric similarity between two strings: 0 = unrelated, 1 = identical
pub trait SimilarityMetric {
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Best score over every pair taken from the two sets; 0 when either set is empty.
    fn best_similarity(&self, a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
        let mut best: f64 = 0.0;
        for left in a {
            for right in b {
                best = best.max(self.similarity(left, right));
                if best >= 1.0 {
                    return best;
                }
            }
        }
        best
    }
}

/// Sorensen-Dice coefficient over character bigrams (whitespace ignored)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SorensenDice;

impl SimilarityMetric for SorensenDice {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        sorensen_dice(a, b)
    }
}

/// Jaccard index over whitespace-separated tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Jaccard;

impl SimilarityMetric for Jaccard {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let words_a: HashSet<&str> = a.split_whitespace().collect();
        let words_b: HashSet<&str> = b.split_whitespace().collect();

        let union = words_a.union(&words_b).count();
        if union == 0 {
            return 1.0;
        }
        let intersection = words_a.intersection(&words_b).count();

        intersection as f64 / union as f64
    }
}

/// Metric selection, usable where the metric comes from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[default]
    SorensenDice,
    Jaccard,
}

impl SimilarityMetric for MetricKind {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        match self {
            MetricKind::SorensenDice => SorensenDice.similarity(a, b),
            MetricKind::Jaccard => Jaccard.similarity(a, b),
        }
    }
}
