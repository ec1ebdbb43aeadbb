//! Person and organization name comparators
//!
//! Each comparator owns its metric and its similarity level. Instances are
//! built explicitly by their users; nothing here is shared or global.

use crate::metric::{SimilarityMetric, SorensenDice};
use crate::normalize::{is_short_name, normalize_name, normalized_names_for};

/// Similarity level used when none is configured
pub const DEFAULT_SIMILARITY_LEVEL: f64 = 0.7;

fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Compares person names given as (first name, last name)
#[derive(Debug, Clone)]
pub struct PersonNameComparator<M = SorensenDice> {
    metric: M,
    similarity_level: f64,
}

impl PersonNameComparator<SorensenDice> {
    pub fn new() -> Self {
        Self::with_metric(SorensenDice)
    }
}

impl Default for PersonNameComparator<SorensenDice> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: SimilarityMetric> PersonNameComparator<M> {
    pub fn with_metric(metric: M) -> Self {
        Self {
            metric,
            similarity_level: DEFAULT_SIMILARITY_LEVEL,
        }
    }

    /// Builder method to set the similarity level
    pub fn with_similarity_level(mut self, level: f64) -> Self {
        self.set_similarity_level(level);
        self
    }

    pub fn similarity_level(&self) -> f64 {
        self.similarity_level
    }

    /// Change the similarity level; the value is clamped to [0, 1].
    pub fn set_similarity_level(&mut self, level: f64) {
        self.similarity_level = clamp_level(level);
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Similarity of two persons in [0, 1].
    ///
    /// - 0 when any name component is blank
    /// - exactly the similarity level when the names are identical, in the same or
    ///   swapped order
    /// - otherwise the best of the "same order" and "first and last swapped"
    ///   hypotheses, each averaging the first-name and last-name scores. Initials
    ///   are considered whenever one of the four components is itself made of
    ///   initials, so "S." matches "Stephane".
    pub fn similarity(&self, first1: &str, last1: &str, first2: &str, last2: &str) -> f64 {
        let components = [first1, last1, first2, last2];
        if components.iter().any(|c| normalize_name(c).is_none()) {
            return 0.0;
        }

        if (first1 == first2 && last1 == last2) || (first1 == last2 && last1 == first2) {
            return self.similarity_level;
        }

        let short_names = components.iter().any(|c| is_short_name(c));
        let firsts1 = normalized_names_for(first1, short_names);
        let firsts2 = normalized_names_for(first2, short_names);
        let lasts1 = normalized_names_for(last1, false);
        let lasts2 = normalized_names_for(last2, false);

        let same_order = (self.metric.best_similarity(&firsts1, &firsts2)
            + self.metric.best_similarity(&lasts1, &lasts2))
            / 2.0;
        let swapped = (self.metric.best_similarity(&firsts1, &lasts2)
            + self.metric.best_similarity(&lasts1, &firsts2))
            / 2.0;

        same_order.max(swapped)
    }

    pub fn is_similar(&self, first1: &str, last1: &str, first2: &str, last2: &str) -> bool {
        self.similarity(first1, last1, first2, last2) >= self.similarity_level
    }
}

/// Compares organizations given as (acronym, name)
///
/// Unlike persons, a missing field cannot disprove similarity: a field that is
/// blank on either side scores 1.
#[derive(Debug, Clone)]
pub struct OrganizationNameComparator<M = SorensenDice> {
    metric: M,
    similarity_level: f64,
}

impl OrganizationNameComparator<SorensenDice> {
    pub fn new() -> Self {
        Self::with_metric(SorensenDice)
    }
}

impl Default for OrganizationNameComparator<SorensenDice> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: SimilarityMetric> OrganizationNameComparator<M> {
    pub fn with_metric(metric: M) -> Self {
        Self {
            metric,
            similarity_level: DEFAULT_SIMILARITY_LEVEL,
        }
    }

    /// Builder method to set the similarity level
    pub fn with_similarity_level(mut self, level: f64) -> Self {
        self.set_similarity_level(level);
        self
    }

    pub fn similarity_level(&self) -> f64 {
        self.similarity_level
    }

    /// Change the similarity level; the value is clamped to [0, 1].
    pub fn set_similarity_level(&mut self, level: f64) {
        self.similarity_level = clamp_level(level);
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Best of the acronym score and the name score.
    pub fn similarity(
        &self,
        acronym1: Option<&str>,
        name1: Option<&str>,
        acronym2: Option<&str>,
        name2: Option<&str>,
    ) -> f64 {
        let acronym = self.field_similarity(acronym1, acronym2);
        let name = self.field_similarity(name1, name2);
        acronym.max(name)
    }

    pub fn is_similar(
        &self,
        acronym1: Option<&str>,
        name1: Option<&str>,
        acronym2: Option<&str>,
        name2: Option<&str>,
    ) -> bool {
        self.similarity(acronym1, name1, acronym2, name2) >= self.similarity_level
    }

    fn field_similarity(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        match (a.and_then(normalize_name), b.and_then(normalize_name)) {
            (Some(a), Some(b)) => self.metric.similarity(&a, &b),
            _ => 1.0,
        }
    }
}
