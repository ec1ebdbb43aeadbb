//! Configuration for labdedup-core
//!
//! Comparator settings are read from a TOML file:
//!
//! ```toml
//! [person]
//! similarity_level = 0.8
//! metric = "sorensen_dice"
//!
//! [organization]
//! similarity_level = 0.65
//! metric = "jaccard"
//! ```
//!
//! Missing tables and keys take their default values.

use std::path::Path;

use labdedup_names::{
    MetricKind, OrganizationNameComparator, PersonNameComparator, DEFAULT_SIMILARITY_LEVEL,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Deduplication configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Settings of the person name comparator
    pub person: ComparatorConfig,
    /// Settings of the organization name comparator
    pub organization: ComparatorConfig,
}

/// Settings of one name comparator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorConfig {
    /// Minimum similarity for two names to be duplicates, in [0, 1]
    pub similarity_level: f64,
    pub metric: MetricKind,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            similarity_level: DEFAULT_SIMILARITY_LEVEL,
            metric: MetricKind::default(),
        }
    }
}

impl ComparatorConfig {
    pub fn person_comparator(&self) -> PersonNameComparator<MetricKind> {
        PersonNameComparator::with_metric(self.metric).with_similarity_level(self.similarity_level)
    }

    pub fn organization_comparator(&self) -> OrganizationNameComparator<MetricKind> {
        OrganizationNameComparator::with_metric(self.metric)
            .with_similarity_level(self.similarity_level)
    }

    fn validated(mut self, section: &str) -> Result<Self, ConfigError> {
        if self.similarity_level.is_nan() {
            return Err(ConfigError::Invalid(format!(
                "{}.similarity_level is not a number",
                section
            )));
        }
        self.similarity_level = self.similarity_level.clamp(0.0, 1.0);
        Ok(self)
    }
}

impl DedupConfig {
    /// Parse a configuration from TOML text. Similarity levels outside [0, 1]
    /// are clamped.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DedupConfig = toml::from_str(content)?;
        Ok(Self {
            person: config.person.validated("person")?,
            organization: config.organization.validated("organization")?,
        })
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded deduplication settings from {:?}", path.as_ref());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DedupConfig::default();
        assert_eq!(config.person.similarity_level, 0.7);
        assert_eq!(config.organization.metric, MetricKind::SorensenDice);
    }

    #[test]
    fn test_partial_file() {
        let config = DedupConfig::from_toml_str(
            r#"
            [organization]
            similarity_level = 0.65
            metric = "jaccard"
            "#,
        )
        .unwrap();
        assert_eq!(config.person, ComparatorConfig::default());
        assert_eq!(config.organization.similarity_level, 0.65);
        assert_eq!(config.organization.metric, MetricKind::Jaccard);
    }

    #[test]
    fn test_levels_are_clamped() {
        let config = DedupConfig::from_toml_str(
            "[person]\nsimilarity_level = 1.4\n[organization]\nsimilarity_level = -2.0\n",
        )
        .unwrap();
        assert_eq!(config.person.similarity_level, 1.0);
        assert_eq!(config.organization.similarity_level, 0.0);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            DedupConfig::from_toml_str("[person]\nsimilarity_level = nan\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DedupConfig::from_toml_str("[person]\nmetric = \"levenshtein\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_comparators_follow_config() {
        let config = ComparatorConfig {
            similarity_level: 0.9,
            metric: MetricKind::Jaccard,
        };
        assert_eq!(config.person_comparator().similarity_level(), 0.9);
        assert_eq!(
            *config.organization_comparator().metric(),
            MetricKind::Jaccard
        );
    }
}
