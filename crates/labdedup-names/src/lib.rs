//! labdedup-names: name handling for record deduplication
//!
//! This crate provides:
//! - Parsing of person-name lists ("Last, First and Last, First" or "First Last, First Last")
//! - Normalization of name fragments (case, diacritics, punctuation)
//! - Expansion of a name into its full/initial variants
//! - Pluggable string similarity metrics (Sorensen-Dice bigrams, token Jaccard)
//! - Person and organization name comparators with a configurable similarity level

pub mod comparator;
pub mod error;
pub mod metric;
pub mod normalize;
pub mod parser;

pub use comparator::{
    OrganizationNameComparator, PersonNameComparator, DEFAULT_SIMILARITY_LEVEL,
};
pub use error::{NameError, Result};
pub use metric::{Jaccard, MetricKind, SimilarityMetric, SorensenDice};
pub use normalize::{is_short_name, normalize_name, normalized_names_for};
pub use parser::{
    format_name_for_display, parse_first_name, parse_last_name, parse_name_list, parse_names,
    NameFragment,
};
