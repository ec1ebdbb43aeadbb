//! labdedup-core: duplicate detection and merge of research records
//!
//! This crate provides:
//! - Domain records that take part in name matching and cross-references
//! - Storage collaborator traits and an in-memory backend
//! - Duplicate clustering over persons or organizations
//! - Reference-preserving merge of duplicate organizations and persons
//! - Comparator configuration loaded from TOML
//!
//! Name parsing, normalization and similarity live in `labdedup-names` and
//! are re-exported here.

pub mod config;
pub mod domain;
pub mod duplicates;
pub mod error;
pub mod memory_store;
pub mod merge;
pub mod store;

pub use config::{ComparatorConfig, DedupConfig};
pub use domain::{
    AssociatedStructure, AssociatedStructureHolder, CanonicalOrder, Entity, EntityId, Membership,
    Organization, OrganizationReferences, Person, PersonReferences, Project, TeachingActivity,
};
pub use duplicates::{
    find_duplicate_organizations, find_duplicate_persons, find_duplicates, find_duplicates_by,
    DuplicateProgress, SimilarityCheck,
};
pub use error::{ConfigError, DedupError, MergeError, Result, StoreError};
pub use memory_store::{MemoryStore, StoreStats};
pub use merge::{
    MergePlan, MergeReport, OrganizationMergePlan, OrganizationMerger, PersonMergePlan,
    PersonMerger,
};
pub use store::{Change, Changeset, OrganizationStore, PersonStore, Repository, UnitOfWork};

pub use labdedup_names as names;
